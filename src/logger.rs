//! Stderr logging for the `kivu-graph` binary.
//!
//! The binary calls [`init`] first thing, at `info`, so config failures are
//! logged too. Once config is resolved it narrows or widens the filter with
//! [`LogHandle::set_level`]. Library code only emits `tracing` events.

use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use crate::error::AppError;

/// Handle to the installed filter.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    /// `RUST_LOG` was set and valid at startup; it keeps precedence.
    from_env: bool,
}

impl LogHandle {
    /// Swap the active filter for `level`. The level is validated even when
    /// `RUST_LOG` is in charge, so a broken `log_level` never goes unnoticed.
    pub fn set_level(&self, level: &str) -> Result<(), AppError> {
        let filter = parse_filter(level)?;
        if self.from_env {
            debug!(level, "RUST_LOG set; keeping it over the configured level");
            return Ok(());
        }
        self.filter
            .reload(filter)
            .map_err(|e| AppError::Logger(format!("failed to reload filter: {e}")))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `level` when it parses.
pub fn init(level: &str) -> Result<LogHandle, AppError> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (parse_filter(level)?, false),
    };
    let (filter_layer, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(LogHandle { filter: handle, from_env })
}

/// Parse a level (`"debug"`) or a directive list (`"kivu_graph=debug,reqwest=warn"`).
///
/// A bare word must be a level name. `EnvFilter` alone would take `"verbose"`
/// as a target and silently log nothing from this crate.
pub fn parse_filter(level: &str) -> Result<EnvFilter, AppError> {
    let level = level.trim();
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    for directive in level.split(',').map(str::trim) {
        if !directive.contains('=') && directive.parse::<LevelFilter>().is_err() {
            return Err(AppError::Logger(format!("unrecognised log level: '{directive}'")));
        }
    }
    EnvFilter::try_new(level)
        .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
}
