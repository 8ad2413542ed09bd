//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `KIVU_STORE_URL` and `KIVU_LOG_LEVEL` env overrides.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;
use crate::query::Locale;

/// Which triple-store backend the synchronizer and query endpoint talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Apache Jena Fuseki over HTTP (graph store + SPARQL endpoints).
    Fuseki,
    /// In-memory stand-in; nothing leaves the process.
    Dummy,
}

/// Triple-store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Server root, e.g. `http://localhost:3030`. No trailing slash.
    pub base_url: String,
    /// Dataset name appended to `base_url`.
    pub dataset: String,
    /// When set, every synchronized increment is also written here as Turtle.
    pub export_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Graph store append endpoint (`POST text/turtle`).
    pub fn data_endpoint(&self) -> String {
        format!("{}/{}/data", self.base_url, self.dataset)
    }

    /// SPARQL query endpoint.
    pub fn query_endpoint(&self) -> String {
        format!("{}/{}/query", self.base_url, self.dataset)
    }
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub store: StoreConfig,
    /// Language of user-facing responses.
    pub locale: Locale,
}

/// Raw TOML shape: `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    general: RawGeneral,
    #[serde(default)]
    store: RawStore,
    #[serde(default)]
    responses: RawResponses,
}

#[derive(Deserialize)]
struct RawGeneral {
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize)]
struct RawStore {
    #[serde(default = "default_backend")]
    backend: String,
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_dataset")]
    dataset: String,
    #[serde(default)]
    export_dir: Option<String>,
}

#[derive(Deserialize)]
struct RawResponses {
    #[serde(default = "default_locale")]
    locale: String,
}

impl Default for RawGeneral {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

impl Default for RawStore {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            base_url: default_base_url(),
            dataset: default_dataset(),
            export_dir: None,
        }
    }
}

impl Default for RawResponses {
    fn default() -> Self {
        Self { locale: default_locale() }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_backend() -> String { "fuseki".to_string() }
fn default_base_url() -> String { "http://localhost:3030".to_string() }
fn default_dataset() -> String { "humanitarian".to_string() }
fn default_locale() -> String { "sw".to_string() }

/// Load config from `config/default.toml`, then apply env-var overrides.
pub fn load() -> Result<Config, AppError> {
    load_path(Path::new("config/default.toml"))
}

/// Load config from an explicit file, still honouring env-var overrides.
pub fn load_path(path: &Path) -> Result<Config, AppError> {
    let store_url_override = env::var("KIVU_STORE_URL").ok();
    let log_level_override = env::var("KIVU_LOG_LEVEL").ok();
    load_from(path, store_url_override.as_deref(), log_level_override.as_deref())
}

/// Internal loader: accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    store_url_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    resolve(parsed, store_url_override, log_level_override)
}

fn resolve(
    parsed: RawConfig,
    store_url_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let backend = match parsed.store.backend.as_str() {
        "fuseki" => StoreBackend::Fuseki,
        "dummy" => StoreBackend::Dummy,
        other => {
            return Err(AppError::Config(format!(
                "unknown store backend '{other}' (expected \"fuseki\" or \"dummy\")"
            )));
        }
    };

    let locale: Locale = parsed
        .responses
        .locale
        .parse()
        .map_err(|e| AppError::Config(format!("responses.locale: {e}")))?;

    let base_url = store_url_override
        .unwrap_or(&parsed.store.base_url)
        .trim_end_matches('/')
        .to_string();
    if base_url.is_empty() {
        return Err(AppError::Config("store.base_url must not be empty".into()));
    }

    Ok(Config {
        log_level: log_level_override.unwrap_or(&parsed.general.log_level).to_string(),
        store: StoreConfig {
            backend,
            base_url,
            dataset: parsed.store.dataset,
            export_dir: parsed.store.export_dir.as_deref().map(expand_home),
        },
        locale,
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

impl Default for Config {
    /// Built-in defaults, identical to an empty TOML file.
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            store: StoreConfig {
                backend: StoreBackend::Fuseki,
                base_url: default_base_url(),
                dataset: default_dataset(),
                export_dir: None,
            },
            locale: Locale::Swahili,
        }
    }
}

// ── test helpers ──────────────────────────────────────────────────────────────

#[cfg(test)]
impl Config {
    /// Safe `Config` for unit tests: dummy store, no network.
    pub fn test_default() -> Self {
        Self {
            store: StoreConfig {
                backend: StoreBackend::Dummy,
                base_url: "http://localhost:0".into(),
                dataset: "test".into(),
                export_dir: None,
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_TOML: &str = r#"
[general]
log_level = "debug"

[store]
backend = "dummy"
base_url = "http://fuseki.local:3030/"
dataset = "kivu"

[responses]
locale = "en"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_full_config() {
        let f = write_toml(FULL_TOML);
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.store.backend, StoreBackend::Dummy);
        assert_eq!(cfg.store.base_url, "http://fuseki.local:3030");
        assert_eq!(cfg.store.data_endpoint(), "http://fuseki.local:3030/kivu/data");
        assert_eq!(cfg.store.query_endpoint(), "http://fuseki.local:3030/kivu/query");
        assert_eq!(cfg.locale, Locale::English);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let f = write_toml("");
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.store.backend, StoreBackend::Fuseki);
        assert_eq!(
            cfg.store.data_endpoint(),
            "http://localhost:3030/humanitarian/data"
        );
        assert_eq!(cfg.locale, Locale::Swahili);
        assert!(cfg.store.export_dir.is_none());
    }

    #[test]
    fn overrides_take_precedence() {
        let f = write_toml(FULL_TOML);
        let cfg = load_from(f.path(), Some("http://other:9999"), Some("warn")).unwrap();
        assert_eq!(cfg.store.base_url, "http://other:9999");
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn unknown_backend_errors() {
        let f = write_toml("[store]\nbackend = \"oracle\"\n");
        let msg = load_from(f.path(), None, None).unwrap_err().to_string();
        assert!(msg.contains("config error"));
        assert!(msg.contains("oracle"));
    }

    #[test]
    fn unknown_locale_errors() {
        let f = write_toml("[responses]\nlocale = \"fr\"\n");
        assert!(load_from(f.path(), None, None).is_err());
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), None, None);
        assert!(result.unwrap_err().to_string().contains("config error"));
    }

    #[test]
    fn export_dir_tilde_expands() {
        let f = write_toml("[store]\nexport_dir = \"~/kivu-exports\"\n");
        let cfg = load_from(f.path(), None, None).unwrap();
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let dir = cfg.store.export_dir.unwrap();
        assert!(dir.starts_with(&home));
        assert!(dir.ends_with("kivu-exports"));
    }

    #[test]
    fn absolute_path_unchanged() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }
}
