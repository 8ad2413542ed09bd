//! Graph synchronizer: submits an increment to the triple store.
//!
//! `TripleStore` is an enum over concrete backends, mirroring how providers
//! are dispatched elsewhere: no trait objects, one match arm per backend.
//! The synchronizer reduces every failure to `false`; nothing it does ever
//! propagates an error to the caller. One delivery attempt per call.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{StoreBackend, StoreConfig};

use super::graph::Graph;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("store request failed: {0}")]
    Transport(String),
    #[error("store answered {status}: {body}")]
    Status { status: u16, body: String },
}

// ── Backends ──────────────────────────────────────────────────────────────────

/// All available triple-store backends.
#[derive(Debug, Clone)]
pub enum TripleStore {
    Fuseki(FusekiStore),
    Dummy(DummyStore),
}

impl TripleStore {
    /// Build the backend selected in config.
    pub fn from_config(cfg: &StoreConfig) -> Result<Self, StoreError> {
        match cfg.backend {
            StoreBackend::Fuseki => Ok(TripleStore::Fuseki(FusekiStore::new(cfg.data_endpoint())?)),
            StoreBackend::Dummy => Ok(TripleStore::Dummy(DummyStore::new())),
        }
    }

    /// Append a Turtle document to the default graph in one request.
    pub fn append(&self, turtle: &str) -> Result<(), StoreError> {
        match self {
            TripleStore::Fuseki(s) => s.append(turtle),
            TripleStore::Dummy(s) => s.append(turtle),
        }
    }
}

/// Apache Jena Fuseki graph store endpoint (`POST {base}/{dataset}/data`).
///
/// `reqwest::blocking::Client` is an `Arc` internally, so clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct FusekiStore {
    client: Client,
    data_endpoint: String,
}

impl FusekiStore {
    pub fn new(data_endpoint: String) -> Result<Self, StoreError> {
        let client = Client::builder()
            .build()
            .map_err(|e| StoreError::Client(e.to_string()))?;
        Ok(Self { client, data_endpoint })
    }

    pub fn data_endpoint(&self) -> &str {
        &self.data_endpoint
    }

    fn append(&self, turtle: &str) -> Result<(), StoreError> {
        debug!(url = %self.data_endpoint, bytes = turtle.len(), "posting graph increment");
        let response = self
            .client
            .post(&self.data_endpoint)
            .header(CONTENT_TYPE, "text/turtle")
            .body(turtle.to_string())
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().unwrap_or_default();
        Err(StoreError::Status { status: status.as_u16(), body })
    }
}

/// In-process stand-in that keeps every accepted document. Used for dry runs
/// and tests; a failing instance rejects everything with a 503.
#[derive(Debug, Clone, Default)]
pub struct DummyStore {
    documents: Arc<Mutex<Vec<String>>>,
    failing: bool,
}

impl DummyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses every append.
    pub fn failing() -> Self {
        Self { failing: true, ..Self::default() }
    }

    /// Documents accepted so far, oldest first.
    pub fn documents(&self) -> Vec<String> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn append(&self, turtle: &str) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Status {
                status: 503,
                body: "dummy store is refusing writes".into(),
            });
        }
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(turtle.to_string());
        Ok(())
    }
}

// ── Synchronizer ──────────────────────────────────────────────────────────────

/// Serializes graph increments and hands them to a [`TripleStore`].
#[derive(Debug, Clone)]
pub struct GraphSynchronizer {
    store: TripleStore,
    export_dir: Option<PathBuf>,
}

impl GraphSynchronizer {
    pub fn new(store: TripleStore) -> Self {
        Self { store, export_dir: None }
    }

    pub fn from_config(cfg: &StoreConfig) -> Result<Self, StoreError> {
        let store = TripleStore::from_config(cfg)?;
        Ok(Self { store, export_dir: cfg.export_dir.clone() })
    }

    /// Also write every non-empty increment as a `.ttl` file under `dir`.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    pub fn store(&self) -> &TripleStore {
        &self.store
    }

    /// Submit `graph` to the store. `true` only when the store acknowledged
    /// the append; an empty graph is refused without contacting the store.
    pub fn sync(&self, graph: &Graph) -> bool {
        if graph.is_empty() {
            warn!("no triples to add to the triple store");
            return false;
        }

        let turtle = match graph.to_turtle() {
            Ok(turtle) => turtle,
            Err(e) => {
                error!(error = %e, "failed to serialize graph increment");
                return false;
            }
        };
        if let Some(dir) = &self.export_dir {
            export_increment(dir, &turtle);
        }

        match self.store.append(&turtle) {
            Ok(()) => {
                info!(triples = graph.len(), "added triples to the triple store");
                true
            }
            Err(StoreError::Status { status, body }) => {
                error!(status, body = %body, "triple store rejected the update");
                false
            }
            Err(e) => {
                error!(error = %e, "error connecting to triple store");
                false
            }
        }
    }
}

fn export_increment(dir: &Path, turtle: &str) {
    let path = dir.join(format!("increment-{}.ttl", uuid::Uuid::now_v7()));
    let written = fs::create_dir_all(dir).and_then(|()| fs::write(&path, turtle));
    match written {
        Ok(()) => debug!(path = %path.display(), "exported graph increment"),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to export graph increment"),
    }
}
