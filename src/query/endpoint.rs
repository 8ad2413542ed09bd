//! SPARQL query execution.
//!
//! Same shape as the triple-store backends: an enum over concrete endpoints,
//! each failure logged and reduced to "no results".

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::{StoreBackend, StoreConfig};

use super::results::QueryResults;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("query request failed: {0}")]
    Transport(String),
    #[error("query endpoint answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("query response is not JSON: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub enum SparqlEndpoint {
    Fuseki(FusekiEndpoint),
    Static(StaticEndpoint),
}

impl SparqlEndpoint {
    /// Fuseki for the `fuseki` backend; the `dummy` backend answers every
    /// query with no rows.
    pub fn from_config(cfg: &StoreConfig) -> Result<Self, EndpointError> {
        match cfg.backend {
            StoreBackend::Fuseki => {
                Ok(SparqlEndpoint::Fuseki(FusekiEndpoint::new(cfg.query_endpoint())?))
            }
            StoreBackend::Dummy => Ok(SparqlEndpoint::Static(StaticEndpoint::default())),
        }
    }

    /// Run `query`. `None` on any failure.
    pub fn execute(&self, query: &str) -> Option<QueryResults> {
        let outcome = match self {
            SparqlEndpoint::Fuseki(e) => e.select(query),
            SparqlEndpoint::Static(e) => Ok(e.results.clone()),
        };
        match outcome {
            Ok(results) => {
                debug!(rows = results.len(), "query executed");
                Some(results)
            }
            Err(e) => {
                error!(error = %e, "error executing query");
                None
            }
        }
    }
}

/// Fuseki SPARQL endpoint (`POST {base}/{dataset}/query`, form-encoded).
#[derive(Debug, Clone)]
pub struct FusekiEndpoint {
    client: Client,
    query_endpoint: String,
}

impl FusekiEndpoint {
    pub fn new(query_endpoint: String) -> Result<Self, EndpointError> {
        let client = Client::builder()
            .build()
            .map_err(|e| EndpointError::Client(e.to_string()))?;
        Ok(Self { client, query_endpoint })
    }

    pub fn query_endpoint(&self) -> &str {
        &self.query_endpoint
    }

    fn select(&self, query: &str) -> Result<QueryResults, EndpointError> {
        let response = self
            .client
            .post(&self.query_endpoint)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", query)])
            .send()
            .map_err(|e| EndpointError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EndpointError::Status { status: status.as_u16(), body });
        }

        let doc: Value = response
            .json()
            .map_err(|e| EndpointError::Decode(e.to_string()))?;
        Ok(QueryResults::from_json(&doc))
    }
}

/// Answers every query with the same canned results.
#[derive(Debug, Clone, Default)]
pub struct StaticEndpoint {
    results: QueryResults,
}

impl StaticEndpoint {
    pub fn new(results: QueryResults) -> Self {
        Self { results }
    }
}
