//! Intent → SPARQL query → formatted response.
//!
//! - **template**: parameterized queries with removable optional filters.
//! - **registry**: the immutable intent → template table.
//! - **results**: lenient SPARQL JSON results model.
//! - **endpoint**: query execution against the store.
//! - **formatter**: results → localized response text.
//! - **service**: the caller-facing `respond` entry point.

pub mod endpoint;
pub mod formatter;
pub mod registry;
pub mod results;
pub mod service;
pub mod template;

use std::collections::HashMap;

pub use endpoint::{EndpointError, FusekiEndpoint, SparqlEndpoint, StaticEndpoint};
pub use formatter::{Locale, ResultFormatter};
pub use registry::TemplateRegistry;
pub use results::{Binding, QueryResults};
pub use service::QueryService;
pub use template::QueryTemplate;

/// Named slot values extracted from one conversational turn.
pub type Slots = HashMap<String, String>;

// ── Built-in intents ──────────────────────────────────────────────────────────

pub const INTENT_HEALTH_FACILITIES: &str = "query_health_facilities_swa";
pub const INTENT_WATER_SOURCES: &str = "query_water_sources_swa";
pub const INTENT_CAMPS: &str = "query_camps_swa";
pub const INTENT_AID_REQUEST: &str = "submit_aid_request_swa";

/// `PREFIX` lines shared by every built-in query.
pub fn prefix_header() -> String {
    crate::ontology::PREFIXES
        .iter()
        .filter(|(prefix, _)| *prefix != "xsd")
        .map(|(prefix, ns)| format!("PREFIX {prefix}: <{ns}>\n"))
        .collect()
}
