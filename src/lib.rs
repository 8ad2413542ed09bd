//! Kivu graph: humanitarian entity recognition, knowledge-graph population
//! and intent-driven SPARQL answering for conversational assistants.

pub mod config;
pub mod error;
pub mod logger;
pub mod ontology;
pub mod query;
