//! Text → triple store pipeline.
//!
//! Each call builds a fresh [`Graph`] increment: recognize entities, map every
//! entity to a node, link co-occurring entities, hand the increment to the
//! synchronizer, drop it.

use serde::Serialize;
use tracing::{info, warn};

use super::entity::{Entity, ExternalEntity};
use super::graph::Graph;
use super::linker::link_entities;
use super::mapper::entity_to_node;
use super::recognizer::recognize;
use super::sync::GraphSynchronizer;

/// Outcome of one population call.
#[derive(Debug, Clone, Serialize)]
pub struct PopulationReport {
    pub entities: Vec<Entity>,
    /// Distinct triples in the increment that was submitted.
    pub triples: usize,
    /// Relationship triples among them.
    pub relations: usize,
    pub synced: bool,
}

#[derive(Debug, Clone)]
pub struct Populator {
    synchronizer: GraphSynchronizer,
}

impl Populator {
    pub fn new(synchronizer: GraphSynchronizer) -> Self {
        Self { synchronizer }
    }

    /// Build the increment for one text without submitting it.
    pub fn build_increment(text: &str, external: &[ExternalEntity]) -> (Vec<Entity>, Graph, usize) {
        let entities = recognize(text, external);
        let mut graph = Graph::new();
        for entity in &entities {
            entity_to_node(entity, &mut graph);
        }
        let relations = link_entities(&entities, &mut graph);
        (entities, graph, relations)
    }

    /// Recognize, map, link and synchronize a single text.
    pub fn populate_text(&self, text: &str, external: &[ExternalEntity]) -> PopulationReport {
        let (entities, graph, relations) = Self::build_increment(text, external);
        if entities.is_empty() {
            info!("no entities recognized");
        }
        let synced = self.synchronizer.sync(&graph);
        PopulationReport { entities, triples: graph.len(), relations, synced }
    }

    /// Batch variant: one increment for all sentences, each sentence
    /// recognized (keyword fallback) and linked on its own, one sync at the end.
    pub fn populate_sentences<S: AsRef<str>>(&self, sentences: &[S]) -> PopulationReport {
        if sentences.is_empty() {
            warn!("no sentences to process");
            return PopulationReport {
                entities: Vec::new(),
                triples: 0,
                relations: 0,
                synced: false,
            };
        }

        let mut graph = Graph::new();
        let mut entities = Vec::new();
        let mut relations = 0;
        for sentence in sentences {
            let (found, increment, linked) = Self::build_increment(sentence.as_ref(), &[]);
            graph.extend(increment);
            relations += linked;
            entities.extend(found);
        }
        info!(
            entities = entities.len(),
            sentences = sentences.len(),
            "recognized entities in sentences"
        );

        let synced = self.synchronizer.sync(&graph);
        PopulationReport { entities, triples: graph.len(), relations, synced }
    }
}
