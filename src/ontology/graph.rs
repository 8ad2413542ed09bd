//! In-memory graph increment and its Turtle serialization.
//!
//! A [`Graph`] is created per text-processing call, filled by the mapper and
//! the linker, handed whole to the synchronizer and then dropped. Triples
//! are only ever added; adding a triple twice is a no-op.

use std::collections::{BTreeMap, BTreeSet, btree_map};
use std::string::FromUtf8Error;

use oxttl::TurtleSerializer;
use thiserror::Error;

pub use oxrdf::{Literal, NamedNode, Subject, Term, Triple};

use super::{PREFIXES, Predicate};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid prefix '{0}'")]
    Prefix(String),

    #[error("turtle write failed: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("turtle output is not UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

/// Set of triples.
///
/// Keyed by the N-Triples line of each triple, which keeps iteration and
/// serialization deterministic and every subject's triples adjacent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: BTreeMap<String, Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple. Returns `false` when it was already present.
    pub fn add(&mut self, triple: Triple) -> bool {
        match self.triples.entry(triple.to_string()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(triple);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains_key(&triple.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.values()
    }

    /// Triples whose predicate is `predicate`.
    pub fn with_predicate(&self, predicate: Predicate) -> impl Iterator<Item = &Triple> {
        let iri = predicate.iri();
        self.triples.values().filter(move |t| t.predicate.as_str() == iri)
    }

    /// Distinct subject IRIs.
    pub fn subjects(&self) -> BTreeSet<&str> {
        self.triples
            .values()
            .filter_map(|t| match &t.subject {
                Subject::NamedNode(node) => Some(node.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Merge another increment into this one.
    pub fn extend(&mut self, other: Graph) {
        for (key, triple) in other.triples {
            self.triples.entry(key).or_insert(triple);
        }
    }

    /// Serialize as a Turtle document with the ontology prefixes bound.
    pub fn to_turtle(&self) -> Result<String, GraphError> {
        let mut serializer = TurtleSerializer::new();
        for (prefix, ns) in PREFIXES {
            serializer = serializer
                .with_prefix(*prefix, *ns)
                .map_err(|_| GraphError::Prefix((*prefix).to_string()))?;
        }

        let mut writer = serializer.for_writer(Vec::new());
        for triple in self.triples.values() {
            writer.serialize_triple(triple)?;
        }
        Ok(String::from_utf8(writer.finish()?)?)
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = btree_map::Values<'a, String, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.values()
    }
}
