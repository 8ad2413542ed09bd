//! Humanitarian ontology: vocabulary, entity recognition and graph population.
//!
//! - **entity**: recognized spans and the externally-supplied span shape.
//! - **recognizer**: external-span mapping with keyword fallback.
//! - **graph**: the in-memory triple increment and its Turtle serialization.
//! - **mapper**: entity → node (type / label / name triples).
//! - **linker**: co-occurrence relationships from [`RELATION_RULES`].
//! - **sync**: hands an increment to the triple store.
//! - **preprocess**: text cleaning and sentence splitting for batch input.
//! - **hdx**: text columns of HDX spreadsheet exports.
//! - **population**: the text → store pipeline tying the above together.
//!
//! The class table and the relationship rule table live here as plain data so
//! they can be inspected and tested apart from the code that applies them.

pub mod entity;
pub mod graph;
pub mod hdx;
pub mod linker;
pub mod mapper;
pub mod population;
pub mod preprocess;
pub mod recognizer;
pub mod sync;

use std::fmt;

pub use entity::{Entity, EntityType, ExternalEntity};
pub use graph::{Graph, GraphError, Literal, NamedNode, Subject, Term, Triple};
pub use linker::link_entities;
pub use mapper::{entity_to_node, node_uri};
pub use population::{PopulationReport, Populator};
pub use recognizer::recognize;
pub use sync::{DummyStore, FusekiStore, GraphSynchronizer, StoreError, TripleStore};

// ── Namespaces ────────────────────────────────────────────────────────────────

/// Humanitarian ontology namespace. Every node URI lives under it.
pub const HUMANITARIAN_NS: &str = "http://example.org/humanitarian#";
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// `(prefix, namespace)` pairs bound in serialized documents and query headers.
pub const PREFIXES: &[(&str, &str)] = &[
    ("humanitarian", HUMANITARIAN_NS),
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("xsd", XSD_NS),
];

// ── Entity kinds ──────────────────────────────────────────────────────────────

/// The closed set of entity kinds the ontology knows how to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Camp,
    HealthFacility,
    WaterSource,
    Location,
    Organization,
    Service,
    Need,
    Person,
    SicknessType,
    ServiceType,
    /// Alias target of external `sickness_type` spans. Has no class of its
    /// own and falls back to the generic `Entity` class.
    Sickness,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Camp,
        EntityKind::HealthFacility,
        EntityKind::WaterSource,
        EntityKind::Location,
        EntityKind::Organization,
        EntityKind::Service,
        EntityKind::Need,
        EntityKind::Person,
        EntityKind::SicknessType,
        EntityKind::ServiceType,
        EntityKind::Sickness,
    ];

    /// Canonical snake_case name; also the prefix of node URIs.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Camp => "camp",
            EntityKind::HealthFacility => "health_facility",
            EntityKind::WaterSource => "water_source",
            EntityKind::Location => "location",
            EntityKind::Organization => "organization",
            EntityKind::Service => "service",
            EntityKind::Need => "need",
            EntityKind::Person => "person",
            EntityKind::SicknessType => "sickness_type",
            EntityKind::ServiceType => "service_type",
            EntityKind::Sickness => "sickness",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Entity kind → ontology class.
    pub fn class(self) -> OntologyClass {
        match self {
            EntityKind::Camp => OntologyClass::Camp,
            EntityKind::HealthFacility => OntologyClass::HealthFacility,
            EntityKind::WaterSource => OntologyClass::WaterSource,
            EntityKind::Location => OntologyClass::Location,
            EntityKind::Organization => OntologyClass::Ngo,
            EntityKind::Service => OntologyClass::HealthService,
            EntityKind::Need => OntologyClass::Need,
            EntityKind::Person => OntologyClass::DisplacedPerson,
            EntityKind::SicknessType => OntologyClass::HealthNeed,
            EntityKind::ServiceType => OntologyClass::HealthService,
            EntityKind::Sickness => OntologyClass::Entity,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Classes and predicates ────────────────────────────────────────────────────

/// Classes of the humanitarian ontology that population can assert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OntologyClass {
    Camp,
    HealthFacility,
    WaterSource,
    Location,
    Ngo,
    HealthService,
    Need,
    DisplacedPerson,
    HealthNeed,
    /// Generic fallback for anything unmapped.
    Entity,
}

impl OntologyClass {
    pub fn local_name(self) -> &'static str {
        match self {
            OntologyClass::Camp => "Camp",
            OntologyClass::HealthFacility => "HealthFacility",
            OntologyClass::WaterSource => "WaterSource",
            OntologyClass::Location => "Location",
            OntologyClass::Ngo => "NGO",
            OntologyClass::HealthService => "HealthService",
            OntologyClass::Need => "Need",
            OntologyClass::DisplacedPerson => "DisplacedPerson",
            OntologyClass::HealthNeed => "HealthNeed",
            OntologyClass::Entity => "Entity",
        }
    }

    pub fn iri(self) -> String {
        format!("{HUMANITARIAN_NS}{}", self.local_name())
    }

    pub fn node(self) -> NamedNode {
        // Fixed ASCII vocabulary under a constant namespace.
        NamedNode::new_unchecked(self.iri())
    }
}

/// Predicates emitted by the mapper and the linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    Type,
    Label,
    Name,
    HasLocation,
    ProvidesService,
    Treats,
    RegisteredAt,
    HasNeed,
}

impl Predicate {
    pub fn iri(self) -> String {
        match self {
            Predicate::Type => format!("{RDF_NS}type"),
            Predicate::Label => format!("{RDFS_NS}label"),
            Predicate::Name => format!("{HUMANITARIAN_NS}name"),
            Predicate::HasLocation => format!("{HUMANITARIAN_NS}hasLocation"),
            Predicate::ProvidesService => format!("{HUMANITARIAN_NS}providesService"),
            Predicate::Treats => format!("{HUMANITARIAN_NS}treats"),
            Predicate::RegisteredAt => format!("{HUMANITARIAN_NS}registeredAt"),
            Predicate::HasNeed => format!("{HUMANITARIAN_NS}hasNeed"),
        }
    }

    pub fn node(self) -> NamedNode {
        NamedNode::new_unchecked(self.iri())
    }
}

// ── Relationship rules ────────────────────────────────────────────────────────

/// Which end of a rule becomes the triple's subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `source predicate target`
    Forward,
    /// `target predicate source`
    Reverse,
}

/// One row of the co-occurrence rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationRule {
    pub source: EntityKind,
    pub target: EntityKind,
    pub predicate: Predicate,
    pub direction: Direction,
}

/// Every `(source, target)` kind pair that produces an edge when both kinds
/// occur in the same entity batch.
pub const RELATION_RULES: &[RelationRule] = &[
    RelationRule {
        source: EntityKind::HealthFacility,
        target: EntityKind::Location,
        predicate: Predicate::HasLocation,
        direction: Direction::Forward,
    },
    RelationRule {
        source: EntityKind::Camp,
        target: EntityKind::Location,
        predicate: Predicate::HasLocation,
        direction: Direction::Forward,
    },
    RelationRule {
        source: EntityKind::Organization,
        target: EntityKind::Service,
        predicate: Predicate::ProvidesService,
        direction: Direction::Forward,
    },
    RelationRule {
        source: EntityKind::ServiceType,
        target: EntityKind::HealthFacility,
        predicate: Predicate::ProvidesService,
        direction: Direction::Reverse,
    },
    RelationRule {
        source: EntityKind::SicknessType,
        target: EntityKind::HealthFacility,
        predicate: Predicate::Treats,
        direction: Direction::Reverse,
    },
    RelationRule {
        source: EntityKind::Person,
        target: EntityKind::Camp,
        predicate: Predicate::RegisteredAt,
        direction: Direction::Forward,
    },
    RelationRule {
        source: EntityKind::Need,
        target: EntityKind::Person,
        predicate: Predicate::HasNeed,
        direction: Direction::Reverse,
    },
];
