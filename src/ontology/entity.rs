//! Recognized entities and the externally-supplied span shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EntityKind, OntologyClass};

/// Type of a recognized entity: a known kind, or a name the ontology does not
/// classify (kept verbatim so it still yields a stable node URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Known(EntityKind),
    Other(String),
}

impl EntityType {
    pub fn from_name(name: &str) -> Self {
        match EntityKind::from_name(name) {
            Some(kind) => EntityType::Known(kind),
            None => EntityType::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Known(kind) => kind.as_str(),
            EntityType::Other(name) => name,
        }
    }

    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            EntityType::Known(kind) => Some(*kind),
            EntityType::Other(_) => None,
        }
    }

    /// Unmapped types degrade to the generic `Entity` class.
    pub fn class(&self) -> OntologyClass {
        self.kind().map_or(OntologyClass::Entity, EntityKind::class)
    }
}

impl From<EntityKind> for EntityType {
    fn from(kind: EntityKind) -> Self {
        EntityType::Known(kind)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntityType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(EntityType::from_name(&name))
    }
}

/// A typed span recognized in a piece of text.
///
/// `start` / `end` are character offsets into the source text. They are
/// informational; nothing downstream reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

impl Entity {
    pub fn new(entity_type: impl Into<EntityType>, value: impl Into<String>) -> Self {
        let value = value.into();
        let end = value.chars().count();
        Self { entity_type: entity_type.into(), value, start: 0, end }
    }
}

/// A span produced by an external recognizer (the dialogue layer's NLU).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEntity {
    pub entity: String,
    pub value: String,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

impl ExternalEntity {
    pub fn new(entity: impl Into<String>, value: impl Into<String>) -> Self {
        Self { entity: entity.into(), value: value.into(), start: None, end: None }
    }

    /// Parse a JSON array of spans, skipping items without a string `entity`
    /// and `value`. Anything that is not an array yields no spans.
    pub fn from_json_list(value: &Value) -> Vec<ExternalEntity> {
        let Some(items) = value.as_array() else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let entity = item.get("entity")?.as_str()?;
                let value = item.get("value")?.as_str()?;
                let offset = |key: &str| {
                    item.get(key)
                        .and_then(Value::as_u64)
                        .and_then(|n| usize::try_from(n).ok())
                };
                Some(ExternalEntity {
                    entity: entity.to_string(),
                    value: value.to_string(),
                    start: offset("start"),
                    end: offset("end"),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_type_name_is_kept() {
        let t = EntityType::from_name("volcano");
        assert_eq!(t, EntityType::Other("volcano".into()));
        assert_eq!(t.as_str(), "volcano");
        assert_eq!(t.class(), OntologyClass::Entity);
    }

    #[test]
    fn known_type_name_maps_to_kind() {
        let t = EntityType::from_name("water_source");
        assert_eq!(t.kind(), Some(EntityKind::WaterSource));
        assert_eq!(t.class(), OntologyClass::WaterSource);
    }

    #[test]
    fn entity_new_defaults_span_to_value_length() {
        let e = Entity::new(EntityKind::Location, "Nyiragongo");
        assert_eq!((e.start, e.end), (0, 10));
    }

    #[test]
    fn entity_serializes_type_as_name() {
        let e = Entity::new(EntityKind::Camp, "Bulengo");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "camp");
        assert_eq!(v["value"], "Bulengo");
    }

    #[test]
    fn external_list_skips_malformed_items() {
        let raw = json!([
            {"entity": "location", "value": "goma", "start": 4, "end": 8},
            {"entity": "location"},
            {"value": "no type"},
            "not an object",
            {"entity": "person_name", "value": "Amani"}
        ]);
        let parsed = ExternalEntity::from_json_list(&raw);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].start, Some(4));
        assert_eq!(parsed[1].entity, "person_name");
        assert_eq!(parsed[1].end, None);
    }

    #[test]
    fn external_list_from_non_array_is_empty() {
        assert!(ExternalEntity::from_json_list(&json!({"entity": "x"})).is_empty());
    }
}
