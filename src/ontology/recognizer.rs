//! Entity recognition.
//!
//! Two paths:
//! - **external**: spans from the dialogue layer's NLU are trusted verbatim;
//!   only their type names are normalised through [`EXTERNAL_ALIASES`].
//! - **fallback**: with no external spans, the lower-cased text is searched
//!   for the multilingual (English / Swahili / Lingala-influenced Kivu
//!   Swahili) keywords in [`KEYWORDS`] and every hit is widened to the
//!   surrounding whitespace-delimited word(s).
//!
//! Each keyword is located with a single `find`, so only its first
//! occurrence in a text produces an entity. Keywords shared between kinds
//! (`maji`, `kambi`, `dawa`, …) produce one entity per kind.

use tracing::{debug, info};

use super::entity::{Entity, EntityType, ExternalEntity};
use super::EntityKind;

/// External type name → ontology type name. Names not listed pass through.
pub const EXTERNAL_ALIASES: &[(&str, &str)] = &[
    ("health_facility", "health_facility"),
    ("water_source", "water_source"),
    ("location", "location"),
    ("service_type", "service"),
    ("request_type", "need"),
    ("person", "person"),
    ("sickness_type", "sickness"),
    ("person_name", "person"),
];

/// Surface keywords per kind, scanned in table order.
pub const KEYWORDS: &[(EntityKind, &[&str])] = &[
    (EntityKind::Camp, &["camp", "site", "kambi", "settlement"]),
    (
        EntityKind::HealthFacility,
        &[
            "hospital", "clinic", "dispensary", "health center", "health centre", "afya",
            "hospitali", "kliniki",
        ],
    ),
    (
        EntityKind::WaterSource,
        &[
            "water", "source", "maji", "stream", "well", "borehole", "mayi", "majii", "robinet",
            "robinets", "kisima",
        ],
    ),
    (
        EntityKind::Location,
        &[
            "goma", "nyiragongo", "rutshuru", "bulengo", "karisimbi", "masisi", "wapi", "fasi",
            "kambi",
        ],
    ),
    (
        EntityKind::Organization,
        &["unhcr", "unicef", "wfp", "who", "msf", "icrc", "ngo", "viongozi"],
    ),
    (
        EntityKind::Service,
        &[
            "education", "protection", "distribution", "vaccination", "treatment", "assistance",
            "tunziwa", "tunza", "tunzaka", "zalisha", "dawa", "ndui", "shoteya", "pokeya", "kamata",
        ],
    ),
    (
        EntityKind::Need,
        &[
            "food", "shelter", "medicine", "security", "education", "chakula", "msaada", "mayi",
            "maji", "dawa", "usalama", "hema", "masomo", "kutunziwa", "blanketi", "sabuni",
            "nafasi", "pesa",
        ],
    ),
    (
        EntityKind::Person,
        &["watoto", "mtu", "wakimbizi", "watu", "batu", "bakimbizi", "familia", "mtoto"],
    ),
    (EntityKind::SicknessType, &["malaria", "malali", "ukimwi", "homa"]),
];

/// Recognize entities in `text`.
///
/// Non-empty `external` spans short-circuit recognition entirely. Never fails;
/// an empty text yields an empty list.
pub fn recognize(text: &str, external: &[ExternalEntity]) -> Vec<Entity> {
    if !external.is_empty() {
        info!(count = external.len(), "using externally recognized entities");
        return external.iter().map(map_external).collect();
    }

    info!("no external entities, falling back to keyword matching");
    let entities = match_keywords(text);
    debug!(count = entities.len(), "keyword matching finished");
    entities
}

/// Resolve an external type name through [`EXTERNAL_ALIASES`].
pub fn alias_type(name: &str) -> EntityType {
    let mapped = EXTERNAL_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map_or(name, |(_, to)| *to);
    EntityType::from_name(mapped)
}

fn map_external(ext: &ExternalEntity) -> Entity {
    Entity {
        entity_type: alias_type(&ext.entity),
        value: ext.value.clone(),
        start: ext.start.unwrap_or(0),
        end: ext.end.unwrap_or_else(|| ext.value.chars().count()),
    }
}

fn match_keywords(text: &str) -> Vec<Entity> {
    let folded = FoldedText::new(text);
    let mut entities = Vec::new();

    for (kind, keywords) in KEYWORDS {
        for keyword in *keywords {
            let Some((start, end)) = folded.word_span(keyword) else {
                continue;
            };
            entities.push(Entity {
                entity_type: EntityType::Known(*kind),
                value: text[start..end].to_string(),
                start: text[..start].chars().count(),
                end: text[..end].chars().count(),
            });
        }
    }
    entities
}

/// Lower-cased copy of a text that remembers where each byte came from, so
/// spans found in the folded text can be cut from the original even when
/// lower-casing changes byte lengths.
struct FoldedText<'a> {
    original: &'a str,
    folded: String,
    /// `origin[i]` = byte offset in `original` of the char folded byte `i` came from.
    origin: Vec<usize>,
}

impl<'a> FoldedText<'a> {
    fn new(original: &'a str) -> Self {
        let mut folded = String::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len());
        for (idx, ch) in original.char_indices() {
            for lower in ch.to_lowercase() {
                folded.push(lower);
                origin.extend(std::iter::repeat_n(idx, lower.len_utf8()));
            }
        }
        Self { original, folded, origin }
    }

    fn original_offset(&self, folded_pos: usize) -> usize {
        self.origin.get(folded_pos).copied().unwrap_or(self.original.len())
    }

    /// Byte span in the original text of the whitespace-delimited run around
    /// the first occurrence of `keyword`.
    fn word_span(&self, keyword: &str) -> Option<(usize, usize)> {
        let pos = self.folded.find(keyword)?;
        let after = pos + keyword.len();

        let start = self.folded[..pos]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map_or(0, |(i, c)| i + c.len_utf8());
        let end = self.folded[after..]
            .find(char::is_whitespace)
            .map_or(self.folded.len(), |i| after + i);

        Some((self.original_offset(start), self.original_offset(end)))
    }
}
