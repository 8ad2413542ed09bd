//! Entity → graph node.
//!
//! The node URI is `{namespace}{type}_{slug}` where both the type name and
//! the value are slugged: lower-cased, spaces and hyphens turned into
//! underscores, anything else outside the IRI-safe set percent-encoded. The
//! same `(type, value)` therefore always lands on the same node, and mapping
//! an entity twice only re-adds triples the graph already holds.

use std::fmt::Write as _;

use tracing::warn;

use super::entity::{Entity, EntityType};
use super::graph::{Graph, Literal, NamedNode, Triple};
use super::{HUMANITARIAN_NS, Predicate};

/// Deterministic URI of the node for `(entity_type, value)`.
pub fn node_uri(entity_type: &EntityType, value: &str) -> NamedNode {
    let iri = format!("{HUMANITARIAN_NS}{}_{}", slugify(entity_type.as_str()), slugify(value));
    match NamedNode::new(iri) {
        Ok(node) => node,
        Err(e) => {
            warn!(entity_type = %entity_type.as_str(), value, error = %e, "slug not a valid IRI");
            let ascii = format!(
                "{HUMANITARIAN_NS}{}_{}",
                ascii_slug(entity_type.as_str()),
                ascii_slug(value)
            );
            NamedNode::new_unchecked(ascii)
        }
    }
}

/// Add the node for `entity` (type, label and name triples) to `graph` and
/// return its URI. Unmapped types get the generic `Entity` class.
pub fn entity_to_node(entity: &Entity, graph: &mut Graph) -> NamedNode {
    let node = node_uri(&entity.entity_type, &entity.value);
    let value = Literal::new_simple_literal(&entity.value);

    graph.add(Triple::new(node.clone(), Predicate::Type.node(), entity.entity_type.class().node()));
    graph.add(Triple::new(node.clone(), Predicate::Label.node(), value.clone()));
    graph.add(Triple::new(node.clone(), Predicate::Name.node(), value));

    node
}

/// Lower-case, spaces and hyphens → `_`. Letters, digits, `_`, `.` and `~`
/// pass through; everything else is percent-encoded as UTF-8.
pub fn slugify(value: &str) -> String {
    slug_with(value, char::is_alphanumeric)
}

/// Like [`slugify`] but percent-encodes every non-ASCII character too.
fn ascii_slug(value: &str) -> String {
    slug_with(value, |c| c.is_ascii_alphanumeric())
}

fn slug_with(value: &str, keep: impl Fn(char) -> bool) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.to_lowercase().chars() {
        match c {
            ' ' | '-' => slug.push('_'),
            '_' | '.' | '~' => slug.push(c),
            c if keep(c) => slug.push(c),
            c => percent_encode(c, &mut slug),
        }
    }
    slug
}

fn percent_encode(c: char, out: &mut String) {
    let mut buf = [0u8; 4];
    for byte in c.encode_utf8(&mut buf).bytes() {
        let _ = write!(out, "%{byte:02X}");
    }
}
