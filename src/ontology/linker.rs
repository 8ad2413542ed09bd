//! Co-occurrence relationships between entities of one batch.
//!
//! For every rule in [`RELATION_RULES`] whose source and target kinds both
//! occur in the batch, every source entity is linked to every target entity.
//! There is no proximity heuristic: two facilities and three locations in one
//! text give six `hasLocation` edges.

use std::collections::HashMap;

use tracing::debug;

use super::entity::Entity;
use super::graph::{Graph, NamedNode, Triple};
use super::mapper::entity_to_node;
use super::{Direction, EntityKind, RELATION_RULES};

/// Add relationship triples for `entities` to `graph`, mapping each involved
/// entity to its node on first use. Returns the number of relationship
/// triples that were new to the graph.
pub fn link_entities(entities: &[Entity], graph: &mut Graph) -> usize {
    let mut by_kind: HashMap<EntityKind, Vec<usize>> = HashMap::new();
    for (idx, entity) in entities.iter().enumerate() {
        if let Some(kind) = entity.entity_type.kind() {
            by_kind.entry(kind).or_default().push(idx);
        }
    }

    let mut uris: HashMap<usize, NamedNode> = HashMap::new();
    let mut added = 0;

    for rule in RELATION_RULES {
        let (Some(sources), Some(targets)) =
            (by_kind.get(&rule.source), by_kind.get(&rule.target))
        else {
            continue;
        };

        let predicate = rule.predicate.node();
        for &s in sources {
            let source_uri = node_for(s, entities, graph, &mut uris);
            for &t in targets {
                let target_uri = node_for(t, entities, graph, &mut uris);
                let triple = match rule.direction {
                    Direction::Forward => {
                        Triple::new(source_uri.clone(), predicate.clone(), target_uri)
                    }
                    Direction::Reverse => {
                        Triple::new(target_uri, predicate.clone(), source_uri.clone())
                    }
                };
                if graph.add(triple) {
                    added += 1;
                }
            }
        }

        debug!(
            source = %rule.source,
            target = %rule.target,
            pairs = sources.len() * targets.len(),
            "linked entity pair"
        );
    }

    added
}

fn node_for(
    idx: usize,
    entities: &[Entity],
    graph: &mut Graph,
    uris: &mut HashMap<usize, NamedNode>,
) -> NamedNode {
    uris.entry(idx)
        .or_insert_with(|| entity_to_node(&entities[idx], graph))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{EntityType, Predicate, Subject, node_uri};

    fn e(kind: EntityKind, value: &str) -> Entity {
        Entity::new(kind, value)
    }

    #[test]
    fn cross_product_of_facilities_and_locations() {
        let entities = vec![
            e(EntityKind::HealthFacility, "Kyeshero"),
            e(EntityKind::Location, "Goma"),
            e(EntityKind::HealthFacility, "Ndosho"),
            e(EntityKind::Location, "Nyiragongo"),
            e(EntityKind::Location, "Masisi"),
        ];
        let mut g = Graph::new();
        let added = link_entities(&entities, &mut g);
        assert_eq!(added, 6);
        assert_eq!(g.with_predicate(Predicate::HasLocation).count(), 6);
        assert_eq!(g.subjects().len(), 5);
        assert_eq!(g.len(), 6 + 5 * 3);
    }

    #[test]
    fn shuffled_cross_product_gives_the_same_edges() {
        let batch = |order: [usize; 5]| {
            let all = [
                e(EntityKind::HealthFacility, "Kyeshero"),
                e(EntityKind::Location, "Goma"),
                e(EntityKind::HealthFacility, "Ndosho"),
                e(EntityKind::Location, "Nyiragongo"),
                e(EntityKind::Location, "Masisi"),
            ];
            order.map(|i| all[i].clone()).to_vec()
        };

        let mut expected = Graph::new();
        link_entities(&batch([0, 1, 2, 3, 4]), &mut expected);
        for order in [[4, 3, 2, 1, 0], [3, 0, 4, 2, 1], [1, 3, 4, 0, 2]] {
            let mut g = Graph::new();
            assert_eq!(link_entities(&batch(order), &mut g), 6, "{order:?}");
            assert_eq!(g, expected, "{order:?}");
        }

        let facility = node_uri(&EntityType::Known(EntityKind::HealthFacility), "Ndosho");
        let location = node_uri(&EntityType::Known(EntityKind::Location), "Masisi");
        assert!(expected.contains(&Triple::new(facility, Predicate::HasLocation.node(), location)));
    }

    #[test]
    fn input_order_does_not_change_the_triple_set() {
        let mut entities = vec![
            e(EntityKind::Organization, "MSF"),
            e(EntityKind::Service, "vaccination"),
            e(EntityKind::Person, "wakimbizi"),
            e(EntityKind::Need, "chakula"),
            e(EntityKind::Camp, "Bulengo"),
        ];
        let mut forward = Graph::new();
        link_entities(&entities, &mut forward);
        entities.reverse();
        let mut backward = Graph::new();
        link_entities(&entities, &mut backward);
        assert_eq!(forward, backward);
    }

    #[test]
    fn reverse_rules_make_the_facility_the_subject() {
        let entities = vec![
            e(EntityKind::SicknessType, "malaria"),
            e(EntityKind::ServiceType, "vaccination"),
            e(EntityKind::HealthFacility, "CBCA Virunga"),
        ];
        let mut g = Graph::new();
        link_entities(&entities, &mut g);
        let facility = node_uri(&EntityType::Known(EntityKind::HealthFacility), "CBCA Virunga");
        let sickness = node_uri(&EntityType::Known(EntityKind::SicknessType), "malaria");
        assert!(g.contains(&Triple::new(facility.clone(), Predicate::Treats.node(), sickness)));
        let facility = Subject::from(facility);
        assert!(g.with_predicate(Predicate::ProvidesService).all(|t| t.subject == facility));
    }

    #[test]
    fn need_links_from_person() {
        let entities = vec![e(EntityKind::Need, "maji"), e(EntityKind::Person, "watoto")];
        let mut g = Graph::new();
        link_entities(&entities, &mut g);
        let person = node_uri(&EntityType::Known(EntityKind::Person), "watoto");
        let need = node_uri(&EntityType::Known(EntityKind::Need), "maji");
        assert!(g.contains(&Triple::new(person, Predicate::HasNeed.node(), need)));
    }

    #[test]
    fn unrelated_kinds_add_nothing() {
        let entities = vec![
            e(EntityKind::WaterSource, "kisima"),
            e(EntityKind::Location, "Goma"),
            Entity::new(EntityType::Other("volcano".into()), "Nyiragongo"),
        ];
        let mut g = Graph::new();
        assert_eq!(link_entities(&entities, &mut g), 0);
        assert!(g.is_empty());
    }

    #[test]
    fn duplicate_mentions_collapse_to_one_edge() {
        let entities = vec![
            e(EntityKind::HealthFacility, "hospitali"),
            e(EntityKind::HealthFacility, "hospitali"),
            e(EntityKind::Location, "goma"),
        ];
        let mut g = Graph::new();
        assert_eq!(link_entities(&entities, &mut g), 1);
        assert_eq!(g.with_predicate(Predicate::HasLocation).count(), 1);
    }
}
