//! Intent → query template table.
//!
//! Built once and never mutated; share it by reference (or clone it) across
//! callers. Unknown intents are a logged `None`, not an error.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::template::QueryTemplate;
use super::{
    INTENT_AID_REQUEST, INTENT_CAMPS, INTENT_HEALTH_FACILITIES, INTENT_WATER_SOURCES, Slots,
    prefix_header,
};

const LOCATION_FILTER: &str = "    FILTER(REGEX(?locName, \"{location}\", \"i\"))\n";

#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, QueryTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four built-in humanitarian intents.
    pub fn builtin() -> Self {
        let header = prefix_header();
        Self::new()
            .with_template(
                INTENT_HEALTH_FACILITIES,
                QueryTemplate::new("health_facilities")
                    .text(format!(
                        "{header}\nSELECT ?facility ?facilityName ?loc ?locName\nWHERE {{\n\
                         \x20   ?facility rdf:type humanitarian:HealthFacility .\n\
                         \x20   ?facility rdfs:label ?facilityName .\n\
                         \x20   ?facility humanitarian:hasLocation ?loc .\n\
                         \x20   ?loc rdfs:label ?locName .\n"
                    ))
                    .filter("location", LOCATION_FILTER)
                    .text("}\n"),
            )
            .with_template(
                INTENT_WATER_SOURCES,
                QueryTemplate::new("water_sources")
                    .text(format!(
                        "{header}\nSELECT ?source ?sourceName ?locName ?status\nWHERE {{\n\
                         \x20   ?source rdf:type humanitarian:WaterSource .\n\
                         \x20   ?source rdfs:label ?sourceName .\n\
                         \x20   ?source humanitarian:hasLocation ?loc .\n\
                         \x20   ?loc rdfs:label ?locName .\n\
                         \x20   ?source humanitarian:hasStatus ?status .\n"
                    ))
                    .filter("location", LOCATION_FILTER)
                    .text("}\n"),
            )
            .with_template(
                INTENT_CAMPS,
                QueryTemplate::new("camps")
                    .text(format!(
                        "{header}\nSELECT ?camp ?campName ?locName ?capacity ?status\nWHERE {{\n\
                         \x20   ?camp rdf:type humanitarian:Camp .\n\
                         \x20   ?camp rdfs:label ?campName .\n\
                         \x20   ?camp humanitarian:hasLocation ?loc .\n\
                         \x20   ?loc rdfs:label ?locName .\n\
                         \x20   ?camp humanitarian:hasCapacity ?capacity .\n\
                         \x20   ?camp humanitarian:hasStatus ?status .\n"
                    ))
                    .filter("location", LOCATION_FILTER)
                    .text("}\n"),
            )
            .with_template(
                INTENT_AID_REQUEST,
                QueryTemplate::new("aid_request")
                    .text(format!(
                        "{header}\n\
                         SELECT ?organization ?orgName ?locName ?service ?serviceName\n\
                         WHERE {{\n\
                         \x20   ?organization rdf:type humanitarian:NGO .\n\
                         \x20   ?organization rdfs:label ?orgName .\n\
                         \x20   ?organization humanitarian:providesService ?service .\n\
                         \x20   ?service rdfs:label ?serviceName .\n\
                         \x20   ?organization humanitarian:hasLocation ?loc .\n\
                         \x20   ?loc rdfs:label ?locName .\n"
                    ))
                    .filter(
                        "request_type",
                        "    FILTER(REGEX(?serviceName, \"{request_type}\", \"i\"))\n",
                    )
                    .filter("location", LOCATION_FILTER)
                    .text("}\n"),
            )
    }

    /// Register (or replace) the template for `intent`.
    pub fn with_template(mut self, intent: impl Into<String>, template: QueryTemplate) -> Self {
        self.templates.insert(intent.into(), template);
        self
    }

    pub fn get(&self, intent: &str) -> Option<&QueryTemplate> {
        self.templates.get(intent)
    }

    /// Registered intent names, sorted.
    pub fn intents(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Build the query for `intent`. `None` for an unknown intent or a
    /// missing required slot; both are logged.
    pub fn build(&self, intent: &str, slots: &Slots) -> Option<String> {
        let Some(template) = self.get(intent) else {
            warn!(intent = %intent, "no query template found for intent");
            return None;
        };
        let query = template.build(slots)?;
        debug!(intent = %intent, template = %template.name(), "built query");
        Some(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(pairs: &[(&str, &str)]) -> Slots {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn builtin_has_four_intents() {
        let reg = TemplateRegistry::builtin();
        let intents: Vec<_> = reg.intents().collect();
        assert_eq!(
            intents,
            vec![
                "query_camps_swa",
                "query_health_facilities_swa",
                "query_water_sources_swa",
                "submit_aid_request_swa",
            ]
        );
        assert!(reg.intents().all(|i| reg.get(i).unwrap().required_params().is_empty()));
        assert_eq!(
            reg.get(INTENT_AID_REQUEST).unwrap().optional_params(),
            ["request_type".to_string(), "location".to_string()]
        );
    }

    #[test]
    fn unknown_intent_is_none() {
        assert!(TemplateRegistry::builtin().build("greet", &Slots::new()).is_none());
    }

    #[test]
    fn health_query_with_location() {
        let q = TemplateRegistry::builtin()
            .build(INTENT_HEALTH_FACILITIES, &slots(&[("location", "Goma")]))
            .unwrap();
        assert!(q.contains("?facility rdf:type humanitarian:HealthFacility ."));
        assert!(q.contains("FILTER(REGEX(?locName, \"Goma\", \"i\"))"));
        assert!(q.trim_end().ends_with('}'));
    }

    #[test]
    fn every_builtin_builds_without_slots() {
        let reg = TemplateRegistry::builtin();
        for intent in reg.intents() {
            let q = reg.build(intent, &Slots::new()).unwrap();
            assert!(q.starts_with("PREFIX humanitarian:"));
            assert!(!q.contains("FILTER"), "{intent}: {q}");
            assert!(!q.contains("{location}"));
            assert!(!q.contains("{request_type}"));
            assert_eq!(q.matches('{').count(), q.matches('}').count());
        }
    }

    #[test]
    fn aid_request_keeps_only_supplied_filter() {
        let q = TemplateRegistry::builtin()
            .build(INTENT_AID_REQUEST, &slots(&[("request_type", "maji")]))
            .unwrap();
        assert!(q.contains("FILTER(REGEX(?serviceName, \"maji\", \"i\"))"));
        assert!(!q.contains("?locName, \""));
    }

    #[test]
    fn custom_template_with_required_slot() {
        let reg = TemplateRegistry::builtin().with_template(
            "query_camp_by_name",
            QueryTemplate::new("camp_by_name")
                .required("camp")
                .text("SELECT ?c WHERE { ?c rdfs:label \"{camp}\" }"),
        );
        assert!(reg.build("query_camp_by_name", &slots(&[("location", "Goma")])).is_none());
        assert!(reg.build("query_camp_by_name", &slots(&[("camp", "Bulengo")])).is_some());
    }
}
