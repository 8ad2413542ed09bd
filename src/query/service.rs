//! The caller-facing entry point: `(intent, slots, entities)` in, reply out.

use tracing::{debug, info};

use crate::config::Config;
use crate::ontology::ExternalEntity;

use super::endpoint::{EndpointError, SparqlEndpoint};
use super::formatter::ResultFormatter;
use super::registry::TemplateRegistry;
use super::Slots;

#[derive(Debug, Clone)]
pub struct QueryService {
    registry: TemplateRegistry,
    endpoint: SparqlEndpoint,
    formatter: ResultFormatter,
}

impl QueryService {
    pub fn new(
        registry: TemplateRegistry,
        endpoint: SparqlEndpoint,
        formatter: ResultFormatter,
    ) -> Self {
        Self { registry, endpoint, formatter }
    }

    /// Built-in templates, endpoint and locale from config.
    pub fn from_config(cfg: &Config) -> Result<Self, EndpointError> {
        Ok(Self::new(
            TemplateRegistry::builtin(),
            SparqlEndpoint::from_config(&cfg.store)?,
            ResultFormatter::new(cfg.locale),
        ))
    }

    /// Build, execute and format the query for one turn. Always returns a
    /// reply; a turn that cannot be turned into a query gets an apology.
    pub fn respond(&self, intent: &str, slots: &Slots, external: &[ExternalEntity]) -> String {
        let slots = self.enrich_slots(intent, slots, external);
        let Some(query) = self.registry.build(intent, &slots) else {
            return self.formatter.build_failed().to_string();
        };

        info!(intent = %intent, "executing query");
        debug!(query = %query, "query text");
        let results = self.endpoint.execute(&query);
        self.formatter.format(results.as_ref(), intent)
    }

    /// Fill slots the caller left empty from external entities whose name
    /// matches a parameter of the intent's template. First match wins.
    pub fn enrich_slots(&self, intent: &str, slots: &Slots, external: &[ExternalEntity]) -> Slots {
        let mut enriched = slots.clone();
        let Some(template) = self.registry.get(intent) else {
            return enriched;
        };
        if !external.is_empty() {
            info!(count = external.len(), "using external entities for query enrichment");
        }
        for ext in external {
            if ext.value.is_empty() || !template.accepts(&ext.entity) {
                continue;
            }
            let slot = enriched.entry(ext.entity.clone()).or_default();
            if slot.is_empty() {
                debug!(slot = %ext.entity, value = %ext.value, "slot filled from entity");
                *slot = ext.value.clone();
            }
        }
        enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Locale, QueryResults, StaticEndpoint, INTENT_CAMPS};
    use serde_json::json;

    fn service(results: QueryResults) -> QueryService {
        QueryService::new(
            TemplateRegistry::builtin(),
            SparqlEndpoint::Static(StaticEndpoint::new(results)),
            ResultFormatter::new(Locale::Swahili),
        )
    }

    #[test]
    fn unknown_intent_apologises() {
        let reply = service(QueryResults::default()).respond("greet", &Slots::new(), &[]);
        assert_eq!(reply, "Samahani, sikuweza kuunda hoja kwa ajili ya swali lako.");
    }

    #[test]
    fn empty_store_gives_intent_fallback() {
        let reply = service(QueryResults::default()).respond(INTENT_CAMPS, &Slots::new(), &[]);
        assert_eq!(reply, "Samahani, hakuna kambi za wakimbizi zilizopatikana.");
    }

    #[test]
    fn rows_are_formatted() {
        let results = QueryResults::from_json(&json!({ "results": { "bindings": [
            { "campName": { "value": "Bulengo" }, "locName": { "value": "Goma" },
              "capacity": { "value": "12000" } }
        ]}}));
        let reply = service(results).respond(INTENT_CAMPS, &Slots::new(), &[]);
        assert_eq!(reply, "Hii ni kambi za wakimbizi ziliopo:\n- Bulengo (Goma) - Uwezo: 12000\n");
    }

    #[test]
    fn entities_fill_missing_slots_only() {
        let svc = service(QueryResults::default());
        let external = vec![
            ExternalEntity::new("location", "Goma"),
            ExternalEntity::new("location", "Masisi"),
            ExternalEntity::new("camp", "Bulengo"),
        ];
        let enriched = svc.enrich_slots(INTENT_CAMPS, &Slots::new(), &external);
        assert_eq!(enriched.get("location").map(String::as_str), Some("Goma"));
        assert!(!enriched.contains_key("camp"));

        let mut given = Slots::new();
        given.insert("location".into(), "Rutshuru".into());
        let enriched = svc.enrich_slots(INTENT_CAMPS, &given, &external);
        assert_eq!(enriched["location"], "Rutshuru");
    }
}
