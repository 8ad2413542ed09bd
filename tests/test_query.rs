//! Integration tests for intent → query → formatted reply.

mod common;

use kivu_graph::ontology::ExternalEntity;
use kivu_graph::query::{
    FusekiEndpoint, INTENT_AID_REQUEST, INTENT_HEALTH_FACILITIES, INTENT_WATER_SOURCES, Locale,
    QueryResults, QueryService, QueryTemplate, ResultFormatter, Slots, SparqlEndpoint,
    StaticEndpoint, TemplateRegistry,
};
use serde_json::json;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn slots(pairs: &[(&str, &str)]) -> Slots {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn registry_with_required() -> TemplateRegistry {
    TemplateRegistry::builtin().with_template(
        "query_camp_population_swa",
        QueryTemplate::new("camp_population")
            .required("camp")
            .text("SELECT ?pop WHERE {\n    ?c rdfs:label \"{camp}\" .\n")
            .text("    ?c humanitarian:population ?pop .\n")
            .filter("location", "    FILTER(REGEX(?locName, \"{location}\", \"i\"))\n")
            .text("}\n"),
    )
}

// ── Template engine ───────────────────────────────────────────────────────────

#[test]
fn required_slot_missing_or_empty_never_builds() {
    let reg = registry_with_required();
    for s in [
        slots(&[]),
        slots(&[("camp", "")]),
        slots(&[("location", "Goma")]),
        slots(&[("camp", ""), ("location", "Goma")]),
    ] {
        assert!(reg.build("query_camp_population_swa", &s).is_none(), "{s:?}");
    }
    let q = reg
        .build("query_camp_population_swa", &slots(&[("camp", "Bulengo")]))
        .expect("required slot present");
    assert!(q.contains("rdfs:label \"Bulengo\""));
}

#[test]
fn optional_location_substituted_or_removed() {
    let reg = TemplateRegistry::builtin();
    let with = reg
        .build(INTENT_WATER_SOURCES, &slots(&[("location", "Kibati")]))
        .expect("build");
    assert!(with.contains("FILTER(REGEX(?locName, \"Kibati\", \"i\"))"));

    let without = reg.build(INTENT_WATER_SOURCES, &slots(&[])).expect("build");
    assert!(!without.contains("FILTER"));
    assert!(!without.contains("{location}"));
    assert_eq!(without.matches('(').count(), without.matches(')').count());
    assert!(without.contains("?source humanitarian:hasStatus ?status ."));
}

#[test]
fn unknown_intent_builds_nothing() {
    assert!(TemplateRegistry::builtin().build("affirm", &slots(&[("location", "Goma")])).is_none());
}

// ── Formatter ─────────────────────────────────────────────────────────────────

#[test]
fn formatter_degrades_gracefully() {
    let f = ResultFormatter::new(Locale::Swahili);
    for intent in TemplateRegistry::builtin().intents().chain(["nonsense"]) {
        assert!(!f.format(None, intent).is_empty());
        assert!(!f.format(Some(&QueryResults::default()), intent).is_empty());
    }

    let missing = QueryResults::from_json(&json!({ "results": { "bindings": [
        { "sourceName": { "value": "Kisima cha Kibati" } }
    ]}}));
    assert_eq!(
        f.format(Some(&missing), INTENT_WATER_SOURCES),
        "Hii ni vyanzo vya maji vilivyopo:\n- Kisima cha Kibati (Unknown) - Unknown\n"
    );
}

// ── Service ───────────────────────────────────────────────────────────────────

#[test]
fn service_answers_from_static_results() {
    let results = QueryResults::from_json(&json!({ "results": { "bindings": [
        { "orgName": { "value": "MSF" }, "locName": { "value": "Goma" },
          "serviceName": { "value": "Chanjo" } }
    ]}}));
    let service = QueryService::new(
        TemplateRegistry::builtin(),
        SparqlEndpoint::Static(StaticEndpoint::new(results)),
        ResultFormatter::new(Locale::English),
    );
    let reply = service.respond(INTENT_AID_REQUEST, &slots(&[("request_type", "chanjo")]), &[]);
    assert_eq!(reply, "Organizations offering that service:\n- MSF (Goma) - Chanjo\n");

    let reply = service.respond("goodbye", &Slots::new(), &[]);
    assert_eq!(reply, "Sorry, I could not build a query for your question.");
}

#[test]
fn service_queries_fuseki_over_http() {
    let body = json!({
        "head": { "vars": ["facility", "facilityName", "loc", "locName"] },
        "results": { "bindings": [
            { "facilityName": { "type": "literal", "value": "CBCA Ndosho" },
              "locName": { "type": "literal", "value": "Goma" } }
        ]}
    })
    .to_string();
    let (base, server) =
        common::one_shot_server("200 OK", "application/sparql-results+json", body);

    let endpoint = FusekiEndpoint::new(format!("{base}/humanitarian/query")).expect("client");
    let service = QueryService::new(
        TemplateRegistry::builtin(),
        SparqlEndpoint::Fuseki(endpoint),
        ResultFormatter::new(Locale::Swahili),
    );
    let external = vec![ExternalEntity::new("location", "Goma")];
    let reply = service.respond(INTENT_HEALTH_FACILITIES, &Slots::new(), &external);
    assert_eq!(reply, "Hii ni vituo vya afya vilivyopo:\n- CBCA Ndosho (Goma)\n");

    let request = server.join().expect("server thread");
    let lower = request.to_lowercase();
    assert!(request.starts_with("POST /humanitarian/query "));
    assert!(lower.contains("accept: application/sparql-results+json"));
    assert!(lower.contains("content-type: application/x-www-form-urlencoded"));
    assert!(request.contains("query=PREFIX"));
    assert!(request.contains("Goma"));
}

#[test]
fn failing_endpoint_gives_fallback_reply() {
    let (base, server) =
        common::one_shot_server("503 Service Unavailable", "text/plain", "down".into());
    let endpoint = FusekiEndpoint::new(format!("{base}/humanitarian/query")).expect("client");
    let service = QueryService::new(
        TemplateRegistry::builtin(),
        SparqlEndpoint::Fuseki(endpoint),
        ResultFormatter::new(Locale::Swahili),
    );
    let reply = service.respond(INTENT_HEALTH_FACILITIES, &Slots::new(), &[]);
    assert_eq!(reply, "Samahani, hakuna vituo vya afya vilivyopatikana.");
    server.join().expect("server thread");
}
