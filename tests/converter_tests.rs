mod common;

use common::*;
use owl_on_fhir::*;
use url::Url;

#[test]
fn test_minimal_conversion_scenario() {
    // One class `Foo` with label "Foo" under ontology IRI
    // http://example.org/onto.
    let conversion = convert_owl(MINIMAL_OWL);
    let cs = &conversion.code_system;

    assert_eq!(cs.resource_type, "CodeSystem");
    assert_eq!(
        cs.url,
        Some(Url::parse("http://example.org/onto").unwrap())
    );
    assert_eq!(cs.concept.len(), 1);
    assert_eq!(cs.concept[0].code, "Foo");
    assert_eq!(cs.concept[0].display.as_deref(), Some("Foo"));
    assert_eq!(cs.count, Some(1));
}

#[test]
fn test_concept_count_never_exceeds_declared_classes() {
    let document = parse_owl(RICH_OWL);
    let conversion = OwlFhirConverter::new().convert(&document).unwrap();
    assert!(conversion.code_system.concept.len() <= document.declared_class_count());
}

#[test]
fn test_anonymous_class_is_skipped_with_diagnostic() {
    let conversion = convert_owl(RICH_OWL);

    // The anonymous class is dropped, the three named ones survive.
    assert_eq!(
        concept_codes(&conversion),
        vec!["DEMO:0000001", "DEMO:0000002", "DEMO:0000003"]
    );
    assert_eq!(conversion.stats.constructs_skipped, 1);
    assert_eq!(conversion.stats.diagnostics.len(), 1);
    assert!(conversion.stats.diagnostics[0].construct.is_none());
}

#[test]
fn test_header_metadata_propagation() {
    let cs = convert_owl(RICH_OWL).code_system;
    assert_eq!(
        cs.url,
        Some(Url::parse("http://purl.obolibrary.org/obo/demo.owl").unwrap())
    );
    assert_eq!(cs.version.as_deref(), Some("2023-01-15"));
    assert_eq!(cs.title.as_deref(), Some("Demo Ontology"));
    assert_eq!(cs.name.as_deref(), Some("DemoOntology"));
    assert_eq!(cs.description.as_deref(), Some("A demonstration ontology."));
    assert_eq!(cs.status, "active");
    assert_eq!(cs.content, "complete");
    assert!(cs.date.is_none());
}

#[test]
fn test_synonyms_become_designations() {
    let cs = convert_owl(RICH_OWL).code_system;
    let root = &cs.concept[0];
    assert_eq!(root.designation.len(), 1);
    assert_eq!(root.designation[0].value, "base thing");
    let use_ = root.designation[0].use_.as_ref().unwrap();
    assert_eq!(use_.code.as_deref(), Some("hasExactSynonym"));

    let config = ConverterConfig {
        include_designations: false,
        ..ConverterConfig::default()
    };
    let cs = convert_owl_with(RICH_OWL, config).code_system;
    assert!(cs.concept[0].designation.is_empty());
}

#[test]
fn test_subsumption_becomes_parent_property() {
    let cs = convert_owl(RICH_OWL).code_system;
    let child = &cs.concept[1];
    assert!(
        child
            .property
            .iter()
            .any(|p| p.code == "parent" && p.value_code.as_deref() == Some("DEMO:0000001"))
    );
    assert!(cs.property.iter().any(|p| p.code == "parent" && p.property_type == "code"));
}

#[test]
fn test_deprecated_handling() {
    let cs = convert_owl(RICH_OWL).code_system;
    let old = &cs.concept[2];
    assert!(
        old.property
            .iter()
            .any(|p| p.code == "deprecated" && p.value_boolean == Some(true))
    );

    let config = ConverterConfig {
        skip_deprecated: true,
        ..ConverterConfig::default()
    };
    let conversion = convert_owl_with(RICH_OWL, config);
    assert_eq!(
        concept_codes(&conversion),
        vec!["DEMO:0000001", "DEMO:0000002"]
    );
    assert_eq!(conversion.stats.deprecated_skipped, 1);
}

#[test]
fn test_native_uri_stems_exclude_foreign_classes() {
    let config = ConverterConfig {
        native_uri_stems: vec!["http://purl.obolibrary.org/obo/DEMO_0000001".to_string()],
        ..ConverterConfig::default()
    };
    let conversion = convert_owl_with(RICH_OWL, config);
    assert_eq!(concept_codes(&conversion), vec!["DEMO:0000001"]);
    assert_eq!(conversion.stats.foreign_excluded, 2);
}

#[test]
fn test_missing_native_node_is_patched() {
    let document = parse_document(DANGLING_OBOGRAPH, OntologyFormat::ObographJson).unwrap();
    let config = ConverterConfig {
        native_uri_stems: vec!["http://purl.obolibrary.org/obo/DEMO_".to_string()],
        ..ConverterConfig::default()
    };
    let conversion = OwlFhirConverter::with_config(config).convert(&document).unwrap();

    assert_eq!(
        concept_codes(&conversion),
        vec!["DEMO:0000002", "DEMO:0000001"]
    );
    assert_eq!(conversion.stats.patched_nodes, 1);
    // The declared child points at the patched parent.
    assert!(
        conversion.code_system.concept[0]
            .property
            .iter()
            .any(|p| p.code == "parent" && p.value_code.as_deref() == Some("DEMO:0000001"))
    );
}

#[test]
fn test_without_stems_dangling_edges_are_ignored() {
    let document = parse_document(DANGLING_OBOGRAPH, OntologyFormat::ObographJson).unwrap();
    let conversion = OwlFhirConverter::new().convert(&document).unwrap();
    assert_eq!(concept_codes(&conversion), vec!["DEMO:0000002"]);
    assert_eq!(conversion.stats.patched_nodes, 0);
}

#[test]
fn test_critical_predicates_only() {
    let owl = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
         xmlns:owl="http://www.w3.org/2002/07/owl#"
         xmlns:oboInOwl="http://www.geneontology.org/formats/oboInOwl#">
  <owl:Ontology rdf:about="http://example.org/onto"/>
  <owl:Class rdf:about="http://example.org/onto#Foo">
    <rdfs:label>Foo</rdfs:label>
    <oboInOwl:hasDbXref>UMLS:C123</oboInOwl:hasDbXref>
  </owl:Class>
</rdf:RDF>"#;

    let cs = convert_owl(owl).code_system;
    assert!(
        cs.concept[0]
            .property
            .iter()
            .any(|p| p.code == "oboInOwl:hasDbXref" && p.value_string.as_deref() == Some("UMLS:C123"))
    );
    assert!(cs.property.iter().any(|p| p.code == "oboInOwl:hasDbXref"));

    let config = ConverterConfig {
        include_all_predicates: false,
        ..ConverterConfig::default()
    };
    let cs = convert_owl_with(owl, config).code_system;
    assert!(cs.concept[0].property.is_empty());
    assert!(cs.property.is_empty());
}

#[test]
fn test_code_system_url_override() {
    let config = ConverterConfig {
        code_system_url: Some("https://terminology.example.org/CodeSystem/demo".to_string()),
        code_system_id: Some("demo".to_string()),
        ..ConverterConfig::default()
    };
    let cs = convert_owl_with(RICH_OWL, config).code_system;
    assert_eq!(cs.id.as_deref(), Some("demo"));
    assert_eq!(
        cs.url,
        Some(Url::parse("https://terminology.example.org/CodeSystem/demo").unwrap())
    );
}

#[test]
fn test_invalid_url_override_fails() {
    let config = ConverterConfig {
        code_system_url: Some("not a url".to_string()),
        ..ConverterConfig::default()
    };
    let document = parse_owl(MINIMAL_OWL);
    let err = OwlFhirConverter::with_config(config)
        .convert(&document)
        .unwrap_err();
    assert!(matches!(err, OwlFhirError::UrlParse(_)));
}

#[test]
fn test_conversion_is_idempotent() {
    let first = convert_owl(RICH_OWL);
    let second = convert_owl(RICH_OWL);
    assert_eq!(first.code_system, second.code_system);
    assert_eq!(
        serde_json::to_string(&first.code_system).unwrap(),
        serde_json::to_string(&second.code_system).unwrap()
    );
}

#[test]
fn test_code_system_round_trips_through_serde() {
    let cs = convert_owl(RICH_OWL).code_system;
    let json = serde_json::to_string(&cs).unwrap();
    let back: CodeSystem = serde_json::from_str(&json).unwrap();
    assert_eq!(cs, back);
}
