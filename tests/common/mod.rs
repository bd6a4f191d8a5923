use owl_on_fhir::*;

/// Minimal single-class ontology from the conversion contract examples.
pub const MINIMAL_OWL: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
         xmlns:owl="http://www.w3.org/2002/07/owl#">
  <owl:Ontology rdf:about="http://example.org/onto"/>
  <owl:Class rdf:about="http://example.org/onto#Foo">
    <rdfs:label>Foo</rdfs:label>
  </owl:Class>
</rdf:RDF>"#;

/// Richer ontology: metadata, synonyms, hierarchy, a deprecated class and
/// an anonymous (unmappable) class.
pub const RICH_OWL: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
         xmlns:owl="http://www.w3.org/2002/07/owl#"
         xmlns:obo="http://purl.obolibrary.org/obo/"
         xmlns:oboInOwl="http://www.geneontology.org/formats/oboInOwl#">
  <owl:Ontology rdf:about="http://purl.obolibrary.org/obo/demo.owl">
    <owl:versionInfo>2023-01-15</owl:versionInfo>
    <rdfs:label>Demo Ontology</rdfs:label>
    <rdfs:comment>A demonstration ontology.</rdfs:comment>
  </owl:Ontology>
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/DEMO_0000001">
    <rdfs:label>root thing</rdfs:label>
    <obo:IAO_0000115>The root of the demo hierarchy.</obo:IAO_0000115>
    <oboInOwl:hasExactSynonym>base thing</oboInOwl:hasExactSynonym>
  </owl:Class>
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/DEMO_0000002">
    <rdfs:label>child thing</rdfs:label>
    <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/DEMO_0000001"/>
    <oboInOwl:hasRelatedSynonym>offspring thing</oboInOwl:hasRelatedSynonym>
  </owl:Class>
  <owl:Class rdf:about="http://purl.obolibrary.org/obo/DEMO_0000003">
    <rdfs:label>old thing</rdfs:label>
    <owl:deprecated>true</owl:deprecated>
    <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/DEMO_0000001"/>
  </owl:Class>
  <owl:Class>
    <rdfs:label>nameless thing</rdfs:label>
  </owl:Class>
</rdf:RDF>"#;

/// Obograph document with one edge endpoint missing from `nodes`, the
/// shape the missing-node patch recovers.
pub const DANGLING_OBOGRAPH: &str = r#"{
  "graphs": [{
    "id": "http://purl.obolibrary.org/obo/demo.owl",
    "nodes": [
      {"id": "http://purl.obolibrary.org/obo/DEMO_0000002", "lbl": "child thing", "type": "CLASS"}
    ],
    "edges": [
      {"sub": "http://purl.obolibrary.org/obo/DEMO_0000002",
       "pred": "is_a",
       "obj": "http://purl.obolibrary.org/obo/DEMO_0000001"}
    ]
  }]
}"#;

#[allow(dead_code)]
pub fn parse_owl(content: &str) -> OntologyDocument {
    parse_document(content, OntologyFormat::RdfXml).expect("valid RDF/XML fixture")
}

#[allow(dead_code)]
pub fn convert_owl(content: &str) -> Conversion {
    convert_owl_with(content, ConverterConfig::default())
}

#[allow(dead_code)]
pub fn convert_owl_with(content: &str, config: ConverterConfig) -> Conversion {
    let document = parse_owl(content);
    OwlFhirConverter::with_config(config)
        .convert(&document)
        .expect("conversion succeeds")
}

#[allow(dead_code)]
pub fn concept_codes(conversion: &Conversion) -> Vec<&str> {
    conversion
        .code_system
        .concept
        .iter()
        .map(|c| c.code.as_str())
        .collect()
}
