use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OwlFhirError, Result};
use crate::types::{
    OntologyClass, OntologyDocument, OntologyEdge, PropertyAssertion, Synonym, SynonymScope,
};

/// Obograph JSON document, the graph exchange format produced by
/// `robot convert --format json`.
///
/// Only the slice of the model needed for CodeSystem conversion is
/// represented; unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphDocument {
    #[serde(default)]
    pub graphs: Vec<Graph>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Graph {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub meta: Option<GraphMeta>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphMeta {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "basicPropertyValues")]
    pub basic_property_values: Vec<BasicPropertyValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub lbl: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub meta: Option<NodeMeta>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeMeta {
    #[serde(default)]
    pub definition: Option<DefinitionPropertyValue>,
    #[serde(default)]
    pub synonyms: Vec<SynonymPropertyValue>,
    #[serde(default, rename = "basicPropertyValues")]
    pub basic_property_values: Vec<BasicPropertyValue>,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DefinitionPropertyValue {
    #[serde(default)]
    pub val: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SynonymPropertyValue {
    #[serde(default)]
    pub pred: Option<String>,
    #[serde(default)]
    pub val: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BasicPropertyValue {
    #[serde(default)]
    pub pred: Option<String>,
    #[serde(default)]
    pub val: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphEdge {
    pub sub: String,
    pub pred: String,
    pub obj: String,
}

/// Parses an obograph JSON document; the first graph carries the
/// ontology, which matches how `robot` emits single-ontology conversions.
pub fn parse_obograph(content: &str) -> Result<OntologyDocument> {
    let graph_document: GraphDocument = serde_json::from_str(content)
        .map_err(|err| OwlFhirError::parse(format!("invalid obograph JSON: {err}")))?;

    let Some(graph) = graph_document.graphs.into_iter().next() else {
        return Err(OwlFhirError::parse(
            "invalid obograph JSON: document contains no graphs",
        ));
    };

    let mut document = OntologyDocument {
        iri: graph.id,
        ..OntologyDocument::default()
    };
    if let Some(meta) = graph.meta {
        document.version_iri = meta.version;
        for bpv in meta.basic_property_values {
            if let (Some(pred), Some(val)) = (bpv.pred, bpv.val) {
                if pred.ends_with("versionInfo") {
                    document.version_info.get_or_insert(val.clone());
                }
                if pred.ends_with("title") {
                    document.title.get_or_insert(val.clone());
                }
                if pred.ends_with("description") {
                    document.description.get_or_insert(val);
                }
            }
        }
    }

    for node in graph.nodes {
        // PROPERTY and INDIVIDUAL nodes are not classes; untyped nodes are
        // kept because robot omits the type on patched declarations.
        if let Some(node_type) = &node.node_type {
            if node_type != "CLASS" {
                continue;
            }
        }
        document.classes.push(node_to_class(node));
    }

    for edge in graph.edges {
        document.edges.push(OntologyEdge {
            subject: edge.sub,
            predicate: edge.pred,
            object: edge.obj,
        });
    }

    debug!(
        classes = document.classes.len(),
        edges = document.edges.len(),
        "parsed obograph document"
    );
    Ok(document)
}

fn node_to_class(node: Node) -> OntologyClass {
    let mut class = OntologyClass::new(Some(node.id));
    class.label = node.lbl;
    if let Some(meta) = node.meta {
        class.definition = meta.definition.and_then(|d| d.val);
        class.deprecated = meta.deprecated;
        for synonym in meta.synonyms {
            let (Some(pred), Some(val)) = (synonym.pred, synonym.val) else {
                continue;
            };
            // Predicates may arrive as bare names or full oboInOwl IRIs.
            let local = pred.rsplit(['#', '/']).next().unwrap_or(pred.as_str());
            if let Some(scope) = SynonymScope::from_predicate(local) {
                class.synonyms.push(Synonym { scope, value: val });
            } else {
                class.property_values.push(PropertyAssertion {
                    predicate: pred,
                    value: val,
                });
            }
        }
        for bpv in meta.basic_property_values {
            if let (Some(pred), Some(val)) = (bpv.pred, bpv.val) {
                class.property_values.push(PropertyAssertion {
                    predicate: pred,
                    value: val,
                });
            }
        }
    }
    class
}
