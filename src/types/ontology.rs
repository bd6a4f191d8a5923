use serde::{Deserialize, Serialize};

/// Normalized ontology document produced by the parsers.
///
/// Both input formats (RDF/XML OWL and obograph JSON) are reduced to this
/// model before conversion, so the converter never needs to know which
/// syntax the ontology arrived in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OntologyDocument {
    /// Declared ontology IRI (`owl:Ontology rdf:about` / obograph graph id).
    pub iri: Option<String>,
    /// `owl:versionIRI`, when declared.
    pub version_iri: Option<String>,
    /// `owl:versionInfo`, when declared.
    pub version_info: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Class declarations in document order.
    pub classes: Vec<OntologyClass>,
    /// Subsumption and other edges between classes, in document order.
    pub edges: Vec<OntologyEdge>,
}

impl OntologyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declared classes, the upper bound for converted concepts.
    pub fn declared_class_count(&self) -> usize {
        self.classes.len()
    }

    /// Best available version string: `owl:versionInfo` wins over the
    /// version IRI.
    pub fn version(&self) -> Option<&str> {
        self.version_info
            .as_deref()
            .or(self.version_iri.as_deref())
    }
}

/// A declared ontology class.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OntologyClass {
    /// Class IRI; `None` for anonymous (blank-node) classes, which cannot
    /// become concepts.
    pub iri: Option<String>,
    pub label: Option<String>,
    /// Textual definition (`IAO:0000115` / obograph `meta.definition`).
    pub definition: Option<String>,
    pub synonyms: Vec<Synonym>,
    pub deprecated: bool,
    /// Remaining annotation assertions on the class.
    pub property_values: Vec<PropertyAssertion>,
}

impl OntologyClass {
    pub fn new(iri: Option<String>) -> Self {
        Self {
            iri,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_synonym(mut self, scope: SynonymScope, value: impl Into<String>) -> Self {
        self.synonyms.push(Synonym {
            scope,
            value: value.into(),
        });
        self
    }
}

/// Synonym scopes, following the oboInOwl annotation vocabulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SynonymScope {
    Exact,
    Related,
    Broad,
    Narrow,
}

impl SynonymScope {
    /// Maps an oboInOwl predicate local name or obograph `pred` value.
    pub fn from_predicate(predicate: &str) -> Option<Self> {
        match predicate {
            "hasExactSynonym" => Some(Self::Exact),
            "hasRelatedSynonym" => Some(Self::Related),
            "hasBroadSynonym" => Some(Self::Broad),
            "hasNarrowSynonym" => Some(Self::Narrow),
            _ => None,
        }
    }

    pub fn predicate(&self) -> &'static str {
        match self {
            Self::Exact => "hasExactSynonym",
            Self::Related => "hasRelatedSynonym",
            Self::Broad => "hasBroadSynonym",
            Self::Narrow => "hasNarrowSynonym",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Synonym {
    pub scope: SynonymScope,
    pub value: String,
}

/// Annotation assertion that is neither a label, definition nor synonym.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyAssertion {
    /// Predicate IRI (or QName when the namespace was not resolvable).
    pub predicate: String,
    pub value: String,
}

/// Edge between two classes. Subsumption edges carry the obograph
/// predicate spelling `is_a`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OntologyEdge {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl OntologyEdge {
    pub const IS_A: &'static str = "is_a";

    pub fn is_a(subject: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            predicate: Self::IS_A.to_string(),
            object: object.into(),
        }
    }

    pub fn is_subsumption(&self) -> bool {
        self.predicate == Self::IS_A
            || self.predicate == "http://www.w3.org/2000/01/rdf-schema#subClassOf"
    }
}
