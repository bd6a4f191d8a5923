mod obograph;
mod rdf_xml;

pub use obograph::*;
pub use rdf_xml::*;

use crate::error::{OwlFhirError, Result};
use crate::types::OntologyDocument;

/// Supported ontology input syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OntologyFormat {
    /// OWL serialized as RDF/XML (`.owl`, `.rdf`, `.xml`).
    RdfXml,
    /// Obograph JSON graph document (`.json`), the intermediary format
    /// emitted by `robot convert --format json`.
    ObographJson,
}

impl OntologyFormat {
    /// Detects the input format, preferring content sniffing over the
    /// file-name hint.
    pub fn detect(reference_hint: Option<&str>, content: &str) -> Result<Self> {
        match content.trim_start().chars().next() {
            Some('<') => return Ok(Self::RdfXml),
            Some('{') => return Ok(Self::ObographJson),
            _ => {}
        }
        if let Some(hint) = reference_hint {
            let hint = hint.to_ascii_lowercase();
            if hint.ends_with(".owl") || hint.ends_with(".rdf") || hint.ends_with(".xml") {
                return Ok(Self::RdfXml);
            }
            if hint.ends_with(".json") {
                return Ok(Self::ObographJson);
            }
        }
        Err(OwlFhirError::parse(
            "unrecognized ontology format: expected RDF/XML or obograph JSON",
        ))
    }
}

/// Parses ontology text in the given format into the normalized document
/// model.
pub fn parse_document(content: &str, format: OntologyFormat) -> Result<OntologyDocument> {
    match format {
        OntologyFormat::RdfXml => rdf_xml::parse_rdf_xml(content),
        OntologyFormat::ObographJson => obograph::parse_obograph(content),
    }
}
