use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::converter::ConverterConfig;
use crate::types::OntologyDocument;

/// Per-call state of one facade invocation: configuration snapshot plus
/// the running statistics and mapping diagnostics.
pub struct ConversionContext {
    pub config: ConverterConfig,
    pub stats: ConversionStats,
    start_time: Option<Instant>,
}

impl ConversionContext {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            config: config.clone(),
            stats: ConversionStats::default(),
            start_time: None,
        }
    }

    pub fn begin_conversion(&mut self, document: &OntologyDocument) {
        self.start_time = Some(Instant::now());
        self.stats = ConversionStats::default();
        debug!(
            ontology = document.iri.as_deref().unwrap_or("<unnamed>"),
            classes = document.declared_class_count(),
            "beginning ontology conversion"
        );
    }

    pub fn end_conversion(&mut self) {
        if let Some(start_time) = self.start_time.take() {
            self.stats.duration = Some(start_time.elapsed());
        }
        debug!(
            concepts = self.stats.concepts_converted,
            skipped = self.stats.constructs_skipped,
            "finished ontology conversion"
        );
    }

    /// Records a recoverable per-construct failure; the conversion
    /// continues without the offending construct.
    pub fn skip_construct(&mut self, issue: MappingIssue) {
        warn!(
            construct = issue.construct.as_deref().unwrap_or("<anonymous>"),
            reason = %issue.message,
            "skipping unmappable ontology construct"
        );
        self.stats.constructs_skipped += 1;
        self.stats.diagnostics.push(issue);
    }
}

/// Statistics and diagnostics gathered during one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversionStats {
    pub classes_seen: usize,
    pub concepts_converted: usize,
    /// Constructs dropped because they had no FHIR analogue.
    pub constructs_skipped: usize,
    /// Classes excluded because they are foreign to the native URI stems.
    pub foreign_excluded: usize,
    /// Deprecated classes dropped on request.
    pub deprecated_skipped: usize,
    /// Concepts synthesized for edge endpoints missing a declaration.
    pub patched_nodes: usize,
    #[serde(skip)]
    pub duration: Option<Duration>,
    pub diagnostics: Vec<MappingIssue>,
}

/// A recoverable mapping failure: the offending construct and why it
/// could not be translated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappingIssue {
    /// IRI of the construct, when it had one.
    pub construct: Option<String>,
    pub message: String,
}

impl MappingIssue {
    pub fn new(construct: Option<String>, message: impl Into<String>) -> Self {
        Self {
            construct,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for MappingIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.construct {
            Some(construct) => write!(f, "{construct}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}
