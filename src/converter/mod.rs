mod concepts;
mod context;
mod curie;

pub use context::*;
pub use curie::*;

use std::collections::{BTreeSet, HashMap, HashSet};

use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;
use crate::types::{
    CodeSystem, Concept, ConceptProperty, OntologyDocument, PropertyDeclaration,
};

/// Converts a parsed ontology document into a FHIR CodeSystem.
pub trait OntologyConverter {
    /// One-shot conversion with a fresh context.
    fn convert(&self, document: &OntologyDocument) -> Result<Conversion>;

    /// Conversion against a caller-managed context, for callers that want
    /// to inspect statistics midway or reuse a configuration snapshot.
    fn convert_with_context(
        &self,
        document: &OntologyDocument,
        context: &mut ConversionContext,
    ) -> Result<CodeSystem>;
}

/// Converter configuration; defaults mirror the CLI defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConverterConfig {
    /// `CodeSystem.id` override; otherwise derived from the reference.
    pub code_system_id: Option<String>,
    /// Canonical `CodeSystem.url` override; otherwise the ontology IRI.
    pub code_system_url: Option<String>,
    /// URI stems marking concepts as native to this code system. When
    /// non-empty, foreign classes are excluded and dangling native edge
    /// endpoints are patched in as bare concepts.
    pub native_uri_stems: Vec<String>,
    /// Propagate every annotation assertion as a concept property, not
    /// just the critical `parent`/`deprecated` ones.
    pub include_all_predicates: bool,
    /// Emit synonyms as concept designations.
    pub include_designations: bool,
    /// Drop deprecated classes instead of flagging them.
    pub skip_deprecated: bool,
    /// Stamp `CodeSystem.date` with the conversion day. Off by default so
    /// repeated conversions of the same input stay byte-identical.
    pub stamp_date: bool,
    pub prefix_map: PrefixMap,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            code_system_id: None,
            code_system_url: None,
            native_uri_stems: Vec::new(),
            include_all_predicates: true,
            include_designations: true,
            skip_deprecated: false,
            stamp_date: false,
            prefix_map: PrefixMap::default(),
        }
    }
}

/// Owned result of one facade call.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub code_system: CodeSystem,
    pub stats: ConversionStats,
}

/// The converter facade: ontology document in, CodeSystem out.
///
/// Stateless between calls; mapping failures on individual constructs are
/// recorded as diagnostics and never abort the conversion.
#[derive(Debug, Clone, Default)]
pub struct OwlFhirConverter {
    config: ConverterConfig,
}

impl OwlFhirConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }
}

impl OntologyConverter for OwlFhirConverter {
    fn convert(&self, document: &OntologyDocument) -> Result<Conversion> {
        let mut context = ConversionContext::new(&self.config);
        let code_system = self.convert_with_context(document, &mut context)?;
        Ok(Conversion {
            code_system,
            stats: context.stats,
        })
    }

    fn convert_with_context(
        &self,
        document: &OntologyDocument,
        context: &mut ConversionContext,
    ) -> Result<CodeSystem> {
        context.begin_conversion(document);
        let config = context.config.clone();

        let mut code_system = header_from_document(document, &config, context)?;

        let is_native = |iri: &str| {
            config.native_uri_stems.is_empty()
                || config.native_uri_stems.iter().any(|s| iri.starts_with(s))
        };

        let mut concept_list: Vec<Concept> = Vec::new();
        let mut index_by_iri: HashMap<String, usize> = HashMap::new();
        let mut seen_codes: HashSet<String> = HashSet::new();

        for class in &document.classes {
            context.stats.classes_seen += 1;
            if let Some(iri) = class.iri.as_deref() {
                if !is_native(iri) {
                    context.stats.foreign_excluded += 1;
                    continue;
                }
            }
            match concepts::convert_class(class, &config, &config.prefix_map) {
                Ok(Some(concept)) => {
                    if !seen_codes.insert(concept.code.clone()) {
                        context.skip_construct(MappingIssue::new(
                            class.iri.clone(),
                            format!("duplicate concept code {}", concept.code),
                        ));
                        continue;
                    }
                    if let Some(iri) = &class.iri {
                        index_by_iri.insert(iri.clone(), concept_list.len());
                    }
                    concept_list.push(concept);
                    context.stats.concepts_converted += 1;
                }
                Ok(None) => context.stats.deprecated_skipped += 1,
                Err(issue) => context.skip_construct(issue),
            }
        }

        if !config.native_uri_stems.is_empty() {
            patch_missing_native_nodes(
                document,
                &config,
                context,
                &is_native,
                &mut concept_list,
                &mut index_by_iri,
                &mut seen_codes,
            );
        }

        let mut has_parent = false;
        for edge in &document.edges {
            if !edge.is_subsumption() {
                continue;
            }
            let (Some(&subject), Some(&object)) = (
                index_by_iri.get(&edge.subject),
                index_by_iri.get(&edge.object),
            ) else {
                continue;
            };
            let parent_code = concept_list[object].code.clone();
            concept_list[subject]
                .property
                .push(ConceptProperty::code_value("parent", parent_code));
            has_parent = true;
        }

        declare_used_properties(&mut code_system, &concept_list, has_parent);

        code_system.concept = concept_list;
        code_system.finalize_count();
        context.end_conversion();
        Ok(code_system)
    }
}

fn header_from_document(
    document: &OntologyDocument,
    config: &ConverterConfig,
    context: &mut ConversionContext,
) -> Result<CodeSystem> {
    let mut code_system = CodeSystem::new();

    code_system.id = config.code_system_id.clone();

    code_system.url = match &config.code_system_url {
        // A caller-supplied canonical URL must be well-formed.
        Some(url) => Some(Url::parse(url)?),
        None => match &document.iri {
            Some(iri) => match Url::parse(iri) {
                Ok(url) => Some(url),
                Err(err) => {
                    context.skip_construct(MappingIssue::new(
                        Some(iri.clone()),
                        format!("ontology IRI is not a usable canonical URL: {err}"),
                    ));
                    None
                }
            },
            None => None,
        },
    };

    code_system.version = document.version().map(str::to_string);
    if let Some(title) = &document.title {
        code_system.title = Some(title.clone());
        code_system.name = CodeSystem::computable_name(title);
    }
    code_system.description = document.description.clone();
    if config.stamp_date {
        code_system.date = Some(chrono::Utc::now().format("%Y-%m-%d").to_string());
    }

    Ok(code_system)
}

/// Recovers class IRIs that appear in edges but were never declared, an
/// artifact of some OWL-to-obograph exporters. Only endpoints matching a
/// native URI stem are recovered, as bare code-only concepts, in sorted
/// order for deterministic output.
#[allow(clippy::too_many_arguments)]
fn patch_missing_native_nodes(
    document: &OntologyDocument,
    config: &ConverterConfig,
    context: &mut ConversionContext,
    is_native: &dyn Fn(&str) -> bool,
    concept_list: &mut Vec<Concept>,
    index_by_iri: &mut HashMap<String, usize>,
    seen_codes: &mut HashSet<String>,
) {
    let declared: HashSet<&str> = document
        .classes
        .iter()
        .filter_map(|c| c.iri.as_deref())
        .collect();

    let mut missing: BTreeSet<String> = BTreeSet::new();
    for edge in &document.edges {
        for endpoint in [&edge.subject, &edge.object] {
            if !declared.contains(endpoint.as_str())
                && is_native(endpoint)
                && NamedNode::new(endpoint.as_str()).is_ok()
            {
                missing.insert(endpoint.clone());
            }
        }
    }

    for iri in missing {
        let Some(code) = config.prefix_map.code_for(&iri) else {
            context.skip_construct(MappingIssue::new(
                Some(iri),
                "no concept code derivable for undeclared edge endpoint",
            ));
            continue;
        };
        if !seen_codes.insert(code.clone()) {
            continue;
        }
        index_by_iri.insert(iri, concept_list.len());
        concept_list.push(Concept::new(code));
        context.stats.patched_nodes += 1;
        context.stats.concepts_converted += 1;
    }
}

fn declare_used_properties(
    code_system: &mut CodeSystem,
    concept_list: &[Concept],
    has_parent: bool,
) {
    if has_parent {
        code_system.declare_property(
            PropertyDeclaration::new("parent", "code")
                .with_uri("http://hl7.org/fhir/concept-properties#parent"),
        );
    }
    for concept in concept_list {
        for property in &concept.property {
            match property.code.as_str() {
                "parent" => {}
                "deprecated" => {
                    code_system.declare_property(PropertyDeclaration::new("deprecated", "boolean"));
                }
                other => {
                    code_system.declare_property(PropertyDeclaration::new(other, "string"));
                }
            }
        }
    }
}
