use oxrdf::NamedNode;

use crate::converter::{ConverterConfig, MappingIssue, PrefixMap};
use crate::types::{Coding, Concept, ConceptProperty, Designation, OntologyClass};

pub(crate) const OBO_IN_OWL: &str = "http://www.geneontology.org/formats/oboInOwl#";

/// Maps one declared class to a concept.
///
/// `Ok(None)` means the class was filtered by configuration (deprecated
/// skip); `Err` is a recoverable mapping failure the caller records and
/// moves past.
pub(crate) fn convert_class(
    class: &OntologyClass,
    config: &ConverterConfig,
    prefix_map: &PrefixMap,
) -> Result<Option<Concept>, MappingIssue> {
    let Some(iri) = &class.iri else {
        return Err(MappingIssue::new(
            None,
            "anonymous class has no IRI to derive a code from",
        ));
    };

    if NamedNode::new(iri.as_str()).is_err() {
        return Err(MappingIssue::new(
            Some(iri.clone()),
            "class identifier is not a valid IRI",
        ));
    }

    if class.deprecated && config.skip_deprecated {
        return Ok(None);
    }

    let Some(code) = prefix_map.code_for(iri) else {
        return Err(MappingIssue::new(
            Some(iri.clone()),
            "no concept code derivable from class IRI",
        ));
    };

    let mut concept = Concept::new(code);
    concept.display = class.label.clone();
    concept.definition = class.definition.clone();

    if config.include_designations {
        for synonym in &class.synonyms {
            concept.designation.push(
                Designation::new(synonym.value.clone())
                    .with_use(Coding::new(OBO_IN_OWL, synonym.scope.predicate())),
            );
        }
    }

    if class.deprecated {
        concept
            .property
            .push(ConceptProperty::boolean_value("deprecated", true));
    }

    if config.include_all_predicates {
        for assertion in &class.property_values {
            let code = prefix_map
                .code_for(&assertion.predicate)
                .unwrap_or_else(|| assertion.predicate.clone());
            concept
                .property
                .push(ConceptProperty::string_value(code, assertion.value.clone()));
        }
    }

    Ok(Some(concept))
}
