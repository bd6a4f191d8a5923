use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use tracing::debug;

use crate::error::{OwlFhirError, Result};
use crate::types::{OntologyClass, OntologyDocument, OntologyEdge, PropertyAssertion, SynonymScope};

const NS_RDF: &[u8] = b"http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const NS_RDFS: &[u8] = b"http://www.w3.org/2000/01/rdf-schema#";
const NS_OWL: &[u8] = b"http://www.w3.org/2002/07/owl#";
const NS_OBO_IN_OWL: &[u8] = b"http://www.geneontology.org/formats/oboInOwl#";
const NS_OBO: &[u8] = b"http://purl.obolibrary.org/obo/";
const NS_DC: &[u8] = b"http://purl.org/dc/elements/1.1/";
const NS_DCTERMS: &[u8] = b"http://purl.org/dc/terms/";

/// Parses an RDF/XML OWL document into the normalized ontology model.
///
/// The parser is a streaming two-level walk: subjects (`owl:Ontology`,
/// `owl:Class`) at the top level of `rdf:RDF`, annotation properties one
/// level below. Anything deeper (restrictions, axiom annotations) is
/// skipped; class IRIs referenced from `rdfs:subClassOf` survive as edges.
pub fn parse_rdf_xml(content: &str) -> Result<OntologyDocument> {
    let mut reader = NsReader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut state = ParserState::default();

    loop {
        let (resolve, event) = reader.read_resolved_event().map_err(parse_err)?;
        let ns = match &resolve {
            ResolveResult::Bound(ns) => Some(ns.0),
            _ => None,
        };
        match event {
            Event::Start(e) => {
                state.depth += 1;
                if state.skip_depth.is_some() {
                    continue;
                }
                state.open_element(&e, ns, state.depth, false)?;
            }
            Event::Empty(e) => {
                if state.skip_depth.is_some() {
                    continue;
                }
                state.open_element(&e, ns, state.depth + 1, true)?;
            }
            Event::End(_) => {
                if let Some(skip) = state.skip_depth {
                    if state.depth == skip {
                        state.skip_depth = None;
                    }
                    state.depth = state.depth.saturating_sub(1);
                    continue;
                }
                match state.depth {
                    3 => state.finish_property(),
                    2 => state.finish_subject(),
                    _ => {}
                }
                state.depth = state.depth.saturating_sub(1);
            }
            Event::Text(t) => {
                if state.skip_depth.is_none() && state.current_prop.is_some() {
                    state.text.push_str(&t.unescape().map_err(parse_err)?);
                }
            }
            Event::CData(t) => {
                if state.skip_depth.is_none() && state.current_prop.is_some() {
                    state
                        .text
                        .push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !state.saw_rdf_root {
        return Err(OwlFhirError::parse(
            "document is not RDF/XML: missing rdf:RDF root element",
        ));
    }

    debug!(
        classes = state.document.classes.len(),
        edges = state.document.edges.len(),
        "parsed RDF/XML ontology"
    );
    Ok(state.document)
}

fn parse_err(err: impl std::fmt::Display) -> OwlFhirError {
    OwlFhirError::parse(err.to_string())
}

/// Namespace check that tolerates documents where the prefix was never
/// bound; local-name matching is then the only signal available.
fn ns_is(ns: Option<&[u8]>, expected: &[u8]) -> bool {
    ns.map(|n| n == expected).unwrap_or(true)
}

fn attr_by_local(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(parse_err)?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value().map_err(parse_err)?.into_owned()));
        }
    }
    Ok(None)
}

enum Subject {
    Ontology,
    Class(OntologyClass),
}

enum PropKind {
    OntologyTitle,
    OntologyDescription,
    OntologyVersionInfo,
    Label,
    Definition,
    Comment,
    Synonym(SynonymScope),
    Deprecated,
    Generic(String),
    Ignored,
}

#[derive(Default)]
struct ParserState {
    document: OntologyDocument,
    subject: Option<Subject>,
    current_prop: Option<PropKind>,
    text: String,
    depth: usize,
    skip_depth: Option<usize>,
    saw_rdf_root: bool,
}

impl ParserState {
    fn open_element(
        &mut self,
        e: &BytesStart<'_>,
        ns: Option<&[u8]>,
        depth: usize,
        is_empty: bool,
    ) -> Result<()> {
        match depth {
            1 => {
                if e.local_name().as_ref() != b"RDF" || !ns_is(ns, NS_RDF) {
                    return Err(OwlFhirError::parse(format!(
                        "document is not RDF/XML: unexpected root element <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )));
                }
                self.saw_rdf_root = true;
                Ok(())
            }
            2 => self.open_subject(e, ns, depth, is_empty),
            3 if self.subject.is_some() => self.open_property(e, ns, is_empty),
            _ => {
                if !is_empty {
                    self.skip_depth = Some(depth);
                }
                Ok(())
            }
        }
    }

    fn open_subject(
        &mut self,
        e: &BytesStart<'_>,
        ns: Option<&[u8]>,
        depth: usize,
        is_empty: bool,
    ) -> Result<()> {
        let local = e.local_name();
        if ns_is(ns, NS_OWL) && local.as_ref() == b"Ontology" {
            if let Some(about) = attr_by_local(e, b"about")? {
                if !about.is_empty() {
                    self.document.iri = Some(about);
                }
            }
            if !is_empty {
                self.subject = Some(Subject::Ontology);
            }
        } else if ns_is(ns, NS_OWL) && local.as_ref() == b"Class" {
            // Blank-node classes keep iri = None and surface later as a
            // mapping diagnostic, not a parse failure.
            let iri = attr_by_local(e, b"about")?.filter(|a| !a.is_empty());
            let class = OntologyClass::new(iri);
            if is_empty {
                self.push_class(class);
            } else {
                self.subject = Some(Subject::Class(class));
            }
        } else if !is_empty {
            // Object properties, annotation property declarations, axioms:
            // not part of the CodeSystem contract.
            self.skip_depth = Some(depth);
        }
        Ok(())
    }

    fn open_property(&mut self, e: &BytesStart<'_>, ns: Option<&[u8]>, is_empty: bool) -> Result<()> {
        let local = e.local_name().as_ref().to_vec();
        let resource = attr_by_local(e, b"resource")?;

        let kind = if matches!(self.subject, Some(Subject::Ontology)) {
            self.classify_ontology_property(ns, &local, resource)?
        } else if matches!(self.subject, Some(Subject::Class(_))) {
            self.classify_class_property(e, ns, &local, resource)?
        } else {
            PropKind::Ignored
        };

        if is_empty {
            // No text will follow; resource-valued kinds were applied in
            // classification already.
            return Ok(());
        }
        self.text.clear();
        self.current_prop = Some(kind);
        Ok(())
    }

    fn classify_ontology_property(
        &mut self,
        ns: Option<&[u8]>,
        local: &[u8],
        resource: Option<String>,
    ) -> Result<PropKind> {
        let kind = if ns_is(ns, NS_OWL) && local == b"versionIRI" {
            if let Some(resource) = resource {
                self.document.version_iri = Some(resource);
            }
            PropKind::Ignored
        } else if ns_is(ns, NS_OWL) && local == b"versionInfo" {
            PropKind::OntologyVersionInfo
        } else if (ns_is(ns, NS_RDFS) && local == b"label")
            || ((ns_is(ns, NS_DC) || ns_is(ns, NS_DCTERMS)) && local == b"title")
        {
            PropKind::OntologyTitle
        } else if (ns_is(ns, NS_RDFS) && local == b"comment")
            || ((ns_is(ns, NS_DC) || ns_is(ns, NS_DCTERMS)) && local == b"description")
        {
            PropKind::OntologyDescription
        } else {
            PropKind::Ignored
        };
        Ok(kind)
    }

    fn classify_class_property(
        &mut self,
        e: &BytesStart<'_>,
        ns: Option<&[u8]>,
        local: &[u8],
        resource: Option<String>,
    ) -> Result<PropKind> {
        if ns_is(ns, NS_RDFS) && local == b"subClassOf" {
            if let Some(object) = resource {
                if let Some(Subject::Class(class)) = &self.subject {
                    if let Some(subject_iri) = &class.iri {
                        self.document
                            .edges
                            .push(OntologyEdge::is_a(subject_iri.clone(), object));
                    }
                }
            }
            // Anonymous superclasses (restrictions) are skipped wholesale.
            return Ok(PropKind::Ignored);
        }
        if ns_is(ns, NS_RDFS) && local == b"label" {
            return Ok(PropKind::Label);
        }
        if ns_is(ns, NS_RDFS) && local == b"comment" {
            return Ok(PropKind::Comment);
        }
        if ns_is(ns, NS_OBO) && local == b"IAO_0000115" {
            return Ok(PropKind::Definition);
        }
        if ns_is(ns, NS_OWL) && local == b"deprecated" {
            return Ok(PropKind::Deprecated);
        }
        if ns_is(ns, NS_OBO_IN_OWL) {
            if let Some(scope) = SynonymScope::from_predicate(&String::from_utf8_lossy(local)) {
                return Ok(PropKind::Synonym(scope));
            }
        }

        let predicate = match ns {
            Some(ns) => format!(
                "{}{}",
                String::from_utf8_lossy(ns),
                String::from_utf8_lossy(local)
            ),
            None => String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        };
        if let Some(value) = resource {
            if let Some(Subject::Class(class)) = &mut self.subject {
                class.property_values.push(PropertyAssertion { predicate, value });
            }
            return Ok(PropKind::Ignored);
        }
        Ok(PropKind::Generic(predicate))
    }

    fn finish_property(&mut self) {
        let Some(kind) = self.current_prop.take() else {
            return;
        };
        let value = std::mem::take(&mut self.text).trim().to_string();
        if value.is_empty() {
            return;
        }
        match (kind, &mut self.subject) {
            (PropKind::OntologyTitle, _) => {
                self.document.title.get_or_insert(value);
            }
            (PropKind::OntologyDescription, _) => {
                self.document.description.get_or_insert(value);
            }
            (PropKind::OntologyVersionInfo, _) => {
                self.document.version_info.get_or_insert(value);
            }
            (PropKind::Label, Some(Subject::Class(class))) => {
                class.label.get_or_insert(value);
            }
            (PropKind::Definition, Some(Subject::Class(class))) => {
                class.definition.get_or_insert(value);
            }
            (PropKind::Comment, Some(Subject::Class(class))) => {
                class.property_values.push(PropertyAssertion {
                    predicate: "http://www.w3.org/2000/01/rdf-schema#comment".to_string(),
                    value,
                });
            }
            (PropKind::Synonym(scope), Some(Subject::Class(class))) => {
                class.synonyms.push(crate::types::Synonym { scope, value });
            }
            (PropKind::Deprecated, Some(Subject::Class(class))) => {
                class.deprecated = value == "true";
            }
            (PropKind::Generic(predicate), Some(Subject::Class(class))) => {
                class.property_values.push(PropertyAssertion { predicate, value });
            }
            _ => {}
        }
    }

    fn finish_subject(&mut self) {
        match self.subject.take() {
            Some(Subject::Class(class)) => self.push_class(class),
            Some(Subject::Ontology) | None => {}
        }
    }

    /// OWL allows axioms about one class to be split across several
    /// `owl:Class` elements; declarations with a known IRI are merged.
    fn push_class(&mut self, class: OntologyClass) {
        if let Some(iri) = &class.iri {
            if let Some(existing) = self
                .document
                .classes
                .iter_mut()
                .find(|c| c.iri.as_deref() == Some(iri.as_str()))
            {
                if existing.label.is_none() {
                    existing.label = class.label;
                }
                if existing.definition.is_none() {
                    existing.definition = class.definition;
                }
                existing.synonyms.extend(class.synonyms);
                existing.property_values.extend(class.property_values);
                existing.deprecated |= class.deprecated;
                return;
            }
        }
        self.document.classes.push(class);
    }
}
