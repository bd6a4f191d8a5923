use serde::{Deserialize, Serialize};

/// Ordered prefix map used to compress class IRIs into concept codes.
///
/// Longest expansion wins, so `http://purl.obolibrary.org/obo/` never
/// shadows a more specific stem registered by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrefixMap {
    entries: Vec<PrefixEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrefixEntry {
    pub prefix: String,
    pub expansion: String,
}

impl Default for PrefixMap {
    /// Defaults cover the vocabularies the converter routinely meets:
    /// OBO Library PURLs (with the `GO_0000001` → `GO:0000001` rule),
    /// OMIM entries and phenotypic series, and oboInOwl annotations.
    fn default() -> Self {
        let mut map = Self {
            entries: Vec::new(),
        };
        map.insert("obo", "http://purl.obolibrary.org/obo/");
        map.insert("OMIM", "https://omim.org/entry/");
        map.insert("OMIMPS", "https://omim.org/phenotypicSeries/PS");
        map.insert("oboInOwl", "http://www.geneontology.org/formats/oboInOwl#");
        map.insert("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        map.insert("owl", "http://www.w3.org/2002/07/owl#");
        map
    }
}

impl PrefixMap {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, prefix: impl Into<String>, expansion: impl Into<String>) {
        let entry = PrefixEntry {
            prefix: prefix.into(),
            expansion: expansion.into(),
        };
        let at = self
            .entries
            .iter()
            .position(|e| e.expansion.len() < entry.expansion.len())
            .unwrap_or(self.entries.len());
        self.entries.insert(at, entry);
    }

    /// Compresses an IRI into a CURIE when a registered expansion matches.
    pub fn compress(&self, iri: &str) -> Option<String> {
        for entry in &self.entries {
            if let Some(local) = iri.strip_prefix(&entry.expansion) {
                if local.is_empty() {
                    continue;
                }
                // OBO PURLs spell the CURIE separator as an underscore.
                if entry.prefix == "obo" {
                    if let Some((idspace, local_id)) = local.split_once('_') {
                        if !idspace.is_empty() && !local_id.is_empty() {
                            return Some(format!("{idspace}:{local_id}"));
                        }
                    }
                    continue;
                }
                return Some(format!("{}:{}", entry.prefix, local));
            }
        }
        None
    }

    /// Derives a concept code for an IRI: a CURIE when possible, otherwise
    /// the fragment or the last path segment.
    pub fn code_for(&self, iri: &str) -> Option<String> {
        if let Some(curie) = self.compress(iri) {
            return Some(curie);
        }
        let tail = iri
            .rsplit_once('#')
            .map(|(_, fragment)| fragment)
            .or_else(|| iri.rsplit_once('/').map(|(_, segment)| segment))?;
        if tail.is_empty() {
            None
        } else {
            Some(tail.to_string())
        }
    }
}
