use serde::{Deserialize, Serialize};
use url::Url;

/// FHIR CodeSystem resource, restricted to the fields an ontology
/// conversion can populate.
///
/// See <https://hl7.org/fhir/codesystem.html>.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeSystem {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property: Vec<PropertyDeclaration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concept: Vec<Concept>,
}

impl Default for CodeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeSystem {
    pub fn new() -> Self {
        Self {
            resource_type: "CodeSystem".to_string(),
            id: None,
            url: None,
            version: None,
            name: None,
            title: None,
            status: "active".to_string(),
            experimental: None,
            date: None,
            publisher: None,
            description: None,
            content: "complete".to_string(),
            count: None,
            property: Vec::new(),
            concept: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Derives the computable `CodeSystem.name` from a human title by
    /// upper-camel-casing its alphanumeric words.
    pub fn computable_name(title: &str) -> Option<String> {
        let name: String = title
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect();
        if name.is_empty() { None } else { Some(name) }
    }

    /// Ensures a property declaration exists; declarations are kept in
    /// first-use order.
    pub fn declare_property(&mut self, declaration: PropertyDeclaration) {
        if !self.property.iter().any(|p| p.code == declaration.code) {
            self.property.push(declaration);
        }
    }

    /// Sets `count` to the number of concept entries.
    pub fn finalize_count(&mut self) {
        self.count = Some(self.concept.len() as u32);
    }
}

/// Declaration of a property used by concepts of this code system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyDeclaration {
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(rename = "type")]
    pub property_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyDeclaration {
    pub fn new(code: impl Into<String>, property_type: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            uri: None,
            property_type: property_type.into(),
            description: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// A single coded concept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Concept {
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub designation: Vec<Designation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property: Vec<ConceptProperty>,
}

impl Concept {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: None,
            definition: None,
            designation: Vec::new(),
            property: Vec::new(),
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn with_designation(mut self, designation: Designation) -> Self {
        self.designation.push(designation);
        self
    }

    pub fn with_property(mut self, property: ConceptProperty) -> Self {
        self.property.push(property);
        self
    }
}

/// Additional representation of a concept, e.g. a synonym.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Designation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<Coding>,

    pub value: String,
}

impl Designation {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            language: None,
            use_: None,
            value: value.into(),
        }
    }

    pub fn with_use(mut self, use_: Coding) -> Self {
        self.use_ = Some(use_);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            display: None,
        }
    }
}

/// Concept property with one of the FHIR `value[x]` representations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConceptProperty {
    pub code: String,

    #[serde(rename = "valueCode", skip_serializing_if = "Option::is_none")]
    pub value_code: Option<String>,

    #[serde(rename = "valueString", skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    #[serde(rename = "valueBoolean", skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,
}

impl ConceptProperty {
    pub fn code_value(code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            value_code: Some(value.into()),
            value_string: None,
            value_boolean: None,
        }
    }

    pub fn string_value(code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            value_code: None,
            value_string: Some(value.into()),
            value_boolean: None,
        }
    }

    pub fn boolean_value(code: impl Into<String>, value: bool) -> Self {
        Self {
            code: code.into(),
            value_code: None,
            value_string: None,
            value_boolean: Some(value),
        }
    }
}
