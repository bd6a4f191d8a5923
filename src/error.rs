use thiserror::Error;

#[derive(Error, Debug)]
pub enum OwlFhirError {
    #[error("Resolution error: cannot read ontology reference {reference}")]
    Resolution {
        reference: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Download error: {message}")]
    Download { message: String },

    #[error("Conversion error: {message}")]
    Conversion { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl OwlFhirError {
    pub fn resolution(reference: impl Into<String>, source: std::io::Error) -> Self {
        Self::Resolution {
            reference: reference.into(),
            source: Some(source),
        }
    }

    pub fn resolution_without_source(reference: impl Into<String>) -> Self {
        Self::Resolution {
            reference: reference.into(),
            source: None,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for OwlFhirError {
    fn from(err: reqwest::Error) -> Self {
        Self::Download {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OwlFhirError>;
