//! # owl-on-fhir
//!
//! Non-minimalistic OWL to FHIR CodeSystem converter.
//!
//! Ontology classes become CodeSystem concepts: labels map to displays,
//! oboInOwl synonyms to designations, subsumption to `parent` properties.
//! Constructs without a FHIR analogue are skipped with a recorded
//! diagnostic instead of failing the whole conversion.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use owl_on_fhir::*;
//!
//! # async fn example() -> Result<()> {
//! let pipeline = ConversionPipeline::new(
//!     ConverterConfig::default(),
//!     ConversionOptions::default(),
//! );
//! let outcome = pipeline
//!     .convert(&OntologyReference::parse("hp.owl"))
//!     .await?;
//! println!("{} concepts", outcome.conversion.code_system.concept.len());
//! # Ok(())
//! # }
//! ```

pub mod converter;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod types;

pub use converter::*;
pub use error::{OwlFhirError, Result};
pub use parser::*;
pub use pipeline::*;
pub use resolver::*;
pub use types::*;
