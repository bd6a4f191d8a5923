use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::info;

use crate::converter::{Conversion, ConverterConfig, OntologyConverter, OwlFhirConverter};
use crate::error::{OwlFhirError, Result};
use crate::parser::{OntologyFormat, parse_document};
use crate::resolver::{OntologyFetcher, OntologyReference, ReferenceFetcher};

/// Pipeline-level options: where output goes and how wide batches run.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Directory for the serialized CodeSystem. Defaults to the input's
    /// directory for local references, the working directory otherwise.
    pub out_dir: Option<PathBuf>,
    /// Output file name; defaults to `CodeSystem-{id}.json`.
    pub out_filename: Option<String>,
    /// Write the CodeSystem to disk after converting.
    pub write_output: bool,
    pub max_concurrent: usize,
    /// Reuse cached downloads for remote references.
    pub use_cached_downloads: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            out_dir: None,
            out_filename: None,
            write_output: false,
            max_concurrent: num_cpus::get(),
            use_cached_downloads: false,
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub reference: OntologyReference,
    pub conversion: Conversion,
    /// Where the CodeSystem was written, when output was requested.
    pub output_path: Option<PathBuf>,
}

/// One-shot and batch OWL-to-FHIR conversion: resolve, parse, convert,
/// optionally write.
pub struct ConversionPipeline {
    converter: Arc<OwlFhirConverter>,
    fetcher: Arc<dyn OntologyFetcher>,
    options: ConversionOptions,
    semaphore: Arc<Semaphore>,
}

impl ConversionPipeline {
    pub fn new(config: ConverterConfig, options: ConversionOptions) -> Self {
        let fetcher =
            ReferenceFetcher::new().with_cached_downloads(options.use_cached_downloads);
        Self::with_fetcher(config, options, Arc::new(fetcher))
    }

    /// Injects a fetcher, mainly for tests and callers with bespoke
    /// transport or caching.
    pub fn with_fetcher(
        config: ConverterConfig,
        options: ConversionOptions,
        fetcher: Arc<dyn OntologyFetcher>,
    ) -> Self {
        let max_concurrent = options.max_concurrent.max(1);
        Self {
            converter: Arc::new(OwlFhirConverter::with_config(config)),
            fetcher,
            options,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Converts a single ontology reference.
    pub async fn convert(&self, reference: &OntologyReference) -> Result<ConversionOutcome> {
        convert_reference(
            self.converter.clone(),
            self.fetcher.clone(),
            self.options.clone(),
            reference.clone(),
        )
        .await
    }

    /// Converts independent references concurrently. Each reference
    /// succeeds or fails on its own; results keep the input order.
    pub async fn convert_batch(
        &self,
        references: &[OntologyReference],
    ) -> Vec<Result<ConversionOutcome>> {
        let mut tasks = Vec::with_capacity(references.len());
        for reference in references {
            let converter = self.converter.clone();
            let fetcher = self.fetcher.clone();
            let options = self.options.clone();
            let semaphore = self.semaphore.clone();
            let reference = reference.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("conversion semaphore closed");
                convert_reference(converter, fetcher, options, reference).await
            }));
        }

        join_all(tasks)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(result) => result,
                Err(err) => Err(OwlFhirError::conversion(format!(
                    "conversion task panicked: {err}"
                ))),
            })
            .collect()
    }
}

async fn convert_reference(
    converter: Arc<OwlFhirConverter>,
    fetcher: Arc<dyn OntologyFetcher>,
    options: ConversionOptions,
    reference: OntologyReference,
) -> Result<ConversionOutcome> {
    let content = fetcher.fetch(&reference).await?;
    let format = OntologyFormat::detect(reference.file_name().as_deref(), &content)?;
    let document = parse_document(&content, format)?;
    let mut conversion = converter.convert(&document)?;

    let id = derive_code_system_id(&reference, converter.config(), &options);
    if conversion.code_system.id.is_none() {
        conversion.code_system.id = id.clone();
    }

    let output_path = if options.write_output {
        Some(write_code_system(&conversion, &reference, &options, id.as_deref()).await?)
    } else {
        None
    };

    info!(
        reference = %reference,
        concepts = conversion.code_system.count.unwrap_or_default(),
        skipped = conversion.stats.constructs_skipped,
        "converted ontology"
    );

    Ok(ConversionOutcome {
        reference,
        conversion,
        output_path,
    })
}

/// Id precedence: explicit config, then a `CodeSystem-{id}.json` output
/// file name, then the reference's file stem.
fn derive_code_system_id(
    reference: &OntologyReference,
    config: &ConverterConfig,
    options: &ConversionOptions,
) -> Option<String> {
    if let Some(id) = &config.code_system_id {
        return Some(id.clone());
    }
    if let Some(filename) = &options.out_filename {
        if let Some(rest) = filename.strip_prefix("CodeSystem-") {
            let id = rest.split('.').next().unwrap_or(rest);
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
    }
    reference.stem()
}

async fn write_code_system(
    conversion: &Conversion,
    reference: &OntologyReference,
    options: &ConversionOptions,
    id: Option<&str>,
) -> Result<PathBuf> {
    let filename = match &options.out_filename {
        Some(filename) => filename.clone(),
        None => format!("CodeSystem-{}.json", id.unwrap_or("unnamed")),
    };

    let out_dir = match &options.out_dir {
        Some(dir) => dir.clone(),
        None => match reference {
            OntologyReference::Local(path) => path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            OntologyReference::Remote(_) => PathBuf::from("."),
        },
    };

    tokio::fs::create_dir_all(&out_dir).await?;
    let output_path = out_dir.join(filename);
    let json = serde_json::to_string_pretty(&conversion.code_system)?;
    tokio::fs::write(&output_path, json).await?;
    info!(path = %output_path.display(), "wrote CodeSystem");
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_precedence_prefers_config_then_filename_then_stem() {
        let reference = OntologyReference::parse("cache/mondo.owl");
        let options = ConversionOptions {
            out_filename: Some("CodeSystem-custom.json".to_string()),
            ..ConversionOptions::default()
        };

        let mut config = ConverterConfig::default();
        assert_eq!(
            derive_code_system_id(&reference, &config, &options).as_deref(),
            Some("custom")
        );

        config.code_system_id = Some("explicit".to_string());
        assert_eq!(
            derive_code_system_id(&reference, &config, &options).as_deref(),
            Some("explicit")
        );

        let config = ConverterConfig::default();
        assert_eq!(
            derive_code_system_id(&reference, &config, &ConversionOptions::default()).as_deref(),
            Some("mondo")
        );
    }
}
