use std::path::PathBuf;

use clap::Parser;
use owl_on_fhir::{
    ConversionOptions, ConversionPipeline, ConverterConfig, OntologyReference,
};

/// Non-minimalistic OWL to FHIR CodeSystem converter.
#[derive(Parser)]
#[command(name = "owl-on-fhir", version)]
struct Cli {
    /// URL or path of the OWL (or obograph JSON) file to convert.
    #[arg(short = 'i', long)]
    input_path_or_url: String,

    /// CodeSystem id used for identification on the server uploaded to.
    #[arg(short = 's', long)]
    code_system_id: Option<String>,

    /// Canonical URL for the code system; defaults to the ontology IRI.
    #[arg(short = 'S', long)]
    code_system_url: Option<String>,

    /// URI stems of concepts native to the CodeSystem, e.g. for OMIM:
    /// https://omim.org/entry/,https://omim.org/phenotypicSeries/PS
    #[arg(short = 'u', long, value_delimiter = ',')]
    native_uri_stems: Vec<String>,

    /// Directory where results are saved.
    #[arg(short = 'o', long)]
    out_dir: Option<PathBuf>,

    /// File name for the converted CodeSystem.
    #[arg(short = 'n', long)]
    out_filename: Option<String>,

    /// Include only critical properties (parent, deprecated) rather than
    /// all predicates.
    #[arg(short = 'p', long, default_value_t = false)]
    include_only_critical_predicates: bool,

    /// Reuse cached downloads for remote inputs.
    #[arg(short = 'c', long, default_value_t = false)]
    use_cached_downloads: bool,

    /// Skip deprecated classes entirely.
    #[arg(long, default_value_t = false)]
    skip_deprecated: bool,

    /// Stamp CodeSystem.date with the conversion day.
    #[arg(long, default_value_t = false)]
    stamp_date: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = ConverterConfig {
        code_system_id: cli.code_system_id,
        code_system_url: cli.code_system_url,
        native_uri_stems: cli.native_uri_stems,
        include_all_predicates: !cli.include_only_critical_predicates,
        skip_deprecated: cli.skip_deprecated,
        stamp_date: cli.stamp_date,
        ..ConverterConfig::default()
    };
    let options = ConversionOptions {
        out_dir: cli.out_dir,
        out_filename: cli.out_filename,
        write_output: true,
        use_cached_downloads: cli.use_cached_downloads,
        ..ConversionOptions::default()
    };

    let reference = OntologyReference::parse(&cli.input_path_or_url);
    let pipeline = ConversionPipeline::new(config, options);
    let outcome = pipeline.convert(&reference).await?;

    let stats = &outcome.conversion.stats;
    println!("Converted {reference}");
    println!("  concepts:  {}", outcome.conversion.code_system.concept.len());
    if stats.constructs_skipped > 0 {
        println!("  skipped:   {}", stats.constructs_skipped);
        for issue in &stats.diagnostics {
            println!("    - {issue}");
        }
    }
    if stats.foreign_excluded > 0 {
        println!("  foreign:   {}", stats.foreign_excluded);
    }
    if let Some(path) = &outcome.output_path {
        println!("  output:    {}", path.display());
    }

    Ok(())
}
