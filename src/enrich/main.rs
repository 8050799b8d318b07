//! Raion enrichment pipeline.
//!
//! Reads an oblast layer and a raion layer, assigns each raion its parent
//! oblast, and writes the annotated raion layer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use raionmap::{enrich_files, EnrichConfig};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "enrich")]
#[command(about = "Annotate raions with their parent oblast")]
struct Args {
    /// Oblast (adm1) FeatureCollection
    oblasts: PathBuf,

    /// Raion (adm2) FeatureCollection
    raions: PathBuf,

    /// Where to write the enriched raion FeatureCollection
    output: PathBuf,

    /// Optional TOML config overriding property names and run options
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EnrichConfig::load_from_file(path).context("Failed to load config")?,
        None => EnrichConfig::default(),
    };

    info!("Raion Enrichment");
    info!("Oblasts: {}", args.oblasts.display());
    info!("Raions: {}", args.raions.display());

    let summary = enrich_files(&args.oblasts, &args.raions, &args.output, &config)
        .with_context(|| format!("Failed to enrich {}", args.raions.display()))?;

    println!("{}", summary);
    Ok(())
}
