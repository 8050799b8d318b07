//! Generates an SQL seed script from an enriched raion layer.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use raionmap::resolve::read_collection;
use raionmap::seed_sql::seed_script;
use raionmap::EnrichConfig;

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Write an SQL seed script linking raions to their parent oblast")]
struct Args {
    /// Enriched raion FeatureCollection
    enriched: PathBuf,

    /// Output SQL file
    output: PathBuf,

    /// Optional TOML config overriding property and table names
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EnrichConfig::load_from_file(path).context("Failed to load config")?,
        None => EnrichConfig::default(),
    };

    let raions = read_collection(&args.enriched).context("Failed to read enriched raions")?;
    let script = seed_script(&raions, &config);

    fs::write(&args.output, &script.sql)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!("Wrote {}", args.output.display());
    println!("Seed file generated: {}", args.output.display());
    Ok(())
}
