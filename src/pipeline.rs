//! End-to-end enrichment: load both layers, resolve every raion, write the
//! annotated raion layer.

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;

use hashbrown::HashMap;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::EnrichConfig;
use crate::error::{EnrichError, Result};
use crate::models::{BoundaryCollection, RaionRecord};
use crate::resolve::{load_oblasts, load_raions, read_collection, ParentResolver};

/// Outcome of an enrichment run.
#[derive(Debug, Clone, Default)]
pub struct EnrichSummary {
    /// Raions labelled with something other than the unknown label
    pub found_count: usize,
    pub total_count: usize,
    /// Raion count per assigned label, unknown included
    pub per_oblast: HashMap<String, usize>,
}

impl EnrichSummary {
    fn record(&mut self, label: &str, unknown_label: &str) {
        self.total_count += 1;
        if label != unknown_label {
            self.found_count += 1;
        }
        *self.per_oblast.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn unknown_count(&self) -> usize {
        self.total_count - self.found_count
    }

    /// Labels sorted by descending raion count, then by name.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .per_oblast
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

impl fmt::Display for EnrichSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Enrichment complete. Mapped {}/{} raions.",
            self.found_count, self.total_count
        )
    }
}

fn progress_bar(len: u64, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Annotate every raion in `raions` with its parent oblast.
///
/// The returned collection has the same features in the same order, each
/// with `config.parent_key` set. Everything else, collection members and
/// coordinates included, is carried over untouched.
pub fn enrich_collection(
    oblasts: &BoundaryCollection,
    mut raions: BoundaryCollection,
    config: &EnrichConfig,
) -> Result<(BoundaryCollection, EnrichSummary)> {
    let regions = load_oblasts(oblasts, &config.oblast_name_key)?;

    let records = load_raions(std::mem::take(&mut raions.features))?;

    let resolver = if config.use_index {
        ParentResolver::with_index(&regions)
    } else {
        ParentResolver::new(&regions)
    };

    info!(
        "Resolving {} raions against {} oblasts...",
        records.len(),
        resolver.regions().len()
    );

    let pb = progress_bar(records.len() as u64, config.progress);
    let resolve_one = |record: &RaionRecord| {
        let parent = resolver.resolve(&record.geometry);
        pb.inc(1);
        parent
    };

    let parents: Vec<Option<&str>> = if config.parallel {
        records.par_iter().map(&resolve_one).collect()
    } else {
        records.iter().map(&resolve_one).collect()
    };
    pb.finish_and_clear();

    let mut summary = EnrichSummary::default();
    let features = records
        .into_iter()
        .zip(parents)
        .enumerate()
        .map(|(index, (mut record, parent))| {
            let label = parent.unwrap_or_else(|| {
                debug!("Raion {} overlaps no oblast", index);
                config.unknown_label.as_str()
            });
            record.set_parent(&config.parent_key, label);
            summary.record(label, &config.unknown_label);
            record.into_feature()
        })
        .collect();

    for (name, count) in summary.ranked() {
        info!("  {}: {} raions", name, count);
    }

    Ok((raions.with_features(features), summary))
}

/// Temp files are created owner-only; give the output the mode of the file
/// it replaces, or the usual 0644 for a new file.
#[cfg(unix)]
fn set_output_permissions(tmp: &NamedTempFile, path: &Path) -> Result<()> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    let permissions = match std::fs::metadata(path) {
        Ok(existing) => existing.permissions(),
        Err(_) => Permissions::from_mode(0o644),
    };
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| EnrichError::io(tmp.path(), e))
}

#[cfg(not(unix))]
fn set_output_permissions(_tmp: &NamedTempFile, _path: &Path) -> Result<()> {
    Ok(())
}

/// Serialize `collection` to `path` as pretty-printed JSON.
///
/// Output goes to a temporary file next to `path` that replaces it only once
/// fully written, so a failed run never leaves a partial file behind.
pub fn write_collection(path: &Path, collection: &BoundaryCollection) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| EnrichError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, collection)
            .map_err(|e| EnrichError::io(path, e.into()))?;
        writer.flush().map_err(|e| EnrichError::io(path, e))?;
    }
    set_output_permissions(&tmp, path)?;
    tmp.persist(path)
        .map_err(|e| EnrichError::io(path, e.error))?;

    info!("Wrote {} features to {}", collection.features.len(), path.display());
    Ok(())
}

/// Read both layers, enrich the raions and write them to `output_path`.
///
/// Nothing is written unless every step before it succeeded.
pub fn enrich_files(
    oblasts_path: &Path,
    raions_path: &Path,
    output_path: &Path,
    config: &EnrichConfig,
) -> Result<EnrichSummary> {
    let oblasts = read_collection(oblasts_path)?;
    let raions = read_collection(raions_path)?;

    let (enriched, summary) = enrich_collection(&oblasts, raions, config)?;
    write_collection(output_path, &enriched)?;

    info!(
        "Mapped {} raions, {} left as {}",
        summary.found_count,
        summary.unknown_count(),
        config.unknown_label
    );
    Ok(summary)
}
