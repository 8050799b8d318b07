use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{EnrichError, Result};
use crate::resolve::UNKNOWN_OBLAST;

/// Settings for an enrichment run. Every field has a default, so an empty
/// TOML file is a valid config.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EnrichConfig {
    /// Oblast property used as the parent label
    pub oblast_name_key: String,
    /// Raion property the parent label is written to
    pub parent_key: String,
    /// Label for raions that overlap no oblast
    pub unknown_label: String,
    /// Prefilter oblasts with an R-tree over their bounding boxes
    pub use_index: bool,
    /// Resolve raions on the rayon thread pool
    pub parallel: bool,
    /// Draw a progress bar on stderr
    pub progress: bool,
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SeedConfig {
    /// Raion property holding the raion's own name
    pub raion_name_key: String,
    pub table: String,
    pub parent_table: String,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            oblast_name_key: "NAME_1".to_string(),
            parent_key: "parent_oblast".to_string(),
            unknown_label: UNKNOWN_OBLAST.to_string(),
            use_index: true,
            parallel: true,
            progress: true,
            seed: SeedConfig::default(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            raion_name_key: "rayon".to_string(),
            table: "public.raions".to_string(),
            parent_table: "regions".to_string(),
        }
    }
}

impl EnrichConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| EnrichError::io(path, e))?;
        Self::from_toml(&content).map_err(|source| EnrichError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
