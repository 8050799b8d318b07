//! Error types for loading, resolving and writing boundary collections.

use std::path::PathBuf;

use thiserror::Error;

/// Every failure aborts the run; there is no per-raion error state.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {} as a GeoJSON FeatureCollection", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("feature {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("feature {index} has no `{key}` property")]
    MissingAttribute { index: usize, key: String },

    #[error("invalid config file {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl EnrichError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EnrichError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        EnrichError::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = EnrichError> = std::result::Result<T, E>;
