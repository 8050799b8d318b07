//! Raionmap - assigns second-level administrative regions (raions) to their
//! enclosing first-level regions (oblasts).
//!
//! This library provides the shared loading, resolution and output code for
//! the enrich and seed binaries.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod resolve;
pub mod seed_sql;

pub use config::EnrichConfig;
pub use error::EnrichError;
pub use models::{BoundaryCollection, LabeledRegion, RaionRecord};
pub use pipeline::{enrich_collection, enrich_files, EnrichSummary};
