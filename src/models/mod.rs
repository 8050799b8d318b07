//! Core data models for boundary enrichment.

pub mod collection;
pub mod region;

pub use collection::BoundaryCollection;
pub use region::{LabeledRegion, RaionRecord};
