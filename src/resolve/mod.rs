//! Parent oblast resolution.
//!
//! Loads oblast and raion boundaries from GeoJSON and decides, for each
//! raion, which oblast it belongs to by centroid containment and overlap
//! area. An R-tree over oblast bounds can narrow the candidates.

pub mod geometry;
mod index;
mod loader;
mod resolver;

pub use geometry::SpatialExtent;
pub use index::CandidateIndex;
pub use loader::{
    geometry_from_feature, load_oblasts, load_raions, raion_name, read_collection,
    string_property,
};
pub use resolver::{best_parent, resolve_parent, ParentResolver, UNKNOWN_OBLAST};
