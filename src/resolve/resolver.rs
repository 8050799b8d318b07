//! Picks the parent oblast for a raion.
//!
//! A region is a candidate when it contains the raion's centroid or touches
//! the raion at all. Among candidates the one with the largest overlap area
//! wins; equal areas keep the region seen first.

use geo_types::MultiPolygon;
use tracing::debug;

use crate::models::LabeledRegion;
use crate::resolve::geometry::SpatialExtent;
use crate::resolve::index::CandidateIndex;

/// Label for raions that overlap no oblast.
pub const UNKNOWN_OBLAST: &str = "Unknown";

/// Score `candidates` in iteration order and return the best region, if any
/// candidate overlaps the raion with a positive area.
pub fn best_parent<'a, G, I>(raion: &G, candidates: I) -> Option<&'a LabeledRegion<G>>
where
    G: SpatialExtent + 'a,
    I: IntoIterator<Item = &'a LabeledRegion<G>>,
{
    let mut candidates = candidates.into_iter().peekable();
    candidates.peek()?;

    let centroid = raion.centroid_point();

    let mut assigned = None;
    let mut max_intersection = 0.0;

    for region in candidates {
        let admissible = centroid.is_some_and(|c| region.geometry.contains_point(&c))
            || region.geometry.intersects_extent(raion);
        if !admissible {
            continue;
        }

        let intersection_area = region.geometry.intersection_area(raion);
        // Strict comparison: zero overlap never beats Unknown, ties keep the first
        if intersection_area > max_intersection {
            max_intersection = intersection_area;
            assigned = Some(region);
        }
    }

    assigned
}

/// Name of the best parent among `regions`, or [`UNKNOWN_OBLAST`].
pub fn resolve_parent<'a, G: SpatialExtent>(raion: &G, regions: &'a [LabeledRegion<G>]) -> &'a str {
    best_parent(raion, regions).map_or(UNKNOWN_OBLAST, |region| region.name.as_str())
}

/// Resolver over a fixed oblast list, optionally backed by a bounding-box index.
///
/// Both modes give identical answers; the index only skips regions whose
/// bounds cannot touch the raion.
pub struct ParentResolver<'a> {
    regions: &'a [LabeledRegion],
    index: Option<CandidateIndex>,
}

impl<'a> ParentResolver<'a> {
    /// Plain linear scan over `regions`.
    pub fn new(regions: &'a [LabeledRegion]) -> Self {
        Self {
            regions,
            index: None,
        }
    }

    /// Scan only regions whose bounding box touches the raion's.
    pub fn with_index(regions: &'a [LabeledRegion]) -> Self {
        Self {
            regions,
            index: Some(CandidateIndex::build(regions)),
        }
    }

    /// Best parent name, or `None` when no region overlaps the raion.
    pub fn resolve(&self, raion: &MultiPolygon<f64>) -> Option<&'a str> {
        let best = match &self.index {
            None => best_parent(raion, self.regions),
            Some(index) => {
                let bounds = raion.bounding_box()?;
                let positions = index.candidates(bounds);
                debug!("{} candidate regions after prefilter", positions.len());
                best_parent(raion, positions.into_iter().map(|i| &self.regions[i]))
            }
        };
        best.map(|region| region.name.as_str())
    }

    pub fn regions(&self) -> &'a [LabeledRegion] {
        self.regions
    }
}
