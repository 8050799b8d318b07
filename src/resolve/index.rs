//! Bounding-box prefilter for oblast candidates.

use geo_types::Rect;
use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

use crate::models::LabeledRegion;
use crate::resolve::geometry::SpatialExtent;

/// R-tree entry pointing back at a region by its position in the source list
#[derive(Debug, Clone)]
struct IndexedRegion {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn envelope_of(rect: Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

/// Spatial index over region bounding boxes.
///
/// A region can only contain a raion's centroid or intersect the raion if the
/// two bounding boxes touch, so the lookup never drops a region the linear
/// scan would have scored. Regions without a bounding box (empty geometry)
/// are left out for the same reason.
pub struct CandidateIndex {
    tree: RTree<IndexedRegion>,
}

impl CandidateIndex {
    pub fn build<G: SpatialExtent>(regions: &[LabeledRegion<G>]) -> Self {
        let indexed: Vec<IndexedRegion> = regions
            .iter()
            .enumerate()
            .filter_map(|(position, region)| {
                region.geometry.bounding_box().map(|rect| IndexedRegion {
                    position,
                    envelope: envelope_of(rect),
                })
            })
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Candidate index built with {} entries", tree.size());

        Self { tree }
    }

    /// Positions of regions whose bounds touch `bounds`, in ascending order.
    pub fn candidates(&self, bounds: Rect<f64>) -> Vec<usize> {
        let mut positions: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope_of(bounds))
            .map(|entry| entry.position)
            .collect();
        // Source order decides ties, so restore it
        positions.sort_unstable();
        positions
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
