//! Geometry capabilities the parent resolver relies on.
//!
//! The resolver only needs a handful of operations, so it is written against
//! [`SpatialExtent`] rather than a concrete geometry type.

use geo::{Area, BooleanOps, BoundingRect, Centroid, Contains, Intersects};
use geo_types::{MultiPolygon, Point, Rect};

/// Operations needed to decide which region a polygon belongs to.
pub trait SpatialExtent {
    /// Geometric center, or `None` for an empty geometry.
    fn centroid_point(&self) -> Option<Point<f64>>;

    fn contains_point(&self, point: &Point<f64>) -> bool;

    fn intersects_extent(&self, other: &Self) -> bool;

    /// Area of the overlap with `other`. Never negative.
    fn intersection_area(&self, other: &Self) -> f64;

    /// Axis-aligned bounds, or `None` for an empty geometry.
    fn bounding_box(&self) -> Option<Rect<f64>>;
}

impl SpatialExtent for MultiPolygon<f64> {
    fn centroid_point(&self) -> Option<Point<f64>> {
        Centroid::centroid(self)
    }

    fn contains_point(&self, point: &Point<f64>) -> bool {
        Contains::contains(self, point)
    }

    fn intersects_extent(&self, other: &Self) -> bool {
        Intersects::intersects(self, other)
    }

    fn intersection_area(&self, other: &Self) -> f64 {
        BooleanOps::intersection(self, other).unsigned_area()
    }

    fn bounding_box(&self) -> Option<Rect<f64>> {
        BoundingRect::bounding_rect(self)
    }
}

/// Every ring of every part has at least four positions once closed.
pub fn has_closed_rings(multi_polygon: &MultiPolygon<f64>) -> bool {
    multi_polygon.0.iter().all(|polygon| {
        std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .all(|ring| ring.0.len() >= 4)
    })
}

/// Axis-aligned square polygon, used throughout the tests.
#[cfg(test)]
pub(crate) fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> MultiPolygon<f64> {
    use geo_types::{LineString, Polygon};

    let ring = LineString::from(vec![
        (min_x, min_y),
        (max_x, min_y),
        (max_x, max_y),
        (min_x, max_y),
        (min_x, min_y),
    ]);
    MultiPolygon::new(vec![Polygon::new(ring, vec![])])
}
