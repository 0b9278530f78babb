//! Geodesic area, centroid and bounds of a validated polygon.

use geo::orient::{Direction, Orient};
use geo::GeodesicArea;
use tracing::debug;

use super::distance::centroid_of;
use super::validate::is_valid_polygon;
use crate::error::{Result, RooftopError};
use crate::models::{AreaResult, BoundingBox, Polygon};

pub const PRECISION_LABEL: &str = "±1 square meter";
pub const METHOD: &str = "Geodesic area on the WGS84 ellipsoid (Karney)";

/// Computes surface area and descriptive metrics for building polygons.
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaCalculator;

impl AreaCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Area in square meters (2 decimals), vertex centroid and bounds.
    ///
    /// Fails with `InvalidGeometry` for unclosed, degenerate or
    /// self-intersecting polygons, and for holes that are not simple rings
    /// inside the exterior. The input is never modified.
    pub fn compute(&self, polygon: &Polygon) -> Result<AreaResult> {
        if !is_valid_polygon(polygon) {
            return Err(RooftopError::invalid_geometry(
                "polygon is unclosed, degenerate, self-intersecting or has an invalid hole",
            ));
        }

        let area = geodesic_area(polygon);

        let centroid = centroid_of(&polygon.exterior)
            .ok_or_else(|| RooftopError::Internal("validated ring has no vertices".into()))?;
        let bounds = BoundingBox::of_points(polygon.exterior.points())
            .ok_or_else(|| RooftopError::Internal("validated ring has no bounds".into()))?;

        debug!(
            "Computed area {:.2} m² over {} positions",
            area,
            polygon.exterior.len()
        );

        Ok(AreaResult {
            area_square_meters: round_to_cents(area),
            centroid,
            bounds,
            coordinate_count: polygon.exterior.len(),
            precision_label: PRECISION_LABEL.to_string(),
            method: METHOD.to_string(),
        })
    }
}

/// Unsigned ellipsoidal area in square meters.
fn geodesic_area(polygon: &Polygon) -> f64 {
    // Exterior counter-clockwise, holes clockwise
    polygon
        .to_geo()
        .orient(Direction::Default)
        .geodesic_area_unsigned()
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
