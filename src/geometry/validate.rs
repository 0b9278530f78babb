//! Ring closure and simple-polygon checks.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Contains, Coord, Line};
use tracing::debug;

use crate::error::{Result, RooftopError};
use crate::models::{Polygon, Ring};

/// Planar area (square degrees) below which a ring counts as degenerate.
const MIN_DEGREE_AREA: f64 = 1e-16;

/// Close a ring by appending its first point when first != last.
///
/// Fails when the ring has fewer than 3 distinct points.
pub fn normalize(ring: &Ring) -> Result<Ring> {
    let distinct = ring.distinct_count();
    if distinct < 3 {
        return Err(RooftopError::invalid_geometry(format!(
            "ring has {} distinct points, at least 3 are required",
            distinct
        )));
    }

    if ring.is_closed() {
        return Ok(ring.clone());
    }

    let mut points = ring.points().to_vec();
    points.push(points[0]);
    Ok(Ring::new(points))
}

/// Whether the polygon is a closed, non-degenerate, simple polygon whose
/// holes are themselves simple rings lying inside the exterior.
pub fn is_valid_polygon(polygon: &Polygon) -> bool {
    let exterior = &polygon.exterior;

    if !is_simple_ring(exterior) {
        debug!("Rejecting polygon: exterior ring is unclosed, degenerate or self-intersecting");
        return false;
    }

    let shell = geo::Polygon::new(exterior.to_line_string(), vec![]);
    for hole in &polygon.interiors {
        if !is_simple_ring(hole) {
            debug!("Rejecting polygon: hole is unclosed, degenerate or self-intersecting");
            return false;
        }
        if !shell.contains(&hole.to_line_string()) {
            debug!("Rejecting polygon: hole lies outside the exterior ring");
            return false;
        }
    }

    true
}

/// Closed, at least 4 positions / 3 distinct points, non-zero area, no crossings.
fn is_simple_ring(ring: &Ring) -> bool {
    if !ring.is_closed() || ring.len() < 4 || ring.distinct_count() < 3 {
        return false;
    }

    let area = geo::Polygon::new(ring.to_line_string(), vec![]).unsigned_area();
    if area <= MIN_DEGREE_AREA {
        return false;
    }

    !self_intersects(ring)
}

/// Check every pair of ring edges for crossings, touching or overlap.
fn self_intersects(ring: &Ring) -> bool {
    // Drop repeated consecutive points so zero-length edges don't count
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.len());
    for c in ring.points() {
        let c = Coord::from(*c);
        if coords.last() != Some(&c) {
            coords.push(c);
        }
    }

    let edges: Vec<Line<f64>> = coords.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let m = edges.len();

    for i in 0..m {
        for j in (i + 1)..m {
            let adjacent = j == i + 1 || (i == 0 && j == m - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                // Neighbouring edges meet at their shared vertex
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => return true,
            }
        }
    }

    false
}
