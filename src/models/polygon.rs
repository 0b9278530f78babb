//! Rings and polygons.

use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Ordered loop of coordinates. Closed once first == last.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ring(Vec<Coordinate>);

impl Ring {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.0.len() >= 2 && self.0.first() == self.0.last()
    }

    /// Vertices without the closing duplicate.
    pub fn vertices(&self) -> &[Coordinate] {
        if self.is_closed() {
            &self.0[..self.0.len() - 1]
        } else {
            &self.0
        }
    }

    /// Number of distinct positions in the ring.
    pub fn distinct_count(&self) -> usize {
        let mut pts: Vec<(f64, f64)> = self
            .0
            .iter()
            .map(|c| (c.latitude, c.longitude))
            .collect();
        pts.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        pts.dedup();
        pts.len()
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.0.iter().map(|c| Coord::from(*c)).collect())
    }

    /// GeoJSON `[[lon, lat], ...]`
    pub fn to_positions(&self) -> Vec<[f64; 2]> {
        self.0.iter().map(Coordinate::lon_lat).collect()
    }
}

impl From<Vec<Coordinate>> for Ring {
    fn from(points: Vec<Coordinate>) -> Self {
        Self(points)
    }
}

/// Polygon with one exterior ring. Holes are carried but never produced
/// by the footprint sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Ring,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interiors: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring) -> Self {
        Self {
            exterior,
            interiors: Vec::new(),
        }
    }

    pub fn with_holes(exterior: Ring, interiors: Vec<Ring>) -> Self {
        Self {
            exterior,
            interiors,
        }
    }

    pub fn to_geo(&self) -> geo::Polygon<f64> {
        geo::Polygon::new(
            self.exterior.to_line_string(),
            self.interiors.iter().map(Ring::to_line_string).collect(),
        )
    }

    /// GeoJSON Polygon `coordinates` member.
    pub fn to_positions(&self) -> Vec<Vec<[f64; 2]>> {
        std::iter::once(&self.exterior)
            .chain(self.interiors.iter())
            .map(Ring::to_positions)
            .collect()
    }
}
