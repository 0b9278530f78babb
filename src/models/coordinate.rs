//! Coordinates and bounding boxes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RooftopError};

/// Geographic point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the WGS84 range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self {
            latitude,
            longitude,
        };
        coord.validate()?;
        Ok(coord)
    }

    /// Build from a GeoJSON-ordered `[lon, lat]` position.
    pub fn from_lon_lat(longitude: f64, latitude: f64) -> Result<Self> {
        Self::new(latitude, longitude)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(RooftopError::invalid_input(format!(
                "coordinate out of range: latitude {} must be within [-90, 90] and longitude {} within [-180, 180]",
                self.latitude, self.longitude
            )))
        }
    }

    /// GeoJSON position order.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Coord {
            x: c.longitude,
            y: c.latitude,
        }
    }
}

/// Bounding box envelope in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Square box with `buffer_degrees` on each side of `point`, clamped to
    /// the valid latitude and longitude ranges.
    pub fn around(point: Coordinate, buffer_degrees: f64) -> Self {
        Self {
            south: (point.latitude - buffer_degrees).max(-90.0),
            west: (point.longitude - buffer_degrees).max(-180.0),
            north: (point.latitude + buffer_degrees).min(90.0),
            east: (point.longitude + buffer_degrees).min(180.0),
        }
    }

    /// Min/max envelope over a set of points. `None` when empty.
    pub fn of_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            south: first.latitude,
            west: first.longitude,
            north: first.latitude,
            east: first.longitude,
        };
        for p in iter {
            bbox.south = bbox.south.min(p.latitude);
            bbox.north = bbox.north.max(p.latitude);
            bbox.west = bbox.west.min(p.longitude);
            bbox.east = bbox.east.max(p.longitude);
        }
        Some(bbox)
    }

    /// `[lon, lat]` of the south-west corner.
    pub fn southwest(&self) -> [f64; 2] {
        [self.west, self.south]
    }

    /// `[lon, lat]` of the north-east corner.
    pub fn northeast(&self) -> [f64; 2] {
        [self.east, self.north]
    }
}
