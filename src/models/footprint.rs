//! Candidates, resolved footprints and area results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{BoundingBox, Coordinate, Polygon, Ring};

/// Type of OSM object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    Way,
    Relation,
}

impl std::fmt::Display for OsmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsmType::Way => write!(f, "way"),
            OsmType::Relation => write!(f, "relation"),
        }
    }
}

/// Raw building geometry returned by a source, before selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub ring: Ring,
    /// Provider name, e.g. "OpenStreetMap"
    pub source_tag: String,
    /// Provider specific fields (feature id, building tag)
    #[serde(default)]
    pub source_metadata: Map<String, Value>,
}

impl Candidate {
    pub fn new(ring: Ring, source_tag: impl Into<String>) -> Self {
        Self {
            ring,
            source_tag: source_tag.into(),
            source_metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.source_metadata.insert(key.to_string(), value.into());
        self
    }
}

/// The selected, normalized building polygon for a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub polygon: Polygon,
    pub source: String,
    /// Centroid distance from the query point, in meters
    pub distance_to_query: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Footprint {
    /// Distance rounded to the nearest meter, for display.
    pub fn distance_meters(&self) -> i64 {
        self.distance_to_query.round() as i64
    }
}

/// Area and descriptive metrics of a polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaResult {
    /// Square meters, rounded to 2 decimals
    pub area_square_meters: f64,
    pub centroid: Coordinate,
    pub bounds: BoundingBox,
    /// Positions in the exterior ring
    pub coordinate_count: usize,
    pub precision_label: String,
    pub method: String,
}
