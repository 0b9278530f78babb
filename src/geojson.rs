//! GeoJSON encoding of polygons and footprints.
//!
//! Only single Polygon features are accepted, in the shape
//! `{"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[lon, lat], ...]]}}`.
//! A bare Polygon geometry object is accepted as well.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, RooftopError};
use crate::models::{Coordinate, Footprint, Polygon, Ring};

#[derive(Debug, Deserialize)]
struct GeometryDoc {
    #[serde(rename = "type")]
    geometry_type: String,
    #[serde(default)]
    coordinates: Option<Value>,
}

/// GeoJSON Feature wrapping a single polygon.
#[derive(Debug, Clone, Serialize)]
pub struct PolygonFeature {
    #[serde(rename = "type")]
    pub feature_type: &'static str,
    pub properties: Map<String, Value>,
    pub geometry: PolygonGeometry,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub geometry_type: &'static str,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl PolygonFeature {
    pub fn new(polygon: &Polygon, properties: Map<String, Value>) -> Self {
        Self {
            feature_type: "Feature",
            properties,
            geometry: PolygonGeometry {
                geometry_type: "Polygon",
                coordinates: polygon.to_positions(),
            },
        }
    }

    /// Feature for a resolved footprint, carrying its provenance.
    pub fn from_footprint(footprint: &Footprint) -> Self {
        let mut properties = Map::new();
        properties.insert("source".into(), Value::from(footprint.source.clone()));
        properties.insert(
            "building".into(),
            footprint
                .metadata
                .get("building")
                .cloned()
                .unwrap_or_else(|| Value::from("yes")),
        );
        for key in ["osm_id", "osm_type"] {
            if let Some(v) = footprint.metadata.get(key) {
                properties.insert(key.into(), v.clone());
            }
        }
        properties.insert(
            "distance_meters".into(),
            Value::from(footprint.distance_meters()),
        );
        Self::new(&footprint.polygon, properties)
    }
}

/// Parse a Polygon Feature (or bare Polygon geometry) into a [`Polygon`].
///
/// Structural problems are `InvalidInput`; ring validity is left to the
/// validator.
pub fn parse_polygon_feature(value: &Value) -> Result<Polygon> {
    let object = value
        .as_object()
        .ok_or_else(|| RooftopError::invalid_input("GeoJSON must be an object"))?;

    let object_type = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| RooftopError::invalid_input("GeoJSON must have type and geometry properties"))?;

    let geometry_value = match object_type {
        "Feature" => object
            .get("geometry")
            .filter(|g| !g.is_null())
            .ok_or_else(|| {
                RooftopError::invalid_input("GeoJSON must have type and geometry properties")
            })?,
        _ => value,
    };

    let geometry: GeometryDoc = serde_json::from_value(geometry_value.clone())
        .map_err(|e| RooftopError::invalid_input(format!("Invalid geometry object: {}", e)))?;

    if geometry.geometry_type != "Polygon" {
        return Err(RooftopError::invalid_input(format!(
            "Only Polygon geometries are supported, got {}",
            geometry.geometry_type
        )));
    }

    let coordinates = geometry
        .coordinates
        .ok_or_else(|| RooftopError::invalid_input("Polygon must have coordinate array"))?;

    let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(coordinates).map_err(|_| {
        RooftopError::invalid_input("Polygon coordinates must be an array of rings of [lon, lat] positions")
    })?;

    let mut rings = rings.into_iter().map(|r| parse_ring(&r));
    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => return Err(RooftopError::invalid_input("Polygon must have coordinate array")),
    };
    if exterior.is_empty() {
        return Err(RooftopError::invalid_input("Polygon must have coordinate array"));
    }
    let interiors = rings.collect::<Result<Vec<_>>>()?;

    Ok(Polygon::with_holes(exterior, interiors))
}

fn parse_ring(positions: &[Vec<f64>]) -> Result<Ring> {
    positions
        .iter()
        .map(|pos| match pos.as_slice() {
            [lon, lat, ..] => Coordinate::from_lon_lat(*lon, *lat),
            _ => Err(RooftopError::invalid_input(
                "Each position must contain longitude and latitude",
            )),
        })
        .collect::<Result<Vec<_>>>()
        .map(Ring::new)
}
