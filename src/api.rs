//! Caller-facing operations and their JSON response shapes.
//!
//! The response field names (`area`, `units`, `precision`,
//! `calculation_method`, `polygon_info`) are relied on by existing clients.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::footprint::FootprintResolver;
use crate::geojson::{parse_polygon_feature, PolygonFeature};
use crate::geometry::{normalize, AreaCalculator};
use crate::models::{AreaResult, Coordinate, Footprint, Polygon};

pub const AREA_UNITS: &str = "square_meters";

/// Resolve the building footprint at a latitude/longitude.
pub async fn resolve_footprint(
    resolver: &FootprintResolver,
    latitude: f64,
    longitude: f64,
) -> Result<Footprint> {
    let point = Coordinate::new(latitude, longitude)?;
    resolver.resolve(point).await
}

/// Area of a GeoJSON Polygon Feature. Unclosed exterior rings are closed
/// before measuring.
pub fn compute_area(geojson: &Value) -> Result<AreaResult> {
    let polygon = parse_polygon_feature(geojson)?;
    compute_polygon_area(&polygon)
}

pub fn compute_polygon_area(polygon: &Polygon) -> Result<AreaResult> {
    let exterior = normalize(&polygon.exterior)?;
    let polygon = Polygon::with_holes(exterior, polygon.interiors.clone());
    AreaCalculator::new().compute(&polygon)
}

#[derive(Debug, Serialize)]
pub struct CoordinatesBody {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coordinate> for CoordinatesBody {
    fn from(c: Coordinate) -> Self {
        Self {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FootprintResponse {
    pub success: bool,
    pub coordinates: CoordinatesBody,
    pub footprint: PolygonFeature,
    pub source: String,
}

impl FootprintResponse {
    pub fn new(latitude: f64, longitude: f64, footprint: &Footprint) -> Self {
        Self {
            success: true,
            coordinates: CoordinatesBody {
                latitude,
                longitude,
            },
            footprint: PolygonFeature::from_footprint(footprint),
            source: footprint.source.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BoundsBody {
    /// `[lon, lat]`
    pub southwest: [f64; 2],
    /// `[lon, lat]`
    pub northeast: [f64; 2],
}

#[derive(Debug, Serialize)]
pub struct PolygonInfo {
    pub coordinate_count: usize,
    pub centroid: CoordinatesBody,
    pub bounds: BoundsBody,
}

#[derive(Debug, Serialize)]
pub struct AreaResponse {
    pub success: bool,
    pub area: f64,
    pub units: &'static str,
    pub precision: String,
    pub calculation_method: String,
    pub polygon_info: PolygonInfo,
}

impl From<AreaResult> for AreaResponse {
    fn from(result: AreaResult) -> Self {
        Self {
            success: true,
            area: result.area_square_meters,
            units: AREA_UNITS,
            precision: result.precision_label,
            calculation_method: result.method,
            polygon_info: PolygonInfo {
                coordinate_count: result.coordinate_count,
                centroid: result.centroid.into(),
                bounds: BoundsBody {
                    southwest: result.bounds.southwest(),
                    northeast: result.bounds.northeast(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RooftopError;
    use serde_json::json;

    #[test]
    fn test_compute_area_closes_open_ring() {
        let open = json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [-122.1430, 37.4419],
                    [-122.1425, 37.4419],
                    [-122.1425, 37.4415],
                    [-122.1430, 37.4415]
                ]]
            }
        });
        let result = compute_area(&open).unwrap();
        assert_eq!(result.coordinate_count, 5);
        assert_eq!(result.area_square_meters, 1964.32);
    }

    #[test]
    fn test_compute_area_rejects_non_polygon() {
        let line = json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}
        });
        assert!(matches!(
            compute_area(&line),
            Err(RooftopError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_compute_area_degenerate_ring() {
        let flat = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [0.001, 0.0], [0.0, 0.0]]]
        });
        assert!(matches!(
            compute_area(&flat),
            Err(RooftopError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_compute_area_rejects_hole_outside_shell() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [0.0001, 0.0], [0.0001, 0.0001], [0.0, 0.0001], [0.0, 0.0]],
                [[1.0, 1.0], [1.0, 1.0001], [1.0001, 1.0001], [1.0001, 1.0], [1.0, 1.0]]
            ]
        });
        assert!(matches!(
            compute_area(&polygon),
            Err(RooftopError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_compute_area_rejects_bowtie_hole() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [0.001, 0.0], [0.001, 0.001], [0.0, 0.001], [0.0, 0.0]],
                [[0.0002, 0.0002], [0.0008, 0.0008], [0.0008, 0.0002], [0.0002, 0.0008], [0.0002, 0.0002]]
            ]
        });
        assert!(matches!(
            compute_area(&polygon),
            Err(RooftopError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_area_response_shape() {
        let square = json!({
            "type": "Polygon",
            "coordinates": [[
                [-122.1430, 37.4419],
                [-122.1425, 37.4419],
                [-122.1425, 37.4415],
                [-122.1430, 37.4415],
                [-122.1430, 37.4419]
            ]]
        });
        let response = AreaResponse::from(compute_area(&square).unwrap());
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["units"], "square_meters");
        assert_eq!(value["precision"], "±1 square meter");
        assert!(value["area"].as_f64().unwrap() > 1900.0);
        assert!(value["calculation_method"].is_string());
        assert_eq!(value["polygon_info"]["coordinate_count"], 5);
        assert!(value["polygon_info"]["centroid"]["latitude"].is_number());
        assert!(value["polygon_info"]["centroid"]["longitude"].is_number());
        assert_eq!(
            value["polygon_info"]["bounds"]["southwest"],
            json!([-122.1430, 37.4415])
        );
        assert_eq!(
            value["polygon_info"]["bounds"]["northeast"],
            json!([-122.1425, 37.4419])
        );
    }

    #[tokio::test]
    async fn test_resolve_footprint_rejects_bad_coordinates() {
        let resolver = FootprintResolver::new(vec![], 0.0005, std::time::Duration::from_secs(1));
        let err = resolve_footprint(&resolver, 95.0, 0.0).await.unwrap_err();
        assert!(matches!(err, RooftopError::InvalidInput(_)));
    }
}
