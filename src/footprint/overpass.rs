//! OpenStreetMap building lookup through the Overpass API.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::FootprintSource;
use crate::config::SourcesConfig;
use crate::error::{Result, RooftopError};
use crate::geometry::merge_segments;
use crate::models::{BoundingBox, Candidate, Coordinate, OsmType, Ring};

pub const SECONDARY_SOURCE_NAME: &str = "OpenStreetMap";

/// Queries `building=*` ways and relations around a point.
pub struct OverpassSource {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
    max_attempts: u32,
    retry_delay: Duration,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    element_type: String,
    id: i64,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    geometry: Option<Vec<LatLon>>,
    #[serde(default)]
    members: Vec<OverpassMember>,
}

#[derive(Debug, Deserialize)]
struct OverpassMember {
    #[serde(rename = "type")]
    member_type: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Option<Vec<LatLon>>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
struct LatLon {
    lat: f64,
    lon: f64,
}

impl OverpassSource {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| RooftopError::Internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.overpass_url.clone(),
            timeout_secs: config.timeout_secs,
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay(),
        })
    }

    /// Overpass QL for building ways and relations inside `bbox`.
    pub fn build_query(bbox: &BoundingBox, timeout_secs: u64) -> String {
        let b = format!("{},{},{},{}", bbox.south, bbox.west, bbox.north, bbox.east);
        format!(
            "[out:json][timeout:{timeout}];\n(\n  way[\"building\"]({b});\n  relation[\"building\"]({b});\n);\nout geom;\n",
            timeout = timeout_secs,
            b = b
        )
    }

    async fn fetch(&self, query: &str) -> Result<OverpassResponse> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.fetch_once(query).await {
                Ok(data) => return Ok(data),
                Err(e) if e.is_retryable() && attempts < self.max_attempts => {
                    warn!(
                        "Overpass request failed (attempt {}/{}): {}",
                        attempts, self.max_attempts, e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, query: &str) -> Result<OverpassResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/plain")
            .body(query.to_string())
            .send()
            .await
            .map_err(|e| RooftopError::unavailable(SECONDARY_SOURCE_NAME, e))?;

        if !response.status().is_success() {
            return Err(RooftopError::unavailable(
                SECONDARY_SOURCE_NAME,
                format!("Overpass API error: {}", response.status()),
            ));
        }

        response
            .json::<OverpassResponse>()
            .await
            .map_err(|e| RooftopError::unavailable(SECONDARY_SOURCE_NAME, format!("invalid response: {}", e)))
    }
}

#[async_trait]
impl FootprintSource for OverpassSource {
    fn name(&self) -> &str {
        SECONDARY_SOURCE_NAME
    }

    async fn query(&self, point: Coordinate, buffer_degrees: f64) -> Result<Vec<Candidate>> {
        let bbox = BoundingBox::around(point, buffer_degrees);
        let query = Self::build_query(&bbox, self.timeout_secs);

        debug!(
            "Querying Overpass for buildings around ({}, {})",
            point.latitude, point.longitude
        );

        let data = self.fetch(&query).await?;
        let total = data.elements.len();
        let candidates = candidates_from_response(data);

        info!(
            "Overpass returned {} elements, {} usable building candidates",
            total,
            candidates.len()
        );

        Ok(candidates)
    }
}

/// Convert Overpass elements into candidates, skipping anything without
/// usable geometry.
fn candidates_from_response(data: OverpassResponse) -> Vec<Candidate> {
    data.elements
        .into_iter()
        .filter_map(|element| {
            let (osm_type, ring) = match element.element_type.as_str() {
                "way" => (OsmType::Way, way_ring(&element)?),
                "relation" => (OsmType::Relation, relation_ring(&element)?),
                _ => return None,
            };

            let building = element
                .tags
                .get("building")
                .cloned()
                .unwrap_or_else(|| "yes".to_string());

            Some(
                Candidate::new(ring, SECONDARY_SOURCE_NAME)
                    .with_metadata("osm_id", element.id)
                    .with_metadata("osm_type", osm_type.to_string())
                    .with_metadata("building", building),
            )
        })
        .collect()
}

fn way_ring(element: &OverpassElement) -> Option<Ring> {
    let coords = to_coordinates(element.geometry.as_deref()?, element.id)?;
    if coords.is_empty() {
        return None;
    }
    Some(Ring::new(coords))
}

/// First closed ring assembled from the relation's outer members.
fn relation_ring(element: &OverpassElement) -> Option<Ring> {
    let segments: Vec<Vec<Coordinate>> = element
        .members
        .iter()
        .filter(|m| m.member_type == "way" && (m.role == "outer" || m.role.is_empty()))
        .filter_map(|m| to_coordinates(m.geometry.as_deref()?, element.id))
        .collect();

    merge_segments(segments).into_iter().next()
}

fn to_coordinates(points: &[LatLon], element_id: i64) -> Option<Vec<Coordinate>> {
    let coords: std::result::Result<Vec<Coordinate>, _> = points
        .iter()
        .map(|p| Coordinate::new(p.lat, p.lon))
        .collect();

    match coords {
        Ok(coords) => Some(coords),
        Err(e) => {
            warn!("Skipping OSM element {}: {}", element_id, e);
            None
        }
    }
}
