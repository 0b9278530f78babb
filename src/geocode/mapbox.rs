//! Address lookup through the Mapbox geocoding API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::config::GeocoderConfig;
use crate::error::{Result, RooftopError};
use crate::models::Coordinate;

const SOURCE_NAME: &str = "Mapbox";

/// Best match for a free-text address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodedAddress {
    pub input: String,
    pub formatted: String,
    /// Mapbox relevance, 0.0 to 1.0
    pub confidence: f64,
    pub coordinates: Coordinate,
    /// `[minLon, minLat, maxLon, maxLat]` when Mapbox reports one
    pub bounds: Option<[f64; 4]>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    features: Vec<GeocodingFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodingFeature {
    place_name: String,
    center: [f64; 2],
    #[serde(default)]
    relevance: Option<f64>,
    #[serde(default)]
    bbox: Option<[f64; 4]>,
}

/// Thin client for Mapbox forward geocoding.
pub struct MapboxGeocoder {
    client: Client,
    endpoint: String,
    token: Option<String>,
    country: String,
}

impl MapboxGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RooftopError::Internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.secret_token.clone(),
            country: config.country.clone(),
        })
    }

    /// Coordinates of the best address match.
    pub async fn geocode(&self, address: &str) -> Result<GeocodedAddress> {
        let address = address.trim();
        if address.is_empty() {
            return Err(RooftopError::invalid_input("Address parameter is required"));
        }

        let token = self
            .token
            .as_deref()
            .ok_or_else(|| RooftopError::Internal("Mapbox API token not configured".into()))?;

        let url = self.request_url(address, token)?;
        debug!("Geocoding address '{}'", address);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RooftopError::unavailable(SOURCE_NAME, e))?;

        if !response.status().is_success() {
            return Err(RooftopError::unavailable(
                SOURCE_NAME,
                format!("Mapbox API error: {}", response.status()),
            ));
        }

        let data: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| RooftopError::unavailable(SOURCE_NAME, format!("invalid response: {}", e)))?;

        let result = first_match(address, data)?;
        info!(
            "Geocoded '{}' to ({}, {})",
            address, result.coordinates.latitude, result.coordinates.longitude
        );
        Ok(result)
    }

    fn request_url(&self, address: &str, token: &str) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| RooftopError::Internal(format!("invalid geocoder endpoint: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| RooftopError::Internal("geocoder endpoint cannot be a base URL".into()))?
            .pop_if_empty()
            .push(&format!("{}.json", address));

        url.query_pairs_mut()
            .append_pair("access_token", token)
            .append_pair("country", &self.country)
            .append_pair("types", "address")
            .append_pair("limit", "1");

        Ok(url)
    }
}

fn first_match(address: &str, data: GeocodingResponse) -> Result<GeocodedAddress> {
    let feature = data
        .features
        .into_iter()
        .next()
        .ok_or_else(|| RooftopError::AddressNotFound(address.to_string()))?;

    let [longitude, latitude] = feature.center;
    let coordinates = Coordinate::new(latitude, longitude)
        .map_err(|e| RooftopError::unavailable(SOURCE_NAME, e))?;

    Ok(GeocodedAddress {
        input: address.to_string(),
        formatted: feature.place_name,
        confidence: feature.relevance.unwrap_or(1.0),
        coordinates,
        bounds: feature.bbox,
    })
}
