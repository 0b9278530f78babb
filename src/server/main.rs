//! HTTP API for building footprint lookup and roof area calculation.
//!
//! Exposes geocoding, footprint resolution and area endpoints consumed by
//! the map client.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rooftop::api::{compute_area, resolve_footprint, AreaResponse, FootprintResponse};
use rooftop::config::Config;
use rooftop::geocode::{GeocodedAddress, MapboxGeocoder};
use rooftop::{FootprintResolver, RooftopError};

mod response;
use response::ApiError;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const SERVICE_NAME: &str = "roof-area-calculator-api";

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Building footprint and roof area API server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Overpass API interpreter URL (overrides config)
    #[arg(long, env = "OVERPASS_API_URL")]
    overpass_url: Option<String>,

    /// Mapbox secret token used for geocoding
    #[arg(long, env = "MAPBOX_SECRET_TOKEN", hide_env_values = true)]
    mapbox_secret_token: Option<String>,

    /// Mapbox public token handed to map clients
    #[arg(long, env = "MAPBOX_PUBLIC_TOKEN", hide_env_values = true)]
    mapbox_public_token: Option<String>,

    /// Deployment environment name
    #[arg(long, env = "ROOFTOP_ENV")]
    environment: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::default(),
        };

        if let Some(listen) = self.listen {
            config.server.listen = listen;
        }
        if let Some(url) = self.overpass_url {
            config.sources.overpass_url = url;
        }
        if let Some(token) = self.mapbox_secret_token {
            config.geocoder.secret_token = Some(token);
        }
        if let Some(token) = self.mapbox_public_token {
            config.geocoder.public_token = Some(token);
        }
        if let Some(env) = self.environment {
            config.server.environment = env;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Application state shared across handlers
struct AppState {
    resolver: FootprintResolver,
    geocoder: MapboxGeocoder,
    public_token: Option<String>,
    environment: String,
}

impl AppState {
    fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            resolver: FootprintResolver::from_config(&config.sources)?,
            geocoder: MapboxGeocoder::new(&config.geocoder)?,
            public_token: config.geocoder.public_token.clone(),
            environment: config.server.environment.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config()?;

    info!("Rooftop API server");
    info!("Overpass endpoint: {}", config.sources.overpass_url);
    if config.geocoder.secret_token.is_none() {
        tracing::warn!("MAPBOX_SECRET_TOKEN not set, geocoding requests will fail");
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/geocode", get(geocode_handler))
        .route("/api/footprint", get(footprint_handler))
        .route("/api/area", get(area_get_handler).post(area_post_handler))
        .route("/api/config", get(config_handler))
        .fallback(fallback_handler)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    service: &'static str,
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: SERVICE_NAME,
    })
}

#[derive(Deserialize)]
struct FootprintParams {
    lat: Option<String>,
    lon: Option<String>,
}

/// Building polygon nearest to a coordinate
async fn footprint_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FootprintParams>,
) -> Result<Json<FootprintResponse>, ApiError> {
    let (Some(lat), Some(lon)) = (params.lat.as_deref(), params.lon.as_deref()) else {
        return Err(RooftopError::invalid_input(
            "Latitude and longitude parameters are required, e.g. /api/footprint?lat=37.4419&lon=-122.1430",
        )
        .into());
    };

    let latitude = parse_number(lat)?;
    let longitude = parse_number(lon)?;

    let footprint = resolve_footprint(&state.resolver, latitude, longitude).await?;

    Ok(Json(FootprintResponse::new(latitude, longitude, &footprint)))
}

fn parse_number(raw: &str) -> Result<f64, ApiError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RooftopError::invalid_input("Invalid latitude or longitude values").into())
}

#[derive(Deserialize)]
struct AreaParams {
    geojson: Option<String>,
}

/// Area of a GeoJSON polygon passed as a query parameter
async fn area_get_handler(Query(params): Query<AreaParams>) -> Result<Json<AreaResponse>, ApiError> {
    let raw = params.geojson.ok_or_else(|| {
        RooftopError::invalid_input(
            "GeoJSON parameter is required, e.g. /api/area?geojson={\"type\":\"Feature\",\"geometry\":{\"type\":\"Polygon\",\"coordinates\":[[...]]}}",
        )
    })?;
    area_from_bytes(raw.as_bytes())
}

/// Area of a GeoJSON polygon posted as the request body
async fn area_post_handler(body: Bytes) -> Result<Json<AreaResponse>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RooftopError::invalid_input("GeoJSON data required in request body").into());
    }
    area_from_bytes(&body)
}

fn area_from_bytes(raw: &[u8]) -> Result<Json<AreaResponse>, ApiError> {
    let geojson: Value = serde_json::from_slice(raw)
        .map_err(|e| RooftopError::invalid_input(format!("Invalid GeoJSON format: {}", e)))?;
    let result = compute_area(&geojson)?;
    Ok(Json(AreaResponse::from(result)))
}

#[derive(Deserialize)]
struct GeocodeParams {
    address: Option<String>,
}

#[derive(Serialize)]
struct GeocodeResponse {
    success: bool,
    address: AddressBody,
    coordinates: rooftop::Coordinate,
    bounds: Option<[f64; 4]>,
}

#[derive(Serialize)]
struct AddressBody {
    input: String,
    formatted: String,
    confidence: f64,
}

impl From<GeocodedAddress> for GeocodeResponse {
    fn from(g: GeocodedAddress) -> Self {
        Self {
            success: true,
            address: AddressBody {
                input: g.input,
                formatted: g.formatted,
                confidence: g.confidence,
            },
            coordinates: g.coordinates,
            bounds: g.bounds,
        }
    }
}

/// Address to coordinate lookup
async fn geocode_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeParams>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let address = params.address.unwrap_or_default();
    let result = state.geocoder.geocode(&address).await?;
    Ok(Json(result.into()))
}

/// Client configuration (public map token, environment)
async fn config_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "config": {
            "mapboxToken": state.public_token,
            "environment": state.environment,
        }
    }))
}

async fn fallback_handler(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found", "path": uri.to_string() })),
    )
}
