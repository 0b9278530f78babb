use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_MAPBOX_ENDPOINT: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// Roughly 50 meters of latitude.
pub const DEFAULT_BUFFER_DEGREES: f64 = 0.0005;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub geocoder: GeocoderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub environment: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub overpass_url: String,
    pub buffer_degrees: f64,
    /// Per-source timeout, also sent to Overpass as its query timeout
    pub timeout_secs: u64,
    /// Attempts per source on SourceUnavailable (1 = no retry)
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub secret_token: Option<String>,
    /// Token handed to browser clients through /api/config
    pub public_token: Option<String>,
    pub country: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3001".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            buffer_degrees: DEFAULT_BUFFER_DEGREES,
            timeout_secs: 25,
            max_attempts: 2,
            retry_delay_ms: 500,
            user_agent: format!("rooftop/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_MAPBOX_ENDPOINT.to_string(),
            secret_token: None,
            public_token: None,
            country: "US".to_string(),
            timeout_secs: 10,
        }
    }
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Check URLs and numeric ranges. Re-run after applying overrides.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.sources.overpass_url).context("Invalid sources.overpass_url")?;
        url::Url::parse(&self.geocoder.endpoint).context("Invalid geocoder.endpoint")?;
        if !(self.sources.buffer_degrees > 0.0 && self.sources.buffer_degrees < 1.0) {
            anyhow::bail!(
                "sources.buffer_degrees must be in (0, 1), got {}",
                self.sources.buffer_degrees
            );
        }
        if self.sources.max_attempts == 0 {
            anyhow::bail!("sources.max_attempts must be at least 1");
        }
        Ok(())
    }
}
