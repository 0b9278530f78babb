//! Error types for footprint resolution and area computation.

use thiserror::Error;

/// Errors raised anywhere in the resolve-then-compute pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RooftopError {
    /// Malformed coordinates, malformed GeoJSON or a wrong geometry type.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No building near the point after every source was consulted.
    #[error(
        "No building found near ({latitude}, {longitude}); sources checked: {}",
        .sources_checked.join(", ")
    )]
    NotFound {
        latitude: f64,
        longitude: f64,
        sources_checked: Vec<String>,
    },

    /// The geocoder returned no match for an address.
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// Unclosed, degenerate or self-intersecting ring.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Network, timeout or parse failure from an upstream service.
    #[error("Source unavailable ({source_name}): {message}")]
    SourceUnavailable {
        source_name: String,
        message: String,
    },

    /// Internal error (should not happen).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RooftopError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        RooftopError::InvalidInput(msg.into())
    }

    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        RooftopError::InvalidGeometry(msg.into())
    }

    pub fn unavailable(source_name: impl Into<String>, message: impl ToString) -> Self {
        RooftopError::SourceUnavailable {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RooftopError::SourceUnavailable { .. })
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RooftopError>;
