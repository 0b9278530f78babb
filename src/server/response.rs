//! Mapping of pipeline errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use rooftop::RooftopError;

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub struct ApiError(pub RooftopError);

impl From<RooftopError> for ApiError {
    fn from(e: RooftopError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            RooftopError::InvalidInput(_) | RooftopError::InvalidGeometry(_) => {
                StatusCode::BAD_REQUEST
            }
            RooftopError::NotFound { .. } | RooftopError::AddressNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            RooftopError::SourceUnavailable { .. } => StatusCode::BAD_GATEWAY,
            RooftopError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match &self.0 {
            RooftopError::InvalidInput(_) => "Invalid input",
            RooftopError::NotFound { .. } => "No building footprint found",
            RooftopError::AddressNotFound(_) => "Address not found",
            RooftopError::InvalidGeometry(_) => "Invalid polygon geometry",
            RooftopError::SourceUnavailable { .. } => "Upstream source unavailable",
            RooftopError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut body = json!({
            "error": self.title(),
            "message": self.0.to_string(),
        });

        match &self.0 {
            RooftopError::NotFound {
                latitude,
                longitude,
                sources_checked,
            } => {
                body["coordinates"] = json!({ "latitude": latitude, "longitude": longitude });
                body["sources_checked"] = json!(sources_checked);
            }
            RooftopError::AddressNotFound(address) => {
                body["address"] = json!(address);
            }
            RooftopError::SourceUnavailable { source_name, .. } => {
                body["source"] = json!(source_name);
            }
            _ => {}
        }

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        (status, Json(body)).into_response()
    }
}
