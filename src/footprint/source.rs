//! Building footprint source trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Candidate, Coordinate};

/// An upstream provider of building geometries near a point.
///
/// Implementations fail only with `SourceUnavailable` (network, status,
/// parse or timeout). An empty list means the provider has no buildings
/// within the buffer.
#[async_trait]
pub trait FootprintSource: Send + Sync {
    /// Human readable provider name, reported in errors and responses.
    fn name(&self) -> &str;

    /// Buildings within `buffer_degrees` of `point`.
    async fn query(&self, point: Coordinate, buffer_degrees: f64) -> Result<Vec<Candidate>>;
}
