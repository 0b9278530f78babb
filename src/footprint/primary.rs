//! Tile-indexed global building footprint dataset.

use async_trait::async_trait;
use tracing::debug;

use super::FootprintSource;
use crate::error::Result;
use crate::models::{Candidate, Coordinate};

pub const PRIMARY_SOURCE_NAME: &str = "Microsoft Building Footprints";

/// Placeholder slot for the global footprint dataset.
///
/// No backing dataset is wired in yet: every lookup returns no candidates
/// and never fails, so resolution always falls through to the next source.
#[derive(Debug, Clone, Default)]
pub struct PrimarySource;

impl PrimarySource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FootprintSource for PrimarySource {
    fn name(&self) -> &str {
        PRIMARY_SOURCE_NAME
    }

    async fn query(&self, point: Coordinate, buffer_degrees: f64) -> Result<Vec<Candidate>> {
        debug!(
            "Querying {} for ({}, {}) within {}°",
            PRIMARY_SOURCE_NAME, point.latitude, point.longitude, buffer_degrees
        );
        Ok(Vec::new())
    }
}
