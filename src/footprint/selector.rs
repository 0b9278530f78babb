//! Nearest-candidate selection.

use crate::error::{Result, RooftopError};
use crate::geometry::{centroid_of, haversine};
use crate::models::{Candidate, Coordinate};

/// Candidate whose vertex centroid is nearest to `query`, together with
/// that distance in kilometers. Ties keep the first candidate seen.
///
/// Candidates with empty rings are skipped; an input with no usable
/// candidate fails with `NotFound`.
pub fn pick(query: &Coordinate, candidates: Vec<Candidate>) -> Result<(Candidate, f64)> {
    let mut best: Option<(Candidate, f64)> = None;

    for candidate in candidates {
        let Some(centroid) = centroid_of(&candidate.ring) else {
            continue;
        };
        let distance = haversine(query, &centroid);

        // Strictly closer only, so ties keep the earlier candidate
        let closer = best.as_ref().map_or(true, |(_, d)| distance < *d);
        if closer {
            best = Some((candidate, distance));
        }
    }

    best.ok_or_else(|| RooftopError::NotFound {
        latitude: query.latitude,
        longitude: query.longitude,
        sources_checked: Vec::new(),
    })
}
