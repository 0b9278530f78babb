//! Ordered source chain resolving a point to one building footprint.

use std::time::Duration;
use tracing::{debug, info, warn};

use super::{FootprintSource, OverpassSource, PrimarySource};
use crate::config::SourcesConfig;
use crate::error::{Result, RooftopError};
use crate::footprint::selector::pick;
use crate::geometry::normalize;
use crate::models::{Coordinate, Footprint, Polygon};

/// Resolves points to building footprints using sources in priority order.
pub struct FootprintResolver {
    sources: Vec<Box<dyn FootprintSource>>,
    buffer_degrees: f64,
    source_timeout: Duration,
}

impl FootprintResolver {
    pub fn new(
        sources: Vec<Box<dyn FootprintSource>>,
        buffer_degrees: f64,
        source_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            buffer_degrees,
            source_timeout,
        }
    }

    /// Primary dataset first, then OpenStreetMap.
    pub fn from_config(config: &SourcesConfig) -> Result<Self> {
        let sources: Vec<Box<dyn FootprintSource>> = vec![
            Box::new(PrimarySource::new()),
            Box::new(OverpassSource::new(config)?),
        ];
        // Outer bound covers the source's own retries
        let timeout = config.timeout() * config.max_attempts.max(1)
            + config.retry_delay() * config.max_attempts.saturating_sub(1);
        Ok(Self::new(sources, config.buffer_degrees, timeout))
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Nearest building to `point` from the first source that has any.
    ///
    /// Later sources are not consulted once a source returns candidates,
    /// even if the picked candidate then fails normalization.
    pub async fn resolve(&self, point: Coordinate) -> Result<Footprint> {
        point.validate()?;

        let mut consulted = Vec::with_capacity(self.sources.len());
        let mut failures = Vec::new();
        let mut winner = None;

        for source in &self.sources {
            let name = source.name().to_string();
            consulted.push(name.clone());

            let outcome = tokio::time::timeout(
                self.source_timeout,
                source.query(point, self.buffer_degrees),
            )
            .await
            .unwrap_or_else(|_| {
                Err(RooftopError::unavailable(
                    name.as_str(),
                    format!("timed out after {:?}", self.source_timeout),
                ))
            });

            match outcome {
                Ok(candidates) if !candidates.is_empty() => {
                    info!(
                        "{} returned {} candidates for ({}, {})",
                        name,
                        candidates.len(),
                        point.latitude,
                        point.longitude
                    );
                    winner = Some((name, candidates));
                    break;
                }
                Ok(_) => {
                    debug!("No footprint from {}, trying next source", name);
                }
                Err(e) => {
                    warn!("{} failed: {}", name, e);
                    failures.push(e);
                }
            }
        }

        let Some((source_name, candidates)) = winner else {
            if !failures.is_empty() && failures.len() == consulted.len() {
                let message = failures
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(RooftopError::SourceUnavailable {
                    source_name: consulted.join(", "),
                    message,
                });
            }
            return Err(RooftopError::NotFound {
                latitude: point.latitude,
                longitude: point.longitude,
                sources_checked: consulted,
            });
        };

        let (candidate, distance_km) = pick(&point, candidates).map_err(|e| match e {
            RooftopError::NotFound { .. } => RooftopError::NotFound {
                latitude: point.latitude,
                longitude: point.longitude,
                sources_checked: consulted.clone(),
            },
            other => other,
        })?;

        let ring = normalize(&candidate.ring)?;

        let footprint = Footprint {
            polygon: Polygon::new(ring),
            source: candidate.source_tag,
            distance_to_query: distance_km * 1000.0,
            metadata: candidate.source_metadata,
        };

        info!(
            "Resolved footprint from {} at {} m from ({}, {})",
            source_name,
            footprint.distance_meters(),
            point.latitude,
            point.longitude
        );

        Ok(footprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::AreaCalculator;
    use crate::models::{Candidate, Ring};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Behaviour {
        Empty,
        Fail,
        Hang,
        Return(Vec<Candidate>),
    }

    struct FakeSource {
        name: String,
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn boxed(name: &str, behaviour: Behaviour) -> (Box<dyn FootprintSource>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = FakeSource {
                name: name.to_string(),
                behaviour,
                calls: Arc::clone(&calls),
            };
            (Box::new(source), calls)
        }
    }

    #[async_trait]
    impl FootprintSource for FakeSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn query(&self, _point: Coordinate, _buffer: f64) -> Result<Vec<Candidate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behaviour {
                Behaviour::Empty => Ok(vec![]),
                Behaviour::Fail => Err(RooftopError::unavailable(self.name.as_str(), "boom")),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(vec![])
                }
                Behaviour::Return(c) => Ok(c.clone()),
            }
        }
    }

    fn query_point() -> Coordinate {
        Coordinate::new(37.4419, -122.1430).unwrap()
    }

    /// Square ring of `side` degrees centred on (lat, lon), optionally left open.
    fn square(lat: f64, lon: f64, side: f64, closed: bool) -> Ring {
        let h = side / 2.0;
        let mut pts = vec![
            Coordinate::new(lat - h, lon - h).unwrap(),
            Coordinate::new(lat - h, lon + h).unwrap(),
            Coordinate::new(lat + h, lon + h).unwrap(),
            Coordinate::new(lat + h, lon - h).unwrap(),
        ];
        if closed {
            pts.push(pts[0]);
        }
        Ring::new(pts)
    }

    fn osm(ring: Ring, id: i64) -> Candidate {
        Candidate::new(ring, "OpenStreetMap").with_metadata("osm_id", id)
    }

    fn resolver(sources: Vec<Box<dyn FootprintSource>>) -> FootprintResolver {
        FootprintResolver::new(sources, 0.0005, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_found() {
        let (primary, _) = FakeSource::boxed("Primary", Behaviour::Empty);
        let (secondary, _) = FakeSource::boxed("Secondary", Behaviour::Empty);
        let err = resolver(vec![primary, secondary])
            .resolve(query_point())
            .await
            .unwrap_err();
        match err {
            RooftopError::NotFound {
                latitude,
                longitude,
                sources_checked,
            } => {
                assert_eq!(latitude, 37.4419);
                assert_eq!(longitude, -122.1430);
                assert_eq!(sources_checked, vec!["Primary", "Secondary"]);
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_coordinate_rejected_before_query() {
        let (primary, calls) = FakeSource::boxed("Primary", Behaviour::Empty);
        let r = resolver(vec![primary]);
        for (lat, lon) in [(91.0, 0.0), (-90.5, 0.0), (0.0, 180.1), (0.0, -200.0)] {
            let point = Coordinate {
                latitude: lat,
                longitude: lon,
            };
            assert!(matches!(
                r.resolve(point).await,
                Err(RooftopError::InvalidInput(_))
            ));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_secondary_square_resolves_and_measures() {
        let q = query_point();
        let (primary, _) = FakeSource::boxed("Primary", Behaviour::Empty);
        let (secondary, _) = FakeSource::boxed(
            "Secondary",
            Behaviour::Return(vec![osm(square(37.44192, -122.14298, 0.0001, true), 42)]),
        );

        let footprint = resolver(vec![primary, secondary]).resolve(q).await.unwrap();
        assert_eq!(footprint.source, "OpenStreetMap");
        assert_eq!(footprint.metadata["osm_id"], 42);
        assert!(footprint.distance_to_query < 5.0);

        let result = AreaCalculator::new().compute(&footprint.polygon).unwrap();

        // Local planar approximation of a 0.0001° square at this latitude
        let meters_per_degree = 111_320.0;
        let side_lat = 0.0001 * meters_per_degree;
        let side_lon = 0.0001 * meters_per_degree * 37.44192_f64.to_radians().cos();
        let planar = side_lat * side_lon;
        let ratio = result.area_square_meters / planar;
        assert!((ratio - 1.0).abs() < 0.01, "area {} vs planar {}", result.area_square_meters, planar);
    }

    #[tokio::test]
    async fn test_unclosed_ring_is_closed_and_measurable() {
        let (secondary, _) = FakeSource::boxed(
            "Secondary",
            Behaviour::Return(vec![osm(square(37.4419, -122.1430, 0.0002, false), 7)]),
        );
        let footprint = resolver(vec![secondary]).resolve(query_point()).await.unwrap();
        assert!(footprint.polygon.exterior.is_closed());
        assert_eq!(footprint.polygon.exterior.len(), 5);
        assert!(AreaCalculator::new().compute(&footprint.polygon).is_ok());
    }

    #[tokio::test]
    async fn test_short_circuits_on_first_non_empty_source() {
        let (primary, primary_calls) = FakeSource::boxed(
            "Primary",
            Behaviour::Return(vec![osm(square(37.4419, -122.1430, 0.0001, true), 1)]),
        );
        let (secondary, secondary_calls) = FakeSource::boxed("Secondary", Behaviour::Empty);
        resolver(vec![primary, secondary])
            .resolve(query_point())
            .await
            .unwrap();
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_picks_nearest_candidate() {
        let (secondary, _) = FakeSource::boxed(
            "Secondary",
            Behaviour::Return(vec![
                osm(square(37.4423, -122.1430, 0.0001, true), 1),
                osm(square(37.44195, -122.1430, 0.0001, true), 2),
            ]),
        );
        let footprint = resolver(vec![secondary]).resolve(query_point()).await.unwrap();
        assert_eq!(footprint.metadata["osm_id"], 2);
    }

    #[tokio::test]
    async fn test_invalid_geometry_does_not_fall_through() {
        let degenerate = Ring::new(vec![
            Coordinate::new(37.4419, -122.1430).unwrap(),
            Coordinate::new(37.4420, -122.1430).unwrap(),
        ]);
        let (primary, _) = FakeSource::boxed("Primary", Behaviour::Return(vec![osm(degenerate, 1)]));
        let (secondary, secondary_calls) = FakeSource::boxed(
            "Secondary",
            Behaviour::Return(vec![osm(square(37.4419, -122.1430, 0.0001, true), 2)]),
        );
        let err = resolver(vec![primary, secondary])
            .resolve(query_point())
            .await
            .unwrap_err();
        assert!(matches!(err, RooftopError::InvalidGeometry(_)));
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unavailable_source_falls_through() {
        let (primary, _) = FakeSource::boxed("Primary", Behaviour::Fail);
        let (secondary, _) = FakeSource::boxed(
            "Secondary",
            Behaviour::Return(vec![osm(square(37.4419, -122.1430, 0.0001, true), 3)]),
        );
        let footprint = resolver(vec![primary, secondary])
            .resolve(query_point())
            .await
            .unwrap();
        assert_eq!(footprint.metadata["osm_id"], 3);
    }

    #[tokio::test]
    async fn test_all_unavailable_is_source_unavailable() {
        let (primary, _) = FakeSource::boxed("Primary", Behaviour::Fail);
        let (secondary, _) = FakeSource::boxed("Secondary", Behaviour::Fail);
        let err = resolver(vec![primary, secondary])
            .resolve(query_point())
            .await
            .unwrap_err();
        match err {
            RooftopError::SourceUnavailable { source_name, .. } => {
                assert_eq!(source_name, "Primary, Secondary");
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_one_failure_one_empty_is_not_found() {
        let (primary, _) = FakeSource::boxed("Primary", Behaviour::Empty);
        let (secondary, _) = FakeSource::boxed("Secondary", Behaviour::Fail);
        let err = resolver(vec![primary, secondary])
            .resolve(query_point())
            .await
            .unwrap_err();
        assert!(matches!(err, RooftopError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_source_unavailable() {
        let (slow, _) = FakeSource::boxed("Slow", Behaviour::Hang);
        let err = resolver(vec![slow]).resolve(query_point()).await.unwrap_err();
        assert!(matches!(err, RooftopError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_default_chain_order() {
        let r = FootprintResolver::from_config(&SourcesConfig::default()).unwrap();
        assert_eq!(
            r.source_names(),
            vec!["Microsoft Building Footprints", "OpenStreetMap"]
        );
    }
}
