//! Great-circle distance and vertex centroid.

use crate::models::{Coordinate, Ring};

/// Mean Earth radius used for Haversine distances, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometers.
pub fn haversine(a: &Coordinate, b: &Coordinate) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Arithmetic mean of the ring's vertex latitudes and longitudes.
///
/// The closing point of a closed ring is not counted twice, so a ring and
/// its normalized form share a centroid. A plain mean over every stored
/// position would weight the first vertex of a closed ring double and can
/// differ slightly from this value. This is not an area-weighted centroid;
/// for building-sized rings the difference is negligible.
pub fn centroid_of(ring: &Ring) -> Option<Coordinate> {
    let vertices = ring.vertices();
    if vertices.is_empty() {
        return None;
    }

    let n = vertices.len() as f64;
    let (lat_sum, lon_sum) = vertices
        .iter()
        .fold((0.0, 0.0), |(lat, lon), c| (lat + c.latitude, lon + c.longitude));

    Some(Coordinate {
        latitude: lat_sum / n,
        longitude: lon_sum / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_haversine_known_distance() {
        // Berlin to Paris, ~878 km
        let d = haversine(&c(52.5200, 13.4050), &c(48.8566, 2.3522));
        assert!((d - 878.0).abs() < 10.0, "got {}", d);
    }

    #[test]
    fn test_haversine_symmetric_and_zero() {
        let a = c(37.4419, -122.1430);
        let b = c(37.4425, -122.1401);
        assert_eq!(haversine(&a, &b), haversine(&b, &a));
        assert_eq!(haversine(&a, &a), 0.0);
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = haversine(&c(0.0, 0.0), &c(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_centroid_ignores_closing_point() {
        let open = Ring::new(vec![c(0.0, 0.0), c(0.0, 2.0), c(2.0, 2.0), c(2.0, 0.0)]);
        let mut closed_pts = open.points().to_vec();
        closed_pts.push(c(0.0, 0.0));
        let closed = Ring::new(closed_pts);

        let a = centroid_of(&open).unwrap();
        let b = centroid_of(&closed).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c(1.0, 1.0));
    }

    #[test]
    fn test_centroid_of_empty_ring() {
        assert!(centroid_of(&Ring::default()).is_none());
    }
}
