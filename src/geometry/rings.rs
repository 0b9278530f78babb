//! Joining open way segments into closed rings.

use crate::models::{Coordinate, Ring};

/// Merge disconnected segments (e.g. the outer members of a multipolygon
/// relation) into closed rings. Segments that cannot be closed into a ring
/// of at least 4 positions are dropped.
pub fn merge_segments(segments: Vec<Vec<Coordinate>>) -> Vec<Ring> {
    let mut result = Vec::new();
    let mut remaining: Vec<Vec<Coordinate>> = segments.into_iter().filter(|s| !s.is_empty()).collect();

    while !remaining.is_empty() {
        let mut current = remaining.remove(0);

        if current.first() == current.last() && current.len() >= 4 {
            result.push(Ring::new(current));
            continue;
        }

        let mut merged = true;
        while merged && !remaining.is_empty() {
            merged = false;

            let current_start = current.first().copied();
            let current_end = current.last().copied();

            for i in 0..remaining.len() {
                let seg_start = remaining[i].first().copied();
                let seg_end = remaining[i].last().copied();

                if current_end == seg_start {
                    let mut seg = remaining.remove(i);
                    seg.remove(0); // shared point
                    current.extend(seg);
                } else if current_end == seg_end {
                    let mut seg = remaining.remove(i);
                    seg.reverse();
                    seg.remove(0);
                    current.extend(seg);
                } else if current_start == seg_end {
                    let mut seg = remaining.remove(i);
                    seg.pop();
                    seg.extend(current);
                    current = seg;
                } else if current_start == seg_start {
                    let mut seg = remaining.remove(i);
                    seg.reverse();
                    seg.pop();
                    seg.extend(current);
                    current = seg;
                } else {
                    continue;
                }
                merged = true;
                break;
            }
        }

        // Only rings that actually closed up are kept
        if current.len() >= 4 && current.first() == current.last() {
            result.push(Ring::new(current));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lon: f64, lat: f64) -> Coordinate {
        Coordinate::from_lon_lat(lon, lat).unwrap()
    }

    #[test]
    fn test_merge_simple_ring() {
        let ring = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(0.0, 0.0)];
        let rings = merge_segments(vec![ring]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
    }

    #[test]
    fn test_merge_split_ring() {
        let s1 = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)];
        let s2 = vec![p(1.0, 1.0), p(0.0, 1.0), p(0.0, 0.0)];

        let rings = merge_segments(vec![s1, s2]);
        assert_eq!(rings.len(), 1);
        assert!(rings[0].is_closed());
        assert_eq!(rings[0].len(), 5);
    }

    #[test]
    fn test_merge_reversed_segment() {
        let s1 = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)];
        // Runs the wrong way round
        let s2 = vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0)];

        let rings = merge_segments(vec![s1, s2]);
        assert_eq!(rings.len(), 1);
        assert!(rings[0].is_closed());
    }

    #[test]
    fn test_merge_gap_fails() {
        let s1 = vec![p(0.0, 0.0), p(1.0, 0.0)];
        let s2 = vec![p(1.0, 1.0), p(0.0, 1.0)];

        let rings = merge_segments(vec![s1, s2]);
        assert!(rings.is_empty());
    }
}
