//! Geometry primitives: validation, distances, ring merging and area.

pub mod area;
pub mod distance;
pub mod rings;
pub mod validate;

pub use area::AreaCalculator;
pub use distance::{centroid_of, haversine, EARTH_RADIUS_KM};
pub use rings::merge_segments;
pub use validate::{is_valid_polygon, normalize};
