//! Core data models for footprint resolution.

pub mod coordinate;
pub mod footprint;
pub mod polygon;

pub use coordinate::{BoundingBox, Coordinate};
pub use footprint::{AreaResult, Candidate, Footprint, OsmType};
pub use polygon::{Polygon, Ring};
