//! Rooftop - building footprint lookup and geodesic roof area.
//!
//! This library resolves a point to the nearest building polygon from an
//! ordered chain of footprint sources and measures its surface area. It is
//! shared by the `server` and `measure` binaries.

pub mod api;
pub mod config;
pub mod error;
pub mod footprint;
pub mod geocode;
pub mod geojson;
pub mod geometry;
pub mod models;

pub use error::{Result, RooftopError};
pub use footprint::{FootprintResolver, FootprintSource};
pub use geometry::AreaCalculator;
pub use models::{AreaResult, BoundingBox, Candidate, Coordinate, Footprint, Polygon, Ring};
