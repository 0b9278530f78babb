//! Address to coordinate geocoding.

mod mapbox;

pub use mapbox::{GeocodedAddress, MapboxGeocoder};
