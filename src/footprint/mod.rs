//! Footprint resolution: sources, candidate selection and the resolver.
//!
//! Sources are consulted in priority order and the first one returning any
//! building wins. Its candidates are narrowed to the one nearest the query
//! point, whose ring is then closed and returned as a [`Footprint`].
//!
//! [`Footprint`]: crate::models::Footprint

mod overpass;
mod primary;
mod resolver;
pub mod selector;
mod source;

pub use overpass::{OverpassSource, SECONDARY_SOURCE_NAME};
pub use primary::{PrimarySource, PRIMARY_SOURCE_NAME};
pub use resolver::FootprintResolver;
pub use selector::pick;
pub use source::FootprintSource;
