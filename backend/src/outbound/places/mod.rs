//! Places API outbound adapters.
//!
//! A thin HTTP implementation of the `PlacesSource` port against the Places
//! text search endpoint.

mod dto;
mod http_source;

pub use http_source::{PlacesHttpConfig, PlacesHttpSource};
