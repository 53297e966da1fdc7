//! Driven port for the external Places text search API.
use async_trait::async_trait;

use crate::domain::{PlaceSuggestion, SearchQuery};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling the Places API.
    pub enum PlacesSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } => "places transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } => "places request timed out: {message}",
        /// The API answered with a non-success status.
        Status { status: u16, message: String } =>
            "places API returned status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "places response decode failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlacesSource: Send + Sync {
    /// Run a text search and return the hits in provider order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PlaceSuggestion>, PlacesSourceError>;
}
