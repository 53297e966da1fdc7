//! Port for the shared place catalogue.
use async_trait::async_trait;

use crate::domain::{Place, PlaceDraft, PlaceId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by place repository adapters.
    pub enum PlaceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "place repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "place repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Insert a place keyed by its external id, or refresh the descriptive
    /// fields of the existing row. Returns the stored place.
    async fn upsert(&self, draft: &PlaceDraft) -> Result<Place, PlaceRepositoryError>;

    /// Fetch a place by identifier.
    async fn find_by_id(&self, id: &PlaceId) -> Result<Option<Place>, PlaceRepositoryError>;
}
