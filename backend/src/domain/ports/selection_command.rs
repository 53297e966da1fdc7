//! Driving port for editing the selection board.

use async_trait::async_trait;

use crate::domain::{Error, PlaceId, ProjectId, SelectionPlacement, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SelectionCommand: Send + Sync {
    /// Apply a batch of placements atomically. Candidates among them are
    /// promoted; a place that is neither candidate nor selected rejects the
    /// whole batch with a conflict naming the offending ids.
    async fn save_batch(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        placements: Vec<SelectionPlacement>,
    ) -> Result<(), Error>;

    /// `selected -> none`. Candidate status is not restored.
    async fn unconfirm(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        place_id: &PlaceId,
    ) -> Result<bool, Error>;
}
