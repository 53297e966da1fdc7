//! Port for the candidate and selection workflow of a project.
//!
//! A (project, place) pair is a candidate, a selection, or neither. Methods
//! that move a pair between states run as one transaction in the adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CandidateRemoval, PlaceId, PoolSnapshot, ProjectId, Selection,
    SelectionPlacement, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by plan repository adapters.
    pub enum PlanRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "plan repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "plan repository query failed: {message}",
        /// The referenced place does not exist.
        UnknownPlace { place_id: String } => "place {place_id} does not exist",
        /// The place is already confirmed and cannot become a candidate.
        AlreadySelected { place_id: String } => "place {place_id} is already selected",
        /// Places in a confirm request are neither candidates nor selected.
        NotCandidates { place_ids: Vec<String> } =>
            "places are not candidates: {place_ids:?}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Read everything the candidate pool is derived from: target regions,
    /// wishlist entries of active members, candidate and selection ids, and
    /// votes.
    async fn pool_snapshot(&self, project_id: &ProjectId)
    -> Result<PoolSnapshot, PlanRepositoryError>;

    /// Insert a candidate row unless one exists. Fails with
    /// [`PlanRepositoryError::AlreadySelected`] when the place is selected.
    /// Returns whether a row was written.
    async fn add_candidate(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        added_by: &UserId,
        added_at: DateTime<Utc>,
    ) -> Result<bool, PlanRepositoryError>;

    /// Delete the candidate row and, when `also_unselect` is set, the
    /// selection row, in one transaction.
    async fn remove_candidate(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        also_unselect: bool,
    ) -> Result<CandidateRemoval, PlanRepositoryError>;

    /// Record a vote unless it exists.
    async fn add_vote(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        user_id: &UserId,
    ) -> Result<(), PlanRepositoryError>;

    /// Remove a vote if present.
    async fn remove_vote(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        user_id: &UserId,
    ) -> Result<(), PlanRepositoryError>;

    /// Count votes for a place and report whether `user_id` voted.
    async fn tally(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        user_id: &UserId,
    ) -> Result<(u32, bool), PlanRepositoryError>;

    /// In one transaction: check that every placement targets a candidate or
    /// an existing selection, delete the candidate rows, and upsert the
    /// selection rows, stamping the project as updated at `at`. Nothing is
    /// written when any check fails.
    async fn confirm(
        &self,
        project_id: &ProjectId,
        placements: &[SelectionPlacement],
        at: DateTime<Utc>,
    ) -> Result<(), PlanRepositoryError>;

    /// Delete a selection row, reporting whether one existed.
    async fn unconfirm(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
    ) -> Result<bool, PlanRepositoryError>;

    /// Selections joined with their places.
    async fn selections(&self, project_id: &ProjectId)
    -> Result<Vec<Selection>, PlanRepositoryError>;
}
