//! Driving port for candidate transitions and votes.

use async_trait::async_trait;

use crate::domain::{
    CandidateRemoval, Error, PlaceId, ProjectId, SelectionPlacement, UserId, VoteOp, VoteTally,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateCommand: Send + Sync {
    /// `none -> candidate`. Idempotent; a selected place is a conflict.
    async fn add(&self, actor: &UserId, project_id: &ProjectId, place_id: &PlaceId)
    -> Result<(), Error>;

    /// `candidate -> none`, optionally also removing a selection.
    async fn remove(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        place_id: &PlaceId,
        also_unselect: bool,
    ) -> Result<CandidateRemoval, Error>;

    /// Add or remove the actor's vote and return the fresh tally.
    async fn vote(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        place_id: &PlaceId,
        op: VoteOp,
    ) -> Result<VoteTally, Error>;

    /// `candidate -> selected` at the given placement.
    async fn confirm(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        placement: SelectionPlacement,
    ) -> Result<(), Error>;
}
