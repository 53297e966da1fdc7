//! Candidate pool, voting, and selection board service.
//!
//! Every operation resolves the caller's membership first; any active
//! member, including viewers, may move places through the lifecycle and
//! vote.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use crate::domain::candidates::compute_candidate_pool;
use crate::domain::ports::{
    CandidateCommand, CandidateQuery, PlanRepository, PlanRepositoryError, ProjectRepository,
    SelectionCommand, SelectionQuery,
};
use crate::domain::project_access::ProjectAccess;
use crate::domain::{
    CandidatePoolRow, CandidateRemoval, Error, PlaceId, ProjectId, ProjectRole, SelectionBoard,
    SelectionPlacement, UserId, VoteOp, VoteTally,
};

/// Implements the candidate and selection driving ports.
pub struct PlanService<R, L> {
    access: ProjectAccess<R>,
    plans: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<R, L> PlanService<R, L> {
    pub fn new(projects: Arc<R>, plans: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            access: ProjectAccess::new(projects),
            plans,
            clock,
        }
    }
}

fn map_plan_error(error: PlanRepositoryError) -> Error {
    match error {
        PlanRepositoryError::Connection { message } => {
            Error::internal(format!("plan repository unavailable: {message}"))
        }
        PlanRepositoryError::Query { message } => {
            Error::internal(format!("plan repository error: {message}"))
        }
        PlanRepositoryError::UnknownPlace { place_id } => {
            Error::not_found("place not found").with_details(json!({
                "field": "placeId",
                "value": place_id,
                "code": "unknown_place",
            }))
        }
        PlanRepositoryError::AlreadySelected { place_id } => {
            Error::conflict("place is already selected").with_details(json!({
                "placeId": place_id,
                "code": "already_selected",
            }))
        }
        PlanRepositoryError::NotCandidates { place_ids } => {
            Error::conflict("places must be candidates before they can be selected")
                .with_details(json!({
                    "placeIds": place_ids,
                    "code": "not_candidates",
                }))
        }
    }
}

impl<R, L> PlanService<R, L>
where
    R: ProjectRepository,
    L: PlanRepository,
{
    async fn member(&self, actor: &UserId, project_id: &ProjectId) -> Result<(), Error> {
        self.access
            .require(actor, project_id, ProjectRole::Viewer)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl<R, L> CandidateQuery for PlanService<R, L>
where
    R: ProjectRepository,
    L: PlanRepository,
{
    async fn pool(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
    ) -> Result<Vec<CandidatePoolRow>, Error> {
        self.member(actor, project_id).await?;
        let snapshot = self
            .plans
            .pool_snapshot(project_id)
            .await
            .map_err(map_plan_error)?;
        Ok(compute_candidate_pool(&snapshot, *actor))
    }
}

#[async_trait]
impl<R, L> CandidateCommand for PlanService<R, L>
where
    R: ProjectRepository,
    L: PlanRepository,
{
    async fn add(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        place_id: &PlaceId,
    ) -> Result<(), Error> {
        self.member(actor, project_id).await?;
        let added = self
            .plans
            .add_candidate(project_id, place_id, actor, self.clock.utc())
            .await
            .map_err(map_plan_error)?;
        if added {
            tracing::info!(project_id = %project_id, place_id = %place_id, "candidate added");
        }
        Ok(())
    }

    async fn remove(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        place_id: &PlaceId,
        also_unselect: bool,
    ) -> Result<CandidateRemoval, Error> {
        self.member(actor, project_id).await?;
        self.plans
            .remove_candidate(project_id, place_id, also_unselect)
            .await
            .map_err(map_plan_error)
    }

    async fn vote(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        place_id: &PlaceId,
        op: VoteOp,
    ) -> Result<VoteTally, Error> {
        self.member(actor, project_id).await?;
        match op {
            VoteOp::Add => self.plans.add_vote(project_id, place_id, actor).await,
            VoteOp::Remove => self.plans.remove_vote(project_id, place_id, actor).await,
        }
        .map_err(map_plan_error)?;
        let (vote_count, voted_by_me) = self
            .plans
            .tally(project_id, place_id, actor)
            .await
            .map_err(map_plan_error)?;
        Ok(VoteTally {
            place_id: *place_id,
            vote_count,
            voted_by_me,
        })
    }

    async fn confirm(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        placement: SelectionPlacement,
    ) -> Result<(), Error> {
        self.member(actor, project_id).await?;
        self.plans
            .confirm(project_id, std::slice::from_ref(&placement), self.clock.utc())
            .await
            .map_err(map_plan_error)
    }
}

#[async_trait]
impl<R, L> SelectionQuery for PlanService<R, L>
where
    R: ProjectRepository,
    L: PlanRepository,
{
    async fn board(&self, actor: &UserId, project_id: &ProjectId) -> Result<SelectionBoard, Error> {
        self.member(actor, project_id).await?;
        let selections = self
            .plans
            .selections(project_id)
            .await
            .map_err(map_plan_error)?;
        Ok(SelectionBoard::from_selections(selections))
    }
}

#[async_trait]
impl<R, L> SelectionCommand for PlanService<R, L>
where
    R: ProjectRepository,
    L: PlanRepository,
{
    async fn save_batch(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        placements: Vec<SelectionPlacement>,
    ) -> Result<(), Error> {
        self.member(actor, project_id).await?;
        let mut seen: HashSet<PlaceId> = HashSet::with_capacity(placements.len());
        for (index, placement) in placements.iter().enumerate() {
            if !seen.insert(placement.place_id) {
                return Err(
                    Error::invalid_request("each place may appear only once per batch")
                        .with_details(json!({
                            "field": "items",
                            "index": index,
                            "code": "duplicate_place",
                            "value": placement.place_id.to_string(),
                        })),
                );
            }
        }
        if placements.is_empty() {
            return Ok(());
        }
        self.plans
            .confirm(project_id, &placements, self.clock.utc())
            .await
            .map_err(map_plan_error)?;
        tracing::info!(project_id = %project_id, items = placements.len(), "selections saved");
        Ok(())
    }

    async fn unconfirm(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        place_id: &PlaceId,
    ) -> Result<bool, Error> {
        self.member(actor, project_id).await?;
        self.plans
            .unconfirm(project_id, place_id)
            .await
            .map_err(map_plan_error)
    }
}

#[cfg(test)]
#[path = "plan_service_tests.rs"]
mod tests;
