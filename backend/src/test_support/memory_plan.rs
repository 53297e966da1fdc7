//! Project, plan, and invite repositories over [`InMemoryStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::memory_store::{InMemoryStore, MemberRow, ProjectRow, SelectionRow, StoreState};
use crate::domain::ports::{
    InviteRepository, InviteRepositoryError, PlanRepository, PlanRepositoryError,
    ProjectMetaUpdate, ProjectRepository, ProjectRepositoryError,
};
use crate::domain::{
    CandidateRemoval, Invite, InviteToken, MemberStatus, NewProject, PlaceId,
    PoolSnapshot, Prefecture, Project, ProjectId, ProjectListing, ProjectMember, ProjectRole,
    SavedPlace, Selection, SelectionPlacement, UserId, Vote,
};

impl StoreState {
    fn project(&self, id: &ProjectId) -> Option<Project> {
        self.projects.get(id).map(|row| Project {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title.clone(),
            description: row.description.clone(),
            dates: row.dates,
            prefectures: self.prefectures.get(id).cloned().unwrap_or_default(),
            updated_at: row.updated_at,
        })
    }

    fn member(&self, row: &MemberRow) -> Option<ProjectMember> {
        self.summary(&row.user_id).map(|user| ProjectMember {
            project_id: row.project_id,
            user,
            role: row.role,
            status: row.status,
        })
    }

    /// Insert a membership unless one exists; returns whether it was new.
    fn insert_member(
        &mut self,
        project_id: ProjectId,
        user_id: UserId,
        role: ProjectRole,
        status: MemberStatus,
    ) -> bool {
        if self
            .members
            .iter()
            .any(|m| m.project_id == project_id && m.user_id == user_id)
        {
            return false;
        }
        self.members.push(MemberRow {
            project_id,
            user_id,
            role,
            status,
        });
        true
    }

    fn is_candidate(&self, project_id: &ProjectId, place_id: &PlaceId) -> bool {
        self.candidates
            .iter()
            .any(|(p, place, _, _)| p == project_id && place == place_id)
    }

    fn is_selected(&self, project_id: &ProjectId, place_id: &PlaceId) -> bool {
        self.selections
            .iter()
            .any(|row| row.project_id == *project_id && row.place_id == *place_id)
    }

    fn touch(&mut self, project_id: &ProjectId, at: DateTime<Utc>) {
        if let Some(row) = self.projects.get_mut(project_id) {
            row.updated_at = at;
        }
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn create(&self, project: &NewProject) -> Result<Project, ProjectRepositoryError> {
        let mut state = self.lock();
        state.projects.insert(
            project.id,
            ProjectRow {
                id: project.id,
                owner_id: project.owner_id,
                title: project.title.clone(),
                description: project.description.clone(),
                dates: project.dates,
                updated_at: project.created_at,
            },
        );
        state
            .prefectures
            .insert(project.id, project.prefectures.clone());
        state.insert_member(
            project.id,
            project.owner_id,
            ProjectRole::Owner,
            MemberStatus::Active,
        );
        for editor in &project.editors {
            state.insert_member(project.id, *editor, ProjectRole::Editor, MemberStatus::Active);
        }
        state
            .project(&project.id)
            .ok_or_else(|| ProjectRepositoryError::query("project row missing"))
    }

    async fn find(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        Ok(self.lock().project(id))
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProjectListing>, ProjectRepositoryError> {
        let state = self.lock();
        let mut listings: Vec<ProjectListing> = state
            .members
            .iter()
            .filter(|m| m.user_id == *user_id && m.status == MemberStatus::Active)
            .filter_map(|m| {
                state.project(&m.project_id).map(|project| ProjectListing {
                    project,
                    role: m.role,
                })
            })
            .collect();
        listings.sort_by(|a, b| b.project.updated_at.cmp(&a.project.updated_at));
        Ok(listings)
    }

    async fn find_member(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Option<ProjectMember>, ProjectRepositoryError> {
        let state = self.lock();
        Ok(state
            .members
            .iter()
            .find(|m| m.project_id == *project_id && m.user_id == *user_id)
            .and_then(|m| state.member(m)))
    }

    async fn update_meta(
        &self,
        project_id: &ProjectId,
        update: &ProjectMetaUpdate,
    ) -> Result<Option<Project>, ProjectRepositoryError> {
        let mut state = self.lock();
        let Some(row) = state.projects.get_mut(project_id) else {
            return Ok(None);
        };
        if let Some(title) = &update.patch.title {
            row.title = title.clone();
        }
        if let Some(description) = &update.patch.description {
            row.description = description.clone();
        }
        row.dates = update.dates;
        row.updated_at = update.updated_at;
        Ok(state.project(project_id))
    }

    async fn replace_prefectures(
        &self,
        project_id: &ProjectId,
        prefectures: &[Prefecture],
        updated_at: DateTime<Utc>,
    ) -> Result<(), ProjectRepositoryError> {
        let mut state = self.lock();
        state.prefectures.insert(*project_id, prefectures.to_vec());
        state.touch(project_id, updated_at);
        Ok(())
    }

    async fn list_members(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<ProjectMember>, ProjectRepositoryError> {
        let state = self.lock();
        let mut members: Vec<ProjectMember> = state
            .members
            .iter()
            .filter(|m| m.project_id == *project_id)
            .filter_map(|m| state.member(m))
            .collect();
        members.sort_by(|a, b| {
            b.role
                .cmp(&a.role)
                .then_with(|| a.user.email.as_str().cmp(b.user.email.as_str()))
        });
        Ok(members)
    }

    async fn add_members(
        &self,
        project_id: &ProjectId,
        user_ids: &[UserId],
        role: ProjectRole,
        status: MemberStatus,
    ) -> Result<usize, ProjectRepositoryError> {
        let mut state = self.lock();
        Ok(user_ids
            .iter()
            .filter(|user_id| state.insert_member(*project_id, **user_id, role, status))
            .count())
    }
}

#[async_trait]
impl PlanRepository for InMemoryStore {
    async fn pool_snapshot(
        &self,
        project_id: &ProjectId,
    ) -> Result<PoolSnapshot, PlanRepositoryError> {
        let state = self.lock();
        let active: Vec<UserId> = state
            .members
            .iter()
            .filter(|m| m.project_id == *project_id && m.status == MemberStatus::Active)
            .map(|m| m.user_id)
            .collect();
        let saved = state
            .wishlists
            .iter()
            .filter(|row| active.contains(&row.user_id))
            .filter_map(|row| {
                state.places.get(&row.place_id).map(|place| SavedPlace {
                    user_id: row.user_id,
                    place: place.clone(),
                    saved_at: row.saved_at,
                })
            })
            .collect();
        Ok(PoolSnapshot {
            regions: state.prefectures.get(project_id).cloned().unwrap_or_default(),
            saved,
            candidates: state
                .candidates
                .iter()
                .filter(|(p, _, _, _)| p == project_id)
                .map(|(_, place, _, _)| *place)
                .collect(),
            selections: state
                .selections
                .iter()
                .filter(|row| row.project_id == *project_id)
                .map(|row| row.place_id)
                .collect(),
            votes: state
                .votes
                .iter()
                .filter(|(p, _, _)| p == project_id)
                .map(|(_, place_id, user_id)| Vote {
                    place_id: *place_id,
                    user_id: *user_id,
                })
                .collect(),
        })
    }

    async fn add_candidate(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        added_by: &UserId,
        added_at: DateTime<Utc>,
    ) -> Result<bool, PlanRepositoryError> {
        let mut state = self.lock();
        if !state.places.contains_key(place_id) {
            return Err(PlanRepositoryError::unknown_place(place_id.to_string()));
        }
        if state.is_selected(project_id, place_id) {
            return Err(PlanRepositoryError::already_selected(place_id.to_string()));
        }
        if state.is_candidate(project_id, place_id) {
            return Ok(false);
        }
        state
            .candidates
            .push((*project_id, *place_id, *added_by, added_at));
        state.touch(project_id, added_at);
        Ok(true)
    }

    async fn remove_candidate(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        also_unselect: bool,
    ) -> Result<CandidateRemoval, PlanRepositoryError> {
        let mut state = self.lock();
        let candidates_before = state.candidates.len();
        state
            .candidates
            .retain(|(p, place, _, _)| !(p == project_id && place == place_id));
        let selection_removed = if also_unselect {
            let before = state.selections.len();
            state
                .selections
                .retain(|row| !(row.project_id == *project_id && row.place_id == *place_id));
            state.selections.len() != before
        } else {
            false
        };
        Ok(CandidateRemoval {
            candidate_removed: state.candidates.len() != candidates_before,
            selection_removed,
        })
    }

    async fn add_vote(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        user_id: &UserId,
    ) -> Result<(), PlanRepositoryError> {
        let mut state = self.lock();
        if !state.places.contains_key(place_id) {
            return Err(PlanRepositoryError::unknown_place(place_id.to_string()));
        }
        state.votes.insert((*project_id, *place_id, *user_id));
        Ok(())
    }

    async fn remove_vote(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        user_id: &UserId,
    ) -> Result<(), PlanRepositoryError> {
        self.lock()
            .votes
            .remove(&(*project_id, *place_id, *user_id));
        Ok(())
    }

    async fn tally(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
        user_id: &UserId,
    ) -> Result<(u32, bool), PlanRepositoryError> {
        let state = self.lock();
        let count = state
            .votes
            .iter()
            .filter(|(p, place, _)| p == project_id && place == place_id)
            .count();
        let mine = state.votes.contains(&(*project_id, *place_id, *user_id));
        Ok((u32::try_from(count).unwrap_or(u32::MAX), mine))
    }

    async fn confirm(
        &self,
        project_id: &ProjectId,
        placements: &[SelectionPlacement],
        at: DateTime<Utc>,
    ) -> Result<(), PlanRepositoryError> {
        let mut state = self.lock();
        let missing: Vec<String> = placements
            .iter()
            .filter(|p| {
                !state.is_candidate(project_id, &p.place_id)
                    && !state.is_selected(project_id, &p.place_id)
            })
            .map(|p| p.place_id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PlanRepositoryError::not_candidates(missing));
        }
        for placement in placements {
            state
                .candidates
                .retain(|(p, place, _, _)| !(p == project_id && *place == placement.place_id));
            let row = SelectionRow {
                project_id: *project_id,
                place_id: placement.place_id,
                day_index: placement.day_index,
                order_in_day: placement.order_in_day,
                note: placement.note.clone(),
            };
            match state
                .selections
                .iter_mut()
                .find(|r| r.project_id == *project_id && r.place_id == placement.place_id)
            {
                Some(existing) => *existing = row,
                None => state.selections.push(row),
            }
        }
        if !placements.is_empty() {
            state.touch(project_id, at);
        }
        Ok(())
    }

    async fn unconfirm(
        &self,
        project_id: &ProjectId,
        place_id: &PlaceId,
    ) -> Result<bool, PlanRepositoryError> {
        let mut state = self.lock();
        let before = state.selections.len();
        state
            .selections
            .retain(|row| !(row.project_id == *project_id && row.place_id == *place_id));
        Ok(state.selections.len() != before)
    }

    async fn selections(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Selection>, PlanRepositoryError> {
        let state = self.lock();
        Ok(state
            .selections
            .iter()
            .filter(|row| row.project_id == *project_id)
            .filter_map(|row| {
                state.places.get(&row.place_id).map(|place| Selection {
                    place: place.clone(),
                    day_index: row.day_index,
                    order_in_day: row.order_in_day,
                    note: row.note.clone(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl InviteRepository for InMemoryStore {
    async fn create_if_absent(&self, invite: &Invite) -> Result<bool, InviteRepositoryError> {
        let mut state = self.lock();
        if state
            .invites
            .iter()
            .any(|i| i.project_id == invite.project_id && i.email == invite.email)
        {
            return Ok(false);
        }
        state.invites.push(invite.clone());
        Ok(true)
    }

    async fn find_by_token(
        &self,
        token: &InviteToken,
    ) -> Result<Option<Invite>, InviteRepositoryError> {
        Ok(self
            .lock()
            .invites
            .iter()
            .find(|i| i.token == *token)
            .cloned())
    }

    async fn claim(
        &self,
        token: &InviteToken,
        user_id: &UserId,
    ) -> Result<Option<Invite>, InviteRepositoryError> {
        let mut state = self.lock();
        let Some(invite) = state.invites.iter_mut().find(|i| i.token == *token) else {
            return Ok(None);
        };
        if invite.claimed_by.is_none() {
            invite.claimed_by = Some(*user_id);
        }
        let invite = invite.clone();
        state.insert_member(
            invite.project_id,
            *user_id,
            ProjectRole::from(invite.role),
            MemberStatus::Active,
        );
        Ok(Some(invite))
    }
}
