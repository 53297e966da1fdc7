//! Project domain service: creation, metadata, regions, and membership.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use crate::domain::ports::{
    FriendshipRepository, FriendshipRepositoryError, InviteCommand, ProjectCommand,
    ProjectCreated, ProjectMetaUpdate, ProjectQuery, ProjectRepository,
};
use crate::domain::project_access::{ProjectAccess, map_project_error};
use crate::domain::{
    CreateProjectRequest, Email, Error, InviteRole, InviteSummary, Invitee, MemberStatus,
    NewProject, Prefecture, Project, ProjectId, ProjectListing, ProjectMember, ProjectMetaPatch,
    ProjectRole, SendInvitesRequest, UserId,
};

/// Implements the project driving ports.
pub struct ProjectService<R, F, I: ?Sized> {
    projects: Arc<R>,
    friendships: Arc<F>,
    invites: Arc<I>,
    access: ProjectAccess<R>,
    clock: Arc<dyn Clock>,
}

impl<R, F, I: ?Sized> ProjectService<R, F, I> {
    pub fn new(
        projects: Arc<R>,
        friendships: Arc<F>,
        invites: Arc<I>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            access: ProjectAccess::new(Arc::clone(&projects)),
            projects,
            friendships,
            invites,
            clock,
        }
    }
}

fn map_friendship_error(error: FriendshipRepositoryError) -> Error {
    Error::internal(format!("friendship lookup failed: {error}"))
}

fn not_a_friend(field: &str, index: usize, friend: &UserId) -> Error {
    Error::invalid_request("only accepted friends can be added to a project").with_details(json!({
        "field": field,
        "index": index,
        "code": "not_a_friend",
        "value": friend.to_string(),
    }))
}

impl<R, F, I> ProjectService<R, F, I>
where
    R: ProjectRepository,
    F: FriendshipRepository,
    I: InviteCommand + ?Sized,
{
    /// Check that every id is an accepted friend of `actor`, dropping the
    /// actor and duplicates.
    async fn accepted_friends<'a>(
        &self,
        actor: &UserId,
        field: &str,
        candidates: impl Iterator<Item = (usize, &'a UserId)>,
    ) -> Result<Vec<UserId>, Error> {
        let mut friends: Vec<UserId> = Vec::new();
        for (index, friend) in candidates {
            if friend == actor || friends.contains(friend) {
                continue;
            }
            let is_friend = self
                .friendships
                .are_friends(actor, friend)
                .await
                .map_err(map_friendship_error)?;
            if !is_friend {
                return Err(not_a_friend(field, index, friend));
            }
            friends.push(*friend);
        }
        Ok(friends)
    }

    async fn load(&self, project_id: &ProjectId) -> Result<Project, Error> {
        self.projects
            .find(project_id)
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| Error::not_found("project not found"))
    }
}

#[async_trait]
impl<R, F, I> ProjectCommand for ProjectService<R, F, I>
where
    R: ProjectRepository,
    F: FriendshipRepository,
    I: InviteCommand + ?Sized,
{
    async fn create(&self, request: CreateProjectRequest) -> Result<ProjectCreated, Error> {
        let CreateProjectRequest {
            owner_id,
            title,
            description,
            dates,
            prefectures,
            invitees,
        } = request;

        let friend_ids = invitees.iter().enumerate().filter_map(|(index, invitee)| match invitee {
            Invitee::Friend(id) => Some((index, id)),
            Invitee::Email(_) => None,
        });
        let editors = self.accepted_friends(&owner_id, "invitees", friend_ids).await?;
        let emails: Vec<Email> = invitees
            .into_iter()
            .filter_map(|invitee| match invitee {
                Invitee::Email(email) => Some(email),
                Invitee::Friend(_) => None,
            })
            .collect();

        let new_project = NewProject {
            id: ProjectId::random(),
            owner_id,
            title,
            description,
            dates,
            prefectures,
            editors,
            created_at: self.clock.utc(),
        };
        let project = self
            .projects
            .create(&new_project)
            .await
            .map_err(map_project_error)?;
        tracing::info!(project_id = %project.id, owner = %owner_id, "project created");

        let invites = if emails.is_empty() {
            InviteSummary::default()
        } else {
            let request = SendInvitesRequest {
                actor: owner_id,
                project_id: project.id,
                emails,
                role: InviteRole::Editor,
            };
            match self.invites.send(request).await {
                Ok(summary) => summary,
                Err(err) => {
                    tracing::warn!(
                        project_id = %project.id,
                        error = %err,
                        "sending invites for new project failed"
                    );
                    InviteSummary::default()
                }
            }
        };
        Ok(ProjectCreated { project, invites })
    }

    async fn update_meta(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        patch: ProjectMetaPatch,
    ) -> Result<Project, Error> {
        self.access
            .require(actor, project_id, ProjectRole::Editor)
            .await?;
        let current = self.load(project_id).await?;
        let dates = patch.merged_dates(current.dates).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": "endDate",
                "code": "end_before_start",
            }))
        })?;
        let update = ProjectMetaUpdate {
            patch,
            dates,
            updated_at: self.clock.utc(),
        };
        self.projects
            .update_meta(project_id, &update)
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| Error::not_found("project not found"))
    }

    async fn replace_prefectures(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        prefectures: Vec<Prefecture>,
    ) -> Result<Vec<Prefecture>, Error> {
        self.access
            .require(actor, project_id, ProjectRole::Editor)
            .await?;
        let mut unique: Vec<Prefecture> = Vec::with_capacity(prefectures.len());
        for prefecture in prefectures {
            if !unique.contains(&prefecture) {
                unique.push(prefecture);
            }
        }
        self.projects
            .replace_prefectures(project_id, &unique, self.clock.utc())
            .await
            .map_err(map_project_error)?;
        Ok(unique)
    }

    async fn add_members(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        friend_ids: Vec<UserId>,
        role: ProjectRole,
    ) -> Result<Vec<ProjectMember>, Error> {
        self.access
            .require(actor, project_id, ProjectRole::Editor)
            .await?;
        if role == ProjectRole::Owner {
            return Err(Error::invalid_request("the owner role cannot be granted")
                .with_details(json!({ "field": "role", "code": "owner_not_grantable" })));
        }
        let friends = self
            .accepted_friends(actor, "friendIds", friend_ids.iter().enumerate())
            .await?;
        if !friends.is_empty() {
            let added = self
                .projects
                .add_members(project_id, &friends, role, MemberStatus::Active)
                .await
                .map_err(map_project_error)?;
            tracing::info!(project_id = %project_id, added, "members added");
        }
        self.projects
            .list_members(project_id)
            .await
            .map_err(map_project_error)
    }
}

#[async_trait]
impl<R, F, I> ProjectQuery for ProjectService<R, F, I>
where
    R: ProjectRepository,
    F: FriendshipRepository,
    I: InviteCommand + ?Sized,
{
    async fn list(&self, actor: &UserId) -> Result<Vec<ProjectListing>, Error> {
        self.projects
            .list_for_user(actor)
            .await
            .map_err(map_project_error)
    }

    async fn meta(&self, actor: &UserId, project_id: &ProjectId) -> Result<Project, Error> {
        self.access
            .require(actor, project_id, ProjectRole::Viewer)
            .await?;
        self.load(project_id).await
    }

    async fn members(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
    ) -> Result<Vec<ProjectMember>, Error> {
        self.access
            .require(actor, project_id, ProjectRole::Viewer)
            .await?;
        self.projects
            .list_members(project_id)
            .await
            .map_err(map_project_error)
    }
}

#[cfg(test)]
#[path = "project_service_tests.rs"]
mod tests;
