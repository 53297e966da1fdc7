//! Driving port for creating and editing projects.

use async_trait::async_trait;

use crate::domain::{
    CreateProjectRequest, Error, InviteSummary, Prefecture, Project, ProjectId, ProjectMember,
    ProjectMetaPatch, ProjectRole, UserId,
};

/// Result of project creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCreated {
    pub project: Project,
    /// Outcome of the email invitees, sent after the project was written.
    pub invites: InviteSummary,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectCommand: Send + Sync {
    /// Create a project owned by the requester.
    async fn create(&self, request: CreateProjectRequest) -> Result<ProjectCreated, Error>;

    /// Patch title, description, or dates. Requires editor.
    async fn update_meta(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        patch: ProjectMetaPatch,
    ) -> Result<Project, Error>;

    /// Replace the target regions. Requires editor.
    async fn replace_prefectures(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        prefectures: Vec<Prefecture>,
    ) -> Result<Vec<Prefecture>, Error>;

    /// Add accepted friends of the actor as active members. Requires editor.
    async fn add_members(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        friend_ids: Vec<UserId>,
        role: ProjectRole,
    ) -> Result<Vec<ProjectMember>, Error>;
}
