//! Port for projects, their target regions, and their members.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    MemberStatus, NewProject, Prefecture, Project, ProjectId, ProjectListing, ProjectMember,
    ProjectMetaPatch, ProjectRole, TripDates, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by project repository adapters.
    pub enum ProjectRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "project repository query failed: {message}",
    }
}

/// Metadata values written by a patch, already merged and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetaUpdate {
    pub patch: ProjectMetaPatch,
    pub dates: TripDates,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Write the project, its prefectures, the owner membership, and the
    /// editor memberships in one transaction.
    async fn create(&self, project: &NewProject) -> Result<Project, ProjectRepositoryError>;

    /// Fetch a project with its prefectures.
    async fn find(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError>;

    /// Projects the user is an active member of, most recently updated first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProjectListing>, ProjectRepositoryError>;

    /// The user's membership row, if any.
    async fn find_member(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Option<ProjectMember>, ProjectRepositoryError>;

    /// Apply a metadata update and bump `updated_at`.
    async fn update_meta(
        &self,
        project_id: &ProjectId,
        update: &ProjectMetaUpdate,
    ) -> Result<Option<Project>, ProjectRepositoryError>;

    /// Replace the target regions (delete all, insert set) in one transaction.
    async fn replace_prefectures(
        &self,
        project_id: &ProjectId,
        prefectures: &[Prefecture],
        updated_at: DateTime<Utc>,
    ) -> Result<(), ProjectRepositoryError>;

    /// All member rows joined with user profiles, owner first.
    async fn list_members(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<ProjectMember>, ProjectRepositoryError>;

    /// Insert memberships, leaving existing rows untouched. Returns how many
    /// rows were written.
    async fn add_members(
        &self,
        project_id: &ProjectId,
        user_ids: &[UserId],
        role: ProjectRole,
        status: MemberStatus,
    ) -> Result<usize, ProjectRepositoryError>;
}
