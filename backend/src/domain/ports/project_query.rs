//! Driving port for reading projects.

use async_trait::async_trait;

use crate::domain::{Error, Project, ProjectId, ProjectListing, ProjectMember, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectQuery: Send + Sync {
    /// Projects the actor belongs to, most recently updated first.
    async fn list(&self, actor: &UserId) -> Result<Vec<ProjectListing>, Error>;

    /// Metadata and target regions. Requires viewer.
    async fn meta(&self, actor: &UserId, project_id: &ProjectId) -> Result<Project, Error>;

    /// Member list. Requires viewer.
    async fn members(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
    ) -> Result<Vec<ProjectMember>, Error>;
}
