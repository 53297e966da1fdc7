//! Project capability checks.
//!
//! Every project-scoped operation first resolves the caller's membership
//! through [`ProjectAccess::require`], which either yields an
//! [`AuthorizedMember`] or fails before anything is mutated.

use std::sync::Arc;

use crate::domain::ports::{ProjectRepository, ProjectRepositoryError};
use crate::domain::{Error, MemberStatus, ProjectId, ProjectRole, UserId};

/// Proof that `user_id` is an active member of `project_id` with at least
/// the requested role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizedMember {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub role: ProjectRole,
}

/// Resolves memberships against the project repository.
pub struct ProjectAccess<R> {
    projects: Arc<R>,
}

impl<R> Clone for ProjectAccess<R> {
    fn clone(&self) -> Self {
        Self {
            projects: Arc::clone(&self.projects),
        }
    }
}

impl<R> ProjectAccess<R> {
    pub fn new(projects: Arc<R>) -> Self {
        Self { projects }
    }
}

impl<R: ProjectRepository> ProjectAccess<R> {
    /// Require `actor` to hold at least `minimum` on the project.
    ///
    /// # Errors
    ///
    /// - not found when the project does not exist;
    /// - forbidden when the actor is not an active member or the role is
    ///   too low.
    pub async fn require(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
        minimum: ProjectRole,
    ) -> Result<AuthorizedMember, Error> {
        let member = self
            .projects
            .find_member(project_id, actor)
            .await
            .map_err(map_project_error)?;

        let Some(member) = member else {
            let exists = self
                .projects
                .find(project_id)
                .await
                .map_err(map_project_error)?
                .is_some();
            return Err(if exists {
                Error::forbidden("you are not a member of this project")
            } else {
                Error::not_found("project not found")
            });
        };

        if member.status != MemberStatus::Active {
            return Err(Error::forbidden("project membership is not active"));
        }
        if member.role < minimum {
            return Err(Error::forbidden(format!(
                "this action requires the {minimum} role"
            )));
        }
        Ok(AuthorizedMember {
            project_id: *project_id,
            user_id: *actor,
            role: member.role,
        })
    }
}

pub(crate) fn map_project_error(error: ProjectRepositoryError) -> Error {
    match error {
        ProjectRepositoryError::Connection { message } => {
            Error::internal(format!("project repository unavailable: {message}"))
        }
        ProjectRepositoryError::Query { message } => {
            Error::internal(format!("project repository error: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockProjectRepository;
    use crate::domain::{
        Email, ErrorCode, Project, ProjectMember, ProjectTitle, TripDates, UserSummary,
    };
    use chrono::Utc;
    use rstest::rstest;

    fn member(project_id: ProjectId, user_id: UserId, role: ProjectRole, status: MemberStatus) -> ProjectMember {
        ProjectMember {
            project_id,
            user: UserSummary {
                id: user_id,
                email: Email::new("member@example.com").expect("email"),
                handle: None,
                avatar_key: None,
            },
            role,
            status,
        }
    }

    fn project(id: ProjectId, owner_id: UserId) -> Project {
        Project {
            id,
            owner_id,
            title: ProjectTitle::new("Trip").expect("title"),
            description: None,
            dates: TripDates::default(),
            prefectures: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(ProjectRole::Viewer, ProjectRole::Viewer, true)]
    #[case(ProjectRole::Viewer, ProjectRole::Editor, false)]
    #[case(ProjectRole::Editor, ProjectRole::Editor, true)]
    #[case(ProjectRole::Owner, ProjectRole::Editor, true)]
    #[tokio::test]
    async fn role_must_reach_minimum(
        #[case] held: ProjectRole,
        #[case] minimum: ProjectRole,
        #[case] allowed: bool,
    ) {
        let (project_id, actor) = (ProjectId::random(), UserId::random());
        let mut repo = MockProjectRepository::new();
        repo.expect_find_member()
            .return_once(move |_, _| Ok(Some(member(project_id, actor, held, MemberStatus::Active))));

        let access = ProjectAccess::new(Arc::new(repo));
        let result = access.require(&actor, &project_id, minimum).await;
        match (allowed, result) {
            (true, Ok(authorized)) => assert_eq!(authorized.role, held),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Forbidden),
            (_, other) => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn missing_project_is_not_found() {
        let mut repo = MockProjectRepository::new();
        repo.expect_find_member().return_once(|_, _| Ok(None));
        repo.expect_find().return_once(|_| Ok(None));

        let access = ProjectAccess::new(Arc::new(repo));
        let err = access
            .require(&UserId::random(), &ProjectId::random(), ProjectRole::Viewer)
            .await
            .expect_err("missing project");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn outsider_is_forbidden() {
        let project_id = ProjectId::random();
        let owner = UserId::random();
        let mut repo = MockProjectRepository::new();
        repo.expect_find_member().return_once(|_, _| Ok(None));
        repo.expect_find()
            .return_once(move |_| Ok(Some(project(project_id, owner))));

        let access = ProjectAccess::new(Arc::new(repo));
        let err = access
            .require(&UserId::random(), &project_id, ProjectRole::Viewer)
            .await
            .expect_err("outsider");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn invited_members_have_no_access_yet() {
        let (project_id, actor) = (ProjectId::random(), UserId::random());
        let mut repo = MockProjectRepository::new();
        repo.expect_find_member().return_once(move |_, _| {
            Ok(Some(member(project_id, actor, ProjectRole::Owner, MemberStatus::Invited)))
        });

        let access = ProjectAccess::new(Arc::new(repo));
        let err = access
            .require(&actor, &project_id, ProjectRole::Viewer)
            .await
            .expect_err("inactive");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn repository_failure_is_internal() {
        let mut repo = MockProjectRepository::new();
        repo.expect_find_member()
            .return_once(|_, _| Err(ProjectRepositoryError::connection("refused")));

        let access = ProjectAccess::new(Arc::new(repo));
        let err = access
            .require(&UserId::random(), &ProjectId::random(), ProjectRole::Viewer)
            .await
            .expect_err("failure");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
