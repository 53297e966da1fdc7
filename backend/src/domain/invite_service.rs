//! Invite domain service.
//!
//! Sending creates at most one invite per (project, email) and mails a link
//! to `{base_url}/invite/{token}`. Mail failures are logged; the invite row
//! stays so the link can be shared another way.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    InviteCommand, InviteMailer, InviteRepository, InviteRepositoryError, ProjectRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::project_access::{ProjectAccess, map_project_error};
use crate::domain::{
    Email, Error, Invite, InviteEmail, InviteSummary, InviteToken, ProjectId,
    ProjectRole, SendInvitesRequest, UserId,
};

/// Implements the invite driving port.
pub struct InviteService<R, U, V, M: ?Sized> {
    projects: Arc<R>,
    access: ProjectAccess<R>,
    users: Arc<U>,
    invites: Arc<V>,
    mailer: Arc<M>,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl<R, U, V, M: ?Sized> InviteService<R, U, V, M> {
    /// `base_url` is the public origin used to build accept links.
    pub fn new(
        projects: Arc<R>,
        users: Arc<U>,
        invites: Arc<V>,
        mailer: Arc<M>,
        clock: Arc<dyn Clock>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            access: ProjectAccess::new(Arc::clone(&projects)),
            projects,
            users,
            invites,
            mailer,
            clock,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn accept_url(&self, token: &InviteToken) -> String {
        format!("{}/invite/{token}", self.base_url)
    }
}

fn map_invite_error(error: InviteRepositoryError) -> Error {
    match error {
        InviteRepositoryError::Connection { message } => {
            Error::internal(format!("invite repository unavailable: {message}"))
        }
        InviteRepositoryError::Query { message } => {
            Error::internal(format!("invite repository error: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    Error::internal(format!("user lookup failed: {error}"))
}

impl<R, U, V, M> InviteService<R, U, V, M>
where
    R: ProjectRepository,
    U: UserRepository,
    V: InviteRepository,
    M: InviteMailer + ?Sized,
{
    async fn inviter_name(&self, actor: &UserId) -> Result<String, Error> {
        let user = self
            .users
            .find_by_id(actor)
            .await
            .map_err(map_user_error)?;
        Ok(user
            .map(|u| match u.handle {
                Some(handle) => handle.as_str().to_owned(),
                None => u.email.as_str().to_owned(),
            })
            .unwrap_or_else(|| "A Tripboard user".to_owned()))
    }

    async fn dispatch(&self, invite: &Invite, project_title: &str, inviter: &str) {
        let email = InviteEmail {
            to: invite.email.clone(),
            project_title: project_title.to_owned(),
            inviter: inviter.to_owned(),
            accept_url: self.accept_url(&invite.token),
            role: invite.role,
        };
        if let Err(err) = self.mailer.send(&email).await {
            tracing::warn!(
                project_id = %invite.project_id,
                to = %invite.email,
                error = %err,
                "invite email dispatch failed"
            );
        }
    }
}

fn dedupe(emails: Vec<Email>) -> Vec<Email> {
    let mut unique: Vec<Email> = Vec::with_capacity(emails.len());
    for email in emails {
        if !unique.contains(&email) {
            unique.push(email);
        }
    }
    unique
}

#[async_trait]
impl<R, U, V, M> InviteCommand for InviteService<R, U, V, M>
where
    R: ProjectRepository,
    U: UserRepository,
    V: InviteRepository,
    M: InviteMailer + ?Sized,
{
    async fn send(&self, request: SendInvitesRequest) -> Result<InviteSummary, Error> {
        let SendInvitesRequest {
            actor,
            project_id,
            emails,
            role,
        } = request;
        self.access
            .require(&actor, &project_id, ProjectRole::Editor)
            .await?;
        let project = self
            .projects
            .find(&project_id)
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| Error::not_found("project not found"))?;
        let inviter = self.inviter_name(&actor).await?;

        let mut summary = InviteSummary::default();
        for email in dedupe(emails) {
            let registered = self
                .users
                .find_by_email(&email)
                .await
                .map_err(map_user_error)?
                .is_some();
            if registered {
                summary.skipped_existing_users += 1;
                continue;
            }

            let invite = Invite {
                project_id,
                email,
                token: InviteToken::generate(),
                role,
                claimed_by: None,
                created_at: self.clock.utc(),
            };
            let created = self
                .invites
                .create_if_absent(&invite)
                .await
                .map_err(map_invite_error)?;
            if created {
                summary.invited += 1;
                self.dispatch(&invite, project.title.as_str(), &inviter).await;
            } else {
                summary.already_invited += 1;
            }
        }
        tracing::info!(
            project_id = %project_id,
            invited = summary.invited,
            already_invited = summary.already_invited,
            skipped = summary.skipped_existing_users,
            "invites processed"
        );
        Ok(summary)
    }

    async fn accept(&self, token: &InviteToken, user_id: &UserId) -> Result<ProjectId, Error> {
        let invite = self
            .invites
            .claim(token, user_id)
            .await
            .map_err(map_invite_error)?
            .ok_or_else(|| Error::not_found("invite not found"))?;
        tracing::info!(
            project_id = %invite.project_id,
            user_id = %user_id,
            role = ProjectRole::from(invite.role).as_str(),
            "invite claimed"
        );
        Ok(invite.project_id)
    }
}

#[cfg(test)]
#[path = "invite_service_tests.rs"]
mod tests;
