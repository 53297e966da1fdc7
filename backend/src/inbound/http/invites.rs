//! Invite handlers: sending invites and claiming invite links.
//!
//! ```text
//! POST /api/v1/projects/{id}/invites {"emails":["ken@example.com"],"role":"viewer"}
//! GET /invite/{token}
//! ```

use std::str::FromStr;

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, InviteRole, InviteSummary, InviteToken, SendInvitesRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_email_list, parse_project_path,
};

/// Sign-in page that bounces back to the invite after authentication.
const SIGN_IN_PATH: &str = "/sign-in";

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendInvitesBody {
    pub emails: Vec<String>,
    /// `editor` (default) or `viewer`.
    pub role: Option<String>,
}

/// Outcome counts for a batch of invites.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteSummaryBody {
    pub invited: usize,
    pub already_invited: usize,
    pub skipped_existing_users: usize,
}

impl From<InviteSummary> for InviteSummaryBody {
    fn from(summary: InviteSummary) -> Self {
        Self {
            invited: summary.invited,
            already_invited: summary.already_invited,
            skipped_existing_users: summary.skipped_existing_users,
        }
    }
}

fn parse_invite_role(raw: Option<&str>) -> Result<InviteRole, Error> {
    raw.map_or(Ok(InviteRole::Editor), |value| {
        InviteRole::from_str(value).map_err(|err| invalid_field_error(FieldName::new("role"), err))
    })
}

fn see_other(location: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Invite addresses that do not belong to registered users.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/invites",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = SendInvitesBody,
    responses(
        (status = 200, description = "Invite outcome", body = InviteSummaryBody),
        (status = 400, description = "Invalid email or role", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Editor role required", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema)
    ),
    tags = ["invites"],
    operation_id = "sendInvites"
)]
#[post("/projects/{id}/invites")]
pub async fn send_invites(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SendInvitesBody>,
) -> ApiResult<web::Json<InviteSummaryBody>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let emails = parse_email_list(&payload.emails, FieldName::new("emails"))?;
    let role = parse_invite_role(payload.role.as_deref())?;
    let summary = state
        .invites
        .send(SendInvitesRequest {
            actor,
            project_id,
            emails,
            role,
        })
        .await?;
    Ok(web::Json(summary.into()))
}

/// Claim an invite link.
///
/// Without a session the browser is sent to sign in first; afterwards the
/// invite is claimed and the browser lands on the project.
#[utoipa::path(
    get,
    path = "/invite/{token}",
    params(("token" = String, Path, description = "Invite token")),
    responses(
        (status = 303, description = "Redirect to sign-in or to the project"),
        (status = 404, description = "Unknown invite", body = ErrorSchema)
    ),
    tags = ["invites"],
    operation_id = "acceptInvite"
)]
#[get("/invite/{token}")]
pub async fn accept_invite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();
    let token = InviteToken::new(&raw).map_err(|_| Error::not_found("invite not found"))?;
    let Some(user_id) = session.user_id()? else {
        return Ok(see_other(format!(
            "{SIGN_IN_PATH}?redirect_url=/invite/{}",
            token.as_str()
        )));
    };
    let project_id = state.invites.accept(&token, &user_id).await?;
    Ok(see_other(format!("/projects/{project_id}")))
}
