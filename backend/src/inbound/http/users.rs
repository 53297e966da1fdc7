//! Current-user profile handlers.
//!
//! ```text
//! GET /api/v1/users/me
//! PATCH /api/v1/users/me {"handle":"hana_t","bio":"Ramen first."}
//! ```

use actix_web::{get, patch, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Bio, Error, Handle, ProfileUpdate, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error};

const AVATAR_KEY_MAX: usize = 512;

/// The signed-in user's profile.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub email: String,
    pub handle: Option<String>,
    pub bio: Option<String>,
    pub avatar_key: Option<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.into(),
            handle: user.handle.map(String::from),
            bio: user.bio.map(String::from),
            avatar_key: user.avatar_key,
        }
    }
}

/// Profile fields to change; absent fields are left as they are.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatchRequest {
    #[schema(example = "hana_t")]
    pub handle: Option<String>,
    pub bio: Option<String>,
    pub avatar_key: Option<String>,
}

fn parse_profile_patch(payload: ProfilePatchRequest) -> Result<ProfileUpdate, Error> {
    let handle = payload
        .handle
        .map(|raw| Handle::new(raw).map_err(|err| invalid_field_error(FieldName::new("handle"), err)))
        .transpose()?;
    let bio = payload
        .bio
        .map(|raw| Bio::new(raw).map_err(|err| invalid_field_error(FieldName::new("bio"), err)))
        .transpose()?;
    let avatar_key = payload
        .avatar_key
        .map(|raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.chars().count() > AVATAR_KEY_MAX {
                Err(invalid_field_error(
                    FieldName::new("avatarKey"),
                    format!("avatarKey must be between 1 and {AVATAR_KEY_MAX} characters"),
                ))
            } else {
                Ok(trimmed.to_owned())
            }
        })
        .transpose()?;
    Ok(ProfileUpdate {
        handle,
        bio,
        avatar_key,
    })
}

/// Fetch the signed-in user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.profile.fetch_profile(&user_id).await?;
    Ok(web::Json(user.into()))
}

/// Update handle, bio, or avatar key.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = ProfilePatchRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Handle already taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfilePatchRequest>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let update = parse_profile_patch(payload.into_inner())?;
    let user = state
        .profile_command
        .update_profile(&user_id, update)
        .await?;
    Ok(web::Json(user.into()))
}
