//! Friendship handlers.
//!
//! ```text
//! GET /api/v1/friends
//! POST /api/v1/friends/request {"email":"ken@example.com"}
//! POST /api/v1/friends/accept {"friendId":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{FriendList, FriendRequestOutcome, FriendshipStatus, UserSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::UserSummaryBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_email, parse_user_id};

/// A friend or requester with the state of the relationship.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendBody {
    #[serde(flatten)]
    pub user: UserSummaryBody,
    #[schema(example = "accepted")]
    pub status: String,
}

impl FriendBody {
    fn new(user: UserSummary, status: FriendshipStatus) -> Self {
        Self {
            user: user.into(),
            status: status.as_str().to_owned(),
        }
    }
}

/// Accepted friends and requests awaiting the caller's answer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendListResponse {
    pub friends: Vec<FriendBody>,
    pub incoming: Vec<FriendBody>,
}

impl From<FriendList> for FriendListResponse {
    fn from(list: FriendList) -> Self {
        Self {
            friends: list
                .friends
                .into_iter()
                .map(|user| FriendBody::new(user, FriendshipStatus::Accepted))
                .collect(),
            incoming: list
                .incoming
                .into_iter()
                .map(|user| FriendBody::new(user, FriendshipStatus::Pending))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    pub email: String,
}

/// `requested` for a new request, `already_exists` when the pair was
/// already linked in either direction.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestResponse {
    #[schema(example = "requested")]
    pub outcome: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptFriendBody {
    #[schema(format = "uuid")]
    pub friend_id: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/friends",
    responses(
        (status = 200, description = "Friends and incoming requests", body = FriendListResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["friends"],
    operation_id = "listFriends"
)]
#[get("/friends")]
pub async fn list_friends(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<FriendListResponse>> {
    let me = session.require_user_id()?;
    let list = state.friendships_query.list(&me).await?;
    Ok(web::Json(list.into()))
}

/// Send a friend request to the user registered with `email`.
#[utoipa::path(
    post,
    path = "/api/v1/friends/request",
    request_body = FriendRequestBody,
    responses(
        (status = 200, description = "Request recorded", body = FriendRequestResponse),
        (status = 400, description = "Invalid email or self-request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such user", body = ErrorSchema)
    ),
    tags = ["friends"],
    operation_id = "requestFriend"
)]
#[post("/friends/request")]
pub async fn request_friend(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<FriendRequestBody>,
) -> ApiResult<web::Json<FriendRequestResponse>> {
    let me = session.require_user_id()?;
    let email = parse_email(&payload.email, FieldName::new("email"))?;
    let outcome = match state.friendships.request(&me, &email).await? {
        FriendRequestOutcome::Requested => "requested",
        FriendRequestOutcome::AlreadyExists => "already_exists",
    };
    Ok(web::Json(FriendRequestResponse {
        outcome: outcome.to_owned(),
    }))
}

/// Accept a pending request from `friendId`.
#[utoipa::path(
    post,
    path = "/api/v1/friends/accept",
    request_body = AcceptFriendBody,
    responses(
        (status = 204, description = "Friendship accepted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "No pending request", body = ErrorSchema)
    ),
    tags = ["friends"],
    operation_id = "acceptFriend"
)]
#[post("/friends/accept")]
pub async fn accept_friend(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AcceptFriendBody>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let friend = parse_user_id(&payload.friend_id, FieldName::new("friendId"))?;
    state.friendships.accept(&me, &friend).await?;
    Ok(HttpResponse::NoContent().finish())
}
