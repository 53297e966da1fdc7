//! Candidate pool handlers: the pool, candidate toggles, votes, and confirm.
//!
//! ```text
//! GET /api/v1/projects/{id}/candidates
//! POST /api/v1/projects/{id}/candidates {"placeId":"..."}
//! DELETE /api/v1/projects/{id}/candidates {"placeId":"...","alsoUnselect":true}
//! POST /api/v1/projects/{id}/candidates/vote {"placeId":"...","op":"add"}
//! POST /api/v1/projects/{id}/candidates/confirm {"placeId":"...","dayIndex":0}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{CandidatePoolRow, VoteOp, VoteTally};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::PlaceBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_note, parse_place_id, parse_placement, parse_project_path,
};

/// One place in the pool with its state and votes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePoolRowBody {
    pub place: PlaceBody,
    pub saved_by: Vec<String>,
    #[schema(format = "date-time")]
    pub saved_at: String,
    pub is_candidate: bool,
    pub is_selected: bool,
    pub vote_count: u32,
    pub voted_by_me: bool,
}

impl From<CandidatePoolRow> for CandidatePoolRowBody {
    fn from(row: CandidatePoolRow) -> Self {
        Self {
            place: row.place.into(),
            saved_by: row.saved_by.iter().map(ToString::to_string).collect(),
            saved_at: row.saved_at.to_rfc3339(),
            is_candidate: row.is_candidate,
            is_selected: row.is_selected,
            vote_count: row.vote_count,
            voted_by_me: row.voted_by_me,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateBody {
    #[schema(format = "uuid")]
    pub place_id: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCandidateBody {
    #[schema(format = "uuid")]
    pub place_id: String,
    /// Also drop the place from the selection board.
    #[serde(default)]
    pub also_unselect: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCandidateResponse {
    pub candidate_removed: bool,
    pub selection_removed: bool,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteBody {
    #[schema(format = "uuid")]
    pub place_id: String,
    #[schema(value_type = String, example = "add")]
    pub op: VoteOp,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    #[schema(format = "uuid")]
    pub place_id: String,
    pub vote_count: u32,
    pub voted_by_me: bool,
}

impl From<VoteTally> for VoteResponse {
    fn from(tally: VoteTally) -> Self {
        Self {
            place_id: tally.place_id.to_string(),
            vote_count: tally.vote_count,
            voted_by_me: tally.voted_by_me,
        }
    }
}

/// Placement for a confirmed candidate; indices default to zero.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmBody {
    #[schema(format = "uuid")]
    pub place_id: String,
    #[serde(default)]
    pub day_index: i64,
    #[serde(default)]
    pub order_in_day: i64,
    pub note: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/candidates",
    params(("id" = String, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Candidate pool", body = [CandidatePoolRowBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema)
    ),
    tags = ["candidates"],
    operation_id = "candidatePool"
)]
#[get("/projects/{id}/candidates")]
pub async fn candidate_pool(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<CandidatePoolRowBody>>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let rows = state.candidates_query.pool(&actor, &project_id).await?;
    Ok(web::Json(rows.into_iter().map(Into::into).collect()))
}

/// Mark a place as a candidate. Repeating the call is harmless.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/candidates",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = CandidateBody,
    responses(
        (status = 204, description = "Place is a candidate"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "No such project or place", body = ErrorSchema),
        (status = 409, description = "Place is already selected", body = ErrorSchema)
    ),
    tags = ["candidates"],
    operation_id = "addCandidate"
)]
#[post("/projects/{id}/candidates")]
pub async fn add_candidate(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CandidateBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let place_id = parse_place_id(&payload.place_id, FieldName::new("placeId"))?;
    state
        .candidates
        .add(&actor, &project_id, &place_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/candidates",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = RemoveCandidateBody,
    responses(
        (status = 200, description = "What was removed", body = RemoveCandidateResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema)
    ),
    tags = ["candidates"],
    operation_id = "removeCandidate"
)]
#[delete("/projects/{id}/candidates")]
pub async fn remove_candidate(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RemoveCandidateBody>,
) -> ApiResult<web::Json<RemoveCandidateResponse>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let place_id = parse_place_id(&payload.place_id, FieldName::new("placeId"))?;
    let removal = state
        .candidates
        .remove(&actor, &project_id, &place_id, payload.also_unselect)
        .await?;
    debug!(
        %project_id,
        %place_id,
        candidate_removed = removal.candidate_removed,
        selection_removed = removal.selection_removed,
        "candidate removal"
    );
    Ok(web::Json(RemoveCandidateResponse {
        candidate_removed: removal.candidate_removed,
        selection_removed: removal.selection_removed,
    }))
}

/// Add or withdraw the caller's vote and return the new tally.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/candidates/vote",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = VoteBody,
    responses(
        (status = 200, description = "Fresh tally", body = VoteResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "No such project or place", body = ErrorSchema)
    ),
    tags = ["candidates"],
    operation_id = "voteCandidate"
)]
#[post("/projects/{id}/candidates/vote")]
pub async fn vote_candidate(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VoteBody>,
) -> ApiResult<web::Json<VoteResponse>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let place_id = parse_place_id(&payload.place_id, FieldName::new("placeId"))?;
    let tally = state
        .candidates
        .vote(&actor, &project_id, &place_id, payload.op)
        .await?;
    Ok(web::Json(tally.into()))
}

/// Move a candidate onto the selection board.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/candidates/confirm",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = ConfirmBody,
    responses(
        (status = 204, description = "Place confirmed"),
        (status = 400, description = "Invalid placement", body = ErrorSchema),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema),
        (status = 409, description = "Place is not a candidate", body = ErrorSchema)
    ),
    tags = ["candidates"],
    operation_id = "confirmCandidate"
)]
#[post("/projects/{id}/candidates/confirm")]
pub async fn confirm_candidate(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ConfirmBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let ConfirmBody {
        place_id,
        day_index,
        order_in_day,
        note,
    } = payload.into_inner();
    let place_id = parse_place_id(&place_id, FieldName::new("placeId"))?;
    let note = parse_note(note, FieldName::new("note"))?;
    let placement = parse_placement(place_id, day_index, order_in_day, note)?;
    state
        .candidates
        .confirm(&actor, &project_id, placement)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
