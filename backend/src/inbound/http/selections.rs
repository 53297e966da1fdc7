//! Selection board handlers.
//!
//! ```text
//! GET /api/v1/projects/{id}/selections
//! POST /api/v1/projects/{id}/selections {"items":[{"placeId":"...","dayIndex":0,"orderInDay":1}]}
//! DELETE /api/v1/projects/{id}/selections?placeId=...
//! ```

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Note, Selection, SelectionBoard, SelectionDay, SelectionPlacement};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::PlaceBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_item_error, missing_field_error, parse_place_id, parse_project_path,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionItemBody {
    pub place: PlaceBody,
    pub day_index: u32,
    pub order_in_day: u32,
    pub note: Option<String>,
}

impl From<Selection> for SelectionItemBody {
    fn from(selection: Selection) -> Self {
        Self {
            place: selection.place.into(),
            day_index: selection.day_index,
            order_in_day: selection.order_in_day,
            note: selection.note.map(String::from),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionDayBody {
    pub day_index: u32,
    pub items: Vec<SelectionItemBody>,
}

impl From<SelectionDay> for SelectionDayBody {
    fn from(day: SelectionDay) -> Self {
        Self {
            day_index: day.day_index,
            items: day.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Confirmed places grouped by day.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionBoardBody {
    pub days: Vec<SelectionDayBody>,
}

impl From<SelectionBoard> for SelectionBoardBody {
    fn from(board: SelectionBoard) -> Self {
        Self {
            days: board.days.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacementInput {
    #[schema(format = "uuid")]
    pub place_id: String,
    pub day_index: i64,
    pub order_in_day: i64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveSelectionsBody {
    pub items: Vec<PlacementInput>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UnconfirmQuery {
    /// Place to take off the board.
    pub place_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnconfirmResponse {
    pub removed: bool,
}

fn parse_items(items: Vec<PlacementInput>) -> Result<Vec<SelectionPlacement>, Error> {
    let field = FieldName::new("items");
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let place_id = parse_place_id(&item.place_id, field).map_err(|_| {
                invalid_item_error(field, index, item.place_id.clone(), "placeId must be a valid UUID")
            })?;
            let note = item
                .note
                .map(Note::new)
                .transpose()
                .map_err(|err| invalid_item_error(field, index, item.place_id.clone(), err))?;
            SelectionPlacement::new(place_id, item.day_index, item.order_in_day, note)
                .map_err(|err| invalid_item_error(field, index, item.place_id, err))
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/selections",
    params(("id" = String, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Selection board", body = SelectionBoardBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema)
    ),
    tags = ["selections"],
    operation_id = "selectionBoard"
)]
#[get("/projects/{id}/selections")]
pub async fn selection_board(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SelectionBoardBody>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let board = state.selections_query.board(&actor, &project_id).await?;
    Ok(web::Json(board.into()))
}

/// Apply placements in one batch and return the resulting board.
///
/// Every place must already be a candidate or a selection; otherwise the
/// whole batch is rejected with 409 and the offending ids.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/selections",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = SaveSelectionsBody,
    responses(
        (status = 200, description = "Board after the batch", body = SelectionBoardBody),
        (status = 400, description = "Invalid placement", body = ErrorSchema),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema),
        (status = 409, description = "Places are not candidates", body = ErrorSchema)
    ),
    tags = ["selections"],
    operation_id = "saveSelections"
)]
#[post("/projects/{id}/selections")]
pub async fn save_selections(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SaveSelectionsBody>,
) -> ApiResult<web::Json<SelectionBoardBody>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let placements = parse_items(payload.into_inner().items)?;
    state
        .selections
        .save_batch(&actor, &project_id, placements)
        .await?;
    let board = state.selections_query.board(&actor, &project_id).await?;
    Ok(web::Json(board.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/selections",
    params(("id" = String, Path, description = "Project identifier"), UnconfirmQuery),
    responses(
        (status = 200, description = "Whether a selection was removed", body = UnconfirmResponse),
        (status = 400, description = "Missing or invalid placeId", body = ErrorSchema),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "No such project", body = ErrorSchema)
    ),
    tags = ["selections"],
    operation_id = "unconfirmSelection"
)]
#[delete("/projects/{id}/selections")]
pub async fn unconfirm_selection(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<UnconfirmQuery>,
) -> ApiResult<web::Json<UnconfirmResponse>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_path(&path)?;
    let field = FieldName::new("placeId");
    let raw = query
        .place_id
        .as_deref()
        .ok_or_else(|| missing_field_error(field))?;
    let place_id = parse_place_id(raw, field)?;
    let removed = state
        .selections
        .unconfirm(&actor, &project_id, &place_id)
        .await?;
    Ok(web::Json(UnconfirmResponse { removed }))
}
