//! Places text search.
//!
//! ```text
//! GET /api/v1/places/search?q=tokyo%20tower
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{PlaceSuggestion, SearchQuery};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, missing_field_error};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Free text, 1 to 200 characters after trimming.
    pub q: Option<String>,
}

/// One search hit.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSuggestionBody {
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub photo_reference: Option<String>,
}

impl From<PlaceSuggestion> for PlaceSuggestionBody {
    fn from(hit: PlaceSuggestion) -> Self {
        Self {
            external_id: hit.external_id,
            name: hit.name,
            address: hit.address,
            lat: hit.lat,
            lng: hit.lng,
            rating: hit.rating,
            photo_reference: hit.photo_reference,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/places/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Search results", body = [PlaceSuggestionBody]),
        (status = 400, description = "Missing or invalid query", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Places API failure", body = ErrorSchema)
    ),
    tags = ["places"],
    operation_id = "searchPlaces"
)]
#[get("/places/search")]
pub async fn search_places(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<Vec<PlaceSuggestionBody>>> {
    session.require_user_id()?;
    let field = FieldName::new("q");
    let raw = params.q.as_deref().ok_or_else(|| missing_field_error(field))?;
    let query = SearchQuery::new(raw).map_err(|err| invalid_field_error(field, err))?;
    let hits = state.places_search.search(&query).await?;
    Ok(web::Json(hits.into_iter().map(Into::into).collect()))
}
