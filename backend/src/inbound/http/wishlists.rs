//! Wishlist handlers.
//!
//! ```text
//! GET /api/v1/wishlists
//! POST /api/v1/wishlists {"place":{"externalId":"ChIJ...","name":"清水寺"},"note":"sunrise"}
//! GET /api/v1/wishlists/{placeId}
//! PATCH /api/v1/wishlists/{placeId} {"note":null}
//! DELETE /api/v1/wishlists/{placeId}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::SaveWishlistRequest;
use crate::domain::{Coordinates, Error, ExternalPlaceId, PlaceDraft, Prefecture, WishlistEntry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::PlaceBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, missing_field_error, parse_note, parse_place_id, present,
};

/// Place details as returned by the Places search, plus optional extras.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceInput {
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub photo_reference: Option<String>,
    pub image_key: Option<String>,
    /// Prefecture; derived from `address` when omitted.
    pub region: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveWishlistBody {
    pub place: PlaceInput,
    /// Replaces the stored note when present.
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteBody {
    /// New note; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub note: Option<Option<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntryBody {
    pub place: PlaceBody,
    pub note: Option<String>,
    #[schema(format = "date-time")]
    pub saved_at: String,
}

impl From<WishlistEntry> for WishlistEntryBody {
    fn from(entry: WishlistEntry) -> Self {
        Self {
            place: entry.place.into(),
            note: entry.note.map(String::from),
            saved_at: entry.saved_at.to_rfc3339(),
        }
    }
}

fn parse_place_input(input: PlaceInput) -> Result<PlaceDraft, Error> {
    let external_id = ExternalPlaceId::new(input.external_id)
        .map_err(|err| invalid_field_error(FieldName::new("place.externalId"), err))?;
    let location = match (input.lat, input.lng) {
        (Some(lat), Some(lng)) => Some(
            Coordinates::new(lat, lng)
                .map_err(|err| invalid_field_error(FieldName::new("place.lat"), err))?,
        ),
        (None, None) => None,
        (Some(_), None) => return Err(missing_field_error(FieldName::new("place.lng"))),
        (None, Some(_)) => return Err(missing_field_error(FieldName::new("place.lat"))),
    };
    let region = input
        .region
        .map(|raw| {
            Prefecture::new(raw).map_err(|err| invalid_field_error(FieldName::new("place.region"), err))
        })
        .transpose()?;

    let mut draft = PlaceDraft::new(external_id, input.name);
    draft.address = input.address;
    draft.location = location;
    draft.rating = input.rating;
    draft.photo_reference = input.photo_reference;
    draft.image_key = input.image_key;
    draft.region = region;
    Ok(draft)
}

#[utoipa::path(
    get,
    path = "/api/v1/wishlists",
    responses(
        (status = 200, description = "Saved places, most recent first", body = [WishlistEntryBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["wishlists"],
    operation_id = "listWishlist"
)]
#[get("/wishlists")]
pub async fn list_wishlist(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<WishlistEntryBody>>> {
    let user_id = session.require_user_id()?;
    let entries = state.wishlist_query.list(&user_id).await?;
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

/// Save a place to the caller's wishlist. Saving twice keeps one entry.
#[utoipa::path(
    post,
    path = "/api/v1/wishlists",
    request_body = SaveWishlistBody,
    responses(
        (status = 200, description = "Saved entry", body = WishlistEntryBody),
        (status = 400, description = "Invalid place", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["wishlists"],
    operation_id = "saveWishlistEntry"
)]
#[post("/wishlists")]
pub async fn save_wishlist_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SaveWishlistBody>,
) -> ApiResult<web::Json<WishlistEntryBody>> {
    let user_id = session.require_user_id()?;
    let SaveWishlistBody { place, note } = payload.into_inner();
    let request = SaveWishlistRequest {
        user_id,
        place: parse_place_input(place)?,
        note: parse_note(note, FieldName::new("note"))?,
    };
    let entry = state.wishlist.save(request).await?;
    Ok(web::Json(entry.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/wishlists/{placeId}",
    params(("placeId" = String, Path, description = "Place identifier")),
    responses(
        (status = 200, description = "Saved entry", body = WishlistEntryBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not on the wishlist", body = ErrorSchema)
    ),
    tags = ["wishlists"],
    operation_id = "getWishlistEntry"
)]
#[get("/wishlists/{place_id}")]
pub async fn get_wishlist_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<WishlistEntryBody>> {
    let user_id = session.require_user_id()?;
    let place_id = parse_place_id(&path, FieldName::new("placeId"))?;
    let entry = state.wishlist_query.get(&user_id, &place_id).await?;
    Ok(web::Json(entry.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/wishlists/{placeId}",
    params(("placeId" = String, Path, description = "Place identifier")),
    request_body = UpdateNoteBody,
    responses(
        (status = 200, description = "Updated entry", body = WishlistEntryBody),
        (status = 400, description = "Invalid note", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not on the wishlist", body = ErrorSchema)
    ),
    tags = ["wishlists"],
    operation_id = "updateWishlistNote"
)]
#[patch("/wishlists/{place_id}")]
pub async fn update_wishlist_note(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateNoteBody>,
) -> ApiResult<web::Json<WishlistEntryBody>> {
    let user_id = session.require_user_id()?;
    let place_id = parse_place_id(&path, FieldName::new("placeId"))?;
    let note = payload
        .into_inner()
        .note
        .ok_or_else(|| missing_field_error(FieldName::new("note")))?;
    let note = parse_note(note, FieldName::new("note"))?;
    let entry = state
        .wishlist
        .update_note(&user_id, &place_id, note)
        .await?;
    Ok(web::Json(entry.into()))
}

/// Remove a place from the wishlist. Removing an absent entry is a no-op.
#[utoipa::path(
    delete,
    path = "/api/v1/wishlists/{placeId}",
    params(("placeId" = String, Path, description = "Place identifier")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["wishlists"],
    operation_id = "removeWishlistEntry"
)]
#[delete("/wishlists/{place_id}")]
pub async fn remove_wishlist_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let place_id = parse_place_id(&path, FieldName::new("placeId"))?;
    let removed = state.wishlist.remove(&user_id, &place_id).await?;
    tracing::debug!(user_id = %user_id, place_id = %place_id, removed, "wishlist entry removal");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::{harness_app, sign_in};
    use crate::test_support::TestHarness;

    fn kiyomizu() -> Value {
        json!({
            "place": {
                "externalId": "ChIJB_vchdMIAWARujTEUIZlr2I",
                "name": "清水寺",
                "address": "日本、〒605-0862 京都府京都市東山区清水１丁目２９４",
                "lat": 34.9948,
                "lng": 135.7850
            },
            "note": "go at opening time"
        })
    }

    #[actix_web::test]
    async fn saving_twice_keeps_one_entry() {
        let harness = TestHarness::new();
        let app = actix_test::init_service(harness_app(&harness)).await;
        let (cookie, user_id) = sign_in(&app, &harness, "hana@example.com").await;

        let mut saved = Vec::new();
        for _ in 0..2 {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/wishlists")
                    .cookie(cookie.clone())
                    .set_json(kiyomizu())
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::OK);
            let body: WishlistEntryBody = actix_test::read_body_json(res).await;
            saved.push(body);
        }
        assert_eq!(saved[0].place.id, saved[1].place.id);
        assert_eq!(saved[0].place.region.as_deref(), Some("京都府"));
        assert_eq!(harness.store.wishlist_len(&user_id), 1);
    }

    #[actix_web::test]
    async fn note_can_be_cleared_and_entry_removed() {
        let harness = TestHarness::new();
        let app = actix_test::init_service(harness_app(&harness)).await;
        let (cookie, user_id) = sign_in(&app, &harness, "hana@example.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/wishlists")
                .cookie(cookie.clone())
                .set_json(kiyomizu())
                .to_request(),
        )
        .await;
        let saved: WishlistEntryBody = actix_test::read_body_json(res).await;
        let uri = format!("/api/v1/wishlists/{}", saved.place.id);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&uri)
                .cookie(cookie.clone())
                .set_json(json!({ "note": null }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated: WishlistEntryBody = actix_test::read_body_json(res).await;
        assert!(updated.note.is_none());

        for _ in 0..2 {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::delete()
                    .uri(&uri)
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::NO_CONTENT);
        }
        assert_eq!(harness.store.wishlist_len(&user_id), 0);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&uri)
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case(json!({ "place": { "externalId": "", "name": "x" } }), "place.externalId")]
    #[case(json!({ "place": { "externalId": "a", "name": "x", "lat": 91.0, "lng": 0.0 } }), "place.lat")]
    #[case(json!({ "place": { "externalId": "a", "name": "x", "lat": 35.0 } }), "place.lng")]
    #[case(json!({ "place": { "externalId": "a", "name": "x", "region": "Atlantis" } }), "place.region")]
    #[case(json!({ "place": { "externalId": "a", "name": "x" }, "note": "x".repeat(1001) }), "note")]
    #[actix_web::test]
    async fn invalid_saves_are_rejected(#[case] payload: Value, #[case] field: &str) {
        let harness = TestHarness::new();
        let app = actix_test::init_service(harness_app(&harness)).await;
        let (cookie, _) = sign_in(&app, &harness, "hana@example.com").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/wishlists")
                .cookie(cookie)
                .set_json(payload)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], field);
    }
}
