//! Tests for the candidate pool handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::test_utils::{
    befriend, create_project, harness_app, save_place, sign_in,
};
use crate::test_support::TestHarness;

const TOKYO_TOWER: &str = "東京都港区芝公園4丁目2-8";
const OSAKA_CASTLE: &str = "大阪府大阪市中央区大阪城1-1";

#[actix_web::test]
async fn pool_follows_regions_and_confirm_moves_to_board() {
    let harness = TestHarness::new();
    let app = actix_test::init_service(harness_app(&harness)).await;
    let (cookie, owner) = sign_in(&app, &harness, "hana@example.com").await;
    let project = create_project(&harness, &owner, &["東京都"], &[]).await;
    let tower = save_place(&harness, &owner, "tower", "Tokyo Tower", TOKYO_TOWER).await;
    save_place(&harness, &owner, "castle", "Osaka Castle", OSAKA_CASTLE).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/projects/{project}/candidates"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let pool: Vec<CandidatePoolRowBody> = actix_test::read_body_json(res).await;
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].place.id, tower.to_string());
    assert_eq!(pool[0].saved_by, vec![owner.to_string()]);
    assert!(!pool[0].is_candidate);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/projects/{project}/candidates"))
            .cookie(cookie.clone())
            .set_json(json!({ "placeId": tower.to_string() }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(harness.store.pair_rows(&project, &tower), (1, 0));

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/projects/{project}/candidates/confirm"))
            .cookie(cookie.clone())
            .set_json(json!({ "placeId": tower.to_string(), "dayIndex": 0 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(harness.store.pair_rows(&project, &tower), (0, 1));

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/projects/{project}/candidates"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let pool: Vec<CandidatePoolRowBody> = actix_test::read_body_json(res).await;
    assert!(!pool[0].is_candidate);
    assert!(pool[0].is_selected);
}

#[actix_web::test]
async fn votes_are_counted_per_member() {
    let harness = TestHarness::new();
    let app = actix_test::init_service(harness_app(&harness)).await;
    let (hana, owner) = sign_in(&app, &harness, "hana@example.com").await;
    let (ken, friend) = sign_in(&app, &harness, "ken@example.com").await;
    befriend(&harness, &owner, &friend, "ken@example.com").await;
    let project = create_project(&harness, &owner, &["東京都"], &[friend]).await;
    let tower = save_place(&harness, &friend, "tower", "Tokyo Tower", TOKYO_TOWER).await;

    let mut tallies = Vec::new();
    for (cookie, op) in [(hana.clone(), "add"), (ken.clone(), "add"), (ken, "add"), (hana, "remove")] {
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/projects/{project}/candidates/vote"))
                .cookie(cookie)
                .set_json(json!({ "placeId": tower.to_string(), "op": op }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let tally: VoteResponse = actix_test::read_body_json(res).await;
        tallies.push((tally.vote_count, tally.voted_by_me));
    }
    assert_eq!(tallies, vec![(1, true), (2, true), (2, true), (1, false)]);
    assert_eq!(harness.store.vote_rows(&project, &tower), 1);
}

#[actix_web::test]
async fn outsiders_cannot_vote() {
    let harness = TestHarness::new();
    let app = actix_test::init_service(harness_app(&harness)).await;
    let (_, owner) = sign_in(&app, &harness, "hana@example.com").await;
    let (outsider, _) = sign_in(&app, &harness, "ken@example.com").await;
    let project = create_project(&harness, &owner, &["東京都"], &[]).await;
    let tower = save_place(&harness, &owner, "tower", "Tokyo Tower", TOKYO_TOWER).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/projects/{project}/candidates/vote"))
            .cookie(outsider)
            .set_json(json!({ "placeId": tower.to_string(), "op": "add" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn confirming_a_non_candidate_is_a_conflict() {
    let harness = TestHarness::new();
    let app = actix_test::init_service(harness_app(&harness)).await;
    let (cookie, owner) = sign_in(&app, &harness, "hana@example.com").await;
    let project = create_project(&harness, &owner, &["東京都"], &[]).await;
    let tower = save_place(&harness, &owner, "tower", "Tokyo Tower", TOKYO_TOWER).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/projects/{project}/candidates/confirm"))
            .cookie(cookie)
            .set_json(json!({ "placeId": tower.to_string() }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(harness.store.pair_rows(&project, &tower), (0, 0));
}

#[actix_web::test]
async fn negative_order_is_rejected() {
    let harness = TestHarness::new();
    let app = actix_test::init_service(harness_app(&harness)).await;
    let (cookie, owner) = sign_in(&app, &harness, "hana@example.com").await;
    let project = create_project(&harness, &owner, &["東京都"], &[]).await;
    let tower = save_place(&harness, &owner, "tower", "Tokyo Tower", TOKYO_TOWER).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/projects/{project}/candidates/confirm"))
            .cookie(cookie)
            .set_json(json!({ "placeId": tower.to_string(), "orderInDay": -1 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "orderInDay");
}

#[actix_web::test]
async fn removal_can_also_unselect() {
    let harness = TestHarness::new();
    let app = actix_test::init_service(harness_app(&harness)).await;
    let (cookie, owner) = sign_in(&app, &harness, "hana@example.com").await;
    let project = create_project(&harness, &owner, &["東京都"], &[]).await;
    let tower = save_place(&harness, &owner, "tower", "Tokyo Tower", TOKYO_TOWER).await;

    for uri in ["candidates", "candidates/confirm"] {
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/projects/{project}/{uri}"))
                .cookie(cookie.clone())
                .set_json(json!({ "placeId": tower.to_string() }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/projects/{project}/candidates"))
            .cookie(cookie)
            .set_json(json!({ "placeId": tower.to_string(), "alsoUnselect": true }))
            .to_request(),
    )
    .await;
    let body: RemoveCandidateResponse = actix_test::read_body_json(res).await;
    assert!(!body.candidate_removed);
    assert!(body.selection_removed);
    assert_eq!(harness.store.pair_rows(&project, &tower), (0, 0));
}
