//! End-to-end planning over HTTP: two friends search and save places, pool
//! them into a project, vote, confirm and arrange the day board.

use actix_web::http::{Method, StatusCode};
use actix_web::test;
use serde_json::{Value, json};
use tripboard::domain::PlaceSuggestion;
use tripboard::test_support::{StubPlacesSource, TestHarness};

mod support;

use support::{KINKAKU_JI, SENSO_JI, TOKYO_TOWER, Visitor, app, place, send, send_ok, sign_in};

fn tower_hit() -> PlaceSuggestion {
    PlaceSuggestion {
        external_id: "ChIJCewJkL2LGGAR3Qmk0vCTGkg".to_owned(),
        name: "Tokyo Tower".to_owned(),
        address: Some(TOKYO_TOWER.to_owned()),
        lat: Some(35.6586),
        lng: Some(139.7454),
        rating: Some(4.5),
        photo_reference: None,
    }
}

fn place_ids(rows: &Value) -> Vec<String> {
    rows.as_array()
        .expect("array")
        .iter()
        .map(|row| row["place"]["id"].as_str().expect("place id").to_owned())
        .collect()
}

async fn befriend<S>(app: &S, from: &Visitor, to: &Visitor, to_email: &str)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let requested = send_ok(
        app,
        from,
        Method::POST,
        "/api/v1/friends/request",
        Some(json!({ "email": to_email })),
    )
    .await;
    assert_eq!(requested["outcome"], "requested");

    let res = send(
        app,
        to,
        Method::POST,
        "/api/v1/friends/accept",
        Some(json!({ "friendId": from.user_id })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn friends_plan_a_day_together() {
    let harness = TestHarness::with_places(StubPlacesSource::new(vec![tower_hit()]));
    let app = test::init_service(app(&harness)).await;
    let hana = sign_in(&app, &harness, "hana@example.com").await;
    let ken = sign_in(&app, &harness, "ken@example.com").await;
    befriend(&app, &hana, &ken, "ken@example.com").await;

    let friends = send_ok(&app, &hana, Method::GET, "/api/v1/friends", None).await;
    assert_eq!(friends["friends"][0]["id"], ken.user_id.as_str());
    assert_eq!(friends["friends"][0]["status"], "accepted");

    // Search twice; the second call is answered from the cache.
    for _ in 0..2 {
        let hits = send_ok(&app, &ken, Method::GET, "/api/v1/places/search?q=tokyo%20tower", None).await;
        assert_eq!(hits[0]["name"], "Tokyo Tower");
    }
    assert_eq!(harness.places_source.calls(), 1);

    let tower = send_ok(
        &app,
        &ken,
        Method::POST,
        "/api/v1/wishlists",
        Some(place("ChIJCewJkL2LGGAR3Qmk0vCTGkg", "Tokyo Tower", TOKYO_TOWER)),
    )
    .await["place"]["id"]
        .as_str()
        .expect("tower id")
        .to_owned();
    let temple = send_ok(
        &app,
        &hana,
        Method::POST,
        "/api/v1/wishlists",
        Some(place("senso-ji", "Sensō-ji", SENSO_JI)),
    )
    .await["place"]["id"]
        .as_str()
        .expect("temple id")
        .to_owned();
    send_ok(
        &app,
        &hana,
        Method::POST,
        "/api/v1/wishlists",
        Some(place("kinkaku-ji", "Kinkaku-ji", KINKAKU_JI)),
    )
    .await;

    let created = send(
        &app,
        &hana,
        Method::POST,
        "/api/v1/projects",
        Some(json!({
            "title": "Tokyo in spring",
            "startDate": "2026-04-01",
            "endDate": "2026-04-03",
            "prefectures": ["東京都"],
            "invitees": [{ "friendId": ken.user_id }]
        })),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(created).await;
    let project = created["projectId"].as_str().expect("project id").to_owned();
    let base = format!("/api/v1/projects/{project}");

    let listed = send_ok(&app, &ken, Method::GET, "/api/v1/projects", None).await;
    assert_eq!(listed[0]["id"], project.as_str());
    assert_eq!(listed[0]["role"], "editor");

    // Kyoto is outside the project's prefectures, so only two places pool.
    let pool = send_ok(&app, &hana, Method::GET, &format!("{base}/candidates"), None).await;
    let mut pooled = place_ids(&pool);
    pooled.sort();
    let mut expected = vec![tower.clone(), temple.clone()];
    expected.sort();
    assert_eq!(pooled, expected);

    for id in [&tower, &temple] {
        let res = send(
            &app,
            &hana,
            Method::POST,
            &format!("{base}/candidates"),
            Some(json!({ "placeId": id })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    let tally = send_ok(
        &app,
        &ken,
        Method::POST,
        &format!("{base}/candidates/vote"),
        Some(json!({ "placeId": temple, "op": "add" })),
    )
    .await;
    assert_eq!(tally["voteCount"], 1);
    assert_eq!(tally["votedByMe"], true);

    let res = send(
        &app,
        &ken,
        Method::POST,
        &format!("{base}/candidates/confirm"),
        Some(json!({ "placeId": tower, "dayIndex": 0 })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let board = send_ok(
        &app,
        &hana,
        Method::POST,
        &format!("{base}/selections"),
        Some(json!({
            "items": [
                { "placeId": temple, "dayIndex": 0, "orderInDay": 0, "note": "before the crowds" },
                { "placeId": tower, "dayIndex": 0, "orderInDay": 1 }
            ]
        })),
    )
    .await;
    assert_eq!(board["days"].as_array().map(Vec::len), Some(1));
    assert_eq!(place_ids(&board["days"][0]["items"]), vec![temple.clone(), tower.clone()]);
    assert_eq!(board["days"][0]["items"][0]["note"], "before the crowds");

    let pool = send_ok(&app, &ken, Method::GET, &format!("{base}/candidates"), None).await;
    for row in pool.as_array().expect("pool rows") {
        assert_eq!(row["isSelected"], true);
        assert_eq!(row["isCandidate"], false);
    }

    let removed = send_ok(
        &app,
        &hana,
        Method::DELETE,
        &format!("{base}/selections?placeId={tower}"),
        None,
    )
    .await;
    assert_eq!(removed["removed"], true);
    let board = send_ok(&app, &ken, Method::GET, &format!("{base}/selections"), None).await;
    assert_eq!(place_ids(&board["days"][0]["items"]), vec![temple]);
}

#[actix_web::test]
async fn outsiders_get_a_traceable_forbidden() {
    let harness = TestHarness::new();
    let app = test::init_service(app(&harness)).await;
    let hana = sign_in(&app, &harness, "hana@example.com").await;
    let stranger = sign_in(&app, &harness, "stranger@example.com").await;
    let created = send_ok(
        &app,
        &hana,
        Method::POST,
        "/api/v1/projects",
        Some(json!({ "title": "Solo trip" })),
    )
    .await;
    let project = created["projectId"].as_str().expect("project id");

    let res = send(
        &app,
        &stranger,
        Method::GET,
        &format!("/api/v1/projects/{project}/selections"),
        None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let header = res
        .headers()
        .get("trace-id")
        .and_then(|value| value.to_str().ok())
        .expect("trace-id header")
        .to_owned();
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["traceId"], header.as_str());
    insta::assert_json_snapshot!(body, { ".traceId" => "[trace-id]" }, @r#"
    {
      "code": "forbidden",
      "message": "you are not a member of this project",
      "traceId": "[trace-id]"
    }
    "#);
}

#[actix_web::test]
async fn signed_out_visitors_are_turned_away() {
    let harness = TestHarness::new();
    let app = test::init_service(app(&harness)).await;
    let hana = sign_in(&app, &harness, "hana@example.com").await;

    let res = send(&app, &hana, Method::DELETE, "/api/v1/session", None).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cleared = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("removal cookie")
        .into_owned();

    let signed_out = Visitor {
        cookie: cleared,
        user_id: hana.user_id,
    };
    let res = send(&app, &signed_out, Method::GET, "/api/v1/users/me", None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
