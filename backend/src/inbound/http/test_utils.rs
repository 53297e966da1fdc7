//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};

use crate::Trace;
use crate::domain::ports::{
    FriendshipCommand, ProjectCommand, SaveWishlistRequest, WishlistCommand,
};
use crate::domain::{
    CreateProjectRequest, Email, ExternalPlaceId, Invitee, PlaceDraft, PlaceId, ProjectId,
    ProjectTitle, TripDates, UserId, parse_prefectures,
};
use crate::test_support::TestHarness;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Full application over the harness's in-memory ports.
pub fn harness_app(
    harness: &TestHarness,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(web::Data::new(harness.http_state()))
        .wrap(test_session_middleware())
        .wrap(Trace)
        .configure(super::configure)
}

/// Register `email` with the identity double and sign in, returning the
/// session cookie and the resolved user id.
pub async fn sign_in<S>(app: &S, harness: &TestHarness, email: &str) -> (Cookie<'static>, UserId)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let token = format!("token-{email}");
    harness
        .identity_provider
        .register(&token, &format!("subject-{email}"), Some(email));
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/session")
            .set_json(serde_json::json!({ "token": token }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "sign-in failed: {}", res.status());
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();
    let body: serde_json::Value = test::read_body_json(res).await;
    let user_id = body["userId"]
        .as_str()
        .and_then(|raw| UserId::new(raw).ok())
        .expect("user id in sign-in response");
    (cookie, user_id)
}

/// Make `requester` and `addressee` accepted friends.
pub async fn befriend(
    harness: &TestHarness,
    requester: &UserId,
    addressee: &UserId,
    addressee_email: &str,
) {
    let email = Email::new(addressee_email).expect("email");
    harness
        .friendships
        .request(requester, &email)
        .await
        .expect("friend request");
    harness
        .friendships
        .accept(addressee, requester)
        .await
        .expect("accept friend");
}

/// Create a project targeting `prefectures` with `editors` as active members.
pub async fn create_project(
    harness: &TestHarness,
    owner: &UserId,
    prefectures: &[&str],
    editors: &[UserId],
) -> ProjectId {
    let request = CreateProjectRequest {
        owner_id: *owner,
        title: ProjectTitle::new("Kansai loop").expect("title"),
        description: None,
        dates: TripDates::default(),
        prefectures: parse_prefectures(prefectures).expect("prefectures"),
        invitees: editors.iter().copied().map(Invitee::Friend).collect(),
    };
    harness
        .projects
        .create(request)
        .await
        .expect("create project")
        .project
        .id
}

/// Save a place with `address` to the wishlist of `user`.
pub async fn save_place(
    harness: &TestHarness,
    user: &UserId,
    external_id: &str,
    name: &str,
    address: &str,
) -> PlaceId {
    let mut draft = PlaceDraft::new(ExternalPlaceId::new(external_id).expect("external id"), name);
    draft.address = Some(address.to_owned());
    harness
        .wishlists
        .save(SaveWishlistRequest {
            user_id: *user,
            place: draft,
            note: None,
        })
        .await
        .expect("save wishlist entry")
        .place
        .id
}
