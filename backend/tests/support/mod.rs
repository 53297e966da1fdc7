//! Shared plumbing for the HTTP scenarios: an app over the in-memory
//! harness and small request helpers that keep the scenarios readable.

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::Method;
use actix_web::{App, test, web};
use serde_json::Value;
use tripboard::Trace;
use tripboard::inbound::http::configure;
use tripboard::test_support::TestHarness;

pub const TOKYO_TOWER: &str = "東京都港区芝公園4丁目2-8";
pub const SENSO_JI: &str = "東京都台東区浅草2丁目3-1";
pub const KINKAKU_JI: &str = "京都府京都市北区金閣寺町1";

pub fn app(
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
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    App::new()
        .app_data(web::Data::new(harness.http_state()))
        .wrap(session)
        .wrap(Trace)
        .configure(configure)
}

/// A signed-in browser.
#[derive(Clone)]
pub struct Visitor {
    pub cookie: Cookie<'static>,
    pub user_id: String,
}

pub async fn sign_in<S>(app: &S, harness: &TestHarness, email: &str) -> Visitor
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let token = format!("idp-{email}");
    harness
        .identity_provider
        .register(&token, &format!("sub-{email}"), Some(email));
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/session")
            .set_json(serde_json::json!({ "token": token }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "sign-in for {email}: {}", res.status());
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();
    let body: Value = test::read_body_json(res).await;
    let user_id = body["userId"].as_str().expect("userId").to_owned();
    Visitor { cookie, user_id }
}

/// Send `body` (if any) as `visitor` and return the raw response.
pub async fn send<S>(
    app: &S,
    visitor: &Visitor,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut req = test::TestRequest::default()
        .method(method)
        .uri(uri)
        .cookie(visitor.cookie.clone());
    if let Some(body) = body {
        req = req.set_json(body);
    }
    test::call_service(app, req.to_request()).await
}

/// Like [`send`] but asserts a 2xx and decodes the JSON body.
pub async fn send_ok<S>(
    app: &S,
    visitor: &Visitor,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = send(app, visitor, method.clone(), uri, body).await;
    assert!(res.status().is_success(), "{method} {uri}: {}", res.status());
    test::read_body_json(res).await
}

pub fn place(external_id: &str, name: &str, address: &str) -> Value {
    serde_json::json!({
        "place": { "externalId": external_id, "name": name, "address": address }
    })
}
