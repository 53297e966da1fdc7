//! Cookie session access for handlers.
//!
//! The encrypted cookie holds only the internal user id; provider tokens are
//! never stored. Handlers call [`SessionContext::require_user_id`] and get a
//! domain `401` when nobody is signed in.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Session extractor exposing sign-in state as domain types.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Bind the session to `user_id`, renewing it first so a pre-existing
    /// cookie cannot be carried across sign-in.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop all session state; the response carries a removal cookie.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    /// The signed-in user, if any. A cookie holding a malformed id counts as
    /// signed out.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|value| {
            UserId::new(&value)
                .inspect_err(|error| warn!(%error, "ignoring invalid user id in session"))
                .ok()
        }))
    }

    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("sign-in required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use crate::inbound::http::test_utils::test_session_middleware;

    const USER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    async fn sign_in_route(session: SessionContext) -> Result<HttpResponse, Error> {
        session.sign_in(&UserId::new(USER).expect("fixture id"))?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn tamper_route(session: actix_session::Session) -> HttpResponse {
        session
            .insert(USER_ID_KEY, "not-a-uuid")
            .expect("insert raw value");
        HttpResponse::Ok().finish()
    }

    async fn sign_out_route(session: SessionContext) -> HttpResponse {
        session.sign_out();
        HttpResponse::NoContent().finish()
    }

    async fn me_route(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = session.require_user_id()?;
        Ok(HttpResponse::Ok().body(id.to_string()))
    }

    fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    async fn call<S>(app: &S, uri: &str, cookie: Option<Cookie<'static>>) -> ServiceResponse
    where
        S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        let mut req = test::TestRequest::get().uri(uri);
        if let Some(cookie) = cookie {
            req = req.cookie(cookie);
        }
        test::call_service(app, req.to_request()).await
    }

    macro_rules! session_app {
        () => {
            test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .route("/sign-in", web::get().to(sign_in_route))
                    .route("/tamper", web::get().to(tamper_route))
                    .route("/sign-out", web::get().to(sign_out_route))
                    .route("/me", web::get().to(me_route)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn signed_in_user_round_trips() {
        let app = session_app!();
        let signed_in = call(&app, "/sign-in", None).await;
        assert_eq!(signed_in.status(), StatusCode::OK);

        let res = call(&app, "/me", Some(session_cookie(&signed_in))).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, USER);
    }

    #[rstest]
    #[case::no_cookie(None)]
    #[case::tampered(Some("/tamper"))]
    #[case::signed_out(Some("/sign-out"))]
    #[actix_web::test]
    async fn requests_without_a_valid_user_are_unauthorised(#[case] setup: Option<&str>) {
        let app = session_app!();
        let cookie = match setup {
            None => None,
            Some("/sign-out") => {
                let signed_in = call(&app, "/sign-in", None).await;
                let cleared = call(&app, "/sign-out", Some(session_cookie(&signed_in))).await;
                let removal = session_cookie(&cleared);
                assert_eq!(removal.value(), "");
                Some(removal)
            }
            Some(uri) => Some(session_cookie(&call(&app, uri, None).await)),
        };

        let res = call(&app, "/me", cookie).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
