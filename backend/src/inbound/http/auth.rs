//! Session handlers: exchange an identity-provider token for a cookie session.
//!
//! ```text
//! POST /api/v1/session {"token":"<provider jwt>"}
//! POST /api/v1/session            (Authorization: Bearer <provider jwt>)
//! DELETE /api/v1/session
//! ```

use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpRequest, HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error};

/// Sign-in request body. The token may instead arrive as a bearer header.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub token: Option<String>,
}

/// Identifier of the signed-in user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    #[schema(format = "uuid")]
    pub user_id: String,
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_owned())
}

fn token_from(req: &HttpRequest, payload: Option<SignInRequest>) -> Result<String, Error> {
    payload
        .and_then(|body| body.token)
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
        .or_else(|| bearer_token(req))
        .ok_or_else(|| missing_field_error(FieldName::new("token")))
}

/// Verify a provider token and start a session for the resolved user.
#[utoipa::path(
    post,
    path = "/api/v1/session",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "No token supplied", body = ErrorSchema),
        (status = 401, description = "Token rejected", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "signIn",
    security([])
)]
#[post("/session")]
pub async fn sign_in(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Option<web::Json<SignInRequest>>,
) -> ApiResult<web::Json<SignInResponse>> {
    let token = token_from(&req, payload.map(web::Json::into_inner))?;
    let user_id = state.login.login(&token).await?;
    session.sign_in(&user_id)?;
    Ok(web::Json(SignInResponse {
        user_id: user_id.to_string(),
    }))
}

/// End the current session.
#[utoipa::path(
    delete,
    path = "/api/v1/session",
    responses((status = 204, description = "Signed out")),
    tags = ["session"],
    operation_id = "signOut"
)]
#[delete("/session")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.sign_out();
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    #[case(Some("Bearer abc.def"), Some("abc.def"))]
    #[case(Some("bearer  abc.def "), Some("abc.def"))]
    #[case(Some("Basic dXNlcg=="), None)]
    #[case(Some("Bearer "), None)]
    #[case(None, None)]
    fn bearer_tokens_are_extracted(#[case] header: Option<&str>, #[case] expected: Option<&str>) {
        let mut req = TestRequest::default();
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        assert_eq!(bearer_token(&req.to_http_request()).as_deref(), expected);
    }

    #[rstest]
    fn body_token_wins_over_header() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer from-header"))
            .to_http_request();
        let token = token_from(
            &req,
            Some(SignInRequest {
                token: Some("from-body".to_owned()),
            }),
        )
        .expect("token");
        assert_eq!(token, "from-body");
    }

    #[rstest]
    fn missing_token_is_a_validation_error() {
        let req = TestRequest::default().to_http_request();
        let err = token_from(&req, Some(SignInRequest::default())).expect_err("missing");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }
}
