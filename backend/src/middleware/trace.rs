//! Per-request correlation.
//!
//! [`Trace`] picks the request's [`TraceId`] (the caller's `trace-id` header
//! when it is a usable UUID, a fresh one otherwise), runs the rest of the
//! stack inside [`TraceId::scope`], and writes the id back on the response.
//! One `http.request` span per request carries the id, method, path and,
//! once known, the status code.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, Span, field, info, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware factory; wrap it outermost so every error response is covered.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use tripboard::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { inner: service }))
    }
}

#[doc(hidden)]
pub struct TraceMiddleware<S> {
    inner: S,
}

fn incoming_trace_id(req: &ServiceRequest) -> TraceId {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(TraceId::from_header)
        .unwrap_or_else(TraceId::generate)
}

fn stamp<B>(res: &mut ServiceResponse<B>, trace_id: TraceId) {
    match HeaderValue::try_from(trace_id.to_string()) {
        Ok(value) => {
            res.headers_mut()
                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(error) => warn!(%error, "trace id is not a valid header value"),
    }
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = incoming_trace_id(&req);
        let span = info_span!(
            "http.request",
            trace_id = %trace_id,
            method = %req.method(),
            path = %req.path(),
            status = field::Empty,
        );
        let started = Instant::now();
        let pending = span.in_scope(|| self.inner.call(req));

        let handled = TraceId::scope(trace_id, async move {
            let mut res = pending.await?;
            stamp(&mut res, trace_id);
            let status = res.status().as_u16();
            Span::current().record("status", status);
            info!(
                status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "request finished"
            );
            Ok(res)
        });
        Box::pin(handled.instrument(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::BoxBody;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use crate::domain::Error as DomainError;

    async fn echo_trace_id() -> HttpResponse {
        let body = TraceId::current().map(|id| id.to_string()).unwrap_or_default();
        HttpResponse::Ok().body(body)
    }

    async fn not_a_member() -> Result<HttpResponse, DomainError> {
        Err(DomainError::forbidden("not a member of this project"))
    }

    async fn call(uri: &str, inbound: Option<&str>) -> (ServiceResponse<BoxBody>, String) {
        let app = test::init_service(
            App::new()
                .wrap(Trace)
                .route("/echo", web::get().to(echo_trace_id))
                .route("/forbidden", web::get().to(not_a_member)),
        )
        .await;
        let mut req = test::TestRequest::get().uri(uri);
        if let Some(value) = inbound {
            req = req.insert_header((TRACE_ID_HEADER, value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace-id header")
            .to_str()
            .expect("ascii header")
            .to_owned();
        (res, header)
    }

    #[actix_web::test]
    async fn handlers_see_the_id_written_to_the_response() {
        let (res, header) = call("/echo", None).await;
        assert!(TraceId::from_header(&header).is_some());
        assert_eq!(test::read_body(res).await, header.as_str());
    }

    #[rstest]
    #[case::valid(Some("3fa85f64-5717-4562-b3fc-2c963f66afa6"), true)]
    #[case::garbage(Some("request-17"), false)]
    #[case::nil(Some("00000000-0000-0000-0000-000000000000"), false)]
    #[case::absent(None, false)]
    #[actix_web::test]
    async fn inbound_ids_are_reused_only_when_usable(
        #[case] inbound: Option<&str>,
        #[case] reused: bool,
    ) {
        let (_, header) = call("/echo", inbound).await;
        assert_eq!(inbound == Some(header.as_str()), reused);
        assert!(TraceId::from_header(&header).is_some());
    }

    #[actix_web::test]
    async fn domain_errors_carry_the_request_id() {
        let inbound = "9b2f1c3e-0d4a-4f5b-8c6d-7e8f9a0b1c2d";
        let (res, header) = call("/forbidden", Some(inbound)).await;
        assert_eq!(header, inbound);
        let body: DomainError = test::read_body_json(res).await;
        assert_eq!(body.trace_id(), Some(inbound));
    }
}
