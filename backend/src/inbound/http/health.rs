//! Orchestrator probes.
//!
//! The process moves through three phases: `starting` until the listener is
//! bound, `serving`, then `draining` once shutdown begins. Readiness is only
//! true while serving; liveness fails only while draining. Both probes answer
//! with `{"status": <phase>}` and `Cache-Control: no-store`.

use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde_json::json;

const STARTING: u8 = 0;
const SERVING: u8 = 1;
const DRAINING: u8 = 2;

/// Lifecycle phase shared between `main` and the probe handlers.
pub struct HealthState {
    phase: AtomicU8,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            phase: AtomicU8::new(STARTING),
        }
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `serving`. Has no effect once draining.
    pub fn mark_ready(&self) {
        let _ = self
            .phase
            .compare_exchange(STARTING, SERVING, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Enter `draining`; both probes fail from now on.
    pub fn mark_unhealthy(&self) {
        self.phase.store(DRAINING, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.phase.load(Ordering::Acquire) == SERVING
    }

    pub fn is_alive(&self) -> bool {
        self.phase.load(Ordering::Acquire) != DRAINING
    }

    fn phase_name(&self) -> &'static str {
        match self.phase.load(Ordering::Acquire) {
            STARTING => "starting",
            SERVING => "serving",
            _ => "draining",
        }
    }
}

fn probe(state: &HealthState, passing: bool) -> HttpResponse {
    let mut builder = if passing {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(json!({ "status": state.phase_name() }))
}

/// 200 while serving traffic, 503 while starting or draining.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Serving traffic"),
        (status = 405, description = "Only GET is supported"),
        (status = 503, description = "Starting up or draining")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe(&state, state.is_ready())
}

/// 200 until shutdown begins.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive"),
        (status = 405, description = "Only GET is supported"),
        (status = 503, description = "Draining before shutdown")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe(&state, state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    async fn check(state: &web::Data<HealthState>, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(ready)
                .service(live),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(
            res.headers().get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    #[rstest]
    #[case::starting(&[], StatusCode::SERVICE_UNAVAILABLE, StatusCode::OK, "starting")]
    #[case::serving(&["ready"], StatusCode::OK, StatusCode::OK, "serving")]
    #[case::draining(&["ready", "drain"], StatusCode::SERVICE_UNAVAILABLE, StatusCode::SERVICE_UNAVAILABLE, "draining")]
    #[case::no_comeback(&["drain", "ready"], StatusCode::SERVICE_UNAVAILABLE, StatusCode::SERVICE_UNAVAILABLE, "draining")]
    #[actix_web::test]
    async fn probes_follow_the_lifecycle(
        #[case] steps: &[&str],
        #[case] readiness: StatusCode,
        #[case] liveness: StatusCode,
        #[case] phase: &str,
    ) {
        let state = web::Data::new(HealthState::new());
        for step in steps {
            match *step {
                "ready" => state.mark_ready(),
                _ => state.mark_unhealthy(),
            }
        }

        let (status, body) = check(&state, "/health/ready").await;
        assert_eq!(status, readiness);
        assert_eq!(body["status"], phase);
        let (status, _) = check(&state, "/health/live").await;
        assert_eq!(status, liveness);
    }
}
