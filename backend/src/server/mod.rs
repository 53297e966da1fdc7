//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};
pub use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use tripboard::Trace;
#[cfg(debug_assertions)]
use tripboard::doc::ApiDoc;
use tripboard::inbound::http::configure;
use tripboard::inbound::http::health::{HealthState, live, ready};
use tripboard::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Everything a worker needs to build its `App`; cloned once per worker.
#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
    session_ttl: CookieDuration,
}

impl AppDependencies {
    fn new(
        health_state: web::Data<HealthState>,
        http_state: HttpState,
        config: &ServerConfig,
    ) -> Self {
        Self {
            health_state,
            http_state: web::Data::new(http_state),
            key: config.key.clone(),
            cookie_secure: config.cookie_secure,
            same_site: config.same_site,
            session_ttl: config.session_ttl,
        }
    }

    /// Private (encrypted) cookie named `session`, persistent for the TTL.
    fn session_middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name("session".to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(self.cookie_secure)
            .cookie_http_only(true)
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_same_site(self.same_site)
            .session_lifecycle(PersistentSession::default().session_ttl(self.session_ttl))
            .build()
    }
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    // `/invite/{token}` sits outside `/api/v1` and still reads the session.
    let app = App::new()
        .app_data(deps.health_state.clone())
        .app_data(deps.http_state.clone())
        .wrap(deps.session_middleware())
        .wrap(Trace)
        .configure(configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the listener and mark the process ready.
///
/// OS signal handling is left to the caller, which should flip
/// [`HealthState`] to draining before stopping the returned server.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let deps = AppDependencies::new(health_state.clone(), http_state, &config);
    let server = HttpServer::new(move || build_app(deps.clone()))
        .disable_signals()
        .bind(config.bind_addr())?
        .run();
    health_state.mark_ready();
    Ok(server)
}
