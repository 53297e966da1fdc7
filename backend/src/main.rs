//! `tripboard` server binary.
//!
//! Reads `TRIPBOARD_*` settings, connects Postgres (running migrations),
//! the optional Redis cache and SMTP relay, then serves the API until
//! Ctrl-C or SIGTERM. On a signal readiness drops first, then in-flight
//! requests are allowed to finish.

mod server;

use actix_web::dev::ServerHandle;
use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppSettings, ServerConfig, build_http_state, create_server};
use tripboard::inbound::http::health::HealthState;
use tripboard::inbound::http::session_config::{BuildMode, session_settings_from_env};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(error) = fmt().with_env_filter(filter).json().try_init() {
        warn!(%error, "tracing subscriber already installed");
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
                return;
            }
            Err(error) => warn!(%error, "SIGTERM handler unavailable; waiting for Ctrl-C"),
        }
    }
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}

async fn drain_on_signal(health: web::Data<HealthState>, handle: ServerHandle) {
    shutdown_signal().await;
    info!("shutdown requested; draining");
    health.mark_unhealthy();
    handle.stop(true).await;
}

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    let bind_addr = settings.bind_addr()?;

    let http_state = build_http_state(&settings).await?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        http_state,
        ServerConfig::new(session, bind_addr),
    )
    .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "tripboard listening");

    actix_web::rt::spawn(drain_on_signal(health_state, server.handle()));
    server.await.wrap_err("server terminated with an error")
}
