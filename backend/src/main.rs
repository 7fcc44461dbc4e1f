//! Server entry-point: loads settings, prepares the database and serves the
//! REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use progression::inbound::http::health::HealthState;
use progression::outbound::persistence::{DbPool, migrate};
use server::{AppSettings, ServerConfig, create_server};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!(error = %err, "{context}");
    std::io::Error::other(format!("{context}: {err}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| startup_error("failed to load settings", err))?;
    let database_url = settings
        .database_url()
        .map_err(|err| startup_error("invalid settings", err))?
        .to_owned();
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| startup_error("invalid settings", err))?;

    if settings.run_migrations() {
        migrate(database_url.clone())
            .await
            .map_err(|err| startup_error("database migration failed", err))?;
    }
    let pool = DbPool::new(settings.pool_config(&database_url))
        .await
        .map_err(|err| startup_error("database pool unavailable", err))?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        &ServerConfig::new(bind_addr).with_db_pool(pool),
    )?;
    info!(%bind_addr, "progression server listening");
    health_state.mark_ready();

    let result = server.await;
    health_state.mark_unhealthy();
    result
}
