//! Backend entry-point: loads settings, prepares persistence, and serves the
//! REST API with its OpenAPI docs.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lms_backend::config::AppSettings;
use lms_backend::inbound::http::health::HealthState;
use lms_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use lms_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{PaymentSettings, ServerConfig, create_server, ensure_admin_account};

fn config_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os()).map_err(config_error)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::current())
        .map_err(config_error)?;
    info!(
        fingerprint = %session.key_fingerprint(),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let bind_addr = settings.bind_addr().map_err(config_error)?;
    let payments = PaymentSettings::new(
        settings.payment_verifier_url().map_err(config_error)?,
        settings.payment_secret_key(),
        settings.payment_timeout().map_err(config_error)?,
        settings.payment_currency(),
    );
    let admin = settings.admin_bootstrap().map_err(config_error)?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        payments,
    );

    match settings.database_url() {
        Some(database_url) => {
            run_migrations(database_url).await.map_err(config_error)?;
            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .map_err(config_error)?;
            if let Some(admin) = admin.as_ref() {
                ensure_admin_account(&pool, admin).await?;
            }
            config = config.with_db_pool(pool);
        }
        None if BuildMode::current() == BuildMode::Release => {
            return Err(std::io::Error::other(
                "LMS_DATABASE_URL must be set in release builds",
            ));
        }
        None => {
            warn!("LMS_DATABASE_URL not set; serving fixture data (dev only)");
            if admin.is_some() {
                warn!("admin bootstrap skipped without a database");
            }
        }
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting HTTP server");
    create_server(health_state, config)?.await
}
