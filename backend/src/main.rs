//! Backend entry-point: loads settings, prepares storage and serves the
//! job board API.

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use jobboard::inbound::http::health::HealthState;
use jobboard::inbound::http::session_config::fingerprint::key_fingerprint;
use jobboard::inbound::http::session_config::{BuildMode, session_settings_from_env};
use jobboard::outbound::persistence::{DbPool, PoolConfig, bootstrap_schema};
use jobboard::server::{ServerConfig, create_server};
use jobboard::settings::AppSettings;
use ortho_config::OrthoConfig;

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

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let session = session_settings_from_env(&settings, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr(),
    )
    .with_retry_policy(settings.retry_policy());

    if let Some(url) = settings.database_url.as_deref() {
        let mut pool_config = PoolConfig::new(url);
        if let Some(size) = settings.database_pool_size {
            pool_config = pool_config.with_max_size(size);
        }
        let pool = DbPool::new(pool_config)
            .await
            .map_err(std::io::Error::other)?;
        bootstrap_schema(&pool)
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    } else {
        warn!("no database configured; state is kept in memory and lost on restart");
    }

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");

    let handle = server.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            health_state.mark_draining();
            handle.stop(true).await;
        }
    });

    server.await
}
