//! Backend entry-point: wires configuration, persistence, and the HTTP server.

use std::env;
use std::net::SocketAddr;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use roster::inbound::http::health::HealthState;
use roster::inbound::http::session_config::{
    BuildMode, SessionSettings, key_fingerprint, session_settings_from_env,
};
use roster::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use roster::server::{ServerConfig, create_server};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

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

    let SessionSettings {
        key,
        cookie_secure,
        same_site,
    } = session_settings_from_env(&DefaultEnv::default(), BuildMode::from_debug_assertions())
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!(fingerprint = %key_fingerprint(&key), "session key loaded");

    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned())
        .parse()
        .map_err(|err| std::io::Error::other(format!("invalid BIND_ADDR: {err}")))?;

    let mut config = ServerConfig::new(key, cookie_secure, same_site, bind_addr);
    match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let migration_url = database_url.clone();
            web::block(move || run_pending_migrations(&migration_url))
                .await
                .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))?
                .map_err(|err| std::io::Error::other(err.to_string()))?;

            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            config = config.with_db_pool(pool);
            info!("using PostgreSQL user store");
        }
        Err(_) => {
            warn!("DATABASE_URL not set; using in-memory user store");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting server");
    let server = create_server(health_state, config)?;
    server.await
}
