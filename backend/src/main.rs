//! Backend entry-point: reads the environment, applies migrations, and
//! starts the HTTP server.

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use derby_backend::inbound::http::health::HealthState;
use derby_backend::outbound::email::SmtpConfig;
use derby_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use derby_backend::server::{ServerConfig, create_server};

/// Load the cookie signing key, or a throwaway one in development.
fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

/// Build SMTP settings when a relay is configured, with the address fields
/// validated up front.
fn load_smtp_config() -> std::io::Result<Option<SmtpConfig>> {
    let Ok(relay) = env::var("SMTP_RELAY") else {
        return Ok(None);
    };
    let from = env::var("MAIL_FROM")
        .map_err(|_| std::io::Error::other("SMTP_RELAY set but MAIL_FROM missing"))?
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid MAIL_FROM: {e}")))?;
    let organiser = env::var("ORGANISER_EMAIL")
        .map_err(|_| std::io::Error::other("SMTP_RELAY set but ORGANISER_EMAIL missing"))?
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid ORGANISER_EMAIL: {e}")))?;
    let credentials = match (env::var("SMTP_USERNAME"), env::var("SMTP_PASSWORD")) {
        (Ok(username), Ok(password)) => Some((username, password)),
        _ => None,
    };

    Ok(Some(SmtpConfig {
        relay,
        credentials,
        from,
        organiser,
    }))
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

    let key = load_session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let mut config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr);

    match env::var("DATABASE_URL") {
        Ok(database_url) => {
            run_migrations(&database_url).map_err(std::io::Error::other)?;
            let pool = DbPool::new(PoolConfig::new(&database_url))
                .await
                .map_err(std::io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        Err(_) => warn!("DATABASE_URL not set; registrations are not persisted"),
    }

    match env::var("BLOB_DIR") {
        Ok(blob_dir) => config = config.with_blob_root(blob_dir.into()),
        Err(_) => warn!("BLOB_DIR not set; design files are discarded"),
    }

    match load_smtp_config()? {
        Some(smtp) => config = config.with_smtp(smtp),
        None => warn!("SMTP_RELAY not set; confirmation mail is disabled"),
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting registration backend");
    let server = create_server(health_state, config)?;
    server.await
}
