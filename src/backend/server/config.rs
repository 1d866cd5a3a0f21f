/**
 * Server Configuration
 *
 * Environment-driven settings of `classchat-server` and the optional
 * Postgres connection.
 *
 * | Variable               | Default              |
 * |------------------------|----------------------|
 * | `SERVER_PORT`          | `3000`               |
 * | `DATABASE_URL`         | unset (in-memory)    |
 * | `JWT_SECRET`           | development secret   |
 * | `ALLOWED_EMAIL_DOMAIN` | `@sahyadri.edu.in`   |
 * | `STATIC_DIR`           | `public`             |
 *
 * A missing or unreachable database is not fatal: the server falls back to
 * the in-memory store and directory.
 */
use std::path::PathBuf;

use sqlx::PgPool;

use crate::shared::config::{normalize_domain, ConfigError, DEFAULT_EMAIL_DOMAIN};

const DEV_JWT_SECRET: &str = "classchat-dev-secret-change-me";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Admitted email suffix, lower-case, starting with '@'
    pub allowed_email_domain: String,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            allowed_email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            static_dir: PathBuf::from("public"),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("SERVER_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                field: "SERVER_PORT",
                reason: e.to_string(),
            })?,
            None => defaults.port,
        };

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("[Server] JWT_SECRET not set, using the development secret");
                defaults.jwt_secret
            }
        };

        let allowed_email_domain = match lookup("ALLOWED_EMAIL_DOMAIN") {
            Some(domain) => normalize_domain(&domain)?,
            None => defaults.allowed_email_domain,
        };

        Ok(Self {
            port,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            jwt_secret,
            allowed_email_domain,
            static_dir: lookup("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
        })
    }
}

/// Connect to Postgres and run migrations
///
/// Returns `None` when no URL is configured or the connection fails.
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        tracing::warn!("[Server] DATABASE_URL not set, using the in-memory store");
        return None;
    };

    tracing::info!("[Server] Connecting to database...");
    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("[Server] Failed to create database connection pool: {:?}", e);
            tracing::warn!("[Server] Falling back to the in-memory store");
            return None;
        }
    };

    match sqlx::migrate!().run(&pool).await {
        Ok(()) => tracing::info!("[Server] Database migrations completed"),
        Err(e) => {
            tracing::error!("[Server] Failed to run database migrations: {}", e);
            tracing::warn!("[Server] Continuing; the schema might not be up to date");
        }
    }

    Some(pool)
}
