//! Server configuration from the process environment.
//!
//! DESIGN
//! ======
//! All variables are read once at startup into a `ServerConfig`. Parsing goes
//! through a lookup function so tests can feed a fixed map instead of
//! mutating process-wide environment.

use time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SESSION_TTL_HOURS: i64 = 168;
const DEV_CSRF_SECRET: &str = "dev-only-csrf-secret-change-me";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} required")]
    Missing(&'static str),
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings for the HTTP server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
    /// HMAC key for CSRF tokens.
    pub csrf_secret: String,
    pub cookie_secure: bool,
    /// Enables `POST /api/dev/login`.
    pub dev_auth_bypass: bool,
    pub db_max_connections: u32,
    pub session_ttl: Duration,
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `DATABASE_URL` is unset or a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let port = parse_number("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let db_max_connections = parse_number("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS)?;
        let ttl_hours = parse_number("SESSION_TTL_HOURS", lookup("SESSION_TTL_HOURS"), DEFAULT_SESSION_TTL_HOURS)?;
        if ttl_hours <= 0 {
            return Err(ConfigError::Invalid { key: "SESSION_TTL_HOURS", value: ttl_hours.to_string() });
        }

        let csrf_secret = match lookup("CSRF_SECRET").or_else(|| lookup("SECRET_KEY")) {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("CSRF_SECRET not set, using development secret");
                DEV_CSRF_SECRET.to_owned()
            }
        };
        let flag = |key: &str| lookup(key).and_then(|raw| parse_bool(&raw));

        Ok(Self {
            database_url,
            port,
            csrf_secret,
            cookie_secure: flag("COOKIE_SECURE").unwrap_or(false),
            dev_auth_bypass: flag("DEV_AUTH_BYPASS").unwrap_or(false),
            db_max_connections,
            session_ttl: Duration::hours(ttl_hours),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
