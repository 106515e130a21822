//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Storage is held as trait objects so route tests can swap Postgres for
//! in-memory implementations without a live database.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::csrf::{CsrfError, CsrfSigner};
use crate::services::preferences::{PgPreferenceRepo, PreferenceRepo};
use crate::services::session::{PgSessionStore, SessionStore};

/// Settings handlers consult per request.
#[derive(Clone, Debug)]
pub struct RuntimeSettings {
    pub cookie_secure: bool,
    pub dev_auth_bypass: bool,
    pub session_ttl: time::Duration,
}

impl From<&ServerConfig> for RuntimeSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            cookie_secure: config.cookie_secure,
            dev_auth_bypass: config.dev_auth_bypass,
            session_ttl: config.session_ttl,
        }
    }
}

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub preferences: Arc<dyn PreferenceRepo>,
    pub csrf: CsrfSigner,
    pub settings: Arc<RuntimeSettings>,
}

impl AppState {
    /// State backed by Postgres.
    ///
    /// # Errors
    ///
    /// Returns [`CsrfError::InvalidKey`] when the configured secret is empty.
    pub fn new(pool: PgPool, config: &ServerConfig) -> Result<Self, CsrfError> {
        Ok(Self {
            sessions: Arc::new(PgSessionStore::new(pool.clone())),
            preferences: Arc::new(PgPreferenceRepo::new(pool)),
            csrf: CsrfSigner::new(&config.csrf_secret)?,
            settings: Arc::new(RuntimeSettings::from(config)),
        })
    }
}

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
