//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the preference API, auth endpoints and the settings
//! page under a single Axum router. The compiled client bundle is served as
//! static files under `/pkg`.

pub mod auth;
pub mod pages;
pub mod preferences;

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Resolve the directory holding the client's `wasm-pack` output.
fn pkg_dir() -> PathBuf {
    std::env::var("PKG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../client/pkg"))
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/settings", get(pages::settings))
        .route(
            "/api/preferences",
            get(preferences::get_preferences).post(preferences::update_preferences),
        )
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/dev/login", post(auth::dev_login))
        .route("/healthz", get(healthz))
        .nest_service("/pkg", ServeDir::new(pkg_dir()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
