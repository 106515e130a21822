//! Auth routes: session extractor, logout and the development login.

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::services::session::SessionUser;
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";
const MAX_DEV_NAME_LEN: usize = 64;

pub(crate) fn session_cookie(token: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication, or as
/// `Option<AuthUser>` where anonymous callers are fine.
pub struct AuthUser {
    pub user: SessionUser,
    pub token: String,
}

async fn session_from_parts(parts: &Parts, state: &AppState) -> Result<Option<AuthUser>, StatusCode> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
    if token.is_empty() {
        return Ok(None);
    }

    let user = state.sessions.validate_session(token).await.map_err(|e| {
        tracing::error!(error = %e, "session lookup failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(user.map(|user| AuthUser { user, token: token.to_owned() }))
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        session_from_parts(parts, &AppState::from_ref(state))
            .await?
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        session_from_parts(parts, &AppState::from_ref(state)).await
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/auth/me`: return current user.
pub async fn me(auth: AuthUser) -> Json<SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout`: delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = state.sessions.delete_session(&auth.token).await {
        tracing::warn!(error = %e, user_id = %auth.user.id, "session delete failed");
    }

    let cookie = session_cookie(String::new(), state.settings.cookie_secure, Duration::ZERO);
    (CookieJar::new().add(cookie), StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct DevLogin {
    name: String,
}

pub(crate) fn validate_dev_name(raw: &str) -> Option<&str> {
    let name = raw.trim();
    (!name.is_empty() && name.chars().count() <= MAX_DEV_NAME_LEN).then_some(name)
}

/// `POST /api/dev/login`: sign in by name without a password.
///
/// Enabled only when `DEV_AUTH_BYPASS=true`.
pub async fn dev_login(State(state): State<AppState>, Json(body): Json<DevLogin>) -> Response {
    if !state.settings.dev_auth_bypass {
        return StatusCode::NOT_FOUND.into_response();
    }
    let Some(name) = validate_dev_name(&body.name) else {
        return (StatusCode::BAD_REQUEST, "name must be 1-64 characters").into_response();
    };

    let user = match state.sessions.upsert_user(name).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "dev user upsert failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let token = match state.sessions.create_session(user.id, state.settings.session_ttl).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tracing::info!(user_id = %user.id, "dev login");
    let cookie = session_cookie(token, state.settings.cookie_secure, state.settings.session_ttl);
    (CookieJar::new().add(cookie), Json(user)).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
