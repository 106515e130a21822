//! Preference persistence endpoint.
//!
//! ERROR HANDLING
//! ==============
//! Checks run in a fixed order so clients can classify responses: missing or
//! expired session → 401, CSRF failure → 403, unknown enum value → 422 (form
//! rejection), no preference field → 400. A 2xx means the row is committed.

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use prefs::{ActivePreferences, PreferenceForm};
use time::OffsetDateTime;

use super::auth::AuthUser;
use crate::services::csrf::CSRF_COOKIE_NAME;
use crate::services::preferences::{PreferenceError, PreferenceUpdate};
use crate::state::AppState;

pub(crate) fn preference_error_to_status(err: &PreferenceError) -> StatusCode {
    match err {
        PreferenceError::UserNotFound(_) => StatusCode::NOT_FOUND,
        PreferenceError::Empty => StatusCode::BAD_REQUEST,
        PreferenceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `POST /api/preferences`: partial update of the caller's stored values.
pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
    Form(form): Form<PreferenceForm>,
) -> Result<StatusCode, StatusCode> {
    let cookie_token = jar.get(CSRF_COOKIE_NAME).map(Cookie::value);
    if let Err(e) = state
        .csrf
        .verify_pair(cookie_token, &form.csrf_token, OffsetDateTime::now_utc())
    {
        tracing::warn!(error = %e, user_id = %auth.user.id, "preference update rejected");
        return Err(StatusCode::FORBIDDEN);
    }

    let update = PreferenceUpdate::from_values(&form.values());
    state
        .preferences
        .save(auth.user.id, update)
        .await
        .map_err(|e| {
            if matches!(e, PreferenceError::Database(_)) {
                tracing::error!(error = %e, user_id = %auth.user.id, "preference save failed");
            }
            preference_error_to_status(&e)
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/preferences`: the caller's values with defaults filled in.
pub async fn get_preferences(State(state): State<AppState>, auth: AuthUser) -> Result<Json<ActivePreferences>, StatusCode> {
    let stored = state.preferences.load(auth.user.id).await.map_err(|e| {
        tracing::error!(error = %e, user_id = %auth.user.id, "preference load failed");
        preference_error_to_status(&e)
    })?;
    Ok(Json(stored.resolve()))
}

#[cfg(test)]
#[path = "preferences_test.rs"]
mod tests;
