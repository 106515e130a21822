use axum::body::Body;
use axum::http::{HeaderMap, Request, header};
use http_body_util::BodyExt;
use prefs::{ColorPalette, TileStyle};
use tower::ServiceExt;

use super::*;
use crate::services::preferences::StoredPreferences;
use crate::state::test_helpers::{MemoryDb, test_app_state, test_app_state_with};

const FORM: &str = "application/x-www-form-urlencoded";

async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let resp = app(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

fn set_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| {
            let pair = raw.split(';').next()?;
            let (k, v) = pair.split_once('=')?;
            (k.trim() == name).then(|| v.to_owned())
        })
}

fn post_form(cookies: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/preferences")
        .header(header::CONTENT_TYPE, FORM)
        .header(header::COOKIE, cookies)
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn get_with(uri: &str, cookies: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookies)
        .body(Body::empty())
        .unwrap()
}

async fn signed_in(db: &MemoryDb) -> (uuid::Uuid, String) {
    let (user, token) = db.signed_in("trader").await;
    (user.id, token)
}

// =============================================================================
// health
// =============================================================================

#[tokio::test]
async fn healthz_ok() {
    let (state, _) = test_app_state();
    let (status, _, _) = send(&state, Request::builder().uri("/healthz").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// POST /api/preferences
// =============================================================================

#[tokio::test]
async fn post_without_session_is_401_before_csrf() {
    let (state, _) = test_app_state();
    let (status, _, _) = send(&state, post_form("", "tile_style=lite&csrf_token=bogus")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn post_with_unknown_session_is_401() {
    let (state, _) = test_app_state();
    let (status, _, _) = send(&state, post_form("session_token=nope", "tile_style=lite")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn post_commits_partial_update() {
    let (state, db) = test_app_state();
    let (user_id, session) = signed_in(&db).await;
    let csrf = state.csrf.issue();

    let cookies = format!("session_token={session}; csrf_token={csrf}");
    let (status, _, _) = send(&state, post_form(&cookies, &format!("tile_style=lite&csrf_token={csrf}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        db.stored(user_id),
        Some(StoredPreferences { color_palette: None, tile_style: Some("lite".into()) })
    );

    let body = format!("color_palette=high-contrast&csrf_token={csrf}");
    let (status, _, _) = send(&state, post_form(&cookies, &body)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        db.stored(user_id),
        Some(StoredPreferences { color_palette: Some("high-contrast".into()), tile_style: Some("lite".into()) })
    );
}

#[tokio::test]
async fn post_accepts_client_encoded_form() {
    let (state, db) = test_app_state();
    let (user_id, session) = signed_in(&db).await;
    let csrf = state.csrf.issue();
    let body = prefs::PreferenceForm::new(csrf.clone())
        .with(prefs::Preference::Palette(ColorPalette::Monochrome))
        .with(prefs::Preference::TileStyle(TileStyle::Lite))
        .encode()
        .unwrap();

    let cookies = format!("session_token={session}; csrf_token={csrf}");
    let (status, _, _) = send(&state, post_form(&cookies, &body)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        db.stored(user_id),
        Some(StoredPreferences { color_palette: Some("monochrome".into()), tile_style: Some("lite".into()) })
    );
}

#[tokio::test]
async fn post_with_mismatched_csrf_is_403() {
    let (state, db) = test_app_state();
    let (user_id, session) = signed_in(&db).await;
    let cookie_token = state.csrf.issue();
    let form_token = state.csrf.issue();

    let cookies = format!("session_token={session}; csrf_token={cookie_token}");
    let (status, _, _) = send(&state, post_form(&cookies, &format!("tile_style=lite&csrf_token={form_token}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(db.stored(user_id), Some(StoredPreferences::default()));
}

#[tokio::test]
async fn post_without_csrf_field_is_403() {
    let (state, db) = test_app_state();
    let (_, session) = signed_in(&db).await;
    let csrf = state.csrf.issue();

    let cookies = format!("session_token={session}; csrf_token={csrf}");
    let (status, _, _) = send(&state, post_form(&cookies, "tile_style=lite")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn post_with_unknown_value_is_422() {
    let (state, db) = test_app_state();
    let (_, session) = signed_in(&db).await;
    let csrf = state.csrf.issue();

    let cookies = format!("session_token={session}; csrf_token={csrf}");
    let (status, _, _) = send(&state, post_form(&cookies, &format!("color_palette=neon&csrf_token={csrf}"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn post_without_preference_fields_is_400() {
    let (state, db) = test_app_state();
    let (_, session) = signed_in(&db).await;
    let csrf = state.csrf.issue();

    let cookies = format!("session_token={session}; csrf_token={csrf}");
    let (status, _, _) = send(&state, post_form(&cookies, &format!("csrf_token={csrf}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// GET /api/preferences
// =============================================================================

#[tokio::test]
async fn get_preferences_requires_session() {
    let (state, _) = test_app_state();
    let (status, _, _) = send(&state, get_with("/api/preferences", "")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_preferences_fills_defaults() {
    let (state, db) = test_app_state();
    let (user_id, session) = signed_in(&db).await;
    db.put_raw(user_id, StoredPreferences { color_palette: None, tile_style: Some("lite".into()) });

    let (status, _, body) = send(&state, get_with("/api/preferences", &format!("session_token={session}"))).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, serde_json::json!({"color_palette": "refined-prun", "tile_style": "lite"}));
}

// =============================================================================
// GET /settings
// =============================================================================

#[tokio::test]
async fn settings_anonymous_renders_defaults_and_sets_csrf_cookie() {
    let (state, _) = test_app_state();
    let (status, headers, body) = send(&state, get_with("/settings", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"data-theme="refined-prun""#));
    assert!(body.contains(r#"data-tile-style="filled""#));
    assert!(body.contains(r#"data-session="none""#));

    let token = set_cookie(&headers, "csrf_token").expect("csrf cookie");
    assert!(body.contains(&format!(r#"<meta name="csrf-token" content="{token}">"#)));
    assert!(state.csrf.is_fresh(&token, time::OffsetDateTime::now_utc()));
}

#[tokio::test]
async fn settings_reuses_fresh_csrf_cookie() {
    let (state, _) = test_app_state();
    let existing = state.csrf.issue();
    let (_, headers, body) = send(&state, get_with("/settings", &format!("csrf_token={existing}"))).await;
    assert_eq!(set_cookie(&headers, "csrf_token"), Some(existing.clone()));
    assert!(body.contains(&existing));
}

#[tokio::test]
async fn settings_replaces_invalid_csrf_cookie() {
    let (state, _) = test_app_state();
    let (_, headers, _) = send(&state, get_with("/settings", "csrf_token=forged.1.00")).await;
    let token = set_cookie(&headers, "csrf_token").expect("csrf cookie");
    assert_ne!(token, "forged.1.00");
}

#[tokio::test]
async fn settings_reflects_stored_preferences() {
    let (state, db) = test_app_state();
    let (user_id, session) = signed_in(&db).await;
    db.put_raw(
        user_id,
        StoredPreferences { color_palette: Some("monochrome".into()), tile_style: Some("lite".into()) },
    );

    let (_, _, body) = send(&state, get_with("/settings", &format!("session_token={session}"))).await;
    assert!(body.contains(r#"data-theme="monochrome""#));
    assert!(body.contains(r#"data-tile-style="lite""#));
    assert!(body.contains("Signed in as trader"));
    assert!(!body.contains("data-session"));
}

#[tokio::test]
async fn settings_falls_back_on_unreadable_stored_value() {
    let (state, db) = test_app_state();
    let (user_id, session) = signed_in(&db).await;
    db.put_raw(user_id, StoredPreferences { color_palette: Some("retro".into()), tile_style: None });

    let (status, _, body) = send(&state, get_with("/settings", &format!("session_token={session}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"data-theme="refined-prun""#));
}

#[tokio::test]
async fn csrf_from_settings_page_is_accepted_by_post() {
    let (state, db) = test_app_state();
    let (user_id, session) = signed_in(&db).await;
    let (_, headers, _) = send(&state, get_with("/settings", &format!("session_token={session}"))).await;
    let csrf = set_cookie(&headers, "csrf_token").unwrap();

    let cookies = format!("session_token={session}; csrf_token={csrf}");
    let (status, _, _) = send(&state, post_form(&cookies, &format!("color_palette=prun-default&csrf_token={csrf}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(db.stored(user_id).unwrap().color_palette.as_deref(), Some("prun-default"));
}

// =============================================================================
// auth
// =============================================================================

fn dev_login(name: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/dev/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "name": name }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn dev_login_disabled_is_404() {
    let (state, _) = test_app_state();
    let (status, _, _) = send(&state, dev_login("alice")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dev_login_issues_session() {
    let (state, _) = test_app_state_with(true);
    let (status, headers, body) = send(&state, dev_login("alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("alice"));

    let session = set_cookie(&headers, "session_token").expect("session cookie");
    let (status, _, body) = send(&state, get_with("/api/auth/me", &format!("session_token={session}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("alice"));
}

#[tokio::test]
async fn dev_login_rejects_blank_name() {
    let (state, _) = test_app_state_with(true);
    let (status, _, _) = send(&state, dev_login("   ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_ends_session() {
    let (state, db) = test_app_state();
    let (_, session) = signed_in(&db).await;
    let cookies = format!("session_token={session}");

    let logout = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, &cookies)
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&state, logout).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(set_cookie(&headers, "session_token").as_deref(), Some(""));

    let (status, _, _) = send(&state, get_with("/api/auth/me", &cookies)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
