//! Server-rendered document shell for the display settings page.
//!
//! SYSTEM CONTEXT
//! ==============
//! The root `<html>` element leaves the server already carrying
//! `data-theme` / `data-tile-style`, so the first paint uses the right
//! palette before any script runs. The page also carries the CSRF token the
//! client echoes back when persisting a change, and marks renders without a
//! session so the client knows device-local values are the only record.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use prefs::dom::{
    ANONYMOUS_SESSION, CATEGORY_LITE_CLASS, PREVIEW_CONTAINER_ID, SELECTED_CLASS, TILE_CLASS, TILE_LITE_CLASS,
};
use prefs::{ActivePreferences, ColorPalette, Preference, TileStyle};
use time::OffsetDateTime;

use super::auth::AuthUser;
use crate::services::csrf::{CSRF_COOKIE_NAME, MAX_AGE};
use crate::state::AppState;

const BOOT_SCRIPT: &str = r#"import init from "/pkg/client.js"; init();"#;

fn palette_label(palette: ColorPalette) -> &'static str {
    match palette {
        ColorPalette::RefinedPrun => "Refined PrUn",
        ColorPalette::PrunDefault => "PrUn Default",
        ColorPalette::HighContrast => "High Contrast",
        ColorPalette::Monochrome => "Monochrome",
    }
}

fn tile_style_label(style: TileStyle) -> &'static str {
    match style {
        TileStyle::Filled => "Filled",
        TileStyle::Lite => "Lite",
    }
}

fn choice_button(value: Preference, active: ActivePreferences) -> Markup {
    let selected = value == active.get(value.kind());
    let class = selected.then_some(SELECTED_CLASS);
    let pressed = if selected { "true" } else { "false" };
    match value {
        Preference::Palette(palette) => html! {
            button type="button" data-theme-choice=(palette.as_str()) class=[class] aria-pressed=(pressed) {
                (palette_label(palette))
            }
        },
        Preference::TileStyle(style) => html! {
            button type="button" data-tile-style-choice=(style.as_str()) class=[class] aria-pressed=(pressed) {
                (tile_style_label(style))
            }
        },
    }
}

/// Render the settings document for `active` values.
///
/// Pages rendered without a user carry `data-session="none"` so the client
/// shows device-local values before anything else.
pub(crate) fn render_settings(active: ActivePreferences, csrf_token: &str, user_name: Option<&str>) -> String {
    let is_lite = active.tile_style == TileStyle::Lite;
    let tile_class = if is_lite { format!("{TILE_CLASS} {TILE_LITE_CLASS}") } else { TILE_CLASS.to_owned() };
    let chip_class =
        if is_lite { format!("cat-consumables-basic {CATEGORY_LITE_CLASS}") } else { "cat-consumables-basic".to_owned() };
    let session = user_name.is_none().then_some(ANONYMOUS_SESSION);

    let page = html! {
        (DOCTYPE)
        html lang="en" data-theme=(active.color_palette.as_str()) data-tile-style=(active.tile_style.as_str())
            data-session=[session] {
            head {
                meta charset="utf-8";
                meta name="csrf-token" content=(csrf_token);
                title { "Display settings" }
                script type="module" { (PreEscaped(BOOT_SCRIPT)) }
            }
            body {
                div id="nav-spinner" aria-hidden="true" {}
                header {
                    @if let Some(name) = user_name {
                        "Signed in as " (name)
                    } @else {
                        "Not signed in. Changes are kept on this device."
                    }
                }
                section aria-label="Color palette" {
                    @for palette in ColorPalette::ALL {
                        (choice_button(Preference::Palette(palette), active))
                    }
                }
                section aria-label="Tile style" {
                    @for style in TileStyle::ALL {
                        (choice_button(Preference::TileStyle(style), active))
                    }
                }
                div id=(PREVIEW_CONTAINER_ID) {
                    div class=(tile_class) { "RAT" }
                    div class=(tile_class) { "H2O" }
                    span class=(chip_class) { "Consumables" }
                    span class="cat-legend" { "Legend" }
                }
            }
        }
    };
    page.into_string()
}

/// `GET /settings`: render the document shell and (re)issue the CSRF cookie.
pub async fn settings(State(state): State<AppState>, user: Option<AuthUser>, jar: CookieJar) -> Response {
    let active = match &user {
        None => ActivePreferences::default(),
        Some(auth) => match state.preferences.load(auth.user.id).await {
            Ok(stored) => stored.resolve(),
            Err(e) => {
                tracing::error!(error = %e, user_id = %auth.user.id, "preference load failed");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        },
    };

    let now = OffsetDateTime::now_utc();
    let token = match jar.get(CSRF_COOKIE_NAME).map(Cookie::value) {
        Some(existing) if state.csrf.is_fresh(existing, now) => existing.to_owned(),
        _ => state.csrf.issue_at(now),
    };
    let cookie = Cookie::build((CSRF_COOKIE_NAME, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.settings.cookie_secure)
        .max_age(MAX_AGE)
        .build();

    let body = render_settings(active, &token, user.as_ref().map(|a| a.user.name.as_str()));
    (jar.add(cookie), Html(body)).into_response()
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
