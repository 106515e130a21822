//! Cross-document messaging to a hosting frame.
//!
//! Requires a browser environment. Messages are posted with target origin
//! `*` because the hosting site is not known in advance, and they carry only
//! the page's own public URL.

use url::Url;
use wasm_bindgen::JsValue;

use super::nav::{EmbedMessage, is_embed_mode};

/// URL of the current page.
pub fn page_url() -> Option<Url> {
    let href = web_sys::window()?.location().href().ok()?;
    Url::parse(&href).ok()
}

fn is_top_level(window: &web_sys::Window) -> bool {
    match window.top() {
        Ok(Some(top)) => JsValue::from(top) == JsValue::from(window.clone()),
        _ => true,
    }
}

/// Whether this page is framed by a host that opted into embed mode.
pub fn detect() -> bool {
    let (Some(window), Some(page)) = (web_sys::window(), page_url()) else {
        return false;
    };
    is_embed_mode(is_top_level(&window), &page)
}

/// Post `message` to the parent frame. Failures are logged and dropped.
pub fn post_to_parent(message: &EmbedMessage) {
    let Some(parent) = web_sys::window().and_then(|w| w.parent().ok().flatten()) else {
        return;
    };
    let payload = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("could not encode embed message: {e}");
            return;
        }
    };
    let Ok(value) = js_sys::JSON::parse(&payload) else {
        return;
    };
    if let Err(e) = parent.post_message(&value, "*") {
        log::warn!("embed postMessage failed: {e:?}");
    }
}

/// Announce readiness and the current path to the parent frame.
pub fn announce_ready() {
    if let Some(page) = page_url() {
        post_to_parent(&EmbedMessage::ready(&page));
    }
}
