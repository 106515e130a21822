//! Link and form activation policy for the navigation spinner and the
//! iframe embed bridge.
//!
//! SYSTEM CONTEXT
//! ==============
//! These are pure decisions over URLs and event flags so they can be tested
//! natively; `util::embed` and `util::spinner` carry them out in the browser.
//!
//! The embed protocol is two fire-and-forget messages from child to parent:
//! `pru:ready` once after load and `pru:navigate` in place of a link
//! navigation. There is no acknowledgement and nothing is received.

use serde::Serialize;
use url::Url;

/// Query parameter a hosting frame sets to opt into embed mode.
pub const EMBED_QUERY_PARAM: &str = "embed";

/// Message posted to the parent frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum EmbedMessage {
    #[serde(rename = "pru:ready")]
    Ready { path: String, url: String },
    #[serde(rename = "pru:navigate")]
    Navigate {
        path: Option<String>,
        url: String,
        #[serde(skip_serializing_if = "is_false")]
        external: bool,
    },
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl EmbedMessage {
    #[must_use]
    pub fn ready(page: &Url) -> Self {
        Self::Ready { path: path_of(page), url: page.to_string() }
    }
}

/// Embed mode requires both a foreign top-level context and the explicit
/// `embed=1` opt-in.
#[must_use]
pub fn is_embed_mode(is_top_level: bool, page: &Url) -> bool {
    !is_top_level && page.query_pairs().any(|(k, v)| k == EMBED_QUERY_PARAM && v == "1")
}

/// Path, query and fragment of `url`, as a hosting frame would route it.
#[must_use]
pub fn path_of(url: &Url) -> String {
    let mut out = url.path().to_owned();
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// What the user activated on an anchor.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinkActivation<'a> {
    /// Raw `href` attribute, unresolved.
    pub href: &'a str,
    pub target: Option<&'a str>,
    pub download: bool,
    /// Any of ctrl/meta/shift/alt held.
    pub modified: bool,
    /// `MouseEvent.button`; 0 is the primary button.
    pub button: i16,
}

/// How to handle a link activation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkAction {
    /// Leave it to the browser with no spinner.
    Ignore,
    /// Let the browser navigate and show the loading indicator.
    ShowSpinner,
    /// Prevent navigation and post this message to the parent frame.
    PostToParent(EmbedMessage),
}

fn opens_elsewhere(target: Option<&str>) -> bool {
    target.is_some_and(|t| !t.is_empty() && !t.eq_ignore_ascii_case("_self"))
}

/// Decide what a link activation on `page` should do.
#[must_use]
pub fn link_action(page: &Url, embed: bool, link: &LinkActivation<'_>) -> LinkAction {
    if link.modified || link.button != 0 || link.download || opens_elsewhere(link.target) {
        return LinkAction::Ignore;
    }
    let href = link.href.trim();
    if href.is_empty() || href.starts_with('#') {
        return LinkAction::Ignore;
    }
    let Ok(resolved) = page.join(href) else {
        return LinkAction::Ignore;
    };
    if !matches!(resolved.scheme(), "http" | "https") {
        return LinkAction::Ignore;
    }

    if embed {
        let message = if resolved.host_str() == page.host_str() {
            EmbedMessage::Navigate { path: Some(path_of(&resolved)), url: resolved.to_string(), external: false }
        } else {
            EmbedMessage::Navigate { path: None, url: resolved.to_string(), external: true }
        };
        return LinkAction::PostToParent(message);
    }

    if resolved.origin() != page.origin() || same_document(page, &resolved) {
        return LinkAction::Ignore;
    }
    LinkAction::ShowSpinner
}

fn same_document(page: &Url, target: &Url) -> bool {
    let mut a = page.clone();
    let mut b = target.clone();
    a.set_fragment(None);
    b.set_fragment(None);
    a == b && target.fragment().is_some()
}

/// Whether a form submission should show the loading indicator.
#[must_use]
pub fn form_shows_spinner(target: Option<&str>, opted_out: bool) -> bool {
    !opted_out && !opens_elsewhere(target)
}

#[cfg(test)]
#[path = "nav_test.rs"]
mod tests;
