//! Page-load wiring for server-rendered pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server renders `data-theme` / `data-tile-style` on `<html>` before any
//! script runs, so this module never decides initial values. It builds the
//! sync coordinator over the live document, installs delegated listeners for
//! choice controls, links, forms and HTMX swaps, and then starts migration.
//!
//! Listeners are delegated from `document` so controls and links that arrive
//! in a partial-page swap work without re-binding.

use std::rc::Rc;

use prefs::{Preference, PreferenceKind, PreferenceStore, SyncCoordinator};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;

use crate::net::api::FormTransport;
use crate::util::dom::{CSRF_META_NAME, WebDocument};
use crate::util::local_store::device_store;
use crate::util::nav::{LinkAction, LinkActivation, form_shows_spinner, link_action};
use crate::util::{embed, spinner};

type Coordinator = SyncCoordinator<WebDocument>;

/// Attribute that opts a form out of the loading indicator.
const NO_SPINNER_ATTR: &str = "data-no-spinner";
/// Event HTMX dispatches after swapping new content in.
const HTMX_AFTER_SWAP: &str = "htmx:afterSwap";

/// Run the page-load sequence.
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let Some(document) = WebDocument::current() else {
        return;
    };
    let csrf_token = document.meta_content(CSRF_META_NAME).unwrap_or_default();
    if csrf_token.is_empty() {
        log::debug!("no csrf token on page, preference saves will be rejected");
    }

    let coordinator = Rc::new(SyncCoordinator::new(
        document.clone(),
        PreferenceStore::new(device_store()),
        Rc::new(FormTransport::default()),
        csrf_token,
    ));
    let embedded = embed::detect();

    let migration = coordinator.initialize(|_| {
        listen(document.inner(), "click", {
            let coordinator = Rc::clone(&coordinator);
            move |event| on_click(&coordinator, embedded, &event)
        });
        listen(document.inner(), "submit", on_submit);
        listen(document.inner(), HTMX_AFTER_SWAP, {
            let coordinator = Rc::clone(&coordinator);
            move |_| {
                coordinator.reapply();
                coordinator.refresh_controls();
            }
        });
        if let Some(window) = web_sys::window() {
            listen(&window, "pageshow", |_| spinner::hide());
        }
    });

    if embedded {
        embed::announce_ready();
    }
    spawn_local(async move {
        let outcome = migration.await;
        log::debug!("preference migration: {outcome:?}");
    });
}

fn listen(target: &web_sys::EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    if target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref()).is_ok() {
        cb.forget();
    }
}

fn event_element(event: &web_sys::Event) -> Option<web_sys::Element> {
    event.target()?.dyn_into::<web_sys::Element>().ok()
}

fn on_click(coordinator: &Rc<Coordinator>, embedded: bool, event: &web_sys::Event) {
    let Some(target) = event_element(event) else {
        return;
    };
    if let Some(value) = chosen_preference(&target) {
        let pending = coordinator.set(value);
        spawn_local(async move {
            let _ = pending.await;
        });
        return;
    }
    if let Ok(Some(anchor)) = target.closest("a[href]") {
        on_link(&anchor, embedded, event);
    }
}

fn chosen_preference(target: &web_sys::Element) -> Option<Preference> {
    PreferenceKind::ALL.into_iter().find_map(|kind| {
        let attr = kind.choice_attribute();
        let control = target.closest(&format!("[{attr}]")).ok().flatten()?;
        let raw = control.get_attribute(attr)?;
        match Preference::parse(kind, &raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("ignoring choice control: {e}");
                None
            }
        }
    })
}

fn on_link(anchor: &web_sys::Element, embedded: bool, event: &web_sys::Event) {
    let Some(page) = embed::page_url() else {
        return;
    };
    let href = anchor.get_attribute("href").unwrap_or_default();
    let target = anchor.get_attribute("target");
    let (modified, button) = event
        .dyn_ref::<web_sys::MouseEvent>()
        .map_or((false, 0), |m| (m.ctrl_key() || m.meta_key() || m.shift_key() || m.alt_key(), m.button()));
    let activation = LinkActivation {
        href: &href,
        target: target.as_deref(),
        download: anchor.has_attribute("download"),
        modified,
        button,
    };
    match link_action(&page, embedded, &activation) {
        LinkAction::Ignore => {}
        LinkAction::ShowSpinner => spinner::show(),
        LinkAction::PostToParent(message) => {
            event.prevent_default();
            embed::post_to_parent(&message);
        }
    }
}

fn on_submit(event: web_sys::Event) {
    if event.default_prevented() {
        return;
    }
    let Some(form) = event_element(&event) else {
        return;
    };
    let target = form.get_attribute("target");
    if form_shows_spinner(target.as_deref(), form.has_attribute(NO_SPINNER_ATTR)) {
        spinner::show();
    }
}
