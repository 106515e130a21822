//! Page-level loading indicator shown while a navigation is in flight.
//!
//! Requires a browser environment.

/// Id of the server-rendered indicator element.
pub const SPINNER_ID: &str = "nav-spinner";
const VISIBLE_CLASS: &str = "visible";

fn indicator() -> Option<web_sys::Element> {
    web_sys::window()?.document()?.get_element_by_id(SPINNER_ID)
}

pub fn show() {
    if let Some(el) = indicator() {
        let _ = el.class_list().add_1(VISIBLE_CLASS);
    }
}

/// Hide again, e.g. when a page is restored from the back/forward cache with
/// the indicator still showing.
pub fn hide() {
    if let Some(el) = indicator() {
        let _ = el.class_list().remove_1(VISIBLE_CLASS);
    }
}
