//! `web-sys` implementation of the `prefs` document abstraction.
//!
//! Requires a browser environment; the whole module is compiled only with
//! the `hydrate` feature.

use prefs::dom::{Document, Element, Query};
use wasm_bindgen::JsCast;

/// Meta tag carrying the CSRF token the server rendered into the page.
pub const CSRF_META_NAME: &str = "csrf-token";

#[derive(Clone)]
pub struct WebElement(web_sys::Element);

impl WebElement {
    pub fn element(&self) -> &web_sys::Element {
        &self.0
    }
}

impl Element for WebElement {
    fn classes(&self) -> Vec<String> {
        let list = self.0.class_list();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }

    fn add_class(&self, class: &str) {
        let _ = self.0.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.0.class_list().remove_1(class);
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let _ = self.0.set_attribute(name, value);
    }
}

#[derive(Clone)]
pub struct WebDocument(web_sys::Document);

impl WebDocument {
    /// The window's document, if running in a page.
    pub fn current() -> Option<Self> {
        web_sys::window().and_then(|w| w.document()).map(Self)
    }

    pub fn inner(&self) -> &web_sys::Document {
        &self.0
    }

    /// `content` of `<meta name="{name}">`.
    pub fn meta_content(&self, name: &str) -> Option<String> {
        self.0
            .query_selector(&format!("meta[name=\"{name}\"]"))
            .ok()
            .flatten()?
            .get_attribute("content")
    }
}

impl Document for WebDocument {
    type Element = WebElement;

    fn root_attribute(&self, name: &str) -> Option<String> {
        self.0.document_element()?.get_attribute(name)
    }

    fn set_root_attribute(&self, name: &str, value: &str) {
        if let Some(root) = self.0.document_element() {
            let _ = root.set_attribute(name, value);
        }
    }

    fn query_all(&self, query: &Query) -> Vec<WebElement> {
        let Ok(nodes) = self.0.query_selector_all(&query.to_css()) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .map(WebElement)
            .collect()
    }

    fn has_element_id(&self, id: &str) -> bool {
        self.0.get_element_by_id(id).is_some()
    }
}
