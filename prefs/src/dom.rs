//! Minimal document abstraction for the reflector and coordinator.
//!
//! The browser implementation lives in the `client` crate on top of
//! `web-sys`; tests use an in-memory document. Both only need root-attribute
//! access, class-list edits, and a handful of query shapes.

/// Class carried by every primary material tile.
pub const TILE_CLASS: &str = "material-tile";
/// Modifier class on a tile rendered in lite style.
pub const TILE_LITE_CLASS: &str = "material-tile-lite";
/// Prefix shared by colored category chips (`cat-fuels`, `cat-metals`, ...).
pub const CATEGORY_PREFIX: &str = "cat-";
/// Modifier class on a category chip rendered in lite style.
pub const CATEGORY_LITE_CLASS: &str = "cat-lite";
/// Classes using the category prefix that are not colored category chips.
pub const NON_CATEGORY_CLASSES: [&str; 4] = ["cat-badge", "cat-list", "cat-filter", "cat-legend"];
/// Id of the settings-page container previewing the tile style.
pub const PREVIEW_CONTAINER_ID: &str = "theme-preview";
/// Class marking the selected choice control.
pub const SELECTED_CLASS: &str = "active";
/// Root attribute the server sets when it rendered the page without a session.
pub const SESSION_ATTRIBUTE: &str = "data-session";
/// Value of [`SESSION_ATTRIBUTE`] on anonymous renders.
pub const ANONYMOUS_SESSION: &str = "none";

/// What an element must carry to match a [`Query`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Match {
    Class(&'static str),
    ClassPrefix(&'static str),
    Attribute(&'static str),
}

/// An element query, optionally scoped to descendants of an element id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Query {
    pub matcher: Match,
    pub within: Option<&'static str>,
}

impl Query {
    #[must_use]
    pub const fn class(name: &'static str) -> Self {
        Self { matcher: Match::Class(name), within: None }
    }

    #[must_use]
    pub const fn class_prefix(prefix: &'static str) -> Self {
        Self { matcher: Match::ClassPrefix(prefix), within: None }
    }

    #[must_use]
    pub const fn attribute(name: &'static str) -> Self {
        Self { matcher: Match::Attribute(name), within: None }
    }

    #[must_use]
    pub const fn within(self, id: &'static str) -> Self {
        Self { matcher: self.matcher, within: Some(id) }
    }

    /// Render as a CSS selector list for `querySelectorAll`.
    ///
    /// A class-prefix query is a substring match, so it also hits names like
    /// `bobcat-icon` and lists separated by tabs or newlines. Callers re-check
    /// each class for the actual prefix.
    #[must_use]
    pub fn to_css(&self) -> String {
        let scope = self.within.map(|id| format!("#{id} ")).unwrap_or_default();
        match self.matcher {
            Match::Class(name) => format!("{scope}.{name}"),
            Match::ClassPrefix(prefix) => format!("{scope}[class*=\"{prefix}\"]"),
            Match::Attribute(name) => format!("{scope}[{name}]"),
        }
    }
}

/// A mutable handle onto one element.
///
/// Methods take `&self`: DOM handles are shared references into the page,
/// not owned values.
pub trait Element {
    fn classes(&self) -> Vec<String>;

    fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }

    fn add_class(&self, class: &str);

    fn remove_class(&self, class: &str);

    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str);
}

/// The page the reflector writes into.
pub trait Document {
    type Element: Element;

    fn root_attribute(&self, name: &str) -> Option<String>;

    fn set_root_attribute(&self, name: &str, value: &str);

    fn query_all(&self, query: &Query) -> Vec<Self::Element>;

    fn has_element_id(&self, id: &str) -> bool;
}

/// Add or remove `class` so its presence equals `on`. No-op when it already does.
pub fn set_class<E: Element + ?Sized>(element: &E, class: &str, on: bool) {
    match (on, element.has_class(class)) {
        (true, false) => element.add_class(class),
        (false, true) => element.remove_class(class),
        _ => {}
    }
}

#[cfg(test)]
#[path = "dom_test.rs"]
mod tests;
