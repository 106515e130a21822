//! In-memory fakes for the document and persistence transport.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;

use crate::dom::{Document, Element, Match, Query};
use crate::sync::{PersistOutcome, PreferenceTransport};
use crate::{PreferenceForm, PreferenceKind};

// =============================================================================
// DOCUMENT
// =============================================================================

#[derive(Debug, Default)]
struct Node {
    id: Option<String>,
    container: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
}

#[derive(Clone, Debug)]
pub struct MemoryElement(Rc<RefCell<Node>>);

impl Element for MemoryElement {
    fn classes(&self) -> Vec<String> {
        self.0.borrow().classes.clone()
    }

    fn add_class(&self, class: &str) {
        let mut node = self.0.borrow_mut();
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_owned());
        }
    }

    fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.retain(|c| c != class);
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.0.borrow_mut().attributes.insert(name.to_owned(), value.to_owned());
    }
}

#[derive(Debug, Default)]
struct Page {
    root: BTreeMap<String, String>,
    nodes: Vec<MemoryElement>,
}

/// Flat document: a root element plus nodes optionally nested one level
/// under a container id.
#[derive(Clone, Debug, Default)]
pub struct MemoryDocument(Rc<RefCell<Page>>);

impl MemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document as rendered by the server with both root attributes set.
    #[must_use]
    pub fn rendered(theme: &str, tile_style: &str) -> Self {
        let doc = Self::new();
        doc.set_root_attribute(PreferenceKind::Palette.root_attribute(), theme);
        doc.set_root_attribute(PreferenceKind::TileStyle.root_attribute(), tile_style);
        doc
    }

    pub fn insert(&self, classes: &[&str]) -> MemoryElement {
        self.push(Node { classes: classes.iter().map(|c| (*c).to_owned()).collect(), ..Node::default() })
    }

    pub fn insert_within(&self, container: &str, classes: &[&str]) -> MemoryElement {
        self.push(Node {
            container: Some(container.to_owned()),
            classes: classes.iter().map(|c| (*c).to_owned()).collect(),
            ..Node::default()
        })
    }

    pub fn insert_container(&self, id: &str) -> MemoryElement {
        self.push(Node { id: Some(id.to_owned()), ..Node::default() })
    }

    pub fn insert_choice(&self, attribute: &str, value: &str) -> MemoryElement {
        let mut node = Node::default();
        node.attributes.insert(attribute.to_owned(), value.to_owned());
        self.push(node)
    }

    /// Class lists of every node in insertion order.
    #[must_use]
    pub fn class_snapshot(&self) -> Vec<Vec<String>> {
        self.0.borrow().nodes.iter().map(|el| el.classes()).collect()
    }

    fn push(&self, node: Node) -> MemoryElement {
        let el = MemoryElement(Rc::new(RefCell::new(node)));
        self.0.borrow_mut().nodes.push(el.clone());
        el
    }
}

fn node_matches(node: &Node, query: &Query) -> bool {
    if let Some(scope) = query.within {
        if node.container.as_deref() != Some(scope) {
            return false;
        }
    }
    match query.matcher {
        Match::Class(name) => node.classes.iter().any(|c| c == name),
        Match::ClassPrefix(prefix) => node.classes.iter().any(|c| c.starts_with(prefix)),
        Match::Attribute(name) => node.attributes.contains_key(name),
    }
}

impl Document for MemoryDocument {
    type Element = MemoryElement;

    fn root_attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().root.get(name).cloned()
    }

    fn set_root_attribute(&self, name: &str, value: &str) {
        self.0.borrow_mut().root.insert(name.to_owned(), value.to_owned());
    }

    fn query_all(&self, query: &Query) -> Vec<MemoryElement> {
        self.0
            .borrow()
            .nodes
            .iter()
            .filter(|el| node_matches(&el.0.borrow(), query))
            .cloned()
            .collect()
    }

    fn has_element_id(&self, id: &str) -> bool {
        self.0.borrow().nodes.iter().any(|el| el.0.borrow().id.as_deref() == Some(id))
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Transport that replays queued outcomes (default `Committed`) and records
/// every submitted form.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: RefCell<VecDeque<PersistOutcome>>,
    submitted: RefCell<Vec<PreferenceForm>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn answering(outcomes: impl IntoIterator<Item = PersistOutcome>) -> Rc<Self> {
        let t = Self::default();
        t.outcomes.borrow_mut().extend(outcomes);
        Rc::new(t)
    }

    #[must_use]
    pub fn submitted(&self) -> Vec<PreferenceForm> {
        self.submitted.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PreferenceTransport for ScriptedTransport {
    async fn submit(&self, form: &PreferenceForm) -> PersistOutcome {
        self.submitted.borrow_mut().push(form.clone());
        self.outcomes.borrow_mut().pop_front().unwrap_or(PersistOutcome::Committed)
    }
}
