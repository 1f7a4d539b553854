//! Headless document the controllers bind to.
//!
//! Elements are addressed by their `data-testid`. Listeners registered on an
//! element run synchronously on [`Document::dispatch`]; any async work they
//! start is returned as a [`Pending`] handle.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::task::JoinHandle;

pub type NodeId = usize;

/// Async work started by a handler, if any.
pub type Pending = Option<JoinHandle<()>>;

pub type Listener = Arc<dyn Fn(&mut Event) -> Pending + Send + Sync>;

/// Blocking user-facing message, like `window.alert`.
pub type Alert = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Change,
    Submit,
    Click,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
    default_prevented: bool,
}

impl Event {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A file picked through a file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub test_id: Option<String>,
    pub value: String,
    pub files: Vec<SelectedFile>,
    pub attributes: HashMap<String, String>,
    pub inner_html: String,
    parent: Option<NodeId>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_test_id(mut self, test_id: impl Into<String>) -> Self {
        self.test_id = Some(test_id.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    fn has_test_id(&self, test_id: &str) -> bool {
        self.test_id.as_deref() == Some(test_id)
    }

    fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// Parents always precede their children, so the walk terminates.
fn is_descendant(nodes: &[Element], node: &Element, root: NodeId) -> bool {
    let mut parent = node.parent;
    while let Some(current) = parent {
        if current == root {
            return true;
        }
        parent = nodes.get(current).and_then(|n| n.parent);
    }
    false
}

#[derive(Default)]
pub struct Document {
    nodes: RwLock<Vec<Element>>,
    listeners: RwLock<HashMap<(NodeId, EventKind), Vec<Listener>>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn nodes(&self) -> RwLockReadGuard<'_, Vec<Element>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn nodes_mut(&self) -> RwLockWriteGuard<'_, Vec<Element>> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, element: Element) -> NodeId {
        let mut nodes = self.nodes_mut();
        nodes.push(element);
        nodes.len() - 1
    }

    /// Appends `element` under `parent`. An unknown parent leaves the
    /// element at the top level.
    pub fn append_child(&self, parent: NodeId, mut element: Element) -> NodeId {
        let mut nodes = self.nodes_mut();
        element.parent = (parent < nodes.len()).then_some(parent);
        nodes.push(element);
        nodes.len() - 1
    }

    /// First element carrying `test_id`, in insertion order.
    pub fn query(&self, test_id: &str) -> Option<NodeId> {
        self.nodes().iter().position(|node| node.has_test_id(test_id))
    }

    pub fn query_all(&self, test_id: &str) -> Vec<NodeId> {
        self.nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.has_test_id(test_id))
            .map(|(id, _)| id)
            .collect()
    }

    /// First descendant of `root` carrying `test_id`.
    pub fn query_in(&self, root: NodeId, test_id: &str) -> Option<NodeId> {
        let nodes = self.nodes();
        nodes
            .iter()
            .position(|node| node.has_test_id(test_id) && is_descendant(&nodes, node, root))
    }

    /// First descendant of `root` whose `class` attribute lists `class`.
    pub fn query_class_in(&self, root: NodeId, class: &str) -> Option<NodeId> {
        let nodes = self.nodes();
        nodes
            .iter()
            .position(|node| node.has_class(class) && is_descendant(&nodes, node, root))
    }

    pub fn value(&self, node: NodeId) -> Option<String> {
        self.nodes().get(node).map(|n| n.value.clone())
    }

    /// Sets the element's value. An empty value also drops selected files,
    /// the way clearing a file input does.
    pub fn set_value(&self, node: NodeId, value: impl Into<String>) {
        if let Some(element) = self.nodes_mut().get_mut(node) {
            element.value = value.into();
            if element.value.is_empty() {
                element.files.clear();
            }
        }
    }

    pub fn files(&self, node: NodeId) -> Vec<SelectedFile> {
        self.nodes()
            .get(node)
            .map(|n| n.files.clone())
            .unwrap_or_default()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes()
            .get(node)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    pub fn set_attribute(&self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(element) = self.nodes_mut().get_mut(node) {
            element.attributes.insert(name.into(), value.into());
        }
    }

    pub fn inner_html(&self, node: NodeId) -> Option<String> {
        self.nodes().get(node).map(|n| n.inner_html.clone())
    }

    pub fn set_inner_html(&self, node: NodeId, html: impl Into<String>) {
        if let Some(element) = self.nodes_mut().get_mut(node) {
            element.inner_html = html.into();
        }
    }

    pub fn add_event_listener(&self, node: NodeId, kind: EventKind, listener: Listener) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((node, kind))
            .or_default()
            .push(listener);
    }

    /// Runs every listener bound to `node` for `kind`, in registration order.
    pub fn dispatch(&self, node: NodeId, kind: EventKind) -> Vec<JoinHandle<()>> {
        // Cloned out so listeners can touch the document without deadlocking.
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(node, kind))
            .cloned()
            .unwrap_or_default();

        let mut event = Event::new(kind, node);
        listeners
            .iter()
            .filter_map(|listener| listener(&mut event))
            .collect()
    }

    /// Selects `files` on a file input and fires its change event.
    pub fn upload(&self, node: NodeId, files: Vec<SelectedFile>) -> Vec<JoinHandle<()>> {
        if let Some(element) = self.nodes_mut().get_mut(node) {
            element.value = files
                .first()
                .map(|file| format!("C:\\fakepath\\{}", file.name))
                .unwrap_or_default();
            element.files = files;
        }
        self.dispatch(node, EventKind::Change)
    }

    pub fn submit(&self, form: NodeId) -> Vec<JoinHandle<()>> {
        self.dispatch(form, EventKind::Submit)
    }

    pub fn click(&self, node: NodeId) -> Vec<JoinHandle<()>> {
        self.dispatch(node, EventKind::Click)
    }
}
