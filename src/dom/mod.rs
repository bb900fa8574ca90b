//! In-memory host document.
//!
//! The progress bar is a DOM widget: it creates an element, styles it, inserts
//! it into a container found by selector, and listens for transition-end
//! events. This module models exactly that slice of the DOM so the widget can
//! run (and be tested) without a browser.
//!
//! [`Document`] is a cheap, clonable handle to a shared node tree. [`Element`]
//! is a handle to one node in that tree. Both are `Send + Sync`; all access
//! goes through a single lock that is never held while a listener runs, so
//! listeners are free to mutate the document they were called from.
//!
//! # Basic Usage
//!
//! ```rust
//! use toprogress::dom::{Document, Event, ListenerAction, TRANSITION_END};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let doc = Document::new();
//! let container = doc.create_element("div");
//! container.set_id("container");
//! doc.body().append_child(&container);
//!
//! let found = doc.query_selector("#container").expect("container exists");
//! assert_eq!(found, container);
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let seen = Arc::clone(&calls);
//! container.add_event_listener(TRANSITION_END, move |_event| {
//!     seen.fetch_add(1, Ordering::SeqCst);
//!     ListenerAction::Remove
//! });
//!
//! container.dispatch_event(&Event::transition_end("width"));
//! container.dispatch_event(&Event::transition_end("width"));
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```

mod event;
mod selector;
mod style;

pub use event::{Event, ListenerAction, ListenerId, TRANSITION_END};
pub use selector::Selector;
pub use style::Style;

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};

type Callback = Box<dyn FnMut(&Event) -> ListenerAction + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeId(u64);

struct Listener {
    id: ListenerId,
    event_type: String,
    callback: Callback,
}

struct Node {
    tag: String,
    id: String,
    classes: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    style: Style,
    listeners: Vec<Listener>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: String::new(),
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
            style: Style::new(),
            listeners: Vec::new(),
        }
    }
}

struct Tree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    body: NodeId,
    next_node: u64,
    next_listener: u64,
    vendor_properties: HashSet<String>,
    /// Listeners taken out of their node while a dispatch calls them.
    in_flight: HashMap<ListenerId, NodeId>,
    /// In-flight listeners removed before their dispatch finished.
    cancelled: HashSet<ListenerId>,
}

impl Tree {
    fn new() -> Self {
        let root = NodeId(0);
        let body = NodeId(1);
        let mut nodes = HashMap::new();

        let mut html = Node::new("html");
        html.children.push(body);
        let mut body_node = Node::new("body");
        body_node.parent = Some(root);

        nodes.insert(root, html);
        nodes.insert(body, body_node);

        Self {
            nodes,
            root,
            body,
            next_node: 2,
            next_listener: 0,
            vendor_properties: HashSet::new(),
            in_flight: HashMap::new(),
            cancelled: HashSet::new(),
        }
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, Node::new(tag));
        id
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get_mut(&node).and_then(|n| n.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&child| child != node);
        }
    }

    /// Drops `node` and its subtree from the arena and returns them, so the
    /// caller can release their listeners after unlocking. Listeners of freed
    /// nodes that are mid-dispatch are cancelled.
    fn free(&mut self, node: NodeId) -> Vec<Node> {
        if node == self.root || node == self.body {
            return Vec::new();
        }
        self.detach(node);

        let mut freed = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&id) {
                stack.extend(removed.children.iter().copied());
                freed.push(removed);
            }
        }
        let in_flight: Vec<ListenerId> = self
            .in_flight
            .iter()
            .filter(|&(_, owner)| !self.nodes.contains_key(owner))
            .map(|(&id, _)| id)
            .collect();
        self.cancelled.extend(in_flight);
        freed
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(&node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Pre-order search from the root, the order `querySelector` uses.
    fn find(&self, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if pred(node) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        out.push('<');
        out.push_str(&node.tag);
        if !node.id.is_empty() {
            push_attr(out, "id", &node.id);
        }
        if !node.classes.is_empty() {
            push_attr(out, "class", &node.classes.join(" "));
        }
        if !node.style.is_empty() {
            push_attr(out, "style", &node.style.css_text());
        }
        out.push('>');
        for &child in &node.children {
            self.write_html(child, out);
        }
        out.push_str("</");
        out.push_str(&node.tag);
        out.push('>');
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

/// A shared handle to an in-memory document.
///
/// A fresh document contains `<html><body></body></html>`. Cloning the handle
/// does not copy the tree.
#[derive(Clone)]
pub struct Document {
    tree: Arc<Mutex<Tree>>,
}

impl Document {
    /// Creates a document with an empty `<body>`.
    pub fn new() -> Self {
        Self {
            tree: Arc::new(Mutex::new(Tree::new())),
        }
    }

    /// Creates a document whose elements recognise the given vendor-prefixed
    /// style properties (e.g. `WebkitTransition`).
    ///
    /// ```rust
    /// use toprogress::dom::Document;
    ///
    /// let doc = Document::with_vendor_properties(["WebkitTransition"]);
    /// assert!(doc.supports_vendor_property("WebkitTransition"));
    /// assert!(!doc.supports_vendor_property("OTransition"));
    /// ```
    pub fn with_vendor_properties<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let doc = Self::new();
        doc.tree
            .lock()
            .vendor_properties
            .extend(properties.into_iter().map(Into::into));
        doc
    }

    /// Whether elements of this document expose a vendor style property.
    pub fn supports_vendor_property(&self, property: &str) -> bool {
        self.tree.lock().vendor_properties.contains(property)
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Element {
        let root = self.tree.lock().root;
        self.element(root)
    }

    /// The `<body>` element.
    pub fn body(&self) -> Element {
        let body = self.tree.lock().body;
        self.element(body)
    }

    /// Creates a detached element.
    pub fn create_element(&self, tag: &str) -> Element {
        let node = self.tree.lock().alloc(tag);
        self.element(node)
    }

    /// Returns the first attached element, in document order, matching
    /// `selector`. Unsupported selector syntax matches nothing.
    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        let selector = Selector::parse(selector)?;
        let found = self
            .tree
            .lock()
            .find(|node| selector.matches(&node.tag, &node.id, &node.classes))?;
        Some(self.element(found))
    }

    /// Returns the first attached element whose id is `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        if id.is_empty() {
            return None;
        }
        let found = self.tree.lock().find(|node| node.id == id)?;
        Some(self.element(found))
    }

    /// Serializes the whole document.
    pub fn outer_html(&self) -> String {
        self.document_element().outer_html()
    }

    /// Number of nodes the document owns, attached or not.
    pub fn node_count(&self) -> usize {
        self.tree.lock().nodes.len()
    }

    fn element(&self, node: NodeId) -> Element {
        Element {
            doc: self.clone(),
            node,
        }
    }

    fn same_document(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.node_count())
            .finish()
    }
}

/// Handle to a single element of a [`Document`].
///
/// Two handles compare equal when they refer to the same node of the same
/// document. Operations on a node that does not belong to the handle's tree
/// (never the case for handles obtained from the document) are no-ops.
#[derive(Clone)]
pub struct Element {
    doc: Document,
    node: NodeId,
}

impl Element {
    /// The owning document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Lower-case tag name.
    pub fn tag_name(&self) -> String {
        self.read(|node| node.tag.clone()).unwrap_or_default()
    }

    /// The `id` attribute; empty when unset.
    pub fn id(&self) -> String {
        self.read(|node| node.id.clone()).unwrap_or_default()
    }

    /// Sets the `id` attribute.
    pub fn set_id(&self, id: &str) {
        self.write(|node| node.id = id.to_string());
    }

    /// Adds a class to the class list, ignoring duplicates.
    pub fn add_class(&self, class: &str) {
        self.write(|node| {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        });
    }

    /// Whether the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.read(|node| node.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Parent element, if attached.
    pub fn parent(&self) -> Option<Element> {
        let parent = self.read(|node| node.parent).flatten()?;
        Some(self.doc.element(parent))
    }

    /// Child elements in order.
    pub fn children(&self) -> Vec<Element> {
        self.read(|node| node.children.clone())
            .unwrap_or_default()
            .into_iter()
            .map(|id| self.doc.element(id))
            .collect()
    }

    /// The first child, if any.
    pub fn first_child(&self) -> Option<Element> {
        let first = self.read(|node| node.children.first().copied()).flatten()?;
        Some(self.doc.element(first))
    }

    /// Whether the element has children.
    pub fn has_child_nodes(&self) -> bool {
        self.read(|node| !node.children.is_empty()).unwrap_or(false)
    }

    /// Moves `child` to the end of this element's children.
    ///
    /// Appending an element to itself or to one of its descendants is ignored,
    /// as is appending an element from another document.
    pub fn append_child(&self, child: &Element) {
        self.insert(child, None);
    }

    /// Moves `child` before `reference`, or to the end when `reference` is
    /// `None` or not a child of this element.
    pub fn insert_before(&self, child: &Element, reference: Option<&Element>) {
        self.insert(child, reference.map(|r| r.node));
    }

    fn insert(&self, child: &Element, reference: Option<NodeId>) {
        if !self.doc.same_document(&child.doc) {
            return;
        }
        let mut tree = self.doc.tree.lock();
        if !tree.nodes.contains_key(&self.node)
            || !tree.nodes.contains_key(&child.node)
            || tree.is_ancestor_or_self(child.node, self.node)
        {
            return;
        }

        tree.detach(child.node);
        if let Some(node) = tree.nodes.get_mut(&child.node) {
            node.parent = Some(self.node);
        }
        if let Some(parent) = tree.nodes.get_mut(&self.node) {
            let index = reference
                .and_then(|r| parent.children.iter().position(|&c| c == r))
                .unwrap_or(parent.children.len());
            parent.children.insert(index, child.node);
        }
    }

    /// Removes the element from its parent. Its listeners stay registered.
    pub fn remove(&self) {
        self.doc.tree.lock().detach(self.node);
    }

    /// Removes the element from its parent and releases it and its subtree,
    /// listeners included. Handles to released nodes become inert.
    ///
    /// `<html>` and `<body>` cannot be disposed.
    ///
    /// ```rust
    /// use toprogress::dom::Document;
    ///
    /// let doc = Document::new();
    /// let el = doc.create_element("div");
    /// doc.body().append_child(&el);
    /// assert_eq!(doc.node_count(), 3);
    ///
    /// el.dispose();
    /// assert_eq!(doc.node_count(), 2);
    /// assert!(el.tag_name().is_empty());
    /// ```
    pub fn dispose(&self) {
        let freed = self.doc.tree.lock().free(self.node);
        // listener captures are dropped outside the lock
        drop(freed);
    }

    /// A handle that does not keep the document alive.
    pub fn downgrade(&self) -> WeakElement {
        WeakElement {
            tree: Arc::downgrade(&self.doc.tree),
            node: self.node,
        }
    }

    /// Whether the element is reachable from the document root.
    pub fn is_connected(&self) -> bool {
        let tree = self.doc.tree.lock();
        tree.is_ancestor_or_self(tree.root, self.node)
    }

    /// A snapshot of the inline style.
    pub fn style(&self) -> Style {
        self.read(|node| node.style.clone()).unwrap_or_default()
    }

    /// Value of one inline style property.
    pub fn style_value(&self, property: &str) -> Option<String> {
        self.read(|node| node.style.get(property).map(str::to_string))
            .flatten()
    }

    /// Sets one inline style property; an empty value removes it.
    pub fn set_style(&self, property: &str, value: &str) {
        tracing::trace!(property, value, "set style");
        self.write(|node| node.style.set(property, value));
    }

    /// Removes one inline style property.
    pub fn remove_style(&self, property: &str) {
        self.write(|node| {
            node.style.remove(property);
        });
    }

    /// Registers `callback` for events of `event_type`.
    ///
    /// The callback decides after each call whether it stays registered.
    pub fn add_event_listener<F>(&self, event_type: &str, callback: F) -> ListenerId
    where
        F: FnMut(&Event) -> ListenerAction + Send + 'static,
    {
        let mut tree = self.doc.tree.lock();
        let id = ListenerId(tree.next_listener);
        tree.next_listener += 1;
        if let Some(node) = tree.nodes.get_mut(&self.node) {
            node.listeners.push(Listener {
                id,
                event_type: event_type.to_string(),
                callback: Box::new(callback),
            });
        }
        id
    }

    /// Deregisters a listener. Returns whether it was registered.
    ///
    /// Removing a listener while it is being dispatched prevents it from being
    /// called again, including later in the same dispatch.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut tree = self.doc.tree.lock();
        if let Some(node) = tree.nodes.get_mut(&self.node) {
            if let Some(index) = node.listeners.iter().position(|l| l.id == id) {
                node.listeners.remove(index);
                return true;
            }
        }
        if tree.in_flight.get(&id) == Some(&self.node) {
            return tree.cancelled.insert(id);
        }
        false
    }

    /// Drops every listener registered on this element.
    pub fn clear_event_listeners(&self) {
        let mut tree = self.doc.tree.lock();
        if let Some(node) = tree.nodes.get_mut(&self.node) {
            node.listeners.clear();
        }
        let in_flight: Vec<ListenerId> = tree
            .in_flight
            .iter()
            .filter(|&(_, &node)| node == self.node)
            .map(|(&id, _)| id)
            .collect();
        tree.cancelled.extend(in_flight);
    }

    /// Number of registered listeners, excluding any currently dispatching.
    pub fn listener_count(&self) -> usize {
        self.read(|node| node.listeners.len()).unwrap_or(0)
    }

    /// Synchronously delivers `event` to this element's listeners for its type.
    ///
    /// Listeners run in registration order without the document lock held.
    /// Listeners added while dispatching are not called for this event.
    pub fn dispatch_event(&self, event: &Event) {
        tracing::trace!(
            event_type = event.event_type(),
            property = event.property_name(),
            "dispatch event"
        );

        let taken: Vec<Listener> = {
            let mut tree = self.doc.tree.lock();
            let Some(node) = tree.nodes.get_mut(&self.node) else {
                return;
            };
            let (taken, rest): (Vec<Listener>, Vec<Listener>) = node
                .listeners
                .drain(..)
                .partition(|l| l.event_type == event.event_type());
            node.listeners = rest;
            for listener in &taken {
                tree.in_flight.insert(listener.id, self.node);
            }
            taken
        };

        let taken_ids: Vec<ListenerId> = taken.iter().map(|l| l.id).collect();
        let mut kept = Vec::new();
        for mut listener in taken {
            if self.doc.tree.lock().cancelled.contains(&listener.id) {
                continue;
            }
            if (listener.callback)(event) == ListenerAction::Keep {
                kept.push(listener);
            }
        }

        let mut tree = self.doc.tree.lock();
        let mut restored = Vec::with_capacity(kept.len());
        for listener in kept {
            if !tree.cancelled.contains(&listener.id) {
                restored.push(listener);
            }
        }
        for id in taken_ids {
            tree.in_flight.remove(&id);
            tree.cancelled.remove(&id);
        }
        if let Some(node) = tree.nodes.get_mut(&self.node) {
            node.listeners.splice(0..0, restored);
        }
    }

    /// Serializes the element and its subtree.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.doc.tree.lock().write_html(self.node, &mut out);
        out
    }

    fn read<T>(&self, f: impl FnOnce(&Node) -> T) -> Option<T> {
        self.doc.tree.lock().nodes.get(&self.node).map(f)
    }

    fn write(&self, f: impl FnOnce(&mut Node)) {
        if let Some(node) = self.doc.tree.lock().nodes.get_mut(&self.node) {
            f(node);
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.doc.same_document(&other.doc)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (tag, id) = self
            .read(|node| (node.tag.clone(), node.id.clone()))
            .unwrap_or_default();
        f.debug_struct("Element")
            .field("tag", &tag)
            .field("id", &id)
            .finish()
    }
}

/// Non-owning handle to an element, from [`Element::downgrade`].
///
/// Listeners that need to reach back to their own element hold one of these,
/// so the tree never owns a strong reference to itself.
#[derive(Clone)]
pub struct WeakElement {
    tree: Weak<Mutex<Tree>>,
    node: NodeId,
}

impl WeakElement {
    /// The element, if its document is still alive.
    pub fn upgrade(&self) -> Option<Element> {
        let tree = self.tree.upgrade()?;
        Some(Element {
            doc: Document { tree },
            node: self.node,
        })
    }
}

impl fmt::Debug for WeakElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakElement")
            .field("alive", &(self.tree.strong_count() > 0))
            .finish()
    }
}
