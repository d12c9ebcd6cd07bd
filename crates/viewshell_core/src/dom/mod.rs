//! Arena-backed HTML document model.
//!
//! # Responsibility
//! - Hold the shell page and parsed view fragments as node trees.
//! - Provide the DOM operations the router and widgets rely on.
//!
//! # Invariants
//! - `NodeId`s are never reused within one document, so side tables keyed by
//!   `NodeId` never alias a different node after a view swap. Arena slots are
//!   recycled, but each reuse bumps the slot generation carried by the id.
//! - Subtrees dropped by `remove_children` are freed; ids into them go stale
//!   and every accessor treats a stale id as a disconnected, empty node.
//! - A node has at most one parent; appending an attached node re-parents it.
//! - A `NodeId` is only meaningful for the document that allocated it.

mod html;
mod selector;

pub use selector::{Selector, SelectorError};

/// Stable handle of one node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    /// Arena slot index, mostly useful for logging.
    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// Element tag and attributes. Tag names are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|value| value.split_whitespace().any(|item| item == class))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Mutable HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document holding only the document node.
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node {
                    parent: None,
                    children: Vec::new(),
                    kind: NodeKind::Document,
                }),
            }],
            free: Vec::new(),
        }
    }

    /// Parses a full HTML document. Malformed markup is recovered, never rejected.
    pub fn parse_html(source: &str) -> Self {
        html::parse_document(source)
    }

    pub fn root(&self) -> NodeId {
        NodeId {
            index: 0,
            generation: 0,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// `None` once `id` has been freed.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|node| &node.kind)
    }

    /// Whether `id` still refers to an allocated node.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Allocated arena slots, live or free.
    pub fn arena_len(&self) -> usize {
        self.slots.len()
    }

    pub fn live_nodes(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id)? {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|data| data.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.is_element(*child))
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root()).next()
    }

    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|child| self.tag_name(*child) == Some("body"))
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment(text.into()))
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            parent: None,
            children: Vec::new(),
            kind,
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Frees `id` and its descendants. The caller has already unlinked `id`.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            stack.extend(node.children.iter().copied());
            let slot = &mut self.slots[current.index];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
        }
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    /// Stale ids and appending the root are ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if child == self.root() || !self.is_live(parent) || !self.is_live(child) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    /// Removes `id` from its parent. The subtree stays allocated but disconnected.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node_mut(id).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|child| *child != id);
        }
    }

    /// Drops every child of `id` and frees their subtrees.
    pub fn remove_children(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let children = std::mem::take(&mut node.children);
        for child in children {
            self.release(child);
        }
    }

    /// Whether `id` holds an element or non-whitespace text child.
    pub fn has_content(&self, id: NodeId) -> bool {
        self.children(id)
            .iter()
            .any(|child| match self.kind(*child) {
                Some(NodeKind::Element(_)) => true,
                Some(NodeKind::Text(text)) => !text.trim().is_empty(),
                _ => false,
            })
    }

    /// Returns whether `id` is reachable from the document node.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root() {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|data| data.attribute(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(data) = self.element_mut(id) else {
            return;
        };
        match data.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(data) = self.element_mut(id) {
            data.attrs.retain(|(key, _)| key != name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .map(|data| data.has_class(class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        self.toggle_class(id, class, true);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.toggle_class(id, class, false);
    }

    /// Forces `class` present (`on == true`) or absent.
    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) {
        if !self.is_element(id) || self.has_class(id, class) == on {
            return;
        }
        let current = self.attribute(id, "class").unwrap_or_default();
        let mut classes: Vec<&str> = current
            .split_whitespace()
            .filter(|item| *item != class)
            .collect();
        if on {
            classes.push(class);
        }
        let joined = classes.join(" ");
        self.set_attribute(id, "class", &joined);
    }

    /// Reads one inline style declaration.
    pub fn style_property(&self, id: NodeId, name: &str) -> Option<String> {
        parse_style(self.attribute(id, "style")?)
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: &str) {
        let mut declarations = parse_style(self.attribute(id, "style").unwrap_or_default());
        match declarations.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => declarations.push((name.to_string(), value.to_string())),
        }
        self.set_attribute(id, "style", &format_style(&declarations));
    }

    pub fn remove_style_property(&mut self, id: NodeId, name: &str) {
        let Some(style) = self.attribute(id, "style") else {
            return;
        };
        let mut declarations = parse_style(style);
        declarations.retain(|(key, _)| key != name);
        if declarations.is_empty() {
            self.remove_attribute(id, "style");
        } else {
            self.set_attribute(id, "style", &format_style(&declarations));
        }
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(NodeKind::Text(text)) = self.kind(id) {
            return text.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match self.kind(node) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replaces all children with a single text node. A lone text child is
    /// rewritten in place.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if self.write_text(id, text) {
            return;
        }
        if let [only] = self.children(id) {
            let only = *only;
            if !text.is_empty() && self.write_text(only, text) {
                return;
            }
        }
        if !self.is_live(id) {
            return;
        }
        self.remove_children(id);
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node);
        }
    }

    /// Overwrites a text node. `false` when `id` is not a live text node.
    fn write_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.node_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Text(existing)) => {
                existing.clear();
                existing.push_str(text);
                true
            }
            _ => false,
        }
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.element(id)
            .map(|data| selector.matches(data))
            .unwrap_or(false)
    }

    /// First matching descendant of `scope` in document order.
    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|node| self.matches(*node, selector))
    }

    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.matches(*node, selector))
            .collect()
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.matches(node, selector) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|node| self.attribute(*node, "id") == Some(element_id))
    }

    /// Deep-copies `node` out of `source` into this document, unattached.
    /// `None` when `node` is stale in `source`.
    pub fn import_node(&mut self, source: &Document, node: NodeId) -> Option<NodeId> {
        let snapshot = source.snapshot(node)?;
        self.build_from_snapshot(snapshot)
    }

    /// Deep-copies `node` within this document, unattached.
    pub fn clone_subtree(&mut self, node: NodeId) -> Option<NodeId> {
        let snapshot = self.snapshot(node)?;
        self.build_from_snapshot(snapshot)
    }

    fn snapshot(&self, node: NodeId) -> Option<Vec<(Option<usize>, NodeKind)>> {
        let mut out = vec![(None, self.kind(node)?.clone())];
        let mut stack: Vec<(usize, NodeId)> = self
            .children(node)
            .iter()
            .rev()
            .map(|child| (0, *child))
            .collect();
        while let Some((parent_slot, current)) = stack.pop() {
            let Some(kind) = self.kind(current) else {
                continue;
            };
            let slot = out.len();
            out.push((Some(parent_slot), kind.clone()));
            stack.extend(self.children(current).iter().rev().map(|child| (slot, *child)));
        }
        Some(out)
    }

    fn build_from_snapshot(
        &mut self,
        snapshot: Vec<(Option<usize>, NodeKind)>,
    ) -> Option<NodeId> {
        let mut created: Vec<NodeId> = Vec::with_capacity(snapshot.len());
        for (parent_slot, kind) in snapshot {
            let id = self.alloc(kind);
            if let Some(parent) = parent_slot.and_then(|slot| created.get(slot).copied()) {
                self.append_child(parent, id);
            }
            created.push(id);
        }
        created.first().copied()
    }

    /// Serialized children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            html::write_node(self, *child, &mut out);
        }
        out
    }

    /// Serialized `id` including its own tag.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        html::write_node(self, id, &mut out);
        out
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

fn format_style(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(key, value)| format!("{key}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}
