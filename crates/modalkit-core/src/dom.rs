#![forbid(unsafe_code)]

//! Minimal element tree.
//!
//! The [`Document`] owns every node in a generational slot arena. Nodes are
//! addressed by [`NodeId`], a small copyable handle that never aliases a
//! different node after its slot is reused.
//!
//! # Invariants
//!
//! - The body node always exists and is the only root reachable from the
//!   document; detached subtrees are alive but not connected.
//! - A node has at most one parent, and a node is never its own ancestor.
//! - Children are kept in document order.
//! - The active element, when set, is alive, connected, and focusable.
//!   Removing or detaching the subtree that contains it clears focus.
//!
//! # Failure Modes
//!
//! - Operations on stale ids are no-ops returning `false`/`None`/empty.
//! - `append_child` refuses to create cycles or to re-parent the body.
//! - Focusing a node that cannot take focus leaves focus unchanged.

use std::fmt;

/// Generational handle of a node in a [`Document`].
///
/// On removal the slot is freed; reusing it bumps the generation so that
/// stale handles never refer to the new occupant.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    const fn idx(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Element tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Body,
    Main,
    Div,
    Header,
    Footer,
    /// Heading `h1..=h6`; levels outside the range render as `h6`.
    Heading(u8),
    Paragraph,
    Span,
    Button,
    Anchor,
    Input,
    TextArea,
    Select,
    Svg,
}

impl Tag {
    /// Markup name of the tag.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Main => "main",
            Self::Div => "div",
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Heading(1) => "h1",
            Self::Heading(2) => "h2",
            Self::Heading(3) => "h3",
            Self::Heading(4) => "h4",
            Self::Heading(5) => "h5",
            Self::Heading(_) => "h6",
            Self::Paragraph => "p",
            Self::Span => "span",
            Self::Button => "button",
            Self::Anchor => "a",
            Self::Input => "input",
            Self::TextArea => "textarea",
            Self::Select => "select",
            Self::Svg => "svg",
        }
    }

    /// Form controls honour the `disabled` attribute for activation.
    #[must_use]
    pub fn is_form_control(self) -> bool {
        matches!(
            self,
            Self::Button | Self::Input | Self::TextArea | Self::Select
        )
    }

    /// Elements that never have children in markup.
    #[must_use]
    pub fn is_void(self) -> bool {
        matches!(self, Self::Input)
    }
}

/// Direction of sequential (tab) navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TabDirection {
    Forward,
    Backward,
}

#[derive(Clone, Debug)]
pub(crate) enum NodeData {
    Element {
        tag: Tag,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// An element tree with focus state.
#[derive(Clone, Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    body: NodeId,
    active: Option<NodeId>,
    next_uid: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only the body.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            body: NodeId::new(0, 1),
            active: None,
            next_uid: 1,
        };
        doc.body = doc.alloc(NodeData::Element {
            tag: Tag::Body,
            attributes: Vec::new(),
        });
        doc
    }

    /// The document body (root of the connected tree).
    #[inline]
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.body
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            NodeId::new(index, slot.generation)
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 1,
                node: Some(node),
            });
            NodeId::new(index, 1)
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    pub(crate) fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).map(|n| &n.data)
    }

    // --- Construction ---

    /// Create a detached element.
    pub fn create_element(&mut self, tag: Tag) -> NodeId {
        self.alloc(NodeData::Element {
            tag,
            attributes: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    /// Whether `id` refers to a live node.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes, including the body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// A document always contains its body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Tag of an element node.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<Tag> {
        match self.data(id)? {
            NodeData::Element { tag, .. } => Some(*tag),
            NodeData::Text(_) => None,
        }
    }

    /// Whether `id` is a live element (not a text node).
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some()
    }

    /// Parent of a node, if attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children of a node in document order (empty for stale ids).
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    // --- Structure ---

    /// Append `child` as the last child of `parent`, detaching it first.
    ///
    /// Returns `false` (and changes nothing) when either id is stale, the
    /// parent is a text node, the child is the body, or the append would
    /// create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_element(parent) || !self.is_alive(child) || child == self.body {
            return false;
        }
        if self.contains(child, parent) {
            return false;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        true
    }

    /// Detach a node (and its subtree) from its parent without freeing it.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|c| *c != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
        if self.active.is_some_and(|a| self.contains(id, a)) {
            self.active = None;
        }
        true
    }

    /// Remove a node and free its whole subtree.
    ///
    /// The body cannot be removed. Returns `false` for stale ids.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.body || !self.is_alive(id) {
            return false;
        }
        self.detach(id);
        let mut doomed = self.descendants(id);
        doomed.push(id);
        if self.active.is_some_and(|a| doomed.contains(&a)) {
            self.active = None;
        }
        for node in doomed {
            let slot = &mut self.slots[node.idx()];
            slot.node = None;
            self.free.push(node.index);
        }
        true
    }

    /// Whether `node` is `ancestor` or lies inside its subtree.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) {
            return false;
        }
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// The node followed by its ancestors, innermost first.
    #[must_use]
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = self.is_alive(id).then_some(id);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.parent(current);
        }
        path
    }

    /// Whether the node is attached to the body.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.path_to_root(id).last() == Some(&self.body)
    }

    /// All descendants of `root` in document (pre-)order, excluding `root`.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    // --- Attributes ---

    /// Set (or replace) an attribute on an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> bool {
        let Some(Node {
            data: NodeData::Element { attributes, .. },
            ..
        }) = self.node_mut(id)
        else {
            return false;
        };
        let value = value.into();
        if let Some(entry) = attributes.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value;
        } else {
            attributes.push((name.to_owned(), value));
        }
        true
    }

    /// Attribute value, if present.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the attribute is present (boolean attributes).
    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        let Some(Node {
            data: NodeData::Element { attributes, .. },
            ..
        }) = self.node_mut(id)
        else {
            return false;
        };
        let before = attributes.len();
        attributes.retain(|(n, _)| n != name);
        attributes.len() != before
    }

    /// All attributes of an element, in insertion order.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match self.data(id) {
            Some(NodeData::Element { attributes, .. }) => attributes.as_slice(),
            _ => &[],
        }
    }

    /// Append a class name unless it is already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        let class = class.trim();
        if class.is_empty() || !self.is_element(id) {
            return false;
        }
        if self.has_class(id, class) {
            return true;
        }
        let joined = match self.attribute(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        self.set_attribute(id, "class", joined)
    }

    /// Append every whitespace-separated class in `classes`.
    pub fn add_classes(&mut self, id: NodeId, classes: &str) {
        for class in classes.split_whitespace() {
            self.add_class(id, class);
        }
    }

    /// Remove a class name. Returns whether it was present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        if !self.has_class(id, class) {
            return false;
        }
        let kept: Vec<&str> = self.class_list(id).into_iter().filter(|c| *c != class).collect();
        let joined = kept.join(" ");
        if joined.is_empty() {
            self.remove_attribute(id, "class")
        } else {
            self.set_attribute(id, "class", joined)
        }
    }

    /// Whether the element carries a class name.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_list(id).contains(&class)
    }

    /// Class names of an element.
    #[must_use]
    pub fn class_list(&self, id: NodeId) -> Vec<&str> {
        self.attribute(id, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Whether the element carries the `disabled` attribute.
    #[must_use]
    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attribute(id, "disabled")
    }

    /// Parsed `tabindex`; `None` when absent or not an integer.
    #[must_use]
    pub fn tab_index(&self, id: NodeId) -> Option<i32> {
        self.attribute(id, "tabindex")?.trim().parse().ok()
    }

    // --- Text ---

    /// Text of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(text) => Some(text.as_str()),
            NodeData::Element { .. } => None,
        }
    }

    /// Concatenated text of the node and its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_owned();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Replace all children of an element with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        if !self.is_element(id) {
            return false;
        }
        let old: Vec<NodeId> = self.children(id).to_vec();
        for child in old {
            self.remove(child);
        }
        let text = text.into();
        if text.is_empty() {
            return true;
        }
        let node = self.create_text(text);
        self.append_child(id, node)
    }

    // --- Lookup ---

    /// First connected element whose `id` attribute equals `dom_id`.
    #[must_use]
    pub fn element_by_id(&self, dom_id: &str) -> Option<NodeId> {
        if dom_id.is_empty() {
            return None;
        }
        std::iter::once(self.body)
            .chain(self.descendants(self.body))
            .find(|n| self.attribute(*n, "id") == Some(dom_id))
    }

    /// Connected elements carrying a class name, in document order.
    #[must_use]
    pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    /// Generate an element identifier that is unique within this document.
    pub fn generate_id(&mut self, prefix: &str) -> String {
        loop {
            let candidate = format!("{prefix}-{}", self.next_uid);
            self.next_uid += 1;
            if self.element_by_id(&candidate).is_none() {
                return candidate;
            }
        }
    }

    // --- Focus ---

    /// The focused element; `None` means focus rests on the body.
    #[inline]
    #[must_use]
    pub fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    /// Whether `id` currently has focus.
    #[must_use]
    pub fn has_focus(&self, id: NodeId) -> bool {
        self.active == Some(id)
    }

    /// Whether the element can receive focus programmatically.
    ///
    /// Natively interactive elements (enabled form controls, anchors with
    /// `href`) and any element with an integer `tabindex` qualify, provided
    /// they are connected.
    #[must_use]
    pub fn is_focusable(&self, id: NodeId) -> bool {
        let Some(tag) = self.tag(id) else {
            return false;
        };
        if !self.is_connected(id) {
            return false;
        }
        if tag.is_form_control() && self.is_disabled(id) {
            return false;
        }
        if self.tab_index(id).is_some() {
            return true;
        }
        match tag {
            Tag::Button | Tag::Input | Tag::TextArea | Tag::Select => true,
            Tag::Anchor => self.has_attribute(id, "href"),
            _ => false,
        }
    }

    /// Whether the element participates in sequential navigation.
    #[must_use]
    pub fn is_tabbable(&self, id: NodeId) -> bool {
        self.is_focusable(id) && self.tab_index(id).is_none_or(|i| i >= 0)
    }

    /// Move focus to `id`. Returns `false` and leaves focus unchanged when
    /// the element cannot take focus.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.is_focusable(id) {
            return false;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(node = %id, "focus moved");
        self.active = Some(id);
        true
    }

    /// Return focus to the body.
    pub fn blur(&mut self) {
        self.active = None;
    }

    /// Sequential navigation order: positive `tabindex` ascending, then
    /// everything else in document order.
    #[must_use]
    pub fn tab_order(&self) -> Vec<NodeId> {
        let tabbable: Vec<NodeId> = self
            .descendants(self.body)
            .into_iter()
            .filter(|n| self.is_tabbable(*n))
            .collect();
        let mut positive: Vec<(i32, NodeId)> = tabbable
            .iter()
            .filter_map(|n| self.tab_index(*n).filter(|i| *i > 0).map(|i| (i, *n)))
            .collect();
        // Stable sort keeps document order among equal indices.
        positive.sort_by_key(|(i, _)| *i);
        positive
            .into_iter()
            .map(|(_, n)| n)
            .chain(
                tabbable
                    .into_iter()
                    .filter(|n| self.tab_index(*n).is_none_or(|i| i == 0)),
            )
            .collect()
    }

    /// Perform the default action of the Tab key: move focus to the next
    /// (or previous) tabbable element, wrapping at the ends.
    pub fn focus_next(&mut self, direction: TabDirection) -> Option<NodeId> {
        let order = self.tab_order();
        if order.is_empty() {
            return None;
        }
        let current = self.active.and_then(|a| order.iter().position(|n| *n == a));
        let next = match (direction, current) {
            (TabDirection::Forward, Some(i)) => (i + 1) % order.len(),
            (TabDirection::Forward, None) => 0,
            (TabDirection::Backward, Some(0) | None) => order.len() - 1,
            (TabDirection::Backward, Some(i)) => i - 1,
        };
        let target = order[next];
        self.focus(target).then_some(target)
    }
}
