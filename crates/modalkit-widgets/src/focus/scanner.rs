#![forbid(unsafe_code)]

//! Focusable descendant discovery.
//!
//! An element is a member of a root's focusable set when it matches the
//! interactive-element rule:
//!
//! - `a[href]`, `button`, `textarea`, `input`, or `select`, or any element
//!   carrying an integer `tabindex`;
//! - and it is not `disabled`;
//! - and its `tabindex`, when present, is not negative.
//!
//! The root itself never counts; members are listed in document order.
//!
//! # Failure Modes
//!
//! - [`try_scan`] reports a stale root as [`DialogError::MissingRoot`].
//!   [`scan`] logs that and returns an empty set, which the trap treats as
//!   "nothing to trap".

use ahash::AHashMap;
use modalkit_core::{Document, NodeId, Tag};

use crate::error::DialogError;

/// Ordered focusable descendants of a root.
#[derive(Debug, Clone, Default)]
pub struct FocusableSet {
    members: Vec<NodeId>,
    index: AHashMap<NodeId, usize>,
}

impl FocusableSet {
    fn from_members(members: Vec<NodeId>) -> Self {
        let index = members
            .iter()
            .enumerate()
            .map(|(i, node)| (*node, i))
            .collect();
        Self { members, index }
    }

    /// First member; the forward trap boundary and initial focus target.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.members.first().copied()
    }

    /// Last member; the backward trap boundary.
    #[must_use]
    pub fn last(&self) -> Option<NodeId> {
        self.members.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    /// Position of `node` in document order.
    #[must_use]
    pub fn position(&self, node: NodeId) -> Option<usize> {
        self.index.get(&node).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.members
    }
}

impl PartialEq for FocusableSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for FocusableSet {}

/// Whether `node` matches the focusable rule (ignoring where it lives).
#[must_use]
pub fn matches_focusable_selector(doc: &Document, node: NodeId) -> bool {
    let Some(tag) = doc.tag(node) else {
        return false;
    };
    if doc.is_disabled(node) {
        return false;
    }
    // Unparsable tabindex values behave like an absent attribute.
    if let Some(index) = doc.tab_index(node) {
        return index >= 0;
    }
    match tag {
        Tag::Button | Tag::TextArea | Tag::Input | Tag::Select => true,
        Tag::Anchor => doc.has_attribute(node, "href"),
        _ => false,
    }
}

/// Scan `root`, reporting a stale root.
///
/// # Errors
///
/// Returns [`DialogError::MissingRoot`] when `root` is not a live element.
pub fn try_scan(doc: &Document, root: NodeId) -> Result<FocusableSet, DialogError> {
    if !doc.is_element(root) {
        return Err(DialogError::MissingRoot(Some(root)));
    }
    let members = doc
        .descendants(root)
        .into_iter()
        .filter(|node| matches_focusable_selector(doc, *node))
        .collect();
    Ok(FocusableSet::from_members(members))
}

/// Scan `root`; a stale root yields an empty set.
#[must_use]
pub fn scan(doc: &Document, root: NodeId) -> FocusableSet {
    try_scan(doc, root).unwrap_or_else(|err| {
        tracing::debug!(%err, "focus scan skipped");
        FocusableSet::default()
    })
}
