#![forbid(unsafe_code)]

//! Accessible name and description computation.
//!
//! A reduced form of the accessible-name algorithm, enough for dialogs and
//! their controls:
//!
//! 1. `aria-labelledby`: text of each referenced element, joined by a space.
//! 2. `aria-label`, when non-blank.
//! 3. For roles that take their name from content (buttons, headings,
//!    links), the element's own text.
//!
//! Descriptions only follow `aria-describedby`.
//!
//! # Failure Modes
//!
//! - References to missing identifiers are skipped.
//! - A reference chain that loops back onto an element already visited is
//!   cut; each element contributes at most once.

use ahash::AHashSet;
use modalkit_core::{Document, NodeId};

use crate::role::Role;

/// Computed accessible name of `node`; empty when it has none.
#[must_use]
pub fn accessible_name(doc: &Document, node: NodeId) -> String {
    if let Some(ids) = doc.attribute(node, "aria-labelledby") {
        let name = resolve_references(doc, ids, node);
        if !name.is_empty() {
            return name;
        }
    }
    if let Some(label) = doc.attribute(node, "aria-label") {
        let label = label.trim();
        if !label.is_empty() {
            return label.to_owned();
        }
    }
    if role_of(doc, node).is_some_and(Role::name_from_content) {
        return normalize_whitespace(&doc.text_content(node));
    }
    String::new()
}

/// Computed accessible description of `node`; empty when it has none.
#[must_use]
pub fn accessible_description(doc: &Document, node: NodeId) -> String {
    doc.attribute(node, "aria-describedby")
        .map(|ids| resolve_references(doc, ids, node))
        .unwrap_or_default()
}

/// Explicit role, else the role implied by the tag.
#[must_use]
pub fn role_of(doc: &Document, node: NodeId) -> Option<Role> {
    if let Some(role) = doc.attribute(node, "role").and_then(Role::parse) {
        return Some(role);
    }
    let tag = doc.tag(node)?;
    Role::implicit_for(tag, doc.has_attribute(node, "href"))
}

/// Connected elements with `role`, in document order.
#[must_use]
pub fn find_by_role(doc: &Document, role: Role) -> Vec<NodeId> {
    doc.descendants(doc.body())
        .into_iter()
        .filter(|n| role_of(doc, *n) == Some(role))
        .collect()
}

/// First connected element whose accessible name equals `name`.
#[must_use]
pub fn find_by_label(doc: &Document, name: &str) -> Option<NodeId> {
    doc.descendants(doc.body())
        .into_iter()
        .filter(|n| doc.is_element(*n))
        .find(|n| accessible_name(doc, *n) == name)
}

fn resolve_references(doc: &Document, ids: &str, origin: NodeId) -> String {
    let mut seen: AHashSet<NodeId> = AHashSet::new();
    seen.insert(origin);
    let parts: Vec<String> = ids
        .split_whitespace()
        .filter_map(|id| doc.element_by_id(id))
        .filter(|n| seen.insert(*n))
        .map(|n| normalize_whitespace(&doc.text_content(n)))
        .filter(|text| !text.is_empty())
        .collect();
    parts.join(" ")
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
