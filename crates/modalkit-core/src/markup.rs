#![forbid(unsafe_code)]

//! HTML-like serialization of a subtree, used for snapshots and the demo.

use std::fmt::Write as _;

use crate::dom::{Document, NodeData, NodeId};

/// Serialize `node` and its subtree.
///
/// Attribute values and text are escaped. Stale ids produce an empty string.
#[must_use]
pub fn to_markup(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    match doc.data(node) {
        None => {}
        Some(NodeData::Text(text)) => escape_into(text, out),
        Some(NodeData::Element { tag, attributes }) => {
            let name = tag.name();
            let _ = write!(out, "<{name}");
            for (key, value) in attributes {
                let _ = write!(out, " {key}=\"");
                escape_into(value, out);
                out.push('"');
            }
            out.push('>');
            if tag.is_void() {
                return;
            }
            for child in doc.children(node) {
                write_node(doc, *child, out);
            }
            let _ = write!(out, "</{name}>");
        }
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
