#![forbid(unsafe_code)]

//! Property tests for tree structure and sequential focus navigation.

use std::collections::HashSet;

use modalkit_core::{Document, NodeId, TabDirection, Tag};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Kind {
    Button,
    DisabledButton,
    Input,
    Div,
    DivTabIndex(i32),
}

fn kind() -> impl Strategy<Value = Kind> {
    prop_oneof![
        Just(Kind::Button),
        Just(Kind::DisabledButton),
        Just(Kind::Input),
        Just(Kind::Div),
        (-1i32..3).prop_map(Kind::DivTabIndex),
    ]
}

fn build(kinds: &[Kind]) -> (Document, Vec<NodeId>) {
    let mut doc = Document::new();
    let body = doc.body();
    let nodes = kinds
        .iter()
        .map(|k| {
            let tag = match k {
                Kind::Button | Kind::DisabledButton => Tag::Button,
                Kind::Input => Tag::Input,
                Kind::Div | Kind::DivTabIndex(_) => Tag::Div,
            };
            let node = doc.create_element(tag);
            match k {
                Kind::DisabledButton => {
                    doc.set_attribute(node, "disabled", "");
                }
                Kind::DivTabIndex(i) => {
                    doc.set_attribute(node, "tabindex", i.to_string());
                }
                _ => {}
            }
            doc.append_child(body, node);
            node
        })
        .collect();
    (doc, nodes)
}

proptest! {
    #[test]
    fn tab_order_holds_exactly_the_tabbable_elements(kinds in prop::collection::vec(kind(), 0..16)) {
        let (doc, nodes) = build(&kinds);
        let order = doc.tab_order();
        for node in &nodes {
            prop_assert_eq!(order.contains(node), doc.is_tabbable(*node));
        }
        let unique: HashSet<NodeId> = order.iter().copied().collect();
        prop_assert_eq!(unique.len(), order.len());
    }

    #[test]
    fn full_lap_returns_to_start(kinds in prop::collection::vec(kind(), 1..16), backward in any::<bool>()) {
        let (mut doc, _) = build(&kinds);
        let direction = if backward { TabDirection::Backward } else { TabDirection::Forward };
        let len = doc.tab_order().len();
        prop_assume!(len > 0);
        let start = doc.focus_next(direction);
        for _ in 0..len {
            doc.focus_next(direction);
        }
        prop_assert_eq!(doc.active_element(), start);
    }

    #[test]
    fn forward_then_backward_is_identity(kinds in prop::collection::vec(kind(), 1..16), steps in 1usize..10) {
        let (mut doc, _) = build(&kinds);
        prop_assume!(doc.tab_order().len() > 1);
        let start = doc.focus_next(TabDirection::Forward);
        for _ in 0..steps {
            doc.focus_next(TabDirection::Forward);
        }
        for _ in 0..steps {
            doc.focus_next(TabDirection::Backward);
        }
        prop_assert_eq!(doc.active_element(), start);
    }

    #[test]
    fn appends_never_create_cycles(ops in prop::collection::vec((0usize..8, 0usize..8), 0..40)) {
        let mut doc = Document::new();
        let body = doc.body();
        let nodes: Vec<NodeId> = (0..8)
            .map(|_| {
                let n = doc.create_element(Tag::Div);
                doc.append_child(body, n);
                n
            })
            .collect();
        for (parent, child) in ops {
            doc.append_child(nodes[parent], nodes[child]);
        }
        for node in &nodes {
            let path = doc.path_to_root(*node);
            prop_assert!(path.len() <= nodes.len() + 1);
            prop_assert_eq!(path.last().copied(), Some(body));
            prop_assert!(doc.is_connected(*node));
        }
    }
}
