#![forbid(unsafe_code)]

//! Cyclic focus trap.
//!
//! Sequential navigation inside a dialog must not leave it. The trap only
//! intervenes at the two boundaries: Tab on the last focusable member moves
//! to the first, and Shift+Tab on the first moves to the last. Everything
//! in between is left to the host's default tab action.
//!
//! # Invariants
//!
//! - For a set of two or more members, forward navigation from the last
//!   member lands on the first, and backward navigation from the first
//!   lands on the last.
//! - Sets of zero or one member are never trapped; events pass through.
//! - The default action is suppressed only when focus actually moved.

use std::cell::RefCell;
use std::rc::Rc;

use modalkit_core::{Document, DomEvent, EventType, ListenerGuard, ListenerTarget, NodeId, TabDirection};
use modalkit_runtime::Host;

use super::scanner::{FocusableSet, scan};

/// Result of offering a key event to the trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabOutcome {
    /// Focus wrapped to `to` and the default action was suppressed.
    Wrapped { to: NodeId },
    /// A tab event the trap left to the host.
    PassThrough,
    /// Not a tab event.
    Ignored,
}

/// Focus trap over a root element's focusable descendants.
#[derive(Debug, Clone)]
pub struct FocusTrap {
    root: NodeId,
    focusable: FocusableSet,
}

impl FocusTrap {
    /// Build a trap and scan `root` once.
    #[must_use]
    pub fn new(doc: &Document, root: NodeId) -> Self {
        Self {
            root,
            focusable: scan(doc, root),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn focusable(&self) -> &FocusableSet {
        &self.focusable
    }

    /// Rebuild the focusable set, e.g. after the root's content changed.
    pub fn rescan(&mut self, doc: &Document) {
        self.focusable = scan(doc, self.root);
        tracing::trace!(root = %self.root, members = self.focusable.len(), "focus trap rescanned");
    }

    /// The element initial focus should go to.
    #[must_use]
    pub fn first_focusable(&self) -> Option<NodeId> {
        self.focusable.first()
    }

    /// Whether tab events are redirected at the boundaries.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.focusable.len() >= 2
    }

    /// Handle a key event, wrapping focus at the boundaries.
    pub fn handle_tab_key(&self, doc: &mut Document, event: &DomEvent) -> TabOutcome {
        let Some(direction) = event.key().and_then(|key| key.tab_direction()) else {
            return TabOutcome::Ignored;
        };
        if !self.is_active() {
            return TabOutcome::PassThrough;
        }
        let (Some(first), Some(last)) = (self.focusable.first(), self.focusable.last()) else {
            return TabOutcome::PassThrough;
        };
        let active = doc.active_element();
        let target = match direction {
            TabDirection::Forward if active == Some(last) => first,
            TabDirection::Backward if active == Some(first) => last,
            _ => return TabOutcome::PassThrough,
        };
        if !doc.focus(target) {
            tracing::debug!(target_node = %target, "focus trap target refused focus");
            return TabOutcome::PassThrough;
        }
        event.prevent_default();
        TabOutcome::Wrapped { to: target }
    }

    /// Route document key-downs through `trap` while the guard lives.
    pub fn listen(trap: &Rc<RefCell<FocusTrap>>, host: &Host) -> ListenerGuard {
        let trap = Rc::downgrade(trap);
        let weak_host = host.downgrade();
        host.add_listener(ListenerTarget::Document, EventType::KeyDown, move |event| {
            let (Some(trap), Some(host)) = (trap.upgrade(), weak_host.upgrade()) else {
                return;
            };
            let trap = trap.borrow();
            trap.handle_tab_key(&mut host.document_mut(), event);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modalkit_core::{Event, KeyCode, KeyEvent, Modifiers, Tag};

    fn key_event(code: KeyCode, modifiers: Modifiers) -> DomEvent {
        DomEvent::new(Event::Key(KeyEvent::new(code).with_modifiers(modifiers)), None)
    }

    fn dialog_with_buttons(n: usize) -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.body();
        let root = doc.create_element(Tag::Div);
        doc.append_child(body, root);
        let buttons = (0..n)
            .map(|_| {
                let b = doc.create_element(Tag::Button);
                doc.append_child(root, b);
                b
            })
            .collect();
        (doc, root, buttons)
    }

    #[test]
    fn tab_on_last_wraps_to_first() {
        let (mut doc, root, buttons) = dialog_with_buttons(3);
        let trap = FocusTrap::new(&doc, root);
        doc.focus(buttons[2]);
        let event = key_event(KeyCode::Tab, Modifiers::empty());
        assert_eq!(
            trap.handle_tab_key(&mut doc, &event),
            TabOutcome::Wrapped { to: buttons[0] }
        );
        assert!(event.default_prevented());
        assert_eq!(doc.active_element(), Some(buttons[0]));
    }

    #[test]
    fn shift_tab_on_first_wraps_to_last() {
        let (mut doc, root, buttons) = dialog_with_buttons(3);
        let trap = FocusTrap::new(&doc, root);
        doc.focus(buttons[0]);
        let event = key_event(KeyCode::Tab, Modifiers::SHIFT);
        assert_eq!(
            trap.handle_tab_key(&mut doc, &event),
            TabOutcome::Wrapped { to: buttons[2] }
        );
        assert_eq!(doc.active_element(), Some(buttons[2]));
    }

    #[test]
    fn back_tab_counts_as_shift_tab() {
        let (mut doc, root, buttons) = dialog_with_buttons(2);
        let trap = FocusTrap::new(&doc, root);
        doc.focus(buttons[0]);
        let event = key_event(KeyCode::BackTab, Modifiers::empty());
        assert_eq!(
            trap.handle_tab_key(&mut doc, &event),
            TabOutcome::Wrapped { to: buttons[1] }
        );
    }

    #[test]
    fn middle_members_pass_through() {
        let (mut doc, root, buttons) = dialog_with_buttons(3);
        let trap = FocusTrap::new(&doc, root);
        doc.focus(buttons[1]);
        let event = key_event(KeyCode::Tab, Modifiers::empty());
        assert_eq!(trap.handle_tab_key(&mut doc, &event), TabOutcome::PassThrough);
        assert!(!event.default_prevented());
    }

    #[test]
    fn single_member_never_traps() {
        let (mut doc, root, buttons) = dialog_with_buttons(1);
        let trap = FocusTrap::new(&doc, root);
        doc.focus(buttons[0]);
        let event = key_event(KeyCode::Tab, Modifiers::empty());
        assert_eq!(trap.handle_tab_key(&mut doc, &event), TabOutcome::PassThrough);
        assert!(!event.default_prevented());
        assert_eq!(doc.active_element(), Some(buttons[0]));
    }

    #[test]
    fn non_tab_keys_are_ignored() {
        let (mut doc, root, _) = dialog_with_buttons(2);
        let trap = FocusTrap::new(&doc, root);
        let event = key_event(KeyCode::Escape, Modifiers::empty());
        assert_eq!(trap.handle_tab_key(&mut doc, &event), TabOutcome::Ignored);
    }

    #[test]
    fn rescan_picks_up_new_members() {
        let (mut doc, root, buttons) = dialog_with_buttons(1);
        let mut trap = FocusTrap::new(&doc, root);
        assert!(!trap.is_active());
        let extra = doc.create_element(Tag::Input);
        doc.append_child(root, extra);
        trap.rescan(&doc);
        assert!(trap.is_active());
        assert_eq!(trap.first_focusable(), Some(buttons[0]));
    }

    #[test]
    fn removed_boundary_passes_through() {
        let (mut doc, root, buttons) = dialog_with_buttons(2);
        let trap = FocusTrap::new(&doc, root);
        doc.focus(buttons[1]);
        doc.remove(buttons[0]);
        doc.focus(buttons[1]);
        let event = key_event(KeyCode::Tab, Modifiers::empty());
        assert_eq!(trap.handle_tab_key(&mut doc, &event), TabOutcome::PassThrough);
        assert!(!event.default_prevented());
    }

    #[test]
    fn listener_wraps_through_host() {
        let host = Host::new();
        let (root, a, b) = {
            let mut doc = host.document_mut();
            let body = doc.body();
            let root = doc.create_element(Tag::Div);
            doc.append_child(body, root);
            let a = doc.create_element(Tag::Button);
            let b = doc.create_element(Tag::Button);
            doc.append_child(root, a);
            doc.append_child(root, b);
            (root, a, b)
        };
        let trap = Rc::new(RefCell::new(FocusTrap::new(&host.document(), root)));
        let _guard = FocusTrap::listen(&trap, &host);
        host.focus(b);
        host.press(KeyCode::Tab);
        assert_eq!(host.active_element(), Some(a));
        host.press_with(KeyCode::Tab, Modifiers::SHIFT);
        assert_eq!(host.active_element(), Some(b));
    }
}
