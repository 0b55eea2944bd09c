#![forbid(unsafe_code)]

//! Escape-key and outside-click dismissal.
//!
//! The coordinator registers two document-level listeners for as long as
//! it lives and turns matching input into a single close request. It does
//! not deduplicate: the dialog's lifecycle state is the idempotency guard,
//! so rapid repeated gestures all reach the callback and all but the first
//! are ignored there.
//!
//! # Nested dialogs
//!
//! Every open dialog hears every document key-down. A dialog only acts on
//! Escape when it *owns* the event: the event target lies inside its
//! overlay, or the target lies inside no dialog overlay and this overlay is
//! the last one in document order that is not fading out. Outside clicks need no routing since the
//! target must be the overlay element itself.

use std::rc::Rc;

use bitflags::bitflags;
use modalkit_core::{Document, DomEvent, EventType, ListenerGuard, ListenerTarget, NodeId};
use modalkit_runtime::{DialogPolicy, Host};

use super::transition::Fade;

/// Attribute marking a dialog overlay element.
pub const OVERLAY_MARKER: &str = "data-modal-overlay";

/// Why a dialog is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissalRequest {
    /// Escape key.
    Escape,
    /// Pointer activation on the overlay outside the panel.
    OutsideActivation,
    /// Header close control, footer control, or a programmatic close.
    ExplicitControl,
}

bitflags! {
    /// Dismissal gestures a coordinator listens for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DismissGestures: u8 {
        const ESCAPE = 0b01;
        const OUTSIDE_CLICK = 0b10;
    }
}

impl DismissGestures {
    /// Gestures enabled by a policy.
    #[must_use]
    pub fn from_policy(policy: &DialogPolicy) -> Self {
        let mut gestures = Self::empty();
        gestures.set(Self::ESCAPE, policy.close_on_escape);
        gestures.set(Self::OUTSIDE_CLICK, policy.close_on_outside_click);
        gestures
    }
}

/// Whether a click with this target counts as outside activation.
#[must_use]
pub fn is_outside_activation(target: Option<NodeId>, overlay: NodeId) -> bool {
    target == Some(overlay)
}

/// Whether the dialog rooted at `overlay` should act on a key event aimed
/// at `target`.
#[must_use]
pub fn owns_key_event(doc: &Document, overlay: NodeId, target: Option<NodeId>) -> bool {
    let enclosing = target.and_then(|t| {
        doc.path_to_root(t)
            .into_iter()
            .find(|n| doc.has_attribute(*n, OVERLAY_MARKER))
    });
    match enclosing {
        Some(owner) => owner == overlay,
        None => last_overlay(doc) == Some(overlay),
    }
}

fn last_overlay(doc: &Document) -> Option<NodeId> {
    doc.descendants(doc.body())
        .into_iter()
        .rev()
        .find(|n| doc.has_attribute(*n, OVERLAY_MARKER) && !doc.has_class(*n, Fade::Out.class()))
}

/// Dismissal callback.
pub type DismissHandler = Rc<dyn Fn(DismissalRequest)>;

/// Holds the dismissal listeners of one dialog. Dropping it removes them.
#[derive(Debug)]
pub struct DismissalCoordinator {
    gestures: DismissGestures,
    _escape: Option<ListenerGuard>,
    _outside: Option<ListenerGuard>,
}

impl DismissalCoordinator {
    /// Register the listeners enabled by `policy`.
    pub fn install(
        host: &Host,
        overlay: NodeId,
        policy: &DialogPolicy,
        on_dismiss: DismissHandler,
    ) -> Self {
        let gestures = DismissGestures::from_policy(policy);

        let escape = gestures.contains(DismissGestures::ESCAPE).then(|| {
            let weak_host = host.downgrade();
            let on_dismiss = Rc::clone(&on_dismiss);
            host.add_listener(ListenerTarget::Document, EventType::KeyDown, move |event| {
                if !event.key().is_some_and(|key| key.is_escape()) {
                    return;
                }
                let Some(host) = weak_host.upgrade() else {
                    return;
                };
                let owned = owns_key_event(&host.document(), overlay, event.target());
                if owned {
                    tracing::trace!(overlay = %overlay, "escape dismissal");
                    on_dismiss(DismissalRequest::Escape);
                }
            })
        });

        let outside = gestures.contains(DismissGestures::OUTSIDE_CLICK).then(|| {
            let on_dismiss = Rc::clone(&on_dismiss);
            host.add_listener(ListenerTarget::Document, EventType::Click, move |event: &DomEvent| {
                if is_outside_activation(event.target(), overlay) {
                    tracing::trace!(overlay = %overlay, "outside dismissal");
                    on_dismiss(DismissalRequest::OutsideActivation);
                }
            })
        });

        Self {
            gestures,
            _escape: escape,
            _outside: outside,
        }
    }

    #[must_use]
    pub fn gestures(&self) -> DismissGestures {
        self.gestures
    }
}
