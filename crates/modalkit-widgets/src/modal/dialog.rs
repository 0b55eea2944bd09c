#![forbid(unsafe_code)]

//! The dialog shell.
//!
//! A [`Modal`] renders nothing until opened. Opening mounts this structure
//! into the scope's container:
//!
//! ```text
//! div.overlay[data-modal-overlay]          fade-in / fade-out
//! └─ div.modal.medium[role=dialog][aria-modal=true]
//!    ├─ header.header
//!    │  ├─ h3.title#modal-title-N
//!    │  └─ button.button.default.pill[aria-label=Close]
//!    ├─ div.content#modal-content-N
//!    └─ div.footer                         only with footer controls
//! ```
//!
//! and wires the focus trap (rooted at the panel) and the dismissal
//! listeners. Every close path funnels into the same sequence: fade-out,
//! wait for the exit delay, restore focus to the trigger, notify, unmount.
//!
//! # Invariants
//!
//! - The close notification fires at most once per open.
//! - Focus restoration happens before the close notification.
//! - Listeners registered for a mount are released exactly once, when the
//!   mount is torn down.
//! - No `RefCell` borrow of the dialog or the document is held while caller
//!   callbacks run; callbacks may reopen, close, or drop the dialog.
//!
//! # Failure Modes
//!
//! - Blank footer labels are replaced with "Action"/"Dismiss" and logged.
//! - A trigger that was removed or detached is skipped.
//! - Dropping (or force-unmounting) a closing dialog completes the close
//!   immediately, notification included. Dropping an open dialog removes it
//!   without notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use modalkit_a11y::{AccessibilityBinding, resolve_binding};
use modalkit_core::{ListenerGuard, NodeId, Tag, to_markup};
use modalkit_runtime::{DialogPolicy, Host, ModalScope, TaskHandle};

use super::dismissal::{DismissalCoordinator, DismissalRequest, OVERLAY_MARKER};
use super::options::{ControlSpec, DialogOptions};
use super::transition::{DialogLifecycleState, Fade, TransitionSequencer};
use crate::button::{Button, ButtonIcon, ButtonShape, ButtonVariant, MountedButton};
use crate::focus::FocusTrap;

/// Label used when the action control's label is blank.
pub const FALLBACK_ACTION_LABEL: &str = "Action";
/// Label used when the dismiss control's label is blank.
pub const FALLBACK_DISMISS_LABEL: &str = "Dismiss";

/// Element handles of a mounted dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogElements {
    pub overlay: NodeId,
    pub panel: NodeId,
    pub header: NodeId,
    pub title: NodeId,
    pub close_button: NodeId,
    pub content: NodeId,
    pub footer: Option<NodeId>,
    pub action_button: Option<NodeId>,
    pub dismiss_button: Option<NodeId>,
}

struct Mounted {
    elements: DialogElements,
    binding: AccessibilityBinding,
    policy: DialogPolicy,
    trap: Rc<RefCell<FocusTrap>>,
    entry: Option<TaskHandle>,
    _buttons: Vec<MountedButton>,
    _trap_listener: ListenerGuard,
    _dismissal: DismissalCoordinator,
}

struct ModalShared {
    host: Host,
    scope: ModalScope,
    options: RefCell<DialogOptions>,
    sequencer: RefCell<TransitionSequencer>,
    mounted: RefCell<Option<Mounted>>,
}

/// An accessible modal dialog.
///
/// Not `Clone`: the handle owns the dialog. Dropping it force-unmounts.
pub struct Modal {
    shared: Rc<ModalShared>,
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("title", &self.shared.options.borrow().title)
            .field("state", &self.state())
            .field("elements", &self.elements())
            .finish()
    }
}

/// Create a dialog and open it immediately.
pub fn open(scope: &ModalScope, options: DialogOptions) -> Modal {
    let modal = Modal::new(scope, options);
    modal.open();
    modal
}

impl Modal {
    /// Create a closed dialog. Nothing is rendered until [`Modal::open`].
    #[must_use]
    pub fn new(scope: &ModalScope, options: DialogOptions) -> Self {
        Self {
            shared: Rc::new(ModalShared {
                host: scope.host().clone(),
                scope: scope.clone(),
                options: RefCell::new(options),
                sequencer: RefCell::new(TransitionSequencer::new()),
                mounted: RefCell::new(None),
            }),
        }
    }

    /// Mount and start the entry transition. Returns `false` when the
    /// dialog is already mounted.
    pub fn open(&self) -> bool {
        ModalShared::open(&self.shared)
    }

    /// Controlled mode: `true` opens, `false` unmounts immediately.
    pub fn set_open(&self, open: bool) {
        if open {
            self.open();
        } else {
            self.unmount();
        }
    }

    /// Start the close sequence. Ignored unless the dialog is open.
    pub fn request_close(&self, reason: DismissalRequest) -> bool {
        ModalShared::request_close(&self.shared, reason)
    }

    /// Programmatic close, equivalent to the header close control.
    pub fn close(&self) -> bool {
        self.request_close(DismissalRequest::ExplicitControl)
    }

    /// Remove the dialog now.
    ///
    /// A dialog that is already closing completes its close sequence
    /// (focus restoration and notification) first; an open dialog is
    /// removed silently.
    pub fn unmount(&self) {
        ModalShared::unmount(&self.shared);
    }

    #[must_use]
    pub fn state(&self) -> DialogLifecycleState {
        self.shared.sequencer.borrow().state()
    }

    /// What started the close in progress or the last completed one.
    /// Cleared when the dialog opens again.
    #[must_use]
    pub fn close_reason(&self) -> Option<DismissalRequest> {
        self.shared.sequencer.borrow().close_reason()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.borrow().is_some()
    }

    /// Handles of the mounted elements.
    #[must_use]
    pub fn elements(&self) -> Option<DialogElements> {
        self.shared.mounted.borrow().as_ref().map(|m| m.elements)
    }

    #[must_use]
    pub fn overlay(&self) -> Option<NodeId> {
        self.elements().map(|e| e.overlay)
    }

    #[must_use]
    pub fn panel(&self) -> Option<NodeId> {
        self.elements().map(|e| e.panel)
    }

    #[must_use]
    pub fn title(&self) -> Option<NodeId> {
        self.elements().map(|e| e.title)
    }

    #[must_use]
    pub fn close_button(&self) -> Option<NodeId> {
        self.elements().map(|e| e.close_button)
    }

    #[must_use]
    pub fn content(&self) -> Option<NodeId> {
        self.elements().map(|e| e.content)
    }

    #[must_use]
    pub fn footer(&self) -> Option<NodeId> {
        self.elements().and_then(|e| e.footer)
    }

    #[must_use]
    pub fn action_button(&self) -> Option<NodeId> {
        self.elements().and_then(|e| e.action_button)
    }

    #[must_use]
    pub fn dismiss_button(&self) -> Option<NodeId> {
        self.elements().and_then(|e| e.dismiss_button)
    }

    /// Accessibility attributes resolved for the current mount.
    #[must_use]
    pub fn binding(&self) -> Option<AccessibilityBinding> {
        self.shared
            .mounted
            .borrow()
            .as_ref()
            .map(|m| m.binding.clone())
    }

    /// Policy in effect for the current mount.
    #[must_use]
    pub fn policy(&self) -> Option<DialogPolicy> {
        self.shared.mounted.borrow().as_ref().map(|m| m.policy)
    }

    /// First focusable element inside the panel.
    #[must_use]
    pub fn first_focusable(&self) -> Option<NodeId> {
        let mounted = self.shared.mounted.borrow();
        let trap = Rc::clone(&mounted.as_ref()?.trap);
        drop(mounted);
        trap.borrow().first_focusable()
    }

    /// Rebuild the focus trap after the dialog's content changed.
    pub fn rescan_focus(&self) {
        let trap = self
            .shared
            .mounted
            .borrow()
            .as_ref()
            .map(|m| Rc::clone(&m.trap));
        if let Some(trap) = trap {
            trap.borrow_mut().rescan(&self.shared.host.document());
        }
    }

    /// Set the control focus returns to after closing.
    pub fn set_trigger(&self, trigger: NodeId) {
        self.shared.options.borrow_mut().trigger = Some(trigger);
    }

    /// Serialized overlay subtree; empty when unmounted.
    #[must_use]
    pub fn markup(&self) -> String {
        self.overlay()
            .map(|overlay| to_markup(&self.shared.host.document(), overlay))
            .unwrap_or_default()
    }
}

impl Drop for Modal {
    fn drop(&mut self) {
        ModalShared::unmount(&self.shared);
    }
}

impl ModalShared {
    fn open(this: &Rc<Self>) -> bool {
        if !this.sequencer.borrow_mut().begin_open() {
            tracing::debug!("open ignored; dialog already mounted");
            return false;
        }
        let stale = this.mounted.borrow_mut().take();
        if let Some(stale) = stale {
            Self::teardown(&this.host, stale);
        }

        let mounted = Self::mount(this);
        let initial = mounted
            .trap
            .borrow()
            .first_focusable()
            .unwrap_or(mounted.elements.close_button);
        *this.mounted.borrow_mut() = Some(mounted);
        this.host.focus(initial);

        let weak = Rc::downgrade(this);
        let entry = this.host.schedule(Duration::ZERO, move || {
            if let Some(this) = weak.upgrade() {
                Self::entered(&this);
            }
        });
        if let Some(mounted) = this.mounted.borrow_mut().as_mut() {
            mounted.entry = Some(entry);
        }
        true
    }

    fn mount(this: &Rc<Self>) -> Mounted {
        let options = this.options.borrow().clone();
        let _span = tracing::debug_span!("modal_mount", title = %options.title).entered();
        let policy = options.policy.unwrap_or(*this.scope.policy());
        let container = this.scope.container();
        let host = &this.host;

        let (overlay, panel, header, title, content, footer, binding) = {
            let mut doc = host.document_mut();
            let title_id = doc.generate_id("modal-title");
            let content_id = doc.generate_id("modal-content");

            let overlay = doc.create_element(Tag::Div);
            doc.add_class(overlay, "overlay");
            doc.set_attribute(overlay, OVERLAY_MARKER, "");

            let panel = doc.create_element(Tag::Div);
            doc.add_classes(panel, "modal medium");
            doc.append_child(overlay, panel);

            let header = doc.create_element(Tag::Header);
            if let Some(class) = &options.class_names.header {
                doc.add_classes(header, class);
            }
            doc.add_class(header, "header");
            doc.append_child(panel, header);

            let title = doc.create_element(Tag::Heading(3));
            doc.add_class(title, "title");
            doc.set_attribute(title, "id", title_id.as_str());
            doc.set_text_content(title, options.title.as_str());
            doc.append_child(header, title);

            let content = doc.create_element(Tag::Div);
            if let Some(class) = &options.class_names.content {
                doc.add_classes(content, class);
            }
            doc.add_class(content, "content");
            doc.set_attribute(content, "id", content_id.as_str());
            options.content.render(&mut doc, content);
            doc.append_child(panel, content);

            let footer = options.footer.as_ref().filter(|f| !f.is_empty()).map(|_| {
                let footer = doc.create_element(Tag::Div);
                if let Some(class) = &options.class_names.footer {
                    doc.add_classes(footer, class);
                }
                doc.add_class(footer, "footer");
                doc.append_child(panel, footer);
                footer
            });

            let binding = resolve_binding(
                &options.aria,
                &title_id,
                &content_id,
                options.content.kind(),
            );
            binding.apply(&mut doc, panel);
            (overlay, panel, header, title, content, footer, binding)
        };

        let weak = Rc::downgrade(this);
        let mut buttons = Vec::with_capacity(3);

        let close = Button::new()
            .shape(ButtonShape::Pill)
            .icon(ButtonIcon::Cross)
            .aria_label(options.aria.close_label())
            .on_click({
                let weak = Weak::clone(&weak);
                move || Self::request_close_weak(&weak, DismissalRequest::ExplicitControl)
            })
            .mount(host, header);
        let close_button = close.node();
        buttons.push(close);

        let mut action_button = None;
        let mut dismiss_button = None;
        if let (Some(footer_node), Some(spec)) = (footer, options.footer.as_ref()) {
            if let Some(action) = &spec.action {
                let label = action.label_or("footer.action", FALLBACK_ACTION_LABEL);
                let mounted = Self::footer_control(
                    host,
                    &weak,
                    footer_node,
                    action,
                    &label,
                    ButtonVariant::Action,
                );
                action_button = Some(mounted.node());
                buttons.push(mounted);
            }
            if let Some(dismiss) = &spec.dismiss {
                let label = dismiss.label_or("footer.dismiss", FALLBACK_DISMISS_LABEL);
                let mounted = Self::footer_control(
                    host,
                    &weak,
                    footer_node,
                    dismiss,
                    &label,
                    ButtonVariant::Default,
                );
                dismiss_button = Some(mounted.node());
                buttons.push(mounted);
            }
        }

        host.document_mut().append_child(container, overlay);

        let trap = Rc::new(RefCell::new(FocusTrap::new(&host.document(), panel)));
        let trap_listener = FocusTrap::listen(&trap, host);
        let dismissal = DismissalCoordinator::install(
            host,
            overlay,
            &policy,
            Rc::new(move |reason| Self::request_close_weak(&weak, reason)),
        );

        tracing::debug!(
            overlay = %overlay,
            container = %container,
            focusable = trap.borrow().focusable().len(),
            "dialog mounted"
        );

        Mounted {
            elements: DialogElements {
                overlay,
                panel,
                header,
                title,
                close_button,
                content,
                footer,
                action_button,
                dismiss_button,
            },
            binding,
            policy,
            trap,
            entry: None,
            _buttons: buttons,
            _trap_listener: trap_listener,
            _dismissal: dismissal,
        }
    }

    fn footer_control(
        host: &Host,
        weak: &Weak<Self>,
        footer: NodeId,
        spec: &ControlSpec,
        label: &str,
        variant: ButtonVariant,
    ) -> MountedButton {
        let weak = Weak::clone(weak);
        let callback = spec.on_activate.clone();
        Button::new()
            .variant(variant)
            .text(label)
            .disabled(spec.disabled)
            .on_click(move || {
                if let Some(callback) = &callback {
                    callback();
                }
                Self::request_close_weak(&weak, DismissalRequest::ExplicitControl);
            })
            .mount(host, footer)
    }

    fn entered(this: &Rc<Self>) {
        if !this.sequencer.borrow_mut().entered() {
            return;
        }
        if let Some(overlay) = this.mounted.borrow().as_ref().map(|m| m.elements.overlay) {
            Self::set_fade(&this.host, overlay, Fade::In);
        }
    }

    fn request_close_weak(weak: &Weak<Self>, reason: DismissalRequest) {
        if let Some(this) = weak.upgrade() {
            Self::request_close(&this, reason);
        }
    }

    fn request_close(this: &Rc<Self>, reason: DismissalRequest) -> bool {
        if !this.sequencer.borrow_mut().begin_close(reason) {
            return false;
        }
        let Some((overlay, delay)) = this
            .mounted
            .borrow()
            .as_ref()
            .map(|m| (m.elements.overlay, m.policy.exit_delay))
        else {
            return false;
        };
        Self::set_fade(&this.host, overlay, Fade::Out);
        let weak = Rc::downgrade(this);
        let handle = this.host.schedule(delay, move || {
            if let Some(this) = weak.upgrade() {
                Self::complete_close(&this);
            }
        });
        this.sequencer.borrow_mut().arm_close(handle);
        true
    }

    fn complete_close(this: &Rc<Self>) {
        if this.sequencer.borrow().state() != DialogLifecycleState::Closing {
            return;
        }
        let (overlay, restore_focus) = match this.mounted.borrow().as_ref() {
            Some(m) => (Some(m.elements.overlay), m.policy.restore_focus),
            None => (None, false),
        };
        let (trigger, on_close) = {
            let options = this.options.borrow();
            (options.trigger, options.on_close.clone())
        };

        if restore_focus {
            if let Some(trigger) = trigger {
                let usable = {
                    let doc = this.host.document();
                    doc.is_alive(trigger) && doc.is_connected(trigger)
                };
                if usable {
                    this.host.focus(trigger);
                } else {
                    tracing::debug!(%trigger, "trigger gone; focus not restored");
                }
            }
        }

        this.sequencer.borrow_mut().finish_close();
        if let Some(on_close) = on_close {
            on_close();
        }

        // The callback may have reopened the dialog onto a fresh mount.
        let current = this.mounted.borrow().as_ref().map(|m| m.elements.overlay);
        if current.is_some() && current == overlay {
            let mounted = this.mounted.borrow_mut().take();
            if let Some(mounted) = mounted {
                Self::teardown(&this.host, mounted);
            }
        }
    }

    fn unmount(this: &Rc<Self>) {
        let state = this.sequencer.borrow().state();
        match state {
            DialogLifecycleState::Closing => {
                tracing::debug!("forced unmount while closing; completing close");
                Self::complete_close(this);
            }
            DialogLifecycleState::Opening | DialogLifecycleState::Open => {
                this.sequencer.borrow_mut().abort();
                let mounted = this.mounted.borrow_mut().take();
                if let Some(mounted) = mounted {
                    Self::teardown(&this.host, mounted);
                }
            }
            DialogLifecycleState::Unopened | DialogLifecycleState::Closed => {}
        }
    }

    fn teardown(host: &Host, mounted: Mounted) {
        if let Some(entry) = &mounted.entry {
            entry.cancel();
        }
        let overlay = mounted.elements.overlay;
        drop(mounted);
        host.document_mut().remove(overlay);
        tracing::debug!(overlay = %overlay, "dialog unmounted");
    }

    fn set_fade(host: &Host, overlay: NodeId, fade: Fade) {
        let mut doc = host.document_mut();
        doc.remove_class(overlay, fade.opposite().class());
        doc.add_class(overlay, fade.class());
    }
}
