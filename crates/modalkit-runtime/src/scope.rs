#![forbid(unsafe_code)]

//! Ambient render target for dialogs.
//!
//! A [`ModalScope`] answers "where do dialogs mount, and with which default
//! policy?" for a subtree of the application. It is passed explicitly to
//! every dialog; there is no process-wide instance. The configured container
//! defaults to the document body, and a region can temporarily redirect
//! dialogs with [`ModalScope::push_container`].
//!
//! # Failure Modes
//!
//! - A container that was removed from the document (or never attached)
//!   is skipped with a warning, falling back to the next override, the
//!   configured container, and finally the body.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use modalkit_core::NodeId;

use crate::host::Host;
use crate::policy::DialogPolicy;

/// Dialog context: host, mount container, and default policy.
#[derive(Clone, Debug)]
pub struct ModalScope {
    host: Host,
    container: Option<NodeId>,
    policy: DialogPolicy,
    overrides: Rc<OverrideStack>,
}

/// Override entries keyed by a per-push token so guards may drop in any order.
#[derive(Debug, Default)]
struct OverrideStack {
    entries: RefCell<Vec<(u64, NodeId)>>,
    next_token: Cell<u64>,
}

impl ModalScope {
    /// A scope mounting into the document body with the default policy.
    #[must_use]
    pub fn new(host: &Host) -> Self {
        Self {
            host: host.clone(),
            container: None,
            policy: DialogPolicy::default(),
            overrides: Rc::new(OverrideStack::default()),
        }
    }

    /// Mount dialogs into `container` instead of the body.
    #[must_use]
    pub fn with_container(mut self, container: NodeId) -> Self {
        self.container = Some(container);
        self
    }

    /// Default policy for dialogs that do not bring their own.
    #[must_use]
    pub fn with_policy(mut self, policy: DialogPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[must_use]
    pub fn policy(&self) -> &DialogPolicy {
        &self.policy
    }

    /// The element dialogs should mount into right now.
    #[must_use]
    pub fn container(&self) -> NodeId {
        let doc = self.host.document();
        let usable = |node: NodeId| doc.is_element(node) && doc.is_connected(node);
        let overrides = self.overrides.entries.borrow();
        let stacked = overrides.iter().rev().map(|&(_, node)| node);
        for candidate in stacked.chain(self.container) {
            if usable(candidate) {
                return candidate;
            }
            tracing::warn!(container = %candidate, "modal container is stale; falling back");
        }
        doc.body()
    }

    /// Redirect dialogs opened through this scope (and its clones) into
    /// `container` until the guard drops.
    #[must_use = "dropping this guard clears the container override"]
    pub fn push_container(&self, container: NodeId) -> ContainerOverride {
        let token = self.overrides.next_token.get();
        self.overrides.next_token.set(token.wrapping_add(1));
        self.overrides.entries.borrow_mut().push((token, container));
        ContainerOverride {
            stack: Rc::clone(&self.overrides),
            token,
            container,
        }
    }
}

/// RAII guard for a scoped container override.
#[must_use = "dropping this guard clears the container override"]
pub struct ContainerOverride {
    stack: Rc<OverrideStack>,
    token: u64,
    container: NodeId,
}

impl ContainerOverride {
    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }
}

impl Drop for ContainerOverride {
    fn drop(&mut self) {
        let mut entries = self.stack.entries.borrow_mut();
        if let Some(pos) = entries.iter().rposition(|&(t, _)| t == self.token) {
            entries.remove(pos);
        }
    }
}
