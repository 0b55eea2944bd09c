#![forbid(unsafe_code)]

//! Event listener registry with RAII removal.
//!
//! Listeners are keyed by `(target, event type)`. Registering returns a
//! [`ListenerGuard`]; dropping the guard removes the listener. This mirrors
//! the subscribe/unsubscribe discipline of the reactive runtime: a
//! component that mounts listeners holds their guards and releases them on
//! unmount, so a listener can never outlive its owner.
//!
//! # Invariants
//!
//! - Listeners on the same key run in registration order.
//! - A listener removed during dispatch is not invoked afterwards, even if
//!   it was part of the snapshot taken before dispatch started.
//! - Dropping a guard after the registry is gone is a no-op.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::dom::NodeId;
use crate::event::{Event, EventType, KeyEvent};

/// Where a listener is attached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    /// Document-level listener; sees every event after it bubbles.
    Document,
    /// Listener on a single element.
    Node(NodeId),
}

/// An event in flight, as seen by listeners.
///
/// Propagation flags use interior mutability so listeners can receive a
/// shared reference.
pub struct DomEvent {
    event: Event,
    target: Option<NodeId>,
    current_target: Cell<ListenerTarget>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    immediate_stopped: Cell<bool>,
}

impl DomEvent {
    /// Create an event aimed at `target` (`None` targets the body).
    #[must_use]
    pub fn new(event: Event, target: Option<NodeId>) -> Self {
        let current = target.map_or(ListenerTarget::Document, ListenerTarget::Node);
        Self {
            event,
            target,
            current_target: Cell::new(current),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
            immediate_stopped: Cell::new(false),
        }
    }

    /// The underlying input.
    #[inline]
    #[must_use]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// The key event, when this is a key-down.
    #[must_use]
    pub fn key(&self) -> Option<&KeyEvent> {
        match &self.event {
            Event::Key(key) => Some(key),
            Event::Click => None,
        }
    }

    /// Element the event was dispatched at.
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Where the currently running listener is attached.
    #[inline]
    #[must_use]
    pub fn current_target(&self) -> ListenerTarget {
        self.current_target.get()
    }

    /// Set by the dispatcher while walking the propagation path.
    pub fn set_current_target(&self, target: ListenerTarget) {
        self.current_target.set(target);
    }

    /// Suppress the host's default action for this event.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    #[inline]
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop bubbling after the current target's listeners have run.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Stop bubbling and skip the remaining listeners on the current target.
    pub fn stop_immediate_propagation(&self) {
        self.propagation_stopped.set(true);
        self.immediate_stopped.set(true);
    }

    #[inline]
    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    #[inline]
    #[must_use]
    pub fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_stopped.get()
    }
}

impl fmt::Debug for DomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomEvent")
            .field("event", &self.event)
            .field("target", &self.target)
            .field("current_target", &self.current_target.get())
            .field("default_prevented", &self.default_prevented.get())
            .field("propagation_stopped", &self.propagation_stopped.get())
            .finish()
    }
}

/// Callback type stored by the registry.
pub type ListenerFn = Rc<dyn Fn(&DomEvent)>;

/// A registry shared between the host and the guards it hands out.
pub type SharedRegistry = Rc<RefCell<ListenerRegistry>>;

type ListenerKey = (ListenerTarget, EventType);

/// Storage for event listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: AHashMap<ListenerKey, Vec<(u64, ListenerFn)>>,
    keys: AHashMap<u64, ListenerKey>,
    next_id: u64,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.keys.len())
            .finish()
    }
}

impl ListenerRegistry {
    /// Create an empty shared registry.
    #[must_use]
    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Register a listener; it stays registered while the guard lives.
    pub fn add(
        registry: &SharedRegistry,
        target: ListenerTarget,
        event_type: EventType,
        listener: impl Fn(&DomEvent) + 'static,
    ) -> ListenerGuard {
        let mut inner = registry.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        let key = (target, event_type);
        inner
            .listeners
            .entry(key)
            .or_default()
            .push((id, Rc::new(listener)));
        inner.keys.insert(id, key);
        ListenerGuard {
            registry: Rc::downgrade(registry),
            id,
        }
    }

    fn remove(&mut self, id: u64) -> bool {
        let Some(key) = self.keys.remove(&id) else {
            return false;
        };
        if let Some(list) = self.listeners.get_mut(&key) {
            list.retain(|(lid, _)| *lid != id);
            if list.is_empty() {
                self.listeners.remove(&key);
            }
        }
        true
    }

    /// Clone the listeners registered for a key, in registration order.
    ///
    /// Dispatch iterates the snapshot without holding a borrow, so
    /// listeners may add or remove listeners while running.
    #[must_use]
    pub fn snapshot(&self, target: ListenerTarget, event_type: EventType) -> Vec<(u64, ListenerFn)> {
        self.listeners
            .get(&(target, event_type))
            .map(|list| list.iter().map(|(id, f)| (*id, Rc::clone(f))).collect())
            .unwrap_or_default()
    }

    /// Whether the listener with `id` is still registered.
    #[must_use]
    pub fn is_registered(&self, id: u64) -> bool {
        self.keys.contains_key(&id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of listeners on a target, across all event types.
    #[must_use]
    pub fn count_for(&self, target: ListenerTarget) -> usize {
        self.keys.values().filter(|(t, _)| *t == target).count()
    }
}

/// Removes its listener when dropped.
#[must_use = "dropping the guard removes the listener immediately"]
pub struct ListenerGuard {
    registry: Weak<RefCell<ListenerRegistry>>,
    id: u64,
}

impl ListenerGuard {
    /// Whether the listener is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|r| r.borrow().is_registered(self.id))
    }

    /// Registry-assigned identifier.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            // Guards may drop while a listener runs; the registry is never
            // borrowed across listener calls, so try_borrow_mut only fails
            // on re-entrant drops from inside `add`.
            if let Ok(mut inner) = registry.try_borrow_mut() {
                inner.remove(self.id);
            }
        }
    }
}
