#![forbid(unsafe_code)]

//! Single-threaded UI host: element tree, listeners, and deferred tasks.
//!
//! [`Host`] is a cheap, cloneable handle. Widgets keep a clone (or a
//! [`WeakHost`] inside callbacks stored in the host itself, to avoid
//! reference cycles) and interact with the world exclusively through it.
//!
//! # Dispatch
//!
//! Input is delivered like a browser would, minus the capture phase:
//!
//! 1. Due tasks are flushed, so zero-delay work scheduled by earlier input
//!    has run before the next event arrives.
//! 2. The event bubbles from its target through every ancestor to the
//!    document. Key events target the active element (the body when nothing
//!    has focus).
//! 3. Unless a listener called `prevent_default`, the default action runs:
//!    Tab/Shift+Tab move focus sequentially, and Enter/Space on an enabled
//!    button activate it with a click.
//!
//! # Invariants
//!
//! - No borrow of the document, the listener registry, or the scheduler is
//!   held while a listener or task runs. Callbacks may freely re-enter the
//!   host.
//! - Clicks on disabled form controls are never delivered.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use modalkit_core::{
    Document, DomEvent, Event, EventType, KeyCode, KeyEvent, ListenerGuard,
    ListenerRegistry, ListenerTarget, Modifiers, NodeId, SharedRegistry, Tag,
};
use web_time::Instant;

use crate::timer::{Scheduler, TaskHandle};

/// Upper bound on tasks drained by [`Host::run_until_idle`].
const MAX_IDLE_ITERATIONS: usize = 10_000;

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Element the event was aimed at.
    pub target: NodeId,
    /// Whether the event reached listeners at all.
    pub delivered: bool,
    /// Whether a listener suppressed the default action.
    pub default_prevented: bool,
    /// Number of listener invocations.
    pub listeners_invoked: usize,
}

impl DispatchOutcome {
    fn suppressed(target: NodeId) -> Self {
        Self {
            target,
            delivered: false,
            default_prevented: false,
            listeners_invoked: 0,
        }
    }
}

struct HostInner {
    document: RefCell<Document>,
    listeners: SharedRegistry,
    scheduler: RefCell<Scheduler>,
    clock_origin: Cell<Option<Instant>>,
}

/// Handle to the UI host.
#[derive(Clone)]
pub struct Host(Rc<HostInner>);

/// Non-owning handle to a [`Host`].
#[derive(Clone)]
pub struct WeakHost(Weak<HostInner>);

impl WeakHost {
    /// Recover the host if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Host> {
        self.0.upgrade().map(Host)
    }
}

impl fmt::Debug for WeakHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHost")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Host");
        match self.0.document.try_borrow() {
            Ok(doc) => s.field("nodes", &doc.len()).field("active", &doc.active_element()),
            Err(_) => s.field("document", &"<borrowed>"),
        };
        s.field("listeners", &self.listener_count())
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}

impl Host {
    /// Create a host with an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Create a host around an existing document.
    #[must_use]
    pub fn with_document(document: Document) -> Self {
        Self(Rc::new(HostInner {
            document: RefCell::new(document),
            listeners: ListenerRegistry::shared(),
            scheduler: RefCell::new(Scheduler::new()),
            clock_origin: Cell::new(None),
        }))
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakHost {
        WeakHost(Rc::downgrade(&self.0))
    }

    /// Whether two handles refer to the same host.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // --- Document ---

    /// Borrow the document.
    ///
    /// # Panics
    ///
    /// Panics if the document is mutably borrowed; never hold a borrow
    /// across a call that dispatches events or runs tasks.
    pub fn document(&self) -> Ref<'_, Document> {
        self.0.document.borrow()
    }

    /// Mutably borrow the document. Same borrowing rules as [`Self::document`].
    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.0.document.borrow_mut()
    }

    #[must_use]
    pub fn body(&self) -> NodeId {
        self.document().body()
    }

    #[must_use]
    pub fn active_element(&self) -> Option<NodeId> {
        self.document().active_element()
    }

    /// Move focus to `node`. Returns `false` when it cannot take focus.
    pub fn focus(&self, node: NodeId) -> bool {
        self.document_mut().focus(node)
    }

    // --- Listeners ---

    /// Register a listener; dropping the guard removes it.
    pub fn add_listener(
        &self,
        target: ListenerTarget,
        event_type: EventType,
        listener: impl Fn(&DomEvent) + 'static,
    ) -> ListenerGuard {
        ListenerRegistry::add(&self.0.listeners, target, event_type, listener)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    /// Number of listeners attached to `target`.
    #[must_use]
    pub fn listener_count_for(&self, target: ListenerTarget) -> usize {
        self.0.listeners.borrow().count_for(target)
    }

    // --- Tasks ---

    /// Schedule `run` after `delay` of virtual time.
    pub fn schedule(&self, delay: Duration, run: impl FnOnce() + 'static) -> TaskHandle {
        self.0.scheduler.borrow_mut().schedule(delay, run)
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.0.scheduler.borrow().now()
    }

    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.0.scheduler.borrow().pending_count()
    }

    /// Run every task due at the current time. Returns how many ran.
    pub fn tick(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Advance the virtual clock by `delta`, running tasks as they come due.
    pub fn advance(&self, delta: Duration) -> usize {
        let until = self.now().saturating_add(delta);
        let mut ran = 0;
        loop {
            let task = self.0.scheduler.borrow_mut().pop_due(until);
            let Some(task) = task else {
                break;
            };
            if task.run() {
                ran += 1;
            }
        }
        self.0.scheduler.borrow_mut().advance_to(until);
        ran
    }

    /// Run tasks until none are pending, jumping the clock as needed.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        for _ in 0..MAX_IDLE_ITERATIONS {
            let next = self.0.scheduler.borrow().next_due();
            let Some(due) = next else {
                return ran;
            };
            ran += self.advance(due.saturating_sub(self.now()));
        }
        tracing::warn!(
            limit = MAX_IDLE_ITERATIONS,
            "run_until_idle stopped with tasks still pending"
        );
        ran
    }

    /// Drive the virtual clock from wall time.
    ///
    /// The first call fixes the origin; later calls advance the clock by the
    /// time elapsed since then.
    pub fn sync_clock(&self, now: Instant) -> usize {
        let origin = match self.0.clock_origin.get() {
            Some(origin) => origin,
            None => {
                self.0.clock_origin.set(Some(now));
                now
            }
        };
        let elapsed = now.saturating_duration_since(origin);
        self.advance(elapsed.saturating_sub(self.now()))
    }

    // --- Input ---

    /// Press a key with no modifiers.
    pub fn press(&self, code: KeyCode) -> DispatchOutcome {
        self.dispatch_key(KeyEvent::new(code))
    }

    /// Press a key with modifiers held.
    pub fn press_with(&self, code: KeyCode, modifiers: Modifiers) -> DispatchOutcome {
        self.dispatch_key(KeyEvent::new(code).with_modifiers(modifiers))
    }

    /// Deliver a key event to the active element (or the body).
    pub fn dispatch_key(&self, key: KeyEvent) -> DispatchOutcome {
        self.tick();
        let target = {
            let doc = self.document();
            doc.active_element().unwrap_or_else(|| doc.body())
        };
        let outcome = self.dispatch(Event::Key(key), target);
        if !outcome.default_prevented {
            self.key_default_action(&key, target);
        }
        outcome
    }

    /// Deliver a click to `node`, without moving focus.
    pub fn click(&self, node: NodeId) -> DispatchOutcome {
        self.tick();
        let suppressed = {
            let doc = self.document();
            !doc.is_alive(node)
                || doc
                    .tag(node)
                    .is_some_and(|t| t.is_form_control() && doc.is_disabled(node))
        };
        if suppressed {
            tracing::trace!(target_node = %node, "click suppressed");
            return DispatchOutcome::suppressed(node);
        }
        self.dispatch(Event::Click, node)
    }

    /// A pointer press: focus `node` if it can take focus, then click it.
    pub fn pointer_click(&self, node: NodeId) -> DispatchOutcome {
        self.tick();
        self.focus(node);
        self.click(node)
    }

    fn dispatch(&self, event: Event, target: NodeId) -> DispatchOutcome {
        let event_type = event.event_type();
        let path: Vec<ListenerTarget> = self
            .document()
            .path_to_root(target)
            .into_iter()
            .map(ListenerTarget::Node)
            .chain(std::iter::once(ListenerTarget::Document))
            .collect();
        let dom_event = DomEvent::new(event, Some(target));
        let mut invoked = 0;
        for current in path {
            dom_event.set_current_target(current);
            let snapshot = self.0.listeners.borrow().snapshot(current, event_type);
            for (id, listener) in snapshot {
                if dom_event.immediate_propagation_stopped() {
                    break;
                }
                if !self.0.listeners.borrow().is_registered(id) {
                    continue;
                }
                listener(&dom_event);
                invoked += 1;
            }
            if dom_event.propagation_stopped() {
                break;
            }
        }
        tracing::trace!(
            ?event_type,
            target_node = %target,
            listeners = invoked,
            default_prevented = dom_event.default_prevented(),
            "event dispatched"
        );
        DispatchOutcome {
            target,
            delivered: true,
            default_prevented: dom_event.default_prevented(),
            listeners_invoked: invoked,
        }
    }

    fn key_default_action(&self, key: &KeyEvent, target: NodeId) {
        if let Some(direction) = key.tab_direction() {
            self.document_mut().focus_next(direction);
            return;
        }
        if !key.is_down() {
            return;
        }
        let activates = matches!(key.code, KeyCode::Enter | KeyCode::Char(' '))
            && self.document().tag(target) == Some(Tag::Button);
        if activates {
            self.click(target);
        }
    }
}
