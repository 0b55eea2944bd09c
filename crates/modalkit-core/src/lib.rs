#![forbid(unsafe_code)]

//! Core building blocks for modalkit: a minimal element tree, input events,
//! and a listener registry.
//!
//! Widgets never talk to a real browser. Instead they operate on a
//! [`Document`](dom::Document) that models exactly what an accessible dialog
//! needs: tags, attributes, text, document order, an active element, and
//! sequential tab navigation. Event listeners are registered through a
//! [`ListenerRegistry`](listener::ListenerRegistry) and released by dropping
//! the returned [`ListenerGuard`](listener::ListenerGuard).

pub mod dom;
pub mod event;
pub mod listener;
pub mod markup;

pub use dom::{Document, NodeId, Tag, TabDirection};
pub use event::{Event, EventType, KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use listener::{DomEvent, ListenerGuard, ListenerRegistry, ListenerTarget, SharedRegistry};
pub use markup::to_markup;
