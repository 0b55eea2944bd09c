#![forbid(unsafe_code)]

//! Input event types.
//!
//! Only the inputs a modal dialog reacts to are modelled: key presses and
//! pointer activation (click). Events are plain values; propagation state
//! lives on [`DomEvent`](crate::listener::DomEvent).

use bitflags::bitflags;

use crate::dom::TabDirection;

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT = 0b0000_0001;
        /// Alt / Option key.
        const ALT = 0b0000_0010;
        /// Control key.
        const CTRL = 0b0000_0100;
        /// Super / Command key.
        const SUPER = 0b0000_1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::empty()
    }
}

/// Logical key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    Enter,
    Escape,
    Tab,
    /// Reverse tab as reported by terminals (Shift+Tab collapsed into one code).
    BackTab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    /// Function key `F1..=F24`.
    F(u8),
}

/// Whether a key went down, auto-repeated, or was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    /// Set the held modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the event kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this event behaves like a key-down (press or auto-repeat).
    #[inline]
    #[must_use]
    pub fn is_down(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }

    /// Whether this is an Escape key-down.
    #[inline]
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.is_down() && self.code == KeyCode::Escape
    }

    /// Direction of sequential navigation requested by this event, if any.
    ///
    /// `Tab` is forward unless Shift is held; `BackTab` is always backward.
    #[must_use]
    pub fn tab_direction(&self) -> Option<TabDirection> {
        if !self.is_down() {
            return None;
        }
        match self.code {
            KeyCode::Tab if self.modifiers.contains(Modifiers::SHIFT) => {
                Some(TabDirection::Backward)
            }
            KeyCode::Tab => Some(TabDirection::Forward),
            KeyCode::BackTab => Some(TabDirection::Backward),
            _ => None,
        }
    }
}

/// Listener-facing event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    KeyDown,
    Click,
}

/// An input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Primary-button activation.
    Click,
}

impl Event {
    /// The listener channel this event is delivered on.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Key(_) => EventType::KeyDown,
            Self::Click => EventType::Click,
        }
    }
}
