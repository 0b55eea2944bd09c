#![forbid(unsafe_code)]

//! Dialog lifecycle state machine.
//!
//! State machine: Unopened → Opening → Open → Closing → Closed, and
//! Closed → Opening again on reopen.
//!
//! The sequencer only tracks state and the pending exit task; the dialog
//! shell performs the side effects (classes, focus, notification) around
//! each transition. Every method returns whether the transition happened,
//! so callers can treat a refused transition as a no-op.
//!
//! # Invariants
//!
//! - `begin_close` succeeds only from `Open`. Repeated dismissal while
//!   `Closing` is refused, which makes the close notification fire once
//!   per open.
//! - At most one exit task is pending; `finish_close` and `abort` consume
//!   it.

use modalkit_runtime::TaskHandle;

use super::dismissal::DismissalRequest;

/// Where a dialog is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogLifecycleState {
    /// Never opened.
    #[default]
    Unopened,
    /// Mounted; entry transition not started yet.
    Opening,
    /// Fully open and interactive.
    Open,
    /// Exit transition running; the close notification is pending.
    Closing,
    /// Closed after a completed close sequence.
    Closed,
}

impl DialogLifecycleState {
    /// Whether the dialog is in the document.
    #[inline]
    #[must_use]
    pub fn is_mounted(self) -> bool {
        matches!(self, Self::Opening | Self::Open | Self::Closing)
    }

    /// Whether an open request is accepted.
    #[inline]
    #[must_use]
    pub fn can_open(self) -> bool {
        matches!(self, Self::Unopened | Self::Closed)
    }
}

/// Fade classes applied to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    In,
    Out,
}

impl Fade {
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::In => "fade-in",
            Self::Out => "fade-out",
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }
}

/// Tracks the lifecycle state and the pending exit task.
#[derive(Debug, Default)]
pub struct TransitionSequencer {
    state: DialogLifecycleState,
    close_reason: Option<DismissalRequest>,
    pending: Option<TaskHandle>,
}

impl TransitionSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> DialogLifecycleState {
        self.state
    }

    /// Reason of the close in progress (or last completed).
    #[must_use]
    pub fn close_reason(&self) -> Option<DismissalRequest> {
        self.close_reason
    }

    /// Unopened/Closed → Opening.
    pub fn begin_open(&mut self) -> bool {
        if !self.state.can_open() {
            return false;
        }
        self.transition(DialogLifecycleState::Opening);
        self.close_reason = None;
        true
    }

    /// Opening → Open.
    pub fn entered(&mut self) -> bool {
        if self.state != DialogLifecycleState::Opening {
            return false;
        }
        self.transition(DialogLifecycleState::Open);
        true
    }

    /// Open → Closing.
    pub fn begin_close(&mut self, reason: DismissalRequest) -> bool {
        if self.state != DialogLifecycleState::Open {
            tracing::trace!(state = ?self.state, ?reason, "close request ignored");
            return false;
        }
        self.close_reason = Some(reason);
        self.transition(DialogLifecycleState::Closing);
        true
    }

    /// Remember the exit task so it can be cancelled.
    pub fn arm_close(&mut self, handle: TaskHandle) {
        if let Some(previous) = self.pending.replace(handle) {
            previous.cancel();
        }
    }

    /// Cancel and forget the pending exit task, if any.
    pub fn take_pending(&mut self) -> Option<TaskHandle> {
        let handle = self.pending.take()?;
        handle.cancel();
        Some(handle)
    }

    #[must_use]
    pub fn has_pending_close(&self) -> bool {
        self.pending.as_ref().is_some_and(TaskHandle::is_pending)
    }

    /// Closing → Closed.
    pub fn finish_close(&mut self) -> bool {
        if self.state != DialogLifecycleState::Closing {
            return false;
        }
        self.take_pending();
        self.transition(DialogLifecycleState::Closed);
        true
    }

    /// Opening/Open → Closed without a close sequence (forced unmount).
    pub fn abort(&mut self) -> bool {
        if !matches!(
            self.state,
            DialogLifecycleState::Opening | DialogLifecycleState::Open
        ) {
            return false;
        }
        self.take_pending();
        self.transition(DialogLifecycleState::Closed);
        true
    }

    fn transition(&mut self, to: DialogLifecycleState) {
        tracing::debug!(from = ?self.state, ?to, "dialog lifecycle transition");
        self.state = to;
    }
}
