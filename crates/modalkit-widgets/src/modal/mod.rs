#![forbid(unsafe_code)]

//! Accessible modal dialog: shell, dismissal, lifecycle, and options.
//!
//! # Focus Management
//!
//! - **Initial focus**: the first focusable element in the panel, else the
//!   header close control
//! - **Focus trap**: Tab/Shift+Tab wrap at the panel's boundaries
//! - **Focus restore**: focus returns to the trigger after the exit delay,
//!   before the close notification
//!
//! # Dismissal
//!
//! Escape, a click on the overlay itself, the header close control, and the
//! footer controls all request a close. Requests while the dialog is not
//! open are ignored.
//!
//! # Example
//!
//! ```ignore
//! use modalkit_widgets::modal::{open, ControlSpec, DialogOptions, Footer};
//!
//! let modal = open(
//!     &scope,
//!     DialogOptions::new("Delete file?")
//!         .content("This cannot be undone.")
//!         .footer(Footer::new().action(ControlSpec::new("Delete")))
//!         .trigger(delete_button)
//!         .on_close(|| tracing::info!("closed")),
//! );
//! ```

mod dialog;
mod dismissal;
mod options;
mod transition;

pub use dialog::{
    DialogElements, FALLBACK_ACTION_LABEL, FALLBACK_DISMISS_LABEL, Modal, open,
};
pub use dismissal::{
    DismissGestures, DismissHandler, DismissalCoordinator, DismissalRequest, OVERLAY_MARKER,
    is_outside_activation, owns_key_event,
};
pub use options::{
    ClassNames, CloseHandler, Content, ContentBuilder, ControlSpec, DialogOptions, Footer,
};
pub use transition::{DialogLifecycleState, Fade, TransitionSequencer};
