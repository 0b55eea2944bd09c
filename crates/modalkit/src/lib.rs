#![forbid(unsafe_code)]

//! modalkit: accessible modal dialogs over a small element tree.
//!
//! This crate re-exports the layered `modalkit-*` crates and offers a
//! [`prelude`] with the types most callers need.
//!
//! ```ignore
//! use modalkit::prelude::*;
//!
//! let host = Host::new();
//! let scope = ModalScope::new(&host);
//! let modal = open(
//!     &scope,
//!     DialogOptions::new("Title")
//!         .content("Content")
//!         .footer(Footer::new().action(ControlSpec::new("Save"))),
//! );
//! host.tick();
//! host.press(KeyCode::Escape);
//! host.run_until_idle();
//! assert!(!modal.is_mounted());
//! ```

pub use modalkit_a11y as a11y;
pub use modalkit_core as dom;
#[cfg(feature = "runtime")]
pub use modalkit_runtime as runtime;
#[cfg(feature = "widgets")]
pub use modalkit_widgets as widgets;

pub use modalkit_a11y::{AriaOverrides, Role, accessible_description, accessible_name};
pub use modalkit_core::{Document, KeyCode, Modifiers, NodeId, Tag, to_markup};

#[cfg(feature = "runtime")]
pub use modalkit_runtime::{DialogPolicy, Host, ModalScope};

#[cfg(feature = "widgets")]
pub use modalkit_widgets::{
    Button, ClassNames, Content, ControlSpec, DialogError, DialogLifecycleState, DialogOptions,
    DismissalRequest, Footer, Modal,
};

#[cfg(feature = "widgets")]
pub use modalkit_widgets::modal::open;

pub mod prelude {
    //! Common imports.

    pub use modalkit_a11y::{AriaOverrides, Role, accessible_description, accessible_name};
    pub use modalkit_core::{Document, KeyCode, Modifiers, NodeId, Tag};

    #[cfg(feature = "runtime")]
    pub use modalkit_runtime::{DialogPolicy, Host, ModalScope};

    #[cfg(feature = "widgets")]
    pub use modalkit_widgets::modal::open;
    #[cfg(feature = "widgets")]
    pub use modalkit_widgets::{
        Button, ButtonVariant, ClassNames, Content, ControlSpec, DialogLifecycleState,
        DialogOptions, Footer, Modal,
    };
}
