#![forbid(unsafe_code)]

//! Widgets for modalkit: the accessible modal dialog and its trigger button.

pub mod button;
pub mod error;
pub mod focus;
pub mod modal;

pub use button::{Button, ButtonIcon, ButtonShape, ButtonType, ButtonVariant, MountedButton};
pub use error::DialogError;
pub use focus::{FocusTrap, FocusableSet, TabOutcome};
pub use modal::{
    ClassNames, Content, ControlSpec, DialogLifecycleState, DialogOptions, DismissalRequest,
    Footer, Modal,
};
