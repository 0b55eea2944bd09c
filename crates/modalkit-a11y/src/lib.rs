#![forbid(unsafe_code)]

//! Accessibility layer for modalkit.
//!
//! Two halves:
//!
//! - [`binding`]: the attribute contract a dialog panel carries (role,
//!   modality, labelling, description) and how caller overrides combine
//!   with generated identifiers.
//! - [`accname`]: the read side, computing accessible names and
//!   descriptions from the element tree the way assistive technology does.
//!   Tests query the tree through these functions instead of poking at raw
//!   attributes.

pub mod accname;
pub mod binding;
pub mod role;

pub use accname::{accessible_description, accessible_name, find_by_label, find_by_role, role_of};
pub use binding::{
    AccessibilityBinding, AriaOverrides, ContentKind, DEFAULT_CLOSE_LABEL, resolve_binding,
};
pub use role::Role;
