#![forbid(unsafe_code)]

//! Focus discovery and containment.

mod scanner;
mod trap;

pub use scanner::{FocusableSet, matches_focusable_selector, scan, try_scan};
pub use trap::{FocusTrap, TabOutcome};
