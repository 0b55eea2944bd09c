#![forbid(unsafe_code)]

//! Widget error taxonomy.
//!
//! Errors never cross an event handler. They are produced by validation
//! and lookup helpers, logged, and then degraded to a safe default by the
//! caller (a fallback label, an empty focusable set).

use modalkit_core::NodeId;

/// Errors detected while configuring or mounting a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    /// A caller-supplied option was unusable.
    Configuration {
        field: &'static str,
        reason: String,
    },
    /// The element a scan or mount needed is gone.
    MissingRoot(Option<NodeId>),
}

impl std::fmt::Display for DialogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration { field, reason } => {
                write!(f, "invalid dialog option '{field}': {reason}")
            }
            Self::MissingRoot(Some(node)) => write!(f, "root element {node} is not in the document"),
            Self::MissingRoot(None) => write!(f, "dialog is not mounted"),
        }
    }
}

impl std::error::Error for DialogError {}
