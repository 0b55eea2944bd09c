#![forbid(unsafe_code)]

//! Dialog behaviour policy.
//!
//! [`DialogPolicy`] collects the knobs that vary between deployments: how
//! long the exit transition lasts and which dismissal gestures are honoured.
//! The defaults reproduce the reference behaviour (500 ms fade-out, escape
//! and outside click both close, focus returns to the trigger).
//!
//! With the `policy-config` feature a policy can be loaded from TOML or
//! JSON. Every field is optional; missing fields keep their defaults and
//! unknown fields are rejected.
//!
//! ```toml
//! exit_delay_ms = 250
//! close_on_outside_click = false
//! ```

use std::fmt;
use std::time::Duration;

/// Default exit transition length.
pub const DEFAULT_EXIT_DELAY: Duration = Duration::from_millis(500);

/// Per-dialog behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogPolicy {
    /// Time between a dismissal and the close notification.
    pub exit_delay: Duration,
    /// Close when Escape is pressed.
    pub close_on_escape: bool,
    /// Close when the overlay itself is clicked.
    pub close_on_outside_click: bool,
    /// Return focus to the trigger after closing.
    pub restore_focus: bool,
}

impl Default for DialogPolicy {
    fn default() -> Self {
        Self {
            exit_delay: DEFAULT_EXIT_DELAY,
            close_on_escape: true,
            close_on_outside_click: true,
            restore_focus: true,
        }
    }
}

impl DialogPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exit transition length. Zero closes on the next task flush.
    #[must_use]
    pub fn exit_delay(mut self, delay: Duration) -> Self {
        self.exit_delay = delay;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    #[must_use]
    pub fn close_on_outside_click(mut self, close: bool) -> Self {
        self.close_on_outside_click = close;
        self
    }

    #[must_use]
    pub fn restore_focus(mut self, restore: bool) -> Self {
        self.restore_focus = restore;
        self
    }
}

/// Errors from loading a policy file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The TOML document could not be parsed.
    Toml(String),
    /// The JSON document could not be parsed.
    Json(String),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml(msg) => write!(f, "invalid TOML dialog policy: {msg}"),
            Self::Json(msg) => write!(f, "invalid JSON dialog policy: {msg}"),
        }
    }
}

impl std::error::Error for PolicyError {}

#[cfg(feature = "policy-config")]
mod config {
    use super::{DialogPolicy, PolicyError};
    use serde::Deserialize;
    use std::time::Duration;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct PolicyFile {
        exit_delay_ms: Option<u64>,
        close_on_escape: Option<bool>,
        close_on_outside_click: Option<bool>,
        restore_focus: Option<bool>,
    }

    impl PolicyFile {
        fn into_policy(self) -> DialogPolicy {
            let base = DialogPolicy::default();
            DialogPolicy {
                exit_delay: self
                    .exit_delay_ms
                    .map_or(base.exit_delay, Duration::from_millis),
                close_on_escape: self.close_on_escape.unwrap_or(base.close_on_escape),
                close_on_outside_click: self
                    .close_on_outside_click
                    .unwrap_or(base.close_on_outside_click),
                restore_focus: self.restore_focus.unwrap_or(base.restore_focus),
            }
        }
    }

    impl DialogPolicy {
        /// Parse a policy from TOML.
        ///
        /// # Errors
        ///
        /// Returns [`PolicyError::Toml`] on malformed input or unknown keys.
        pub fn from_toml_str(input: &str) -> Result<Self, PolicyError> {
            let file: PolicyFile =
                toml::from_str(input).map_err(|e| PolicyError::Toml(e.to_string()))?;
            let policy = file.into_policy();
            tracing::debug!(?policy, "dialog policy loaded from TOML");
            Ok(policy)
        }

        /// Parse a policy from JSON.
        ///
        /// # Errors
        ///
        /// Returns [`PolicyError::Json`] on malformed input or unknown keys.
        pub fn from_json_str(input: &str) -> Result<Self, PolicyError> {
            let file: PolicyFile =
                serde_json::from_str(input).map_err(|e| PolicyError::Json(e.to_string()))?;
            let policy = file.into_policy();
            tracing::debug!(?policy, "dialog policy loaded from JSON");
            Ok(policy)
        }
    }
}
