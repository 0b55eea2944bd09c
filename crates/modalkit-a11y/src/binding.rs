#![forbid(unsafe_code)]

//! Dialog accessibility attribute resolution.
//!
//! A dialog panel is exposed as `role="dialog"` with `aria-modal="true"`,
//! named by its title and described by its content. Callers may override
//! either reference; otherwise the generated identifiers are used.
//!
//! # Invariants
//!
//! - `labelled_by` is always present: the override when non-empty, else the
//!   generated title identifier.
//! - `described_by` defaults to the content identifier only for plain-text
//!   content. Structured content has no automatic description.
//! - Empty or whitespace-only overrides count as absent.

use modalkit_core::{Document, NodeId};

use crate::role::Role;

/// Default accessible label for the header close control.
pub const DEFAULT_CLOSE_LABEL: &str = "Close";

/// Caller-supplied accessibility overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AriaOverrides {
    /// Identifier(s) of the element(s) naming the dialog.
    pub labelled_by: Option<String>,
    /// Identifier(s) of the element(s) describing the dialog.
    pub described_by: Option<String>,
    /// Accessible label of the header close control.
    pub close_button_label: Option<String>,
}

impl AriaOverrides {
    /// Create empty overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override `aria-labelledby`.
    #[must_use]
    pub fn labelled_by(mut self, ids: impl Into<String>) -> Self {
        self.labelled_by = Some(ids.into());
        self
    }

    /// Override `aria-describedby`.
    #[must_use]
    pub fn described_by(mut self, ids: impl Into<String>) -> Self {
        self.described_by = Some(ids.into());
        self
    }

    /// Override the close control's accessible label.
    #[must_use]
    pub fn close_button_label(mut self, label: impl Into<String>) -> Self {
        self.close_button_label = Some(label.into());
        self
    }

    /// The close control label, falling back to [`DEFAULT_CLOSE_LABEL`].
    #[must_use]
    pub fn close_label(&self) -> &str {
        non_empty(self.close_button_label.as_deref()).unwrap_or(DEFAULT_CLOSE_LABEL)
    }
}

/// Shape of the dialog's content, which decides the description default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// A single string of text.
    PlainText,
    /// Arbitrary caller-built elements.
    Structured,
}

/// The resolved attribute set for a dialog panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibilityBinding {
    pub role: Role,
    pub aria_modal: bool,
    pub labelled_by: String,
    pub described_by: Option<String>,
}

impl AccessibilityBinding {
    /// Write the binding onto `node`.
    ///
    /// Stale attributes from a previous binding (a description that no
    /// longer applies) are removed.
    pub fn apply(&self, doc: &mut Document, node: NodeId) {
        doc.set_attribute(node, "role", self.role.as_str());
        if self.aria_modal {
            doc.set_attribute(node, "aria-modal", "true");
        } else {
            doc.remove_attribute(node, "aria-modal");
        }
        doc.set_attribute(node, "aria-labelledby", self.labelled_by.as_str());
        match &self.described_by {
            Some(ids) => {
                doc.set_attribute(node, "aria-describedby", ids.as_str());
            }
            None => {
                doc.remove_attribute(node, "aria-describedby");
            }
        }
    }
}

/// Combine caller overrides with the generated title/content identifiers.
#[must_use]
pub fn resolve_binding(
    overrides: &AriaOverrides,
    title_id: &str,
    content_id: &str,
    content: ContentKind,
) -> AccessibilityBinding {
    let labelled_by = non_empty(overrides.labelled_by.as_deref())
        .unwrap_or(title_id)
        .to_owned();
    let described_by = match non_empty(overrides.described_by.as_deref()) {
        Some(ids) => Some(ids.to_owned()),
        None if content == ContentKind::PlainText => Some(content_id.to_owned()),
        None => None,
    };
    AccessibilityBinding {
        role: Role::Dialog,
        aria_modal: true,
        labelled_by,
        described_by,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
