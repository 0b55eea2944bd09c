#![forbid(unsafe_code)]

//! Dialog configuration.

use std::fmt;
use std::rc::Rc;

use modalkit_a11y::{AriaOverrides, ContentKind};
use modalkit_core::{Document, NodeId};
use modalkit_runtime::DialogPolicy;

use crate::error::DialogError;

/// A footer control: label, callback, and enabled state.
#[derive(Clone)]
pub struct ControlSpec {
    pub label: String,
    pub on_activate: Option<Rc<dyn Fn()>>,
    pub disabled: bool,
}

impl fmt::Debug for ControlSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSpec")
            .field("label", &self.label)
            .field("on_activate", &self.on_activate.is_some())
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl ControlSpec {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            on_activate: None,
            disabled: false,
        }
    }

    /// Callback run before the dialog starts closing.
    #[must_use]
    pub fn on_activate(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_activate = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Check the control is usable.
    ///
    /// # Errors
    ///
    /// [`DialogError::Configuration`] when the label is blank.
    pub fn validate(&self, field: &'static str) -> Result<(), DialogError> {
        if self.label.trim().is_empty() {
            return Err(DialogError::Configuration {
                field,
                reason: "label is empty".to_owned(),
            });
        }
        Ok(())
    }

    /// The label to render, substituting `fallback` for a blank label.
    pub(crate) fn label_or(&self, field: &'static str, fallback: &str) -> String {
        match self.validate(field) {
            Ok(()) => self.label.clone(),
            Err(err) => {
                tracing::warn!(%err, fallback, "using fallback footer label");
                fallback.to_owned()
            }
        }
    }
}

/// Footer controls. A footer with neither control is not rendered.
#[derive(Debug, Clone, Default)]
pub struct Footer {
    /// Primary control, rendered first with the `action` variant.
    pub action: Option<ControlSpec>,
    /// Secondary control, rendered with the `default` variant.
    pub dismiss: Option<ControlSpec>,
}

impl Footer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn action(mut self, control: ControlSpec) -> Self {
        self.action = Some(control);
        self
    }

    #[must_use]
    pub fn dismiss(mut self, control: ControlSpec) -> Self {
        self.dismiss = Some(control);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.action.is_none() && self.dismiss.is_none()
    }
}

/// Builds structured content under the content region.
pub type ContentBuilder = Rc<dyn Fn(&mut Document, NodeId)>;

/// Dialog body.
#[derive(Clone)]
pub enum Content {
    /// Plain text; also becomes the dialog's default description.
    Text(String),
    /// Caller-built elements appended to the content region.
    Nodes(ContentBuilder),
}

impl Content {
    /// Structured content from a builder.
    #[must_use]
    pub fn nodes(builder: impl Fn(&mut Document, NodeId) + 'static) -> Self {
        Self::Nodes(Rc::new(builder))
    }

    #[must_use]
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text(_) => ContentKind::PlainText,
            Self::Nodes(_) => ContentKind::Structured,
        }
    }

    pub(crate) fn render(&self, doc: &mut Document, region: NodeId) {
        match self {
            Self::Text(text) => {
                doc.set_text_content(region, text.as_str());
            }
            Self::Nodes(build) => build(doc, region),
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Nodes(_) => f.write_str("Nodes(..)"),
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Extra class names for the dialog regions, appended before the built-in
/// ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames {
    pub header: Option<String>,
    pub content: Option<String>,
    pub footer: Option<String>,
}

impl ClassNames {
    #[must_use]
    pub fn header(mut self, class: impl Into<String>) -> Self {
        self.header = Some(class.into());
        self
    }

    #[must_use]
    pub fn content(mut self, class: impl Into<String>) -> Self {
        self.content = Some(class.into());
        self
    }

    #[must_use]
    pub fn footer(mut self, class: impl Into<String>) -> Self {
        self.footer = Some(class.into());
        self
    }
}

/// Close notification.
pub type CloseHandler = Rc<dyn Fn()>;

/// Everything a dialog needs to render and behave.
#[derive(Clone, Default)]
pub struct DialogOptions {
    pub title: String,
    pub content: Content,
    pub footer: Option<Footer>,
    pub on_close: Option<CloseHandler>,
    /// Control focus returns to after closing.
    pub trigger: Option<NodeId>,
    pub aria: AriaOverrides,
    pub class_names: ClassNames,
    /// Overrides the scope's default policy.
    pub policy: Option<DialogPolicy>,
}

impl fmt::Debug for DialogOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogOptions")
            .field("title", &self.title)
            .field("content", &self.content)
            .field("footer", &self.footer)
            .field("on_close", &self.on_close.is_some())
            .field("trigger", &self.trigger)
            .field("aria", &self.aria)
            .field("class_names", &self.class_names)
            .field("policy", &self.policy)
            .finish()
    }
}

impl DialogOptions {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<Content>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub fn footer(mut self, footer: Footer) -> Self {
        self.footer = Some(footer);
        self
    }

    #[must_use]
    pub fn on_close(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_close = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: NodeId) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn aria(mut self, aria: AriaOverrides) -> Self {
        self.aria = aria;
        self
    }

    #[must_use]
    pub fn class_names(mut self, class_names: ClassNames) -> Self {
        self.class_names = class_names;
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: DialogPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}
