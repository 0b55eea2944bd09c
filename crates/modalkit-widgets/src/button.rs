#![forbid(unsafe_code)]

//! Push button used as dialog trigger and dialog control.
//!
//! The button is described by a builder and rendered as a native `button`
//! element. Styling is left to class names: `button`, then the variant
//! (`action` or `default`), then the shape (`pill` or `rounded`).
//!
//! # Example
//!
//! ```ignore
//! let trigger = Button::new()
//!     .text("Open modal")
//!     .on_click(move || modal.open())
//!     .mount(&host, body);
//! ```

use std::fmt;
use std::rc::Rc;

use modalkit_core::{Document, EventType, ListenerGuard, ListenerTarget, NodeId, Tag};
use modalkit_runtime::Host;

/// Visual emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVariant {
    /// Primary call to action.
    Action,
    #[default]
    Default,
}

impl ButtonVariant {
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Default => "default",
        }
    }
}

/// Corner style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonShape {
    Pill,
    #[default]
    Rounded,
}

impl ButtonShape {
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Pill => "pill",
            Self::Rounded => "rounded",
        }
    }
}

/// Value of the `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonType {
    #[default]
    Button,
    Submit,
    Reset,
}

impl ButtonType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Submit => "submit",
            Self::Reset => "reset",
        }
    }
}

/// Built-in icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonIcon {
    /// Diagonal cross, used by close controls.
    Cross,
}

impl ButtonIcon {
    fn render(self, doc: &mut Document) -> NodeId {
        let svg = doc.create_element(Tag::Svg);
        doc.set_attribute(svg, "aria-hidden", "true");
        doc.set_attribute(svg, "focusable", "false");
        match self {
            Self::Cross => {
                doc.set_attribute(svg, "class", "icon cross");
                doc.set_attribute(svg, "viewBox", "0 0 24 24");
            }
        }
        svg
    }
}

/// Click callback.
pub type ClickHandler = Rc<dyn Fn()>;

/// Button builder.
#[derive(Clone, Default)]
pub struct Button {
    text: Option<String>,
    variant: ButtonVariant,
    shape: ButtonShape,
    button_type: ButtonType,
    icon: Option<ButtonIcon>,
    aria_label: Option<String>,
    disabled: bool,
    class: Option<String>,
    id: Option<String>,
    on_click: Option<ClickHandler>,
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("text", &self.text)
            .field("variant", &self.variant)
            .field("shape", &self.shape)
            .field("type", &self.button_type)
            .field("icon", &self.icon)
            .field("aria_label", &self.aria_label)
            .field("disabled", &self.disabled)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

impl Button {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible label.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub fn shape(mut self, shape: ButtonShape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn button_type(mut self, button_type: ButtonType) -> Self {
        self.button_type = button_type;
        self
    }

    /// Icon rendered before the label.
    #[must_use]
    pub fn icon(mut self, icon: ButtonIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Accessible label, for icon-only buttons.
    #[must_use]
    pub fn aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    /// Disabled buttons cannot be focused or clicked.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Extra class names, appended after the built-in ones.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Element identifier.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn on_click(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(handler));
        self
    }

    /// Use an already shared handler.
    #[must_use]
    pub fn on_click_shared(mut self, handler: ClickHandler) -> Self {
        self.on_click = Some(handler);
        self
    }

    /// Create the element (and icon) under `parent`. No listener is bound.
    pub fn render(&self, doc: &mut Document, parent: NodeId) -> NodeId {
        let node = doc.create_element(Tag::Button);
        doc.set_attribute(node, "type", self.button_type.as_str());
        doc.add_class(node, "button");
        doc.add_class(node, self.variant.class());
        doc.add_class(node, self.shape.class());
        if let Some(class) = &self.class {
            doc.add_classes(node, class);
        }
        if let Some(id) = &self.id {
            doc.set_attribute(node, "id", id.as_str());
        }
        if let Some(label) = &self.aria_label {
            doc.set_attribute(node, "aria-label", label.as_str());
        }
        if self.disabled {
            doc.set_attribute(node, "disabled", "");
            doc.set_attribute(node, "aria-disabled", "true");
        }
        if let Some(icon) = self.icon {
            let svg = icon.render(doc);
            doc.append_child(node, svg);
        }
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            let label = doc.create_text(text);
            doc.append_child(node, label);
        }
        doc.append_child(parent, node);
        node
    }

    /// Attach the click handler to a rendered button.
    pub fn bind(&self, host: &Host, node: NodeId) -> Option<ListenerGuard> {
        let handler = self.on_click.clone()?;
        Some(host.add_listener(
            ListenerTarget::Node(node),
            EventType::Click,
            move |_| handler(),
        ))
    }

    /// Render under `parent` and bind the handler.
    pub fn mount(&self, host: &Host, parent: NodeId) -> MountedButton {
        let node = self.render(&mut host.document_mut(), parent);
        let click = self.bind(host, node);
        MountedButton { node, click }
    }
}

/// A button in the document. Dropping it releases the click listener but
/// leaves the element in place.
#[derive(Debug)]
pub struct MountedButton {
    node: NodeId,
    click: Option<ListenerGuard>,
}

impl MountedButton {
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Whether a click handler is attached.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.click.as_ref().is_some_and(ListenerGuard::is_active)
    }
}
