#![forbid(unsafe_code)]

//! Semantic roles.

use std::fmt;

use modalkit_core::Tag;

/// Semantic role of an element, as exposed to assistive technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Modal or non-modal dialog window.
    Dialog,
    /// Dialog that interrupts with urgent information.
    AlertDialog,
    /// Push button.
    Button,
    /// Section heading.
    Heading,
    /// Hyperlink.
    Link,
    /// Single- or multi-line text field.
    TextBox,
    /// Drop-down selection.
    ComboBox,
}

impl Role {
    /// Value of the `role` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dialog => "dialog",
            Self::AlertDialog => "alertdialog",
            Self::Button => "button",
            Self::Heading => "heading",
            Self::Link => "link",
            Self::TextBox => "textbox",
            Self::ComboBox => "combobox",
        }
    }

    /// Parse a `role` attribute value. Unknown roles yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        // The first recognised token wins, per the fallback-role rule.
        value.split_whitespace().find_map(|token| match token {
            "dialog" => Some(Self::Dialog),
            "alertdialog" => Some(Self::AlertDialog),
            "button" => Some(Self::Button),
            "heading" => Some(Self::Heading),
            "link" => Some(Self::Link),
            "textbox" => Some(Self::TextBox),
            "combobox" => Some(Self::ComboBox),
            _ => None,
        })
    }

    /// Role implied by a tag when no explicit role is set.
    #[must_use]
    pub fn implicit_for(tag: Tag, has_href: bool) -> Option<Self> {
        match tag {
            Tag::Button => Some(Self::Button),
            Tag::Heading(_) => Some(Self::Heading),
            Tag::Anchor if has_href => Some(Self::Link),
            Tag::Input | Tag::TextArea => Some(Self::TextBox),
            Tag::Select => Some(Self::ComboBox),
            _ => None,
        }
    }

    /// Whether the role takes its name from its contents when unlabelled.
    #[must_use]
    pub const fn name_from_content(self) -> bool {
        matches!(self, Self::Button | Self::Heading | Self::Link)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
