#![forbid(unsafe_code)]

//! The demo page: a heading, four trigger buttons, and their dialogs.

use std::cell::Cell;
use std::rc::Rc;

use modalkit::widgets::MountedButton;
use modalkit::{
    Button, Content, ControlSpec, DialogOptions, DialogPolicy, Footer, Host, Modal, ModalScope,
    NodeId, Tag, to_markup,
};

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Mauris et \
accumsan neque, vitae dignissim ipsum. Praesent aliquam bibendum nunc. Nullam vel leo \
turpis. Sed mollis pellentesque turpis vel dignissim. Nunc ligula diam, cursus id dui a, \
hendrerit iaculis eros. Ut massa arcu, porttitor eleifend turpis nec, venenatis suscipit \
nisi. Vivamus volutpat auctor lobortis. Cras mauris tellus, rutrum ac magna a, elementum \
scelerisque quam. Quisque sed vehicula lacus, sit amet tincidunt augue. Cras ultricies arcu \
at rhoncus faucibus. Nulla eget est sapien. Donec vestibulum quis nunc et hendrerit. \
Curabitur malesuada volutpat eros. Sed urna augue, scelerisque non dignissim et, gravida sed \
ex. Nunc pharetra, eros feugiat ullamcorper egestas, ex erat suscipit purus, in aliquet leo \
felis vel orci. Sed finibus rutrum risus id fermentum. Nunc ac nisi gravida, iaculis justo \
eget, varius urna. Nullam efficitur eleifend ex ultrices commodo. Duis at dictum lacus. \
Praesent at risus sodales nisl consectetur commodo.";

/// Which footer a demo dialog carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FooterKind {
    SaveCancel,
    SaveOnly,
    None,
}

struct DialogSpec {
    key: &'static str,
    trigger_label: &'static str,
    body: &'static str,
    footer: FooterKind,
}

const DIALOGS: [DialogSpec; 4] = [
    DialogSpec {
        key: "base",
        trigger_label: "Open base modal",
        body: "Content",
        footer: FooterKind::SaveCancel,
    },
    DialogSpec {
        key: "long-content",
        trigger_label: "Open modal with long content",
        body: LOREM,
        footer: FooterKind::SaveCancel,
    },
    DialogSpec {
        key: "one-control",
        trigger_label: "Open modal with one control",
        body: "Content",
        footer: FooterKind::SaveOnly,
    },
    DialogSpec {
        key: "without-footer",
        trigger_label: "Open modal without footer",
        body: "Content",
        footer: FooterKind::None,
    },
];

/// One trigger and the dialog it opens.
pub struct DemoEntry {
    pub key: &'static str,
    pub trigger: NodeId,
    pub modal: Rc<Modal>,
    pub notifications: Rc<Cell<u32>>,
}

pub struct DemoPage {
    pub host: Host,
    pub entries: Vec<DemoEntry>,
    _triggers: Vec<MountedButton>,
}

impl DemoPage {
    pub fn build(policy: DialogPolicy) -> Self {
        let host = Host::new();
        let scope = ModalScope::new(&host).with_policy(policy);

        let main = {
            let mut doc = host.document_mut();
            let main = doc.create_element(Tag::Main);
            doc.add_class(main, "main");
            let header = doc.create_element(Tag::Header);
            doc.add_class(header, "header");
            let heading = doc.create_element(Tag::Heading(1));
            doc.add_class(heading, "heading");
            doc.set_text_content(heading, "Demo Page");
            doc.append_child(header, heading);
            doc.append_child(main, header);
            let body = doc.body();
            doc.append_child(body, main);
            main
        };

        let mut entries = Vec::with_capacity(DIALOGS.len());
        let mut triggers = Vec::with_capacity(DIALOGS.len());
        for spec in &DIALOGS {
            let notifications = Rc::new(Cell::new(0));
            let options = dialog_options(spec, &notifications);
            let modal = Rc::new(Modal::new(&scope, options));

            let weak = Rc::downgrade(&modal);
            let key = spec.key;
            let trigger = Button::new()
                .text(spec.trigger_label)
                .on_click(move || {
                    if let Some(modal) = weak.upgrade() {
                        tracing::info!(dialog = key, "open requested");
                        modal.open();
                    }
                })
                .mount(&host, main);
            modal.set_trigger(trigger.node());

            entries.push(DemoEntry {
                key,
                trigger: trigger.node(),
                modal,
                notifications,
            });
            triggers.push(trigger);
        }

        Self {
            host,
            entries,
            _triggers: triggers,
        }
    }

    /// Markup of the whole page.
    pub fn markup(&self) -> String {
        to_markup(&self.host.document(), self.host.body())
    }
}

fn dialog_options(spec: &DialogSpec, notifications: &Rc<Cell<u32>>) -> DialogOptions {
    let key = spec.key;
    let save = ControlSpec::new("Save").on_activate(move || tracing::info!(dialog = key, "save"));
    let cancel =
        ControlSpec::new("Cancel").on_activate(move || tracing::info!(dialog = key, "cancel"));
    let footer = match spec.footer {
        FooterKind::SaveCancel => Some(Footer::new().action(save).dismiss(cancel)),
        FooterKind::SaveOnly => Some(Footer::new().action(save)),
        FooterKind::None => None,
    };

    let notifications = Rc::clone(notifications);
    let mut options = DialogOptions::new("Title")
        .content(Content::from(spec.body))
        .on_close(move || {
            notifications.set(notifications.get() + 1);
            tracing::info!(dialog = key, "dialog closed");
        });
    if let Some(footer) = footer {
        options = options.footer(footer);
    }
    options
}
