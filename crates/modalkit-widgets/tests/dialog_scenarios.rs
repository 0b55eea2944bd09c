#![forbid(unsafe_code)]

//! End-to-end dialog behaviour driven through the host: keyboard, pointer,
//! timers, focus, and the accessibility tree.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use modalkit_a11y::{AriaOverrides, Role, accessible_description, accessible_name, find_by_role};
use modalkit_core::{KeyCode, Modifiers, NodeId, Tag};
use modalkit_runtime::{DialogPolicy, Host, ModalScope};
use modalkit_widgets::modal::{
    ClassNames, Content, ControlSpec, DialogLifecycleState, DialogOptions, Footer, Modal, open,
};

const EXIT: Duration = Duration::from_millis(500);

type Log = Rc<RefCell<Vec<String>>>;

fn setup() -> (Host, ModalScope) {
    let host = Host::new();
    let scope = ModalScope::new(&host);
    (host, scope)
}

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn push(log: &Log, entry: &'static str) -> impl Fn() + 'static {
    let log = Rc::clone(log);
    move || log.borrow_mut().push(entry.to_owned())
}

fn trigger(host: &Host, id: &str) -> NodeId {
    let mut doc = host.document_mut();
    let button = doc.create_element(Tag::Button);
    doc.set_attribute(button, "id", id);
    doc.set_text_content(button, "Open modal");
    let body = doc.body();
    doc.append_child(body, button);
    button
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

// --- Accessibility ---

#[test]
fn plain_dialog_exposes_name_and_description() {
    let (host, scope) = setup();
    let modal = open(&scope, DialogOptions::new("Title").content("Content"));
    host.tick();

    let doc = host.document();
    let dialogs = find_by_role(&doc, Role::Dialog);
    assert_eq!(dialogs.len(), 1);
    let dialog = dialogs[0];
    assert_eq!(Some(dialog), modal.panel());
    assert_eq!(doc.attribute(dialog, "aria-modal"), Some("true"));
    assert_eq!(accessible_name(&doc, dialog), "Title");
    assert_eq!(accessible_description(&doc, dialog), "Content");
    assert!(modal.footer().is_none());
    assert!(doc.elements_by_class("footer").is_empty());
}

#[test]
fn structured_content_has_no_default_description() {
    let (host, scope) = setup();
    let modal = open(
        &scope,
        DialogOptions::new("Form").content(Content::nodes(|doc, region| {
            let input = doc.create_element(Tag::Input);
            doc.append_child(region, input);
        })),
    );
    let doc = host.document();
    let panel = modal.panel().expect("mounted");
    assert!(!doc.has_attribute(panel, "aria-describedby"));
    assert_eq!(accessible_description(&doc, panel), "");
    assert_eq!(modal.binding().and_then(|b| b.described_by), None);
}

#[test]
fn aria_overrides_replace_defaults() {
    let (host, scope) = setup();
    {
        let mut doc = host.document_mut();
        let body = doc.body();
        for (id, text) in [("custom-label", "Custom name"), ("custom-desc", "Custom description")] {
            let span = doc.create_element(Tag::Span);
            doc.set_attribute(span, "id", id);
            doc.set_text_content(span, text);
            doc.append_child(body, span);
        }
    }
    let modal = open(
        &scope,
        DialogOptions::new("Title").content("Content").aria(
            AriaOverrides::new()
                .labelled_by("custom-label")
                .described_by("custom-desc")
                .close_button_label("Dismiss dialog"),
        ),
    );
    let doc = host.document();
    let panel = modal.panel().expect("mounted");
    assert_eq!(accessible_name(&doc, panel), "Custom name");
    assert_eq!(accessible_description(&doc, panel), "Custom description");
    let close = modal.close_button().expect("mounted");
    assert_eq!(accessible_name(&doc, close), "Dismiss dialog");
}

#[test]
fn class_names_are_prepended_to_builtins() {
    let (host, scope) = setup();
    let modal = open(
        &scope,
        DialogOptions::new("T")
            .footer(Footer::new().action(ControlSpec::new("OK")))
            .class_names(
                ClassNames::default()
                    .header("custom-header")
                    .content("custom-content scrollable")
                    .footer("custom-footer"),
            ),
    );
    let e = modal.elements().expect("mounted");
    let doc = host.document();
    assert_eq!(doc.class_list(e.header), vec!["custom-header", "header"]);
    assert_eq!(
        doc.class_list(e.content),
        vec!["custom-content", "scrollable", "content"]
    );
    assert_eq!(
        doc.class_list(e.footer.expect("footer")),
        vec!["custom-footer", "footer"]
    );
}

// --- Footer controls ---

#[test]
fn save_runs_action_then_closes_once_after_delay() {
    let (host, scope) = setup();
    let log = new_log();
    let modal = open(
        &scope,
        DialogOptions::new("Save changes?")
            .content("Unsaved edits will be lost.")
            .footer(
                Footer::new()
                    .action(ControlSpec::new("Save").on_activate(push(&log, "save")))
                    .dismiss(ControlSpec::new("Cancel").on_activate(push(&log, "cancel"))),
            )
            .on_close(push(&log, "close")),
    );
    host.tick();

    let save = modal.action_button().expect("action button");
    assert_eq!(accessible_name(&host.document(), save), "Save");
    assert_eq!(
        host.document().class_list(save),
        vec!["button", "action", "rounded"]
    );
    host.pointer_click(save);
    assert_eq!(entries(&log), vec!["save"]);
    assert_eq!(modal.state(), DialogLifecycleState::Closing);

    host.advance(EXIT - Duration::from_millis(1));
    assert_eq!(entries(&log), vec!["save"]);
    host.advance(Duration::from_millis(1));
    assert_eq!(entries(&log), vec!["save", "close"]);

    host.run_until_idle();
    assert_eq!(entries(&log), vec!["save", "close"]);
    assert!(!modal.is_mounted());
}

#[test]
fn dismiss_control_uses_default_variant() {
    let (host, scope) = setup();
    let log = new_log();
    let modal = open(
        &scope,
        DialogOptions::new("T")
            .footer(Footer::new().dismiss(ControlSpec::new("Cancel").on_activate(push(&log, "cancel"))))
            .on_close(push(&log, "close")),
    );
    host.tick();
    let cancel = modal.dismiss_button().expect("dismiss button");
    assert!(modal.action_button().is_none());
    assert!(host.document().has_class(cancel, "default"));
    host.pointer_click(cancel);
    host.run_until_idle();
    assert_eq!(entries(&log), vec!["cancel", "close"]);
}

#[test]
fn enter_on_focused_control_activates_it() {
    let (host, scope) = setup();
    let log = new_log();
    let modal = open(
        &scope,
        DialogOptions::new("T")
            .footer(Footer::new().action(ControlSpec::new("Confirm").on_activate(push(&log, "confirm"))))
            .on_close(push(&log, "close")),
    );
    host.tick();
    host.focus(modal.action_button().expect("action"));
    host.press(KeyCode::Enter);
    host.run_until_idle();
    assert_eq!(entries(&log), vec!["confirm", "close"]);
}

#[test]
fn disabled_control_does_nothing() {
    let (host, scope) = setup();
    let log = new_log();
    let modal = open(
        &scope,
        DialogOptions::new("T")
            .footer(
                Footer::new().action(
                    ControlSpec::new("Save")
                        .disabled(true)
                        .on_activate(push(&log, "save")),
                ),
            )
            .on_close(push(&log, "close")),
    );
    host.tick();
    let save = modal.action_button().expect("action");
    assert_eq!(host.document().attribute(save, "aria-disabled"), Some("true"));
    host.pointer_click(save);
    host.run_until_idle();
    assert!(entries(&log).is_empty());
    assert_eq!(modal.state(), DialogLifecycleState::Open);
}

// --- Dismissal ---

#[test]
fn header_close_control_closes() {
    let (host, scope) = setup();
    let log = new_log();
    let modal = open(&scope, DialogOptions::new("T").on_close(push(&log, "close")));
    host.tick();
    host.pointer_click(modal.close_button().expect("close"));
    assert_eq!(modal.state(), DialogLifecycleState::Closing);
    host.run_until_idle();
    assert_eq!(entries(&log), vec!["close"]);
}

#[test]
fn outside_click_closes_but_panel_click_does_not() {
    let (host, scope) = setup();
    let log = new_log();
    let modal = open(&scope, DialogOptions::new("T").content("C").on_close(push(&log, "close")));
    host.tick();
    host.click(modal.panel().expect("panel"));
    host.click(modal.content().expect("content"));
    host.click(modal.title().expect("title"));
    assert_eq!(modal.state(), DialogLifecycleState::Open);
    host.click(modal.overlay().expect("overlay"));
    assert_eq!(modal.state(), DialogLifecycleState::Closing);
    host.run_until_idle();
    assert_eq!(entries(&log), vec!["close"]);
}

#[test]
fn rapid_dismissals_notify_once() {
    let (host, scope) = setup();
    let log = new_log();
    let modal = open(&scope, DialogOptions::new("T").on_close(push(&log, "close")));
    host.tick();
    let overlay = modal.overlay().expect("overlay");
    let close = modal.close_button().expect("close");
    for _ in 0..5 {
        host.press(KeyCode::Escape);
        host.click(overlay);
        host.click(close);
        assert!(!modal.close());
    }
    assert_eq!(modal.state(), DialogLifecycleState::Closing);
    assert_eq!(host.pending_tasks(), 1);
    host.run_until_idle();
    assert_eq!(entries(&log), vec!["close"]);
}

#[test]
fn policy_can_disable_escape_and_outside_click() {
    let (host, scope) = setup();
    let modal = open(
        &scope,
        DialogOptions::new("T").policy(
            DialogPolicy::default()
                .close_on_escape(false)
                .close_on_outside_click(false),
        ),
    );
    host.tick();
    host.press(KeyCode::Escape);
    host.click(modal.overlay().expect("overlay"));
    assert_eq!(modal.state(), DialogLifecycleState::Open);
    assert!(modal.close());
}

#[test]
fn zero_exit_delay_closes_on_next_flush() {
    let (host, scope) = setup();
    let log = new_log();
    let scope = scope.with_policy(DialogPolicy::default().exit_delay(Duration::ZERO));
    let modal = open(&scope, DialogOptions::new("T").on_close(push(&log, "close")));
    host.tick();
    modal.close();
    assert!(entries(&log).is_empty());
    host.tick();
    assert_eq!(entries(&log), vec!["close"]);
    assert_eq!(host.now(), Duration::ZERO);
}

// --- Focus ---

#[test]
fn initial_focus_is_first_focusable() {
    let (host, scope) = setup();
    let modal = open(
        &scope,
        DialogOptions::new("T").footer(Footer::new().action(ControlSpec::new("OK"))),
    );
    assert_eq!(host.active_element(), modal.first_focusable());
    assert_eq!(modal.first_focusable(), modal.close_button());
}

#[test]
fn focus_restored_to_trigger_before_notification() {
    let (host, scope) = setup();
    let opener = trigger(&host, "open-button");
    host.pointer_click(opener);

    let observed = Rc::new(RefCell::new(None));
    let seen = Rc::clone(&observed);
    let probe = host.clone();
    let modal = open(
        &scope,
        DialogOptions::new("T")
            .trigger(opener)
            .on_close(move || *seen.borrow_mut() = Some(probe.active_element())),
    );
    host.tick();
    assert_ne!(host.active_element(), Some(opener));
    host.press(KeyCode::Escape);
    host.advance(EXIT);
    assert_eq!(*observed.borrow(), Some(Some(opener)));
    assert_eq!(host.active_element(), Some(opener));
    assert!(!modal.is_mounted());
}

#[test]
fn focus_not_restored_before_delay_elapses() {
    let (host, scope) = setup();
    let opener = trigger(&host, "open-button");
    let modal = open(&scope, DialogOptions::new("T").trigger(opener));
    host.tick();
    let close = modal.close_button().expect("close");
    host.press(KeyCode::Escape);
    host.advance(Duration::from_millis(250));
    assert_eq!(host.active_element(), Some(close));
    host.advance(Duration::from_millis(250));
    assert_eq!(host.active_element(), Some(opener));
}

#[test]
fn stale_trigger_is_skipped() {
    let (host, scope) = setup();
    let log = new_log();
    let opener = trigger(&host, "open-button");
    let modal = open(
        &scope,
        DialogOptions::new("T")
            .trigger(opener)
            .on_close(push(&log, "close")),
    );
    host.tick();
    host.document_mut().remove(opener);
    modal.close();
    host.run_until_idle();
    assert_eq!(entries(&log), vec!["close"]);
    assert_eq!(host.active_element(), None);
}

#[test]
fn focus_returns_to_trigger_without_id() {
    let (host, scope) = setup();
    let opener = {
        let mut doc = host.document_mut();
        let button = doc.create_element(Tag::Button);
        doc.set_text_content(button, "Open modal");
        let body = doc.body();
        doc.append_child(body, button);
        button
    };
    host.focus(opener);
    let modal = open(&scope, DialogOptions::new("T").trigger(opener));
    host.tick();
    assert_ne!(host.active_element(), Some(opener));
    modal.close();
    host.run_until_idle();
    assert_eq!(host.active_element(), Some(opener));
}

#[test]
fn reused_slot_does_not_receive_focus() {
    let (host, scope) = setup();
    let opener = trigger(&host, "open-button");
    let modal = open(&scope, DialogOptions::new("T").trigger(opener));
    host.tick();
    host.document_mut().remove(opener);
    let replacement = trigger(&host, "open-button");
    modal.close();
    host.run_until_idle();
    assert_ne!(replacement, opener);
    assert_ne!(host.active_element(), Some(replacement));
}

#[test]
fn detached_trigger_is_skipped() {
    let (host, scope) = setup();
    let opener = trigger(&host, "open-button");
    let modal = open(&scope, DialogOptions::new("T").trigger(opener));
    host.tick();
    host.document_mut().detach(opener);
    modal.close();
    host.run_until_idle();
    assert_eq!(host.active_element(), None);
}

#[test]
fn restore_focus_can_be_disabled() {
    let (host, scope) = setup();
    let opener = trigger(&host, "open-button");
    host.focus(opener);
    let modal = open(
        &scope,
        DialogOptions::new("T")
            .trigger(opener)
            .policy(DialogPolicy::default().restore_focus(false)),
    );
    host.tick();
    modal.close();
    host.run_until_idle();
    assert_ne!(host.active_element(), Some(opener));
}

#[test]
fn tab_cycles_within_dialog() {
    let (host, scope) = setup();
    trigger(&host, "outside");
    let modal = open(
        &scope,
        DialogOptions::new("T").footer(
            Footer::new()
                .action(ControlSpec::new("Save"))
                .dismiss(ControlSpec::new("Cancel")),
        ),
    );
    host.tick();
    let close = modal.close_button().expect("close");
    let save = modal.action_button().expect("save");
    let cancel = modal.dismiss_button().expect("cancel");

    let mut seen = Vec::new();
    for _ in 0..6 {
        seen.push(host.active_element().expect("focused"));
        host.press(KeyCode::Tab);
    }
    assert_eq!(seen, vec![close, save, cancel, close, save, cancel]);

    host.focus(close);
    host.press_with(KeyCode::Tab, Modifiers::SHIFT);
    assert_eq!(host.active_element(), Some(cancel));
}

#[test]
fn rescan_includes_late_content() {
    let (host, scope) = setup();
    let modal = open(&scope, DialogOptions::new("T").content("C"));
    host.tick();
    let close = modal.close_button().expect("close");
    let late = {
        let mut doc = host.document_mut();
        let input = doc.create_element(Tag::Input);
        let content = modal.content().expect("content");
        doc.append_child(content, input);
        input
    };
    modal.rescan_focus();
    host.focus(late);
    host.press(KeyCode::Tab);
    assert_eq!(host.active_element(), Some(close));
}

// --- Nesting and scope ---

#[test]
fn escape_closes_only_the_inner_dialog() {
    let (host, scope) = setup();
    let outer_trigger = trigger(&host, "open-outer");
    let log = new_log();
    let outer = open(
        &scope,
        DialogOptions::new("Outer")
            .content(Content::nodes(|doc, region| {
                let button = doc.create_element(Tag::Button);
                doc.set_attribute(button, "id", "open-inner");
                doc.set_text_content(button, "More");
                doc.append_child(region, button);
            }))
            .trigger(outer_trigger)
            .on_close(push(&log, "outer")),
    );
    host.tick();
    let inner_trigger = host
        .document()
        .element_by_id("open-inner")
        .expect("inner trigger");
    host.focus(inner_trigger);

    let inner = open(
        &scope,
        DialogOptions::new("Inner")
            .trigger(inner_trigger)
            .on_close(push(&log, "inner")),
    );
    host.tick();
    assert_eq!(find_by_role(&host.document(), Role::Dialog).len(), 2);

    host.press(KeyCode::Escape);
    assert_eq!(inner.state(), DialogLifecycleState::Closing);
    assert_eq!(outer.state(), DialogLifecycleState::Open);

    host.advance(EXIT);
    assert_eq!(entries(&log), vec!["inner"]);
    assert_eq!(host.active_element(), Some(inner_trigger));
    assert!(!inner.is_mounted());

    host.press(KeyCode::Escape);
    assert_eq!(outer.state(), DialogLifecycleState::Closing);
    host.run_until_idle();
    assert_eq!(entries(&log), vec!["inner", "outer"]);
}

#[test]
fn escape_from_body_skips_a_closing_dialog() {
    let (host, scope) = setup();
    let log = new_log();
    let first = open(&scope, DialogOptions::new("First").on_close(push(&log, "first")));
    host.tick();
    let second = open(&scope, DialogOptions::new("Second").on_close(push(&log, "second")));
    host.tick();

    second.close();
    host.document_mut().blur();
    host.press(KeyCode::Escape);
    assert_eq!(second.state(), DialogLifecycleState::Closing);
    assert_eq!(first.state(), DialogLifecycleState::Closing);

    host.run_until_idle();
    assert_eq!(entries(&log).len(), 2);
    assert!(!first.is_mounted());
    assert!(!second.is_mounted());
}

#[test]
fn outside_click_on_inner_overlay_leaves_outer_open() {
    let (host, scope) = setup();
    let outer = open(&scope, DialogOptions::new("Outer"));
    host.tick();
    let inner = open(&scope, DialogOptions::new("Inner"));
    host.tick();
    host.click(inner.overlay().expect("inner overlay"));
    assert_eq!(inner.state(), DialogLifecycleState::Closing);
    assert_eq!(outer.state(), DialogLifecycleState::Open);
}

#[test]
fn scope_container_override_is_honoured() {
    let (host, scope) = setup();
    let portal = {
        let mut doc = host.document_mut();
        let portal = doc.create_element(Tag::Div);
        doc.set_attribute(portal, "id", "portal");
        let body = doc.body();
        doc.append_child(body, portal);
        portal
    };
    let guard = scope.push_container(portal);
    let inside = open(&scope, DialogOptions::new("Inside"));
    drop(guard);
    let outside = open(&scope, DialogOptions::new("Outside"));

    let doc = host.document();
    assert_eq!(doc.parent(inside.overlay().expect("mounted")), Some(portal));
    assert_eq!(doc.parent(outside.overlay().expect("mounted")), Some(doc.body()));
}

#[test]
fn controlled_mode_toggles_mounting() {
    let (host, scope) = setup();
    let log = new_log();
    let modal = Modal::new(&scope, DialogOptions::new("T").on_close(push(&log, "close")));
    modal.set_open(true);
    assert!(modal.is_mounted());
    host.tick();
    modal.set_open(false);
    assert!(!modal.is_mounted());
    assert!(entries(&log).is_empty());
    assert_eq!(host.listener_count(), 0);
    modal.set_open(true);
    assert!(modal.is_mounted());
}

#[test]
fn dropping_closing_dialog_still_notifies() {
    let (host, scope) = setup();
    let log = new_log();
    let modal = open(&scope, DialogOptions::new("T").on_close(push(&log, "close")));
    host.tick();
    modal.close();
    drop(modal);
    assert_eq!(entries(&log), vec!["close"]);
    assert_eq!(host.listener_count(), 0);
    assert!(host.document().children(host.body()).is_empty());
    host.run_until_idle();
    assert_eq!(entries(&log), vec!["close"]);
}

// --- Logging ---

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedBuf {
    type Writer = SharedBuf;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn blank_footer_label_is_logged_and_replaced() {
    let buf = SharedBuf::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buf.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let (host, scope) = setup();
        let modal = open(
            &scope,
            DialogOptions::new("T").footer(Footer::new().action(ControlSpec::new(""))),
        );
        let action = modal.action_button().expect("action");
        assert_eq!(host.document().text_content(action), "Action");
    });

    let output = String::from_utf8(buf.0.lock().expect("log buffer").clone()).expect("utf8");
    assert!(output.contains("WARN"), "missing warning in {output:?}");
    assert!(output.contains("footer.action"), "missing field in {output:?}");
}

// --- Policy files ---

#[cfg(feature = "policy-config")]
#[test]
fn policy_loaded_from_toml_drives_dialog() {
    let policy = DialogPolicy::from_toml_str("exit_delay_ms = 100\nclose_on_escape = false\n")
        .expect("valid policy");
    let (host, scope) = setup();
    let scope = scope.with_policy(policy);
    let log = new_log();
    let modal = open(&scope, DialogOptions::new("T").on_close(push(&log, "close")));
    host.tick();
    host.press(KeyCode::Escape);
    assert_eq!(modal.state(), DialogLifecycleState::Open);
    modal.close();
    host.advance(Duration::from_millis(100));
    assert_eq!(entries(&log), vec!["close"]);
}
