#![forbid(unsafe_code)]

//! Scripted walk through each demo dialog.

use std::time::Duration;

use modalkit::{Host, KeyCode, accessible_description, accessible_name};
use serde_json::{Value, json};
use web_time::Instant;

use crate::page::{DemoEntry, DemoPage};

/// Longest wall-clock wait for pending transitions.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);
const SETTLE_POLL: Duration = Duration::from_millis(10);

/// How the exit transition is waited out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Sleep and feed wall time into the host.
    Wall,
    /// Jump the virtual clock.
    Virtual,
}

impl Clock {
    fn settle(self, host: &Host) {
        match self {
            Self::Virtual => {
                host.run_until_idle();
            }
            Self::Wall => {
                let start = Instant::now();
                while host.pending_tasks() > 0 {
                    if start.elapsed() > SETTLE_TIMEOUT {
                        tracing::warn!(pending = host.pending_tasks(), "transitions did not settle");
                        break;
                    }
                    std::thread::sleep(SETTLE_POLL);
                    host.sync_clock(Instant::now());
                }
            }
        }
    }
}

/// How a scenario closes its dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Save,
    Escape,
    Outside,
    CloseButton,
}

impl Gesture {
    fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Escape => "escape",
            Self::Outside => "outside-click",
            Self::CloseButton => "close-button",
        }
    }

    /// Gesture used for the dialog at `index` on the page.
    pub fn for_index(index: usize) -> Self {
        match index % 4 {
            0 => Self::Save,
            1 => Self::Escape,
            2 => Self::Outside,
            _ => Self::CloseButton,
        }
    }

    fn perform(self, host: &Host, entry: &DemoEntry) {
        let modal = &entry.modal;
        let target = match self {
            Self::Escape => {
                host.press(KeyCode::Escape);
                return;
            }
            Self::Save => modal.action_button(),
            Self::Outside => modal.overlay(),
            Self::CloseButton => modal.close_button(),
        };
        match target {
            Some(node) => {
                host.pointer_click(node);
            }
            None => {
                tracing::warn!(
                    dialog = entry.key,
                    gesture = self.as_str(),
                    "no target; closing directly"
                );
                modal.close();
            }
        }
    }
}

/// Open one dialog from its trigger, walk its focus order, close it, and
/// report what happened.
pub fn run(
    page: &DemoPage,
    entry: &DemoEntry,
    gesture: Gesture,
    clock: Clock,
    markup: bool,
) -> Value {
    let _span = tracing::info_span!("scenario", dialog = entry.key).entered();
    let host = &page.host;

    host.pointer_click(entry.trigger);
    host.tick();

    let Some(panel) = entry.modal.panel() else {
        tracing::warn!("dialog did not mount");
        return json!({ "dialog": entry.key, "mounted": false });
    };
    let (name, description) = {
        let doc = host.document();
        (accessible_name(&doc, panel), accessible_description(&doc, panel))
    };
    if markup {
        println!("{}", entry.modal.markup());
    }

    let stops = entry.modal.elements().map_or(0, |e| {
        1 + usize::from(e.action_button.is_some()) + usize::from(e.dismiss_button.is_some())
    });
    let mut tab_order = Vec::with_capacity(stops + 1);
    for _ in 0..=stops {
        let label = host
            .active_element()
            .map(|node| accessible_name(&host.document(), node))
            .unwrap_or_default();
        tab_order.push(label);
        host.press(KeyCode::Tab);
    }

    gesture.perform(host, entry);
    clock.settle(host);

    let preview: String = description.chars().take(40).collect();
    json!({
        "dialog": entry.key,
        "mounted": true,
        "name": name,
        "description": preview,
        "tab_order": tab_order,
        "dismissed_by": gesture.as_str(),
        "close_reason": entry.modal.close_reason().map(|r| format!("{r:?}")),
        "state": format!("{:?}", entry.modal.state()),
        "focus_restored": host.active_element() == Some(entry.trigger),
        "notifications": entry.notifications.get(),
    })
}
