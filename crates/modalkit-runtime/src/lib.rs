#![forbid(unsafe_code)]

//! Event host, task scheduler, and dialog context for modalkit.
//!
//! The runtime is deliberately single-threaded: widgets share state through
//! `Rc`/`RefCell`, listeners and tasks run to completion, and nothing here
//! is `Send`. A real embedding drives the [`Host`] by forwarding input
//! events and calling [`Host::sync_clock`] from its frame loop; tests drive
//! it with [`Host::advance`] for deterministic timing.

pub mod host;
pub mod policy;
pub mod scope;
pub mod timer;

pub use host::{DispatchOutcome, Host, WeakHost};
pub use policy::{DEFAULT_EXIT_DELAY, DialogPolicy, PolicyError};
pub use scope::{ContainerOverride, ModalScope};
pub use timer::{ReadyTask, Scheduler, TaskHandle, TaskState};
