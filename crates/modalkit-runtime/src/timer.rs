#![forbid(unsafe_code)]

//! Deferred-task scheduler on a virtual clock.
//!
//! Tasks are one-shot callbacks due at `now + delay`. The clock only moves
//! when the host advances it, which keeps tests deterministic and lets a
//! real event loop drive it from wall time.
//!
//! # Invariants
//!
//! - Tasks run in `(due, scheduling order)` order; two tasks due at the same
//!   instant run in the order they were scheduled.
//! - A task runs at most once. Cancelling a pending task guarantees it never
//!   runs; cancelling a completed task is a no-op.
//! - The clock never moves backwards.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Lifecycle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Completed,
    Cancelled,
}

/// Handle to a scheduled task.
///
/// Dropping the handle does *not* cancel the task.
#[derive(Clone)]
pub struct TaskHandle {
    id: u64,
    due: Duration,
    state: Rc<Cell<TaskState>>,
}

impl TaskHandle {
    /// Scheduler-assigned identifier.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Virtual time at which the task becomes due.
    #[must_use]
    pub fn due(&self) -> Duration {
        self.due
    }

    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state.get()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.get() == TaskState::Pending
    }

    /// Cancel the task. Returns `true` if it was still pending.
    pub fn cancel(&self) -> bool {
        if self.is_pending() {
            self.state.set(TaskState::Cancelled);
            tracing::trace!(task = self.id, "task cancelled");
            true
        } else {
            false
        }
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("due", &self.due)
            .field("state", &self.state.get())
            .finish()
    }
}

type TaskFn = Box<dyn FnOnce()>;

struct Task {
    id: u64,
    state: Rc<Cell<TaskState>>,
    run: TaskFn,
}

/// A task taken off the queue, ready to run.
///
/// The scheduler hands tasks out instead of running them so the caller can
/// release its borrow of the scheduler first; the task may schedule more.
pub struct ReadyTask {
    id: u64,
    state: Rc<Cell<TaskState>>,
    run: TaskFn,
}

impl ReadyTask {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Run the task, unless it was cancelled after being dequeued.
    pub fn run(self) -> bool {
        if self.state.get() != TaskState::Pending {
            return false;
        }
        self.state.set(TaskState::Completed);
        (self.run)();
        true
    }
}

/// Virtual-clock task queue.
#[derive(Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Task>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[inline]
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `run` to execute `delay` from now.
    pub fn schedule(&mut self, delay: Duration, run: impl FnOnce() + 'static) -> TaskHandle {
        self.next_id += 1;
        let id = self.next_id;
        let due = self.now.saturating_add(delay);
        let state = Rc::new(Cell::new(TaskState::Pending));
        self.queue.insert(
            (due, id),
            Task {
                id,
                state: Rc::clone(&state),
                run: Box::new(run),
            },
        );
        tracing::trace!(task = id, ?delay, "task scheduled");
        TaskHandle { id, due, state }
    }

    /// Dequeue the earliest pending task due at or before `until`, moving
    /// the clock to its due time. Cancelled tasks are discarded on the way.
    pub fn pop_due(&mut self, until: Duration) -> Option<ReadyTask> {
        loop {
            let (&(due, _), _) = self.queue.first_key_value()?;
            if due > until {
                return None;
            }
            let (_, task) = self.queue.pop_first()?;
            if task.state.get() != TaskState::Pending {
                continue;
            }
            if due > self.now {
                self.now = due;
            }
            return Some(ReadyTask {
                id: task.id,
                state: task.state,
                run: task.run,
            });
        }
    }

    /// Move the clock forward to `to` (never backwards).
    pub fn advance_to(&mut self, to: Duration) {
        if to > self.now {
            self.now = to;
        }
    }

    /// Number of tasks still pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue
            .values()
            .filter(|t| t.state.get() == TaskState::Pending)
            .count()
    }

    /// Due time of the earliest pending task.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.queue
            .iter()
            .find(|(_, t)| t.state.get() == TaskState::Pending)
            .map(|((due, _), _)| *due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;

    fn drain(scheduler: &mut Scheduler, until: Duration) -> usize {
        let mut ran = 0;
        while let Some(task) = scheduler.pop_due(until) {
            if task.run() {
                ran += 1;
            }
        }
        scheduler.advance_to(until);
        ran
    }

    #[test]
    fn runs_in_due_order() {
        let mut scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (label, ms) in [("b", 20u64), ("a", 10), ("c", 20)] {
            let log = Rc::clone(&log);
            scheduler.schedule(Duration::from_millis(ms), move || log.borrow_mut().push(label));
        }
        assert_eq!(drain(&mut scheduler, Duration::from_millis(100)), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.now(), Duration::from_millis(100));
    }

    #[test]
    fn not_yet_due_stays_queued() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(Duration::from_millis(500), || {});
        assert_eq!(drain(&mut scheduler, Duration::from_millis(499)), 0);
        assert!(handle.is_pending());
        assert_eq!(scheduler.next_due(), Some(Duration::from_millis(500)));
        assert_eq!(drain(&mut scheduler, Duration::from_millis(500)), 1);
        assert_eq!(handle.state(), TaskState::Completed);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let mut scheduler = Scheduler::new();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let handle = scheduler.schedule(Duration::ZERO, move || flag.set(true));
        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(drain(&mut scheduler, Duration::from_secs(1)), 0);
        assert!(!ran.get());
    }

    #[test]
    fn cancel_after_dequeue_still_prevents_run() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(Duration::ZERO, || {});
        let ready = scheduler.pop_due(Duration::ZERO);
        assert!(handle.cancel());
        assert!(ready.is_some_and(|t| !t.run()));
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(Duration::from_millis(10));
        scheduler.advance_to(Duration::from_millis(5));
        assert_eq!(scheduler.now(), Duration::from_millis(10));
    }

    proptest! {
        #[test]
        fn every_pending_task_runs_once_in_order(delays in proptest::collection::vec(0u64..1000, 0..32)) {
            let mut scheduler = Scheduler::new();
            let log = Rc::new(RefCell::new(Vec::new()));
            for (i, ms) in delays.iter().enumerate() {
                let log = Rc::clone(&log);
                let ms = *ms;
                scheduler.schedule(Duration::from_millis(ms), move || log.borrow_mut().push((ms, i)));
            }
            let ran = drain(&mut scheduler, Duration::from_secs(2));
            prop_assert_eq!(ran, delays.len());
            let log = log.borrow();
            let mut sorted = log.clone();
            sorted.sort_unstable();
            prop_assert_eq!(&*log, &sorted);
        }
    }
}
