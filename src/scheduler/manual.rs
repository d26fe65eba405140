//! Virtual-clock executor.
//!
//! Time only moves when the owner calls [`ManualExecutor::advance`] or
//! [`ManualExecutor::run_until_idle`]. Hosts that pump their own event loop can
//! drive it directly, and tests get exact, sleep-free timing.

use super::{Task, TaskId, UiExecutor};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Upper bound on tasks run by one `run_until_idle` call.
const MAX_IDLE_STEPS: usize = 100_000;

#[derive(Default)]
pub struct ManualExecutor {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    // Keyed by (due time, id): due order first, then scheduling order.
    queue: RefCell<BTreeMap<(Duration, u64), Task>>,
}

impl ManualExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Due time of the next task, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.borrow().keys().next().map(|(due, _)| *due)
    }

    /// Move the clock forward by `by`, running every task that falls due.
    ///
    /// Tasks scheduled by running tasks also run if they fall due in the
    /// window. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let deadline = self.now.get().saturating_add(by);
        let mut ran = 0;
        while let Some(task) = self.pop_due(deadline) {
            task();
            ran += 1;
        }
        self.now.set(deadline);
        ran
    }

    /// Run tasks in due order until the queue is empty.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due(Duration::MAX) {
            task();
            ran += 1;
            if ran >= MAX_IDLE_STEPS {
                warn!(ran, "Executor still busy after step limit, stopping");
                break;
            }
        }
        ran
    }

    fn pop_due(&self, deadline: Duration) -> Option<Task> {
        let mut queue = self.queue.borrow_mut();
        let key = *queue.keys().next()?;
        if key.0 > deadline {
            return None;
        }
        let task = queue.remove(&key)?;
        drop(queue);
        if key.0 > self.now.get() {
            self.now.set(key.0);
        }
        Some(task)
    }
}

impl UiExecutor for ManualExecutor {
    fn schedule(&self, delay: Duration, task: Task) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let due = self.now.get().saturating_add(delay);
        self.queue.borrow_mut().insert((due, id), task);
        TaskId(id)
    }

    fn cancel(&self, id: TaskId) {
        self.queue.borrow_mut().retain(|(_, task_id), _| *task_id != id.0);
    }
}
