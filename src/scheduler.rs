//! UI-thread task scheduling.
//!
//! Everything the reconciler does runs as delayed single-shot tasks on the
//! host's UI thread. Nothing blocks or sleeps; "later" is always a scheduled
//! task. Tasks are not `Send` because they touch host widgets.

mod alarm;
mod local;
mod manual;

pub use alarm::Alarm;
pub use local::LocalExecutor;
pub use manual::ManualExecutor;

use std::time::Duration;

/// A single-shot unit of UI-thread work.
pub type Task = Box<dyn FnOnce() + 'static>;

/// Handle of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

/// Runs tasks on the UI thread after a delay.
///
/// Implementations never run a task inline from `schedule`.
pub trait UiExecutor {
    fn schedule(&self, delay: Duration, task: Task) -> TaskId;

    /// Cancel a pending task; unknown or finished ids are ignored.
    fn cancel(&self, id: TaskId);
}
