//! Tokio-backed executor for hosts that run a `LocalSet` on their UI thread.

use super::{Task, TaskId, UiExecutor};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Schedules tasks with `tokio::task::spawn_local`.
///
/// Must be used from inside a `tokio::task::LocalSet`.
#[derive(Default)]
pub struct LocalExecutor {
    next_id: Cell<u64>,
    handles: Rc<RefCell<HashMap<u64, JoinHandle<()>>>>,
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.handles.borrow().len()
    }
}

impl UiExecutor for LocalExecutor {
    fn schedule(&self, delay: Duration, task: Task) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let handles = Rc::clone(&self.handles);
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            handles.borrow_mut().remove(&id);
            task();
        });
        self.handles.borrow_mut().insert(id, handle);
        TaskId(id)
    }

    fn cancel(&self, id: TaskId) {
        if let Some(handle) = self.handles.borrow_mut().remove(&id.0) {
            handle.abort();
        }
    }
}

impl Drop for LocalExecutor {
    fn drop(&mut self) {
        for (_, handle) in self.handles.borrow_mut().drain() {
            handle.abort();
        }
    }
}
