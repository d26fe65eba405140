//! Owner-scoped group of delayed requests.

use super::{TaskId, UiExecutor};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

/// Tracks the requests one owner placed on an executor so they can be
/// cancelled together. Dropping the alarm cancels whatever is still pending.
pub struct Alarm {
    executor: Rc<dyn UiExecutor>,
    pending: Rc<RefCell<HashSet<TaskId>>>,
}

impl Alarm {
    pub fn new(executor: Rc<dyn UiExecutor>) -> Self {
        Self {
            executor,
            pending: Rc::new(RefCell::new(HashSet::new())),
        }
    }

    /// Schedule `task` after `delay`.
    pub fn add_request(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskId {
        let pending = Rc::clone(&self.pending);
        let own_id: Rc<Cell<Option<TaskId>>> = Rc::new(Cell::new(None));
        let own_id_in_task = Rc::clone(&own_id);

        let id = self.executor.schedule(
            delay,
            Box::new(move || {
                if let Some(id) = own_id_in_task.get() {
                    pending.borrow_mut().remove(&id);
                }
                task();
            }),
        );
        own_id.set(Some(id));
        self.pending.borrow_mut().insert(id);
        id
    }

    /// Cancel every request that has not run yet.
    pub fn cancel_all_requests(&self) {
        let ids: Vec<TaskId> = self.pending.borrow_mut().drain().collect();
        for id in ids {
            self.executor.cancel(id);
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

impl Drop for Alarm {
    fn drop(&mut self) {
        self.cancel_all_requests();
    }
}
