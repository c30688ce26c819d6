use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::{Rc, Weak};

use futures::future::{AbortHandle, Abortable, Aborted};

type Registry = RefCell<HashMap<u64, AbortHandle>>;

/// Background futures owned by one chat session.
///
/// Every delayed callback (turn follow-ups, overlay grace closes) is
/// registered here before it is spawned, so tearing down the session can
/// abort whatever is still waiting. A task leaves the registry as soon as it
/// finishes or its future is dropped.
#[derive(Debug, Default)]
pub struct ScheduledTasks {
    handles: Rc<Registry>,
    next_id: Cell<u64>,
}

/// Removes one task's handle when the tracked future goes away.
struct Registration {
    handles: Weak<Registry>,
    id: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(handles) = self.handles.upgrade() {
            handles.borrow_mut().remove(&self.id);
        }
    }
}

impl ScheduledTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `fut` so that [`cancel_all`](Self::cancel_all) can stop it.
    pub fn track<F: Future>(&self, fut: F) -> impl Future<Output = Result<F::Output, Aborted>> {
        let (handle, abort_registration) = AbortHandle::new_pair();
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.handles.borrow_mut().insert(id, handle);

        let registration = Registration {
            handles: Rc::downgrade(&self.handles),
            id,
        };
        async move {
            let _registration = registration;
            Abortable::new(fut, abort_registration).await
        }
    }

    /// Number of tasks registered and not yet finished or aborted.
    pub fn live(&self) -> usize {
        self.handles
            .borrow()
            .values()
            .filter(|h| !h.is_aborted())
            .count()
    }

    pub fn cancel_all(&self) {
        let handles: Vec<_> = self.handles.borrow_mut().drain().map(|(_, h)| h).collect();
        for handle in handles {
            handle.abort();
        }
    }
}

impl Drop for ScheduledTasks {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
