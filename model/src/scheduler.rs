//! Thread-local cooperative executor for deferred work.
//!
//! Everything here is single threaded: tasks are `!Send`, they run on the
//! thread that spawned them, and only while that thread drives the pool with
//! [`run_until_stalled`] or [`run`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{abortable, AbortHandle, Aborted};
use futures::task::LocalSpawnExt;
use log::{trace, warn};

thread_local! {
    static LOCAL_POOL: RefCell<LocalPool> = RefCell::new(LocalPool::new());
    static LOCAL_SPAWNER: LocalSpawner = LOCAL_POOL.with(|pool| pool.borrow_mut().spawner());
}

pub fn spawner() -> LocalSpawner {
    LOCAL_SPAWNER.with(|spawner| spawner.clone())
}

/// Runs every task that can make progress without waiting.
pub fn run_until_stalled() {
    LOCAL_POOL.with(|pool| pool.borrow_mut().run_until_stalled());
}

/// Blocks until every spawned task has completed or been aborted.
pub fn run() {
    LOCAL_POOL.with(|pool| pool.borrow_mut().run());
}

/// Handle to a one-shot task created by [`schedule_after`].
///
/// Dropping the handle cancels the task if it has not run yet.
pub struct ScheduledTask {
    abort: AbortHandle,
    finished: Rc<Cell<bool>>,
}

impl ScheduledTask {
    /// True once the task ran or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    pub fn cancel(&self) {
        self.abort.abort();
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if !self.finished.get() {
            trace!("scheduler: cancelling pending task");
        }
        self.abort.abort();
    }
}

/// Runs `task` on the local pool once `delay` has elapsed.
///
/// A zero delay makes the task ready immediately, so the next
/// [`run_until_stalled`] executes it.
pub fn schedule_after<F>(delay: Duration, task: F) -> ScheduledTask
where
    F: FnOnce() + 'static,
{
    let finished = Rc::new(Cell::new(false));
    let (future, abort) = abortable(async move {
        if delay > Duration::ZERO {
            async_std::task::sleep(delay).await;
        }
        task();
    });
    let done = finished.clone();
    let spawned = spawner().spawn_local(async move {
        if let Err(Aborted) = future.await {
            trace!("scheduler: task aborted");
        }
        done.set(true);
    });
    if let Err(e) = spawned {
        warn!("scheduler: could not spawn task: {}", e);
        finished.set(true);
    }
    ScheduledTask { abort, finished }
}
