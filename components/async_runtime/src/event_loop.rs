//! Event loop implementation.
//!
//! This module provides the host side of the scheduling contract: it owns the
//! microtask queue promise jobs are submitted to, a task queue, and a
//! virtual-time timer queue, and drains them in event loop order.

use crate::task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue};
use crate::Realm;
use core_types::JsError;
use std::any::Any;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use tracing::{trace, warn};

/// Counters describing what the event loop has executed so far.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EventLoopStats {
    /// Tasks and timers run to completion
    pub tasks_run: usize,
    /// Microtasks run to completion
    pub microtasks_run: usize,
    /// Tasks or microtasks that returned an error or panicked
    pub failures: usize,
}

struct Timer {
    deadline: u64,
    seq: u64,
    task: Task,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.deadline, self.seq).cmp(&(other.deadline, other.seq))
    }
}

/// The event loop.
///
/// Each turn of the loop:
/// 1. Drains the microtask queue (a microtask checkpoint)
/// 2. Runs the oldest task from the task queue, if any
/// 3. Otherwise advances the virtual clock to the earliest timer and runs it
/// 4. Repeats until nothing is left
///
/// Code running before the loop starts counts as the current task, so
/// microtasks it queued run before any queued task. A task or microtask that
/// fails (returns `Err` or panics) is logged and counted; it never stops the
/// loop from running the rest of the queue.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Task};
/// use core_types::Value;
///
/// let mut event_loop = EventLoop::new();
/// let realm = event_loop.realm();
///
/// let deferred = realm.deferred();
/// let resolver = deferred.clone();
/// event_loop.set_timeout(50, Task::new(move || {
///     resolver.resolve(Value::Smi(1));
///     Ok(Value::Undefined)
/// }));
///
/// event_loop.run_until_done().unwrap();
/// assert_eq!(deferred.promise().value(), Some(Value::Smi(1)));
/// assert_eq!(event_loop.now(), 50);
/// ```
#[derive(Default)]
pub struct EventLoop {
    task_queue: TaskQueue,
    microtask_queue: MicrotaskQueue,
    timers: BinaryHeap<Reverse<Timer>>,
    now: u64,
    next_timer_seq: u64,
    microtask_limit: Option<usize>,
    stats: EventLoopStats,
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("tasks", &self.task_queue.len())
            .field("microtasks", &self.microtask_queue.len())
            .field("timers", &self.timers.len())
            .field("now", &self.now)
            .field("stats", &self.stats)
            .finish()
    }
}

impl EventLoop {
    /// Creates a new EventLoop with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of microtasks drained in a single checkpoint.
    ///
    /// A chain of promise jobs that keeps rescheduling itself would otherwise
    /// never yield back to the task queue. When the bound is hit the checkpoint
    /// stops with a `RangeError`; the remaining microtasks stay queued.
    pub fn with_microtask_limit(mut self, limit: usize) -> Self {
        self.microtask_limit = Some(limit);
        self
    }

    /// Returns a realm whose promises schedule their jobs on this loop.
    pub fn realm(&self) -> Realm {
        Realm::new(Rc::new(self.microtask_queue.clone()))
    }

    /// Returns a handle to the microtask queue.
    pub fn microtask_queue(&self) -> MicrotaskQueue {
        self.microtask_queue.clone()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Returns execution counters.
    pub fn stats(&self) -> EventLoopStats {
        self.stats
    }

    /// Runs the event loop until all tasks, timers and microtasks are processed.
    ///
    /// # Returns
    ///
    /// `Ok(())` once every queue is empty. Failing tasks do not make this
    /// return an error; only exceeding the microtask limit does.
    pub fn run_until_done(&mut self) -> Result<(), JsError> {
        loop {
            self.run_all_microtasks()?;

            if let Some(task) = self.task_queue.dequeue() {
                self.run_task(task);
                continue;
            }

            match self.timers.pop() {
                Some(Reverse(timer)) => {
                    self.now = self.now.max(timer.deadline);
                    trace!(now = self.now, "timer fired");
                    self.run_task(timer.task);
                }
                None => return Ok(()),
            }
        }
    }

    /// Adds a task to the task queue.
    ///
    /// The task will be executed in the next available iteration of the event loop.
    pub fn enqueue_task(&mut self, task: Task) {
        self.task_queue.enqueue(task);
    }

    /// Adds a microtask to the microtask queue.
    ///
    /// The microtask will be executed at the next microtask checkpoint.
    pub fn enqueue_microtask(&mut self, microtask: MicroTask) {
        self.microtask_queue.enqueue(microtask);
    }

    /// Schedules a task to run once the virtual clock reaches `now + delay_ms`.
    ///
    /// Timers with equal deadlines run in the order they were set.
    pub fn set_timeout(&mut self, delay_ms: u64, task: Task) {
        let seq = self.next_timer_seq;
        self.next_timer_seq += 1;
        self.timers.push(Reverse(Timer {
            deadline: self.now + delay_ms,
            seq,
            task,
        }));
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.task_queue.is_empty()
    }

    /// Returns true if the microtask queue is empty.
    pub fn is_microtask_queue_empty(&self) -> bool {
        self.microtask_queue.is_empty()
    }

    /// Returns the number of timers not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Runs all microtasks in the queue until empty.
    ///
    /// This drains the microtask queue completely. New microtasks added during
    /// execution will also be processed before this method returns.
    pub fn run_all_microtasks(&mut self) -> Result<(), JsError> {
        let mut drained = 0usize;
        while let Some(microtask) = self.microtask_queue.dequeue() {
            if let Some(limit) = self.microtask_limit {
                if drained >= limit {
                    self.microtask_queue.requeue_front(microtask);
                    return Err(JsError::range_error(format!(
                        "microtask limit of {} exceeded in one checkpoint",
                        limit
                    )));
                }
            }
            drained += 1;

            if self.isolate(|| microtask.run()) {
                self.stats.microtasks_run += 1;
            }
        }
        Ok(())
    }

    /// Runs all tasks in the queue (without processing microtasks between them).
    ///
    /// This is primarily for testing purposes.
    pub fn run_all_tasks(&mut self) {
        while let Some(task) = self.task_queue.dequeue() {
            self.run_task(task);
        }
    }

    /// Processes one complete cycle: one task followed by all microtasks.
    pub fn process_one_cycle(&mut self) -> Result<(), JsError> {
        if let Some(task) = self.task_queue.dequeue() {
            self.run_task(task);
        }
        self.run_all_microtasks()
    }

    fn run_task(&mut self, task: Task) {
        if self.isolate(|| task.run()) {
            self.stats.tasks_run += 1;
        }
    }

    /// Runs one unit of work, containing errors and panics.
    fn isolate<F>(&mut self, work: F) -> bool
    where
        F: FnOnce() -> Result<core_types::Value, JsError>,
    {
        match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(Ok(_)) => true,
            Ok(Err(err)) => {
                warn!(error = %err, "scheduled task failed");
                self.stats.failures += 1;
                false
            }
            Err(payload) => {
                warn!(panic = panic_message(payload.as_ref()), "scheduled task panicked");
                self.stats.failures += 1;
                false
            }
        }
    }
}

/// Queued jobs keep their promises alive, and promises keep the queue alive
/// through their scheduler, so the queue is emptied here to break the cycle.
impl Drop for EventLoop {
    fn drop(&mut self) {
        let discarded = self.microtask_queue.clear();
        if discarded > 0 {
            trace!(discarded, "dropping queued microtasks");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
