//! Task and microtask queue management.
//!
//! This module provides the [`Scheduler`] seam the promise core depends on,
//! plus the queues backing it. Promise reactions are submitted as microtasks;
//! the event loop drains the microtask queue completely after each task.

use core_types::{JsError, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Deferred execution of promise jobs.
///
/// Implementations must guarantee that a scheduled task:
/// - is never run synchronously inside the `schedule` call that submitted it,
/// - runs after every task submitted before it (FIFO),
/// - cannot prevent later tasks from running by failing.
///
/// The promise core only ever talks to this trait; which backend satisfies it
/// is decided by whoever builds the [`Realm`](crate::Realm).
pub trait Scheduler {
    /// Submits a task for later execution.
    fn schedule(&self, task: MicroTask);
}

/// A task to be executed by the event loop.
///
/// Tasks represent work to be done in the next iteration of the event loop,
/// such as timer callbacks.
pub struct Task {
    callback: Box<dyn FnOnce() -> Result<Value, JsError>>,
}

impl Task {
    /// Creates a new Task from a closure.
    ///
    /// # Arguments
    ///
    /// * `f` - The function to execute when the task runs
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<Value, JsError> + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the task.
    pub fn run(self) -> Result<Value, JsError> {
        (self.callback)()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task {{ ... }}")
    }
}

/// A microtask to be executed by the event loop.
///
/// Microtasks are executed after each task. Promise reactions and thenable
/// adoption steps are microtasks.
pub struct MicroTask {
    callback: Box<dyn FnOnce() -> Result<Value, JsError>>,
}

impl MicroTask {
    /// Creates a new MicroTask from a closure.
    ///
    /// # Arguments
    ///
    /// * `f` - The function to execute when the microtask runs
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<Value, JsError> + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the microtask.
    pub fn run(self) -> Result<Value, JsError> {
        (self.callback)()
    }
}

impl std::fmt::Debug for MicroTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MicroTask {{ ... }}")
    }
}

/// A queue for tasks.
///
/// Tasks are processed in FIFO order, one at a time.
#[derive(Debug, Default)]
pub struct TaskQueue {
    queue: VecDeque<Task>,
}

impl TaskQueue {
    /// Creates a new empty TaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a task to the end of the queue.
    pub fn enqueue(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    /// Removes and returns the next task from the queue.
    pub fn dequeue(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of tasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// A shared queue for microtasks.
///
/// Cloning yields another handle to the same queue: the event loop keeps one
/// handle to drain it, every [`Realm`](crate::Realm) built from the loop keeps
/// another to submit promise jobs. The internal borrow is never held while a
/// microtask runs, so microtasks may enqueue further microtasks.
#[derive(Debug, Default, Clone)]
pub struct MicrotaskQueue {
    queue: Rc<RefCell<VecDeque<MicroTask>>>,
}

impl MicrotaskQueue {
    /// Creates a new empty MicrotaskQueue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a microtask to the end of the queue.
    pub fn enqueue(&self, microtask: MicroTask) {
        self.queue.borrow_mut().push_back(microtask);
    }

    /// Removes and returns the next microtask from the queue.
    pub fn dequeue(&self) -> Option<MicroTask> {
        self.queue.borrow_mut().pop_front()
    }

    /// Puts a dequeued microtask back at the head of the queue.
    pub(crate) fn requeue_front(&self, microtask: MicroTask) {
        self.queue.borrow_mut().push_front(microtask);
    }

    /// Discards every queued microtask, returning how many were dropped.
    pub(crate) fn clear(&self) -> usize {
        let discarded = std::mem::take(&mut *self.queue.borrow_mut());
        discarded.len()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Returns the number of microtasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl Scheduler for MicrotaskQueue {
    fn schedule(&self, task: MicroTask) {
        self.enqueue(task);
    }
}
