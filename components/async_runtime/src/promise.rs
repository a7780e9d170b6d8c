//! Promise implementation following Promises/A+.
//!
//! A [`Promise`] is a handle to a settlement cell: it starts pending, settles
//! exactly once, and fires its registered reactions in order through the
//! injected [`Scheduler`]. Handles are cheap to clone and compare by identity.

use crate::resolution::resolve_with;
use crate::task_queue::{MicroTask, Scheduler};
use core_types::{Function, HostObject, Value};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_PROMISE_ID: AtomicU64 = AtomicU64::new(1);

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been fulfilled with a value.
    Fulfilled,
    /// The promise has been rejected with a reason.
    Rejected,
}

impl fmt::Display for PromiseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PromiseState::Pending => "pending",
            PromiseState::Fulfilled => "fulfilled",
            PromiseState::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Terminal outcome of a settled promise.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Fulfilled(Value),
    Rejected(Value),
}

/// A reaction to be triggered when a Promise settles.
///
/// This represents the handlers registered via `.then()` together with the
/// promise that `.then()` returned.
pub(crate) struct PromiseReaction {
    on_fulfilled: Option<Function>,
    on_rejected: Option<Function>,
    child: Promise,
}

impl PromiseReaction {
    /// Runs the branch matching `outcome` and settles the child from it.
    fn run(self, outcome: Outcome) {
        let (handler, argument) = match outcome {
            Outcome::Fulfilled(value) => match self.on_fulfilled {
                Some(handler) => (handler, value),
                None => return self.child.fulfill(value),
            },
            Outcome::Rejected(reason) => match self.on_rejected {
                Some(handler) => (handler, reason),
                None => return self.child.reject(reason),
            },
        };

        match handler.call(vec![argument]) {
            Ok(result) => resolve_with(&self.child, result),
            Err(thrown) => self.child.reject(thrown),
        }
    }
}

enum Status {
    Pending(Vec<PromiseReaction>),
    Settled(Outcome),
}

struct PromiseCell {
    id: u64,
    status: RefCell<Status>,
    scheduler: Rc<dyn Scheduler>,
}

/// A Promise.
///
/// Promises represent the eventual completion (or failure) of an operation
/// and its resulting value. They are created through a [`Realm`](crate::Realm)
/// or as the result of [`Promise::then`].
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, PromiseState};
/// use core_types::{Function, Value};
///
/// let mut event_loop = EventLoop::new();
/// let realm = event_loop.realm();
///
/// let promise = realm.resolve(Value::Smi(41));
/// let next = promise.then(
///     Some(Function::unary(|v| match v {
///         Value::Smi(n) => Ok(Value::Smi(n + 1)),
///         other => Err(other),
///     })),
///     None,
/// );
/// assert!(matches!(next.state(), PromiseState::Pending));
///
/// event_loop.run_until_done().unwrap();
/// assert_eq!(next.value(), Some(Value::Smi(42)));
/// ```
#[derive(Clone)]
pub struct Promise {
    cell: Rc<PromiseCell>,
}

impl Promise {
    /// Creates a new pending Promise scheduling its jobs on `scheduler`.
    pub(crate) fn pending(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            cell: Rc::new(PromiseCell {
                id: NEXT_PROMISE_ID.fetch_add(1, Ordering::Relaxed),
                status: RefCell::new(Status::Pending(Vec::new())),
                scheduler,
            }),
        }
    }

    /// Recovers a Promise from a value produced by `Value::from(promise)`.
    ///
    /// Foreign thenables are not promises and yield `None`.
    pub fn from_value(value: &Value) -> Option<Promise> {
        match value {
            Value::Host(obj) => obj.as_any().downcast_ref::<Promise>().cloned(),
            _ => None,
        }
    }

    /// Numeric id, unique per process, used in log output.
    pub fn id(&self) -> u64 {
        self.cell.id
    }

    /// Returns true if both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    /// The current state.
    pub fn state(&self) -> PromiseState {
        match &*self.cell.status.borrow() {
            Status::Pending(_) => PromiseState::Pending,
            Status::Settled(Outcome::Fulfilled(_)) => PromiseState::Fulfilled,
            Status::Settled(Outcome::Rejected(_)) => PromiseState::Rejected,
        }
    }

    /// Returns true while the promise has not settled.
    pub fn is_pending(&self) -> bool {
        matches!(self.state(), PromiseState::Pending)
    }

    /// The fulfillment value, present iff the promise is fulfilled.
    pub fn value(&self) -> Option<Value> {
        match &*self.cell.status.borrow() {
            Status::Settled(Outcome::Fulfilled(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// The rejection reason, present iff the promise is rejected.
    pub fn reason(&self) -> Option<Value> {
        match &*self.cell.status.borrow() {
            Status::Settled(Outcome::Rejected(reason)) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Number of reactions waiting for settlement.
    pub fn pending_reactions(&self) -> usize {
        match &*self.cell.status.borrow() {
            Status::Pending(reactions) => reactions.len(),
            Status::Settled(_) => 0,
        }
    }

    /// Adds handlers for fulfillment and/or rejection.
    ///
    /// Returns a new pending Promise that will be settled from the outcome of
    /// whichever handler runs. A missing `on_fulfilled` passes the value
    /// through, a missing `on_rejected` passes the reason through. Handlers
    /// never run before this call returns, even on a settled promise.
    ///
    /// # Arguments
    ///
    /// * `on_fulfilled` - Optional handler called when the Promise fulfills
    /// * `on_rejected` - Optional handler called when the Promise rejects
    pub fn then(&self, on_fulfilled: Option<Function>, on_rejected: Option<Function>) -> Promise {
        let child = Promise::pending(self.cell.scheduler.clone());
        let reaction = PromiseReaction {
            on_fulfilled,
            on_rejected,
            child: child.clone(),
        };

        let outcome = match &mut *self.cell.status.borrow_mut() {
            Status::Pending(reactions) => {
                reactions.push(reaction);
                trace!(promise = self.id(), child = child.id(), "reaction registered");
                return child;
            }
            Status::Settled(outcome) => outcome.clone(),
        };

        self.schedule_reaction(reaction, outcome);
        child
    }

    /// Like [`then`](Self::then) but takes handlers as values.
    ///
    /// A handler that is not a function is treated as absent.
    pub fn then_values(&self, on_fulfilled: Value, on_rejected: Value) -> Promise {
        self.then(
            on_fulfilled.as_function().cloned(),
            on_rejected.as_function().cloned(),
        )
    }

    /// Adds a rejection handler. Same as `then(None, on_rejected)`.
    pub fn catch(&self, on_rejected: Option<Function>) -> Promise {
        self.then(None, on_rejected)
    }

    /// Runs `on_finally` on either outcome, then passes the outcome through.
    ///
    /// The callback receives no arguments. If it returns a promise or
    /// thenable, the outcome is held back until that settles. If it throws,
    /// or what it returned rejects, the returned promise rejects with that
    /// reason instead.
    pub fn finally(&self, on_finally: Option<Function>) -> Promise {
        let Some(callback) = on_finally else {
            return self.then(None, None);
        };

        let scheduler = self.cell.scheduler.clone();
        let on_fulfilled = {
            let callback = callback.clone();
            let scheduler = scheduler.clone();
            Function::unary(move |value| {
                let waited = Promise::settled_after(&scheduler, callback.call(vec![])?);
                let pass = Function::unary(move |_| Ok(value.clone()));
                Ok(waited.then(Some(pass), None).into())
            })
        };
        let on_rejected = Function::unary(move |reason| {
            let waited = Promise::settled_after(&scheduler, callback.call(vec![])?);
            let rethrow = Function::unary(move |_| Err(reason.clone()));
            Ok(waited.then(Some(rethrow), None).into())
        });

        self.then(Some(on_fulfilled), Some(on_rejected))
    }

    /// A new promise resolved with `value` through the resolution procedure.
    fn settled_after(scheduler: &Rc<dyn Scheduler>, value: Value) -> Promise {
        let promise = Promise::pending(scheduler.clone());
        resolve_with(&promise, value);
        promise
    }

    /// Fulfills the promise. No-op unless pending.
    pub(crate) fn fulfill(&self, value: Value) {
        self.settle(Outcome::Fulfilled(value));
    }

    /// Rejects the promise. No-op unless pending.
    pub(crate) fn reject(&self, reason: Value) {
        self.settle(Outcome::Rejected(reason));
    }

    fn settle(&self, outcome: Outcome) {
        let reactions = {
            let mut status = self.cell.status.borrow_mut();
            let Status::Pending(reactions) = &mut *status else {
                trace!(promise = self.id(), "already settled, ignoring");
                return;
            };
            let reactions = std::mem::take(reactions);
            *status = Status::Settled(outcome.clone());
            reactions
        };

        trace!(
            promise = self.id(),
            outcome = ?outcome,
            reactions = reactions.len(),
            "settled"
        );
        for reaction in reactions {
            self.schedule_reaction(reaction, outcome.clone());
        }
    }

    fn schedule_reaction(&self, reaction: PromiseReaction, outcome: Outcome) {
        self.cell.scheduler.schedule(MicroTask::new(move || {
            reaction.run(outcome);
            Ok(Value::Undefined)
        }));
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Promise");
        out.field("id", &self.id()).field("state", &self.state());
        match &*self.cell.status.borrow() {
            Status::Pending(reactions) => out.field("reactions", &reactions.len()),
            Status::Settled(Outcome::Fulfilled(value)) => out.field("value", value),
            Status::Settled(Outcome::Rejected(reason)) => out.field("reason", reason),
        };
        out.finish()
    }
}

/// Promises are thenable to foreign code through the host object capability.
impl HostObject for Promise {
    fn class_name(&self) -> &str {
        "Promise"
    }

    fn then_capability(&self) -> Result<Option<Function>, Value> {
        let promise = self.clone();
        Ok(Some(
            Function::new(move |args| {
                let mut args = args.into_iter();
                let on_fulfilled = args.next().unwrap_or(Value::Undefined);
                let on_rejected = args.next().unwrap_or(Value::Undefined);
                Ok(promise.then_values(on_fulfilled, on_rejected).into())
            })
            .named("then"),
        ))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<Promise> for Value {
    fn from(promise: Promise) -> Self {
        Value::Host(Rc::new(promise))
    }
}
