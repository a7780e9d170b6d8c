//! The composition root for promises.
//!
//! A [`Realm`] carries the scheduler every promise it creates (and every
//! promise derived from those through `then`) submits its jobs to. Nothing in
//! the promise core reaches for a global scheduler.

use crate::error::PromiseError;
use crate::promise::Promise;
use crate::resolution::ResolvingFunctions;
use crate::task_queue::Scheduler;
use core_types::{Function, Value};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Factory for promises sharing one scheduler.
///
/// # Examples
///
/// ```
/// use async_runtime::{MicrotaskQueue, Realm};
/// use core_types::Value;
/// use std::rc::Rc;
///
/// let queue = MicrotaskQueue::new();
/// let realm = Realm::new(Rc::new(queue.clone()));
///
/// let promise = realm.promise(|functions| {
///     functions.resolve(Value::from("hello"));
///     Ok(())
/// });
/// assert_eq!(promise.value(), Some(Value::from("hello")));
/// ```
#[derive(Clone)]
pub struct Realm {
    scheduler: Rc<dyn Scheduler>,
}

impl fmt::Debug for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Realm {{ ... }}")
    }
}

impl Realm {
    /// Creates a realm backed by `scheduler`.
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self { scheduler }
    }

    /// A fresh pending promise with no way to settle it from outside.
    pub fn pending(&self) -> Promise {
        Promise::pending(self.scheduler.clone())
    }

    /// Creates a promise and runs `executor` synchronously with its
    /// resolving functions.
    ///
    /// An `Err` returned by the executor rejects the promise, unless the
    /// promise has already settled.
    pub fn promise<F>(&self, executor: F) -> Promise
    where
        F: FnOnce(&ResolvingFunctions) -> Result<(), Value>,
    {
        let promise = self.pending();
        let functions = ResolvingFunctions::new(&promise);
        if let Err(thrown) = executor(&functions) {
            debug!(promise = promise.id(), "executor threw");
            functions.reject(thrown);
        }
        promise
    }

    /// Creates a promise from an executor given as a value.
    ///
    /// The executor is called with `(resolve, reject)` as function values.
    ///
    /// # Errors
    ///
    /// Returns [`PromiseError::Construction`] if `executor` is not a function.
    pub fn construct(&self, executor: Value) -> Result<Promise, PromiseError> {
        let executor = match executor {
            Value::Function(executor) => executor,
            other => return Err(PromiseError::Construction(other.to_string())),
        };

        Ok(self.promise(|functions| {
            executor
                .call(vec![
                    Value::Function(functions.resolve_fn().clone()),
                    Value::Function(functions.reject_fn().clone()),
                ])
                .map(|_| ())
        }))
    }

    /// A promise resolved with `value`; promises and thenables are adopted.
    pub fn resolve(&self, value: Value) -> Promise {
        self.promise(|functions| {
            functions.resolve(value);
            Ok(())
        })
    }

    /// A promise rejected with `reason`. The reason is never unwrapped.
    pub fn reject(&self, reason: Value) -> Promise {
        self.promise(|functions| {
            functions.reject(reason);
            Ok(())
        })
    }

    /// A pending promise bundled with its resolving functions.
    pub fn deferred(&self) -> Deferred {
        let promise = self.pending();
        let functions = ResolvingFunctions::new(&promise);
        Deferred { promise, functions }
    }
}

/// A promise together with the entry points that settle it.
///
/// Meant for producer code outside any executor: hand the promise to
/// consumers, keep the deferred (or a clone) to resolve it later.
#[derive(Clone, Debug)]
pub struct Deferred {
    promise: Promise,
    functions: ResolvingFunctions,
}

impl Deferred {
    /// The promise driven by this deferred.
    pub fn promise(&self) -> &Promise {
        &self.promise
    }

    /// Resolves the promise. Ignored once the promise has settled.
    pub fn resolve(&self, value: Value) {
        self.functions.resolve(value);
    }

    /// Rejects the promise. Ignored once the promise has settled.
    pub fn reject(&self, reason: Value) {
        self.functions.reject(reason);
    }

    /// The resolve entry point as a callable value.
    pub fn resolve_fn(&self) -> &Function {
        self.functions.resolve_fn()
    }

    /// The reject entry point as a callable value.
    pub fn reject_fn(&self) -> &Function {
        self.functions.reject_fn()
    }
}
