//! The promise resolution procedure.
//!
//! Decides how a produced value settles a promise: self-resolution is a
//! chaining cycle, promises are adopted through `then`, foreign thenables are
//! called with a guarded pair of resolving functions, anything else fulfills.

use crate::error::PromiseError;
use crate::promise::Promise;
use core_types::{Function, Value};
use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

/// Settles `owner` from `x`.
pub(crate) fn resolve_with(owner: &Promise, x: Value) {
    if let Some(inner) = Promise::from_value(&x) {
        if inner.ptr_eq(owner) {
            debug!(promise = owner.id(), "chaining cycle detected");
            owner.reject(PromiseError::ChainingCycle.into());
            return;
        }

        debug!(promise = owner.id(), adopted = inner.id(), "adopting promise");
        let on_fulfilled = {
            let owner = owner.clone();
            Function::unary(move |value| {
                resolve_with(&owner, value);
                Ok(Value::Undefined)
            })
        };
        let on_rejected = {
            let owner = owner.clone();
            Function::unary(move |reason| {
                owner.reject(reason);
                Ok(Value::Undefined)
            })
        };
        inner.then(Some(on_fulfilled), Some(on_rejected));
        return;
    }

    match x.then_capability() {
        Err(thrown) => owner.reject(thrown),
        Ok(Some(then)) => {
            debug!(promise = owner.id(), "adopting thenable");
            let functions = ResolvingFunctions::guarded(owner);
            let args = vec![
                Value::Function(functions.resolve_fn().clone()),
                Value::Function(functions.reject_fn().clone()),
            ];
            if let Err(thrown) = then.call(args) {
                // Ignored when one of the callbacks already ran.
                functions.reject(thrown);
            }
        }
        Ok(None) => owner.fulfill(x),
    }
}

/// A `resolve`/`reject` pair bound to one promise.
///
/// Pairs built with [`ResolvingFunctions::new`] are state based: `resolve`
/// always runs the resolution procedure and `reject` settles only a pending
/// promise. The pair handed to a foreign `then` shares an "already called"
/// flag instead, so the first call to either wins.
#[derive(Clone, Debug)]
pub struct ResolvingFunctions {
    resolve: Function,
    reject: Function,
}

impl ResolvingFunctions {
    pub(crate) fn new(promise: &Promise) -> Self {
        Self::build(promise, None)
    }

    pub(crate) fn guarded(promise: &Promise) -> Self {
        Self::build(promise, Some(Rc::new(Cell::new(false))))
    }

    fn build(promise: &Promise, already_called: Option<Rc<Cell<bool>>>) -> Self {
        let resolve = {
            let promise = promise.clone();
            let already_called = already_called.clone();
            Function::unary(move |value| {
                if first_call(&already_called) {
                    resolve_with(&promise, value);
                }
                Ok(Value::Undefined)
            })
            .named("resolve")
        };
        let reject = {
            let promise = promise.clone();
            Function::unary(move |reason| {
                if first_call(&already_called) {
                    promise.reject(reason);
                }
                Ok(Value::Undefined)
            })
            .named("reject")
        };

        Self { resolve, reject }
    }

    /// Resolves the bound promise with `value`, adopting promises and thenables.
    pub fn resolve(&self, value: Value) {
        // Resolving functions never throw.
        let _ = self.resolve.call(vec![value]);
    }

    /// Rejects the bound promise with `reason`.
    pub fn reject(&self, reason: Value) {
        let _ = self.reject.call(vec![reason]);
    }

    /// The resolve entry point as a callable value.
    pub fn resolve_fn(&self) -> &Function {
        &self.resolve
    }

    /// The reject entry point as a callable value.
    pub fn reject_fn(&self) -> &Function {
        &self.reject
    }
}

/// True unless a guard is present and has already tripped.
fn first_call(guard: &Option<Rc<Cell<bool>>>) -> bool {
    match guard {
        Some(flag) => !flag.replace(true),
        None => true,
    }
}
