//! Promise combinators: `all`, `race` and `all_settled`.
//!
//! All three accept a value that must be an array; anything else yields an
//! already rejected promise carrying a `TypeError`. Only entries that are
//! promises of this runtime are waited on; every other entry counts as an
//! already available value.

use crate::error::PromiseError;
use crate::promise::{Promise, PromiseState};
use crate::realm::Realm;
use core_types::{Function, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

impl Realm {
    /// Waits for every promise entry to fulfill.
    ///
    /// Fulfills with an array mirroring `items`, promise entries replaced by
    /// their values. Rejects with the reason of the first promise entry to
    /// reject. Without promise entries it fulfills immediately with a copy.
    pub fn all(&self, items: Value) -> Promise {
        let items = match self.sequence(items) {
            Ok(items) => items,
            Err(rejected) => return rejected,
        };

        let remaining = items
            .iter()
            .filter(|item| Promise::from_value(item).is_some())
            .count();
        if remaining == 0 {
            return self.resolve(Value::Array(items));
        }

        let deferred = self.deferred();
        let results = Rc::new(RefCell::new(items.clone()));
        let remaining = Rc::new(Cell::new(remaining));

        for (index, item) in items.iter().enumerate() {
            let Some(promise) = Promise::from_value(item) else {
                continue;
            };
            let on_fulfilled = {
                let results = results.clone();
                let remaining = remaining.clone();
                let resolve = deferred.resolve_fn().clone();
                Function::unary(move |value| {
                    results.borrow_mut()[index] = value;
                    remaining.set(remaining.get() - 1);
                    if remaining.get() == 0 {
                        let values = results.borrow().clone();
                        resolve.call(vec![Value::Array(values)])?;
                    }
                    Ok(Value::Undefined)
                })
            };
            promise.then(Some(on_fulfilled), Some(deferred.reject_fn().clone()));
        }

        deferred.promise().clone()
    }

    /// Settles like whichever entry settles first.
    ///
    /// A non-promise entry is already settled, so the first one in `items`
    /// wins over every promise entry. Such an entry is taken as is, even when
    /// it is a thenable.
    pub fn race(&self, items: Value) -> Promise {
        let items = match self.sequence(items) {
            Ok(items) => items,
            Err(rejected) => return rejected,
        };

        let deferred = self.deferred();
        for item in items {
            match Promise::from_value(&item) {
                Some(promise) => {
                    promise.then(
                        Some(deferred.resolve_fn().clone()),
                        Some(deferred.reject_fn().clone()),
                    );
                }
                None => deferred.promise().fulfill(item),
            }
        }
        deferred.promise().clone()
    }

    /// Waits for every entry to settle, never rejecting.
    ///
    /// Fulfills with an array of `{status: "fulfilled", value}` or
    /// `{status: "rejected", reason}` records mirroring `items`.
    pub fn all_settled(&self, items: Value) -> Promise {
        let items = match self.sequence(items) {
            Ok(items) => items,
            Err(rejected) => return rejected,
        };

        let records = items
            .into_iter()
            .map(|item| match Promise::from_value(&item) {
                Some(promise) => promise
                    .then(
                        Some(Function::unary(|value| Ok(fulfilled_record(value)))),
                        Some(Function::unary(|reason| Ok(rejected_record(reason)))),
                    )
                    .into(),
                None => fulfilled_record(item),
            })
            .collect();

        self.all(Value::Array(records))
    }

    fn sequence(&self, items: Value) -> Result<Vec<Value>, Promise> {
        match items {
            Value::Array(items) => Ok(items),
            other => {
                let description = format!("{} {}", other.type_of(), other);
                Err(self.reject(PromiseError::SequenceType(description).into()))
            }
        }
    }
}

fn fulfilled_record(value: Value) -> Value {
    Value::object([
        ("status", Value::from(PromiseState::Fulfilled.to_string())),
        ("value", value),
    ])
}

fn rejected_record(reason: Value) -> Value {
    Value::object([
        ("status", Value::from(PromiseState::Rejected.to_string())),
        ("reason", reason),
    ])
}
