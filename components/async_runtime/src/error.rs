//! Errors raised by the promise machinery itself.
//!
//! Values thrown by user handlers, and values thrown while reading or calling
//! a foreign `then`, are not wrapped: they become rejection reasons exactly as
//! thrown. The errors below are the ones the runtime raises on its own.

use core_types::{ErrorKind, JsError, Value};

/// Runtime-raised promise errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromiseError {
    /// The executor handed to a constructor is not callable.
    #[error("Promise resolver {0} is not a function")]
    Construction(String),

    /// A promise was resolved with itself.
    #[error("Chaining cycle detected for promise #<Promise>")]
    ChainingCycle,

    /// A combinator received something other than a sequence.
    #[error("{0} is not iterable")]
    SequenceType(String),
}

impl PromiseError {
    /// The engine error kind this error surfaces as.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::TypeError
    }
}

impl From<PromiseError> for JsError {
    fn from(err: PromiseError) -> Self {
        JsError::new(err.kind(), err.to_string())
    }
}

impl From<PromiseError> for Value {
    fn from(err: PromiseError) -> Self {
        Value::Error(err.into())
    }
}
