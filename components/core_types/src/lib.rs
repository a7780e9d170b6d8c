//! Core value types and error handling shared by the promise runtime.
//!
//! This crate provides the dynamic value model that flows through promises:
//! settled values, rejection reasons, handler functions and host objects that
//! may expose a `then` capability.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of values handed through promises
//! - [`Function`] - Shared callable used for handlers and resolving functions
//! - [`HostObject`] - Foreign objects, optionally exposing `then`
//! - [`JsError`] - Engine errors with a kind and message
//! - [`ErrorKind`] - Types of engine errors
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, Function, JsError, Value};
//!
//! let num = Value::Smi(42);
//! assert!(num.is_truthy());
//! assert_eq!(num.type_of(), "number");
//!
//! // A plain object with a callable `then` member is a thenable
//! let then = Function::new(|_args| Ok(Value::Undefined));
//! let thenable = Value::object([("then", Value::Function(then))]);
//! assert!(thenable.then_capability().unwrap().is_some());
//!
//! let error = JsError::type_error("undefined is not a function");
//! assert_eq!(error.kind, ErrorKind::TypeError);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod function;
mod object;
mod value;

pub use error::{ErrorKind, JsError};
pub use function::Function;
pub use object::HostObject;
pub use value::Value;
