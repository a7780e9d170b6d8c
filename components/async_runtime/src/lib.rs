//! Promise runtime.
//!
//! This crate provides a Promise/A+ compliant deferred-value primitive and the
//! scheduling it depends on:
//! - Settlement core: promises that settle once and fire reactions in order
//! - Resolution procedure: adoption of promises and foreign thenables
//! - Combinators: `resolve`, `reject`, `deferred`, `all`, `race`, `all_settled`
//! - Event loop with task, timer and microtask queues
//!
//! # Overview
//!
//! - [`Promise`] - Handle to a settlement cell; `then`, `catch`, `finally`
//! - [`Realm`] - Composition root creating promises on one [`Scheduler`]
//! - [`EventLoop`] - Host driving the microtask queue promises schedule on
//!
//! Everything here is single-threaded: promises are `!Send` and must stay on
//! the thread owning their event loop.
//!
//! # Examples
//!
//! ## Chaining
//!
//! ```
//! use async_runtime::EventLoop;
//! use core_types::{Function, Value};
//!
//! let minus_one = || Function::unary(|v| match v {
//!     Value::Smi(n) => Ok(Value::Smi(n - 1)),
//!     other => Err(other),
//! });
//!
//! let mut event_loop = EventLoop::new();
//! let realm = event_loop.realm();
//!
//! let result = realm
//!     .resolve(Value::Smi(11))
//!     .then(Some(minus_one()), None)
//!     .then(Some(minus_one()), None);
//!
//! event_loop.run_until_done().unwrap();
//! assert_eq!(result.value(), Some(Value::Smi(9)));
//! ```
//!
//! ## Combinators
//!
//! ```
//! use async_runtime::EventLoop;
//! use core_types::Value;
//!
//! let mut event_loop = EventLoop::new();
//! let realm = event_loop.realm();
//!
//! let all = realm.all(Value::Array(vec![
//!     realm.resolve(Value::Smi(1)).into(),
//!     Value::Null,
//! ]));
//!
//! event_loop.run_until_done().unwrap();
//! assert_eq!(all.value(), Some(Value::Array(vec![Value::Smi(1), Value::Null])));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod combinators;
pub mod error;
pub mod event_loop;
pub mod promise;
pub mod realm;
mod resolution;
pub mod task_queue;

// Re-export main types at crate root
pub use error::PromiseError;
pub use event_loop::{EventLoop, EventLoopStats};
pub use promise::{Promise, PromiseState};
pub use realm::{Deferred, Realm};
pub use resolution::ResolvingFunctions;
pub use task_queue::{MicroTask, MicrotaskQueue, Scheduler, Task, TaskQueue};
