//! Integration test suite for the Corten Promise runtime
//!
//! This crate provides end-to-end tests that drive promises through the
//! public API of `async_runtime` and the `promise_cli` runner.


/// Re-export components for test convenience
pub mod components {
    pub use async_runtime;
    pub use core_types;
    pub use promise_cli;
}
