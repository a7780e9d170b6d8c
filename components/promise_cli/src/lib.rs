//! Promise runtime CLI library
//!
//! Provides the scenario catalogue and the runner behind `corten-promise`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod runner;
pub mod scenarios;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use runner::{Report, Runner};
pub use scenarios::{Scenario, SCENARIOS};
