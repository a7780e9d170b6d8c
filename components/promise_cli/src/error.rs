//! Error types for the CLI

use core_types::JsError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// No scenario with this name
    #[error("unknown scenario '{0}' (see --list)")]
    UnknownScenario(String),

    /// The event loop gave up while running a scenario
    #[error("runtime error: {0}")]
    Runtime(#[from] JsError),

    /// Report serialization failed
    #[error("could not encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
