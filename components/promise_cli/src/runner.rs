//! Scenario execution
//!
//! The runner owns the event loop configuration and turns a scenario's final
//! promise into a [`Report`].

use crate::error::CliResult;
use crate::scenarios::Scenario;
use async_runtime::{EventLoop, Promise, PromiseState};
use core_types::Value;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Runs scenarios, each on its own fresh event loop.
#[derive(Debug, Default, Clone)]
pub struct Runner {
    /// Microtask limit applied to every event loop
    microtask_limit: Option<usize>,
}

impl Runner {
    /// Create a runner with default event loop settings
    ///
    /// # Example
    /// ```
    /// use promise_cli::Runner;
    ///
    /// let runner = Runner::new().with_microtask_limit(Some(10_000));
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the microtasks drained per checkpoint
    pub fn with_microtask_limit(mut self, limit: Option<usize>) -> Self {
        self.microtask_limit = limit;
        self
    }

    /// Run one scenario to completion
    ///
    /// # Errors
    /// Returns `CliError::Runtime` if the event loop hits its microtask limit.
    ///
    /// # Example
    /// ```
    /// use promise_cli::{scenarios, Runner};
    /// use core_types::Value;
    ///
    /// let scenario = scenarios::find("numeric-chain").unwrap();
    /// let report = Runner::new().run(scenario).unwrap();
    /// assert_eq!(report.state, "fulfilled");
    /// assert_eq!(report.outcome, Value::Smi(9));
    /// ```
    pub fn run(&self, scenario: &Scenario) -> CliResult<Report> {
        let mut event_loop = EventLoop::new();
        if let Some(limit) = self.microtask_limit {
            event_loop = event_loop.with_microtask_limit(limit);
        }

        info!(scenario = scenario.name, "running scenario");
        let promise = (scenario.build)(&mut event_loop);
        event_loop.run_until_done()?;

        let report = Report::new(scenario.name, &promise, &event_loop);
        debug!(scenario = scenario.name, state = %report.state, "scenario finished");
        Ok(report)
    }
}

/// The observable outcome of one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Scenario name
    pub scenario: &'static str,
    /// Final promise state
    pub state: String,
    /// Fulfillment value or rejection reason; undefined while pending
    pub outcome: Value,
    /// Virtual time at which the event loop went idle
    pub elapsed_ms: u64,
    /// Tasks and timers run
    pub tasks_run: usize,
    /// Microtasks run
    pub microtasks_run: usize,
}

impl Report {
    fn new(scenario: &'static str, promise: &Promise, event_loop: &EventLoop) -> Self {
        let state = promise.state();
        let outcome = match state {
            PromiseState::Pending => None,
            PromiseState::Fulfilled => promise.value(),
            PromiseState::Rejected => promise.reason(),
        };
        let stats = event_loop.stats();
        Self {
            scenario,
            state: state.to_string(),
            outcome: outcome.unwrap_or(Value::Undefined),
            elapsed_ms: event_loop.now(),
            tasks_run: stats.tasks_run,
            microtasks_run: stats.microtasks_run,
        }
    }

    /// Encode as a single JSON line
    pub fn to_json(&self) -> CliResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = serde_json::to_string(&self.outcome).map_err(|_| fmt::Error)?;
        write!(
            f,
            "{}: {} {} (after {}ms)",
            self.scenario, self.state, outcome, self.elapsed_ms
        )
    }
}
