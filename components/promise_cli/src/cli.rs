//! Command line arguments

use clap::{ArgAction, Parser};

/// Runs promise scenarios on a fresh event loop and prints their outcome.
#[derive(Parser, Debug)]
#[command(name = "corten-promise", version, about)]
pub struct Cli {
    /// Scenario to run (repeatable). Runs every scenario when omitted.
    #[arg(short, long = "scenario", value_name = "NAME")]
    pub scenarios: Vec<String>,

    /// List the available scenarios and exit
    #[arg(short, long)]
    pub list: bool,

    /// Print one JSON report per line instead of text
    #[arg(long)]
    pub json: bool,

    /// Maximum number of microtasks drained in one checkpoint
    #[arg(long, value_name = "N")]
    pub microtask_limit: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
