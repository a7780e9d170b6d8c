//! Corten Promise runtime CLI
//!
//! Entry point for the scenario runner. Parses CLI arguments, sets up
//! logging and delegates to the Runner.

use clap::Parser as ClapParser;
use promise_cli::{scenarios, Cli, CliError, CliResult, Runner, SCENARIOS};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list {
        for scenario in SCENARIOS {
            println!("{:<16} {}", scenario.name, scenario.description);
        }
        return;
    }

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let selected = if cli.scenarios.is_empty() {
        SCENARIOS.iter().collect()
    } else {
        cli.scenarios
            .iter()
            .map(|name| scenarios::find(name).ok_or_else(|| CliError::UnknownScenario(name.clone())))
            .collect::<CliResult<Vec<_>>>()?
    };

    let runner = Runner::new().with_microtask_limit(cli.microtask_limit);
    for scenario in selected {
        let report = runner.run(scenario)?;
        if cli.json {
            println!("{}", report.to_json()?);
        } else {
            println!("{}", report);
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}
