//! Jeopardy CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use jeopardy_cli::cli::Cli;
use jeopardy_cli::commands;
use jeopardy_core::{load_env_file, Settings};
use jeopardy_persistence::PersistenceGateway;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));
    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> commands::Result<()> {
    // Read once, before any setting is resolved.
    load_env_file(cli.env.as_deref())?;
    let settings = Settings::from_env()?;

    commands::execute(cli.command, &settings, PersistenceGateway::global())
}
