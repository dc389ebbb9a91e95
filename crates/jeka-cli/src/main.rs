//! Jeka CLI binary.
//!
//! This is the entry point for the `jeka` command-line tool. It initializes
//! logging via `tracing`, parses arguments with `clap`, and dispatches to
//! the appropriate command handler.

mod cli;
mod commands;

use miette::Result;

fn main() -> Result<()> {
    let args = cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    commands::dispatch(args)
}
