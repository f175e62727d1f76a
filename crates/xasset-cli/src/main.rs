mod cli;
mod commands;
mod shutdown;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "xasset=debug"
    } else {
        "xasset=info"
    };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Titles => commands::titles::run(),
        Command::Pools { target, dump } => commands::pools::run(&target, dump.as_deref()),
        Command::List {
            target,
            selection,
            json,
        } => commands::list::run(&target, &selection, json),
        Command::Export {
            target,
            selection,
            output,
            no_pool_report,
            report,
        } => commands::export::run(
            &target,
            &selection,
            output,
            !no_pool_report,
            report.as_deref(),
        ),
        Command::Scan {
            target,
            pattern,
            limit,
        } => commands::scan::run(&target, &pattern, limit),
    }
}
