mod cli;
mod cmd;
mod error;
mod format;
mod io;
mod store;

use std::io::IsTerminal as _;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::cmd::Context;
use crate::error::CliError;

/// Installs the stderr log subscriber.
///
/// `--verbose` and `--quiet` pin the level; otherwise `RUST_LOG` applies,
/// falling back to `warn`.
fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context {
        format: cli.format,
        max_file_size: cli.max_file_size,
        state_file: cli.state_file,
    };

    match cli.command {
        Command::Build { sources } => {
            let session = cmd::open_session(&sources, &ctx)?;
            cmd::build::run(&session, ctx.format)
        }
        Command::Inspect { sources } => {
            let session = cmd::open_session(&sources, &ctx)?;
            cmd::inspect::run(&session, ctx.format)
        }
        Command::Cycles { sources, node } => {
            let session = cmd::open_session(&sources, &ctx)?;
            cmd::cycles::run(&session, node.as_deref(), ctx.format)
        }
        Command::Filter { sources, overrides } => {
            let mut session = cmd::open_session(&sources, &ctx)?;
            cmd::filter::run(&mut session, &overrides, ctx.format)
        }
        Command::ResetFilters => cmd::reset::run(&ctx),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}
