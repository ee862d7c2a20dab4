/// Command modules for the `circref` CLI.
///
/// Each submodule implements one subcommand. Graph-producing commands share
/// [`open_session`], which loads the sources, builds the graph, and restores
/// the persisted filters; their `run` functions then write to stdout and
/// return `Ok(())` or a [`CliError`].
pub mod build;
pub mod cycles;
pub mod filter;
pub mod inspect;
pub mod reset;

use std::io::Write;
use std::path::PathBuf;

use circref_core::{BuildConfig, Session, SessionConfig};

use crate::cli::{OutputFormat, SourceArgs};
use crate::error::{CliError, stdout_error};
use crate::io::{FsFetcher, manifest};
use crate::store::FileStore;

/// Global options every command needs.
#[derive(Debug, Clone)]
pub struct Context {
    /// `--format`.
    pub format: OutputFormat,
    /// `--max-file-size`.
    pub max_file_size: u64,
    /// `--state-file`.
    pub state_file: PathBuf,
}

/// Loads every source, builds and annotates the graph, and restores the
/// persisted filter state. An unreadable state file leaves the defaults in
/// effect.
///
/// # Errors
///
/// Returns [`CliError::NoSourcesLoaded`] when sources were named but none
/// loaded.
pub fn open_session(sources: &SourceArgs, ctx: &Context) -> Result<Session, CliError> {
    let config = SessionConfig {
        build: BuildConfig {
            max_depth: sources.max_depth,
            ..BuildConfig::default()
        },
        ..SessionConfig::default()
    };
    let session = Session::load(
        &FsFetcher::new(ctx.max_file_size),
        &manifest(sources),
        config,
        Box::new(FileStore::new(&ctx.state_file)),
    );

    let load = &session.report().load;
    if load.all_failed() {
        return Err(CliError::NoSourcesLoaded { total: load.total });
    }
    tracing::debug!(
        nodes = session.stats().total_nodes,
        edges = session.stats().total_edges,
        "session ready"
    );
    Ok(session)
}

/// Runs `f` against a locked stdout, mapping write failures.
pub fn with_stdout(
    f: impl FnOnce(&mut std::io::StdoutLock<'_>) -> std::io::Result<()>,
) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    f(&mut out)
        .and_then(|()| out.flush())
        .map_err(|e| stdout_error(&e))
}
