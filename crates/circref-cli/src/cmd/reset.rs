//! Implementation of `circref reset-filters`.
//!
//! Removes the persisted filter record from the state file so that the next
//! load starts from the defaults. Other keys in the file are kept; the file
//! is deleted once nothing is left in it.
//!
//! Exit codes: 0 = success (including when nothing was saved), 2 = the state
//! file could not be read or written.
use std::io::Write;

use serde::Serialize;

use circref_core::{FilterConfig, FilterStore};

use crate::cli::OutputFormat;
use crate::cmd::{Context, with_stdout};
use crate::error::CliError;
use crate::format::write_json;
use crate::store::FileStore;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetOutput {
    state_file: String,
    cleared: bool,
}

/// Runs the `reset-filters` command.
///
/// # Errors
///
/// Returns [`CliError::StateStore`] if the state file is unreadable or
/// cannot be rewritten.
pub fn run(ctx: &Context) -> Result<(), CliError> {
    let key = FilterConfig::default().storage_key;
    let mut store = FileStore::new(&ctx.state_file);
    let cleared = store.get(&key)?.is_some();
    store.remove(&key)?;
    tracing::debug!(path = %store.path().display(), cleared, "filter state reset");

    let output = ResetOutput {
        state_file: store.path().display().to_string(),
        cleared,
    };
    with_stdout(|out| match ctx.format {
        OutputFormat::Json => write_json(out, &output),
        OutputFormat::Human if output.cleared => {
            writeln!(out, "cleared saved filters in {}", output.state_file)
        }
        OutputFormat::Human => writeln!(out, "no saved filters in {}", output.state_file),
    })
}
