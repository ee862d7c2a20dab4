//! Implementation of `circref inspect`.
//!
//! Prints what the load did and what it produced:
//! - sources loaded out of sources named, with the reason each skipped
//!   source failed
//! - build counts (orphan edges, duplicates, merged records, collisions)
//! - aggregate graph statistics, including cycle counts
//! - the visibility summary under the restored filters
//!
//! In `--format json` mode a single JSON object is emitted to stdout.
//! In human mode, aligned key/value lines are printed.
//!
//! Exit codes: 0 = success, 2 = no source loaded or unreadable state file.
use serde::Serialize;

use circref_core::{GraphStats, Session, SessionReport, VisibilitySummary};

use crate::cli::OutputFormat;
use crate::cmd::with_stdout;
use crate::error::CliError;
use crate::format::{
    write_build_human, write_json, write_load_human, write_stats_human, write_visibility_human,
};

/// The JSON document printed by `inspect`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectOutput<'a> {
    #[serde(flatten)]
    report: &'a SessionReport,
    stats: GraphStats,
    visibility: VisibilitySummary,
}

/// Runs the `inspect` command.
///
/// # Errors
///
/// Returns [`CliError`] if stdout cannot be written.
pub fn run(session: &Session, format: OutputFormat) -> Result<(), CliError> {
    let output = InspectOutput {
        report: session.report(),
        stats: session.stats(),
        visibility: session.visibility(),
    };
    with_stdout(|out| match format {
        OutputFormat::Json => write_json(out, &output),
        OutputFormat::Human => {
            write_load_human(out, &output.report.load)?;
            write_build_human(out, &output.report.build)?;
            write_stats_human(out, &output.stats)?;
            write_visibility_human(out, &output.visibility)
        }
    })
}
