//! Implementation of `circref cycles [--node ID]`.
//!
//! Without `--node`, lists every detected cycle with the counts of nodes and
//! edges lying on one. With `--node`, lists only the cycles passing through
//! that document, each as `{cycleId, nodeSequence, length}`; a document on
//! no cycle yields an empty list.
//!
//! Exit codes: 0 = success, 1 = unknown document id, 2 = input failure.
use serde::Serialize;

use circref_core::{CycleSummary, Session};

use crate::cli::OutputFormat;
use crate::cmd::with_stdout;
use crate::error::CliError;
use crate::format::{write_cycles_human, write_json, write_summaries_human};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeCycles<'a> {
    node: &'a str,
    cycles: Vec<CycleSummary>,
}

/// Runs the `cycles` command.
///
/// # Errors
///
/// Returns [`CliError::UnknownNode`] when `node` names no document, or
/// [`CliError`] if stdout cannot be written.
pub fn run(session: &Session, node: Option<&str>, format: OutputFormat) -> Result<(), CliError> {
    let Some(id) = node else {
        let report = session.cycles();
        return with_stdout(|out| match format {
            OutputFormat::Json => write_json(out, report),
            OutputFormat::Human => write_cycles_human(out, &report.cycles),
        });
    };

    let cycles = session
        .cycles_for_node(id)
        .ok_or_else(|| CliError::UnknownNode { id: id.to_owned() })?;
    with_stdout(|out| match format {
        OutputFormat::Json => write_json(out, &NodeCycles { node: id, cycles }),
        OutputFormat::Human => write_summaries_human(out, &cycles),
    })
}
