//! Implementation of `circref build`.
//!
//! Prints the annotated graph. In `--format json` mode the output is the
//! viewer's `{nodes, edges}` document with cycle and visibility annotations.
//! In human mode every document is listed, followed by every reference as
//! `source -> target (type)`; hidden elements are bracketed.
//!
//! Exit codes: 0 = success, 2 = no source loaded or unreadable state file.
use std::io::Write;

use circref_core::{GraphSnapshot, Session};

use crate::cli::OutputFormat;
use crate::cmd::with_stdout;
use crate::error::CliError;
use crate::format::{write_json, write_node_human, write_stats_human};

/// Runs the `build` command.
///
/// # Errors
///
/// Returns [`CliError`] if stdout cannot be written.
pub fn run(session: &Session, format: OutputFormat) -> Result<(), CliError> {
    let snapshot = session.graph();
    with_stdout(|out| match format {
        OutputFormat::Json => write_json(out, &snapshot),
        OutputFormat::Human => {
            print_human(out, &snapshot)?;
            write_stats_human(out, &session.stats())
        }
    })
}

fn print_human<W: Write>(w: &mut W, snapshot: &GraphSnapshot<'_>) -> std::io::Result<()> {
    for node in &snapshot.nodes {
        if node.visibility.hidden {
            write!(w, "[hidden]")?;
        }
        write_node_human(w, node)?;
    }
    for edge in &snapshot.edges {
        let marker = if edge.is_cycle_edge { " *" } else { "" };
        let line = format!(
            "{} -> {} ({}){marker}",
            edge.source,
            edge.target,
            edge.ref_type.as_str()
        );
        if edge.hidden {
            writeln!(w, "[{line}]")?;
        } else {
            writeln!(w, "{line}")?;
        }
    }
    Ok(())
}
