//! Implementation of `circref filter [...]`.
//!
//! Starts from the persisted filter state (or the defaults), applies the
//! overrides given on the command line, persists the result, and prints the
//! documents it leaves visible:
//!
//! - human mode: one line per visible document (`~` dimmed, `*` on a
//!   cycle) followed by the visibility summary;
//! - JSON mode: `{state, summary, visible}` where `visible` lists
//!   `{id, title, department, year, inCycle, dimmed}` per document.
//!
//! Exit codes: 0 = success, 2 = invalid filters, no source loaded, or an
//! unreadable/unwritable state file.
use serde::Serialize;

use circref_core::{Department, DocumentNode, FilterState, Session, VisibilitySummary};

use crate::cli::{FilterArgs, OutputFormat};
use crate::cmd::with_stdout;
use crate::error::CliError;
use crate::format::{write_json, write_node_human, write_visibility_human};

/// Returns `state` with every given override applied.
pub fn apply_overrides(mut state: FilterState, args: &FilterArgs) -> FilterState {
    if !args.department.is_empty() {
        state.departments = args.department.iter().copied().collect();
    }
    if let Some(year) = args.year_min {
        state.year_min = year;
    }
    if let Some(year) = args.year_max {
        state.year_max = year;
    }
    if let Some(search) = &args.search {
        state.search_query.clone_from(search);
    }
    if args.cycles_only {
        state.show_cycles_only = true;
    } else if args.all_documents {
        state.show_cycles_only = false;
    }
    if args.labels {
        state.show_labels = true;
    } else if args.no_labels {
        state.show_labels = false;
    }
    if args.hide_isolated {
        state.show_isolated = false;
    } else if args.show_isolated {
        state.show_isolated = true;
    }
    state
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VisibleDocument<'a> {
    id: &'a str,
    title: &'a str,
    department: Department,
    year: Option<i32>,
    in_cycle: bool,
    dimmed: bool,
}

impl<'a> From<&'a DocumentNode> for VisibleDocument<'a> {
    fn from(node: &'a DocumentNode) -> Self {
        Self {
            id: &node.id,
            title: &node.title,
            department: node.department,
            year: node.year,
            in_cycle: node.in_cycle,
            dimmed: node.visibility.dimmed,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterOutput<'a> {
    state: &'a FilterState,
    summary: VisibilitySummary,
    visible: Vec<VisibleDocument<'a>>,
}

/// Runs the `filter` command.
///
/// # Errors
///
/// - [`CliError::InvalidFilter`] when the resulting state is invalid; the
///   persisted state is left untouched.
/// - [`CliError::StateStore`] when the state cannot be persisted.
pub fn run(session: &mut Session, args: &FilterArgs, format: OutputFormat) -> Result<(), CliError> {
    let state = apply_overrides(session.filter_state().clone(), args);
    let summary = session.apply_filters(state)?;

    let mut visible: Vec<&DocumentNode> = session
        .reference_graph()
        .nodes()
        .filter(|n| !n.visibility.hidden)
        .collect();
    visible.sort_by(|a, b| a.id.cmp(&b.id));

    with_stdout(|out| match format {
        OutputFormat::Json => write_json(
            out,
            &FilterOutput {
                state: session.filter_state(),
                summary,
                visible: visible.iter().map(|&n| VisibleDocument::from(n)).collect(),
            },
        ),
        OutputFormat::Human => {
            for node in &visible {
                write_node_human(out, node)?;
            }
            write_visibility_human(out, &summary)
        }
    })
}
