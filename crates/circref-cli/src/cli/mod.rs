//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

use circref_core::{DEFAULT_MAX_DEPTH, Department};

/// Output format for CLI commands.
///
/// `Human` emits aligned text to stdout. `Json` emits a single pretty-printed
/// JSON object with camelCase keys.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default).
    Human,
    /// Structured JSON output.
    Json,
}

/// Parses a department code, case-insensitively.
fn parse_department(raw: &str) -> Result<Department, String> {
    Department::ALL
        .into_iter()
        .find(|d| d.code().eq_ignore_ascii_case(raw.trim()))
        .ok_or_else(|| {
            let known: Vec<&str> = Department::ALL.iter().map(|d| d.code()).collect();
            format!("unknown department {raw:?}; expected one of {}", known.join(", "))
        })
}

/// The sources one load reads, shared by every graph-producing subcommand.
#[derive(Args, Clone, Debug)]
#[command(group(
    ArgGroup::new("sources")
        .required(true)
        .multiple(true)
        .args(["primary", "cache"])
))]
pub struct SourceArgs {
    /// Primary department document (repeatable).
    #[arg(long, value_name = "FILE")]
    pub primary: Vec<PathBuf>,

    /// Content cache document.
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Maximum nesting level of extracted references.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

/// Overrides applied on top of the restored filter state.
///
/// Every flag that is not given leaves the corresponding field as it was
/// persisted.
#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// Show only these departments (repeatable). Replaces the saved set.
    #[arg(long, value_name = "CODE", value_parser = parse_department)]
    pub department: Vec<Department>,

    /// Inclusive lower year bound.
    #[arg(long, value_name = "YEAR", allow_negative_numbers = true)]
    pub year_min: Option<i32>,

    /// Inclusive upper year bound.
    #[arg(long, value_name = "YEAR", allow_negative_numbers = true)]
    pub year_max: Option<i32>,

    /// Free-text search; non-matching documents are dimmed. Pass an empty
    /// string to clear it.
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Show only documents lying on a cycle.
    #[arg(long, conflicts_with = "all_documents")]
    pub cycles_only: bool,

    /// Turn cycles-only off.
    #[arg(long)]
    pub all_documents: bool,

    /// Draw node labels in the viewer.
    #[arg(long, conflicts_with = "no_labels")]
    pub labels: bool,

    /// Stop drawing node labels.
    #[arg(long)]
    pub no_labels: bool,

    /// Hide documents with no references in either direction.
    #[arg(long, conflicts_with = "show_isolated")]
    pub hide_isolated: bool,

    /// Show documents with no references in either direction.
    #[arg(long)]
    pub show_isolated: bool,
}

/// All top-level subcommands exposed by the `circref` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Build the reference graph and print it with cycle and visibility
    /// annotations.
    Build {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Print load, build, and graph statistics.
    Inspect {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// List detected cycles.
    Cycles {
        #[command(flatten)]
        sources: SourceArgs,
        /// Only list cycles passing through this document id.
        #[arg(long, value_name = "ID")]
        node: Option<String>,
    },

    /// Update the saved filters and print the documents they leave visible.
    Filter {
        #[command(flatten)]
        sources: SourceArgs,
        #[command(flatten)]
        overrides: FilterArgs,
    },

    /// Clear the saved filter state.
    #[command(name = "reset-filters")]
    ResetFilters,
}

/// Root CLI struct for the `circref` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "circref",
    version,
    about = "Circular reference graph CLI",
    long_about = "Builds a deduplicated reference graph from regulatory circular\n\
                  extracts, detects reference cycles, and evaluates the viewer's\n\
                  persisted filters."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Only log errors to stderr (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log debug detail to stderr: orphan edges, merges, filter passes
    /// (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum source file size in bytes.
    ///
    /// Can also be set via the `CIRCREF_MAX_FILE_SIZE` environment variable.
    /// The CLI flag takes precedence over the environment variable.
    /// Default: 268435456 (256 MB).
    #[arg(
        long,
        global = true,
        env = "CIRCREF_MAX_FILE_SIZE",
        default_value = "268435456"
    )]
    pub max_file_size: u64,

    /// File holding the persisted filter state.
    ///
    /// Can also be set via the `CIRCREF_STATE_FILE` environment variable.
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "CIRCREF_STATE_FILE",
        default_value = ".circref-state.json"
    )]
    pub state_file: PathBuf,
}

#[cfg(test)]
mod tests;
