/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `circref` binary. Every
/// variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
///
/// - Exit code **2**: input failure: no source could be loaded, the state
///   file is unreadable, or the requested filters are invalid.
/// - Exit code **1**: logical failure: the tool ran but the request names
///   something the graph does not contain.
///
/// Failures of individual sources are not errors; they are reported by the
/// core's load report and the tool carries on with the rest.
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `circref` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A source file could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// A source exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// The filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes.
        actual: u64,
    },

    /// The source bytes are not valid UTF-8.
    InvalidUtf8 {
        /// The filesystem path.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// A generic I/O error not covered by the more specific variants above.
    IoError {
        /// A human-readable label for the file or stream.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// Every named source failed to load.
    NoSourcesLoaded {
        /// How many sources were named.
        total: usize,
    },

    /// The filter-state file could not be read or written.
    StateStore {
        /// The underlying store error.
        detail: String,
    },

    /// The requested filter state is invalid.
    InvalidFilter {
        /// Why the state was rejected.
        detail: String,
    },

    // --- Exit code 1: logical failures ---
    /// `--node` named a document the graph does not contain.
    UnknownNode {
        /// The requested id.
        id: String,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::IoError { .. }
            | Self::NoSourcesLoaded { .. }
            | Self::StateStore { .. }
            | Self::InvalidFilter { .. } => 2,

            Self::UnknownNode { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual,
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error on {source}: {detail}")
            }
            Self::NoSourcesLoaded { total } => {
                format!("error: none of the {total} source(s) could be loaded")
            }
            Self::StateStore { detail } => {
                format!("error: filter state store: {detail}")
            }
            Self::InvalidFilter { detail } => {
                format!("error: invalid filter: {detail}")
            }
            Self::UnknownNode { id } => {
                format!("error: no document with id {id:?}")
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

impl From<circref_core::StoreError> for CliError {
    fn from(e: circref_core::StoreError) -> Self {
        Self::StateStore { detail: e.detail }
    }
}

impl From<circref_core::FilterError> for CliError {
    fn from(e: circref_core::FilterError) -> Self {
        match e {
            circref_core::FilterError::State(e) => Self::InvalidFilter {
                detail: e.to_string(),
            },
            circref_core::FilterError::Store(e) => e.into(),
        }
    }
}

/// Maps a failed write to stdout.
pub fn stdout_error(e: &std::io::Error) -> CliError {
    CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
