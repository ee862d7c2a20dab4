/// File reading with size enforcement and UTF-8 validation.
///
/// This module is the single entry point for source input in the `circref`
/// binary. `circref-core` never touches the filesystem; it reads sources
/// through the [`FsFetcher`] defined here.
///
/// Key behaviours:
/// - Size checked via `std::fs::metadata` before any read.
/// - UTF-8 validation via `String::from_utf8` with byte-offset reporting.
/// - Errors are [`CliError`] values; [`FsFetcher`] turns them into the
///   core's `FetchError` so a failing source is skipped, not fatal.
use std::path::Path;

use circref_core::{FetchError, SourceFetcher, SourceManifest};

use crate::cli::SourceArgs;
use crate::error::CliError;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reads the entire contents of `path` into a `String`.
///
/// The file length is checked against `max_size` before any bytes are read.
///
/// # Errors
///
/// Returns [`CliError`] (exit code 2) for a missing file, a permission
/// problem, a file over `max_size`, any other I/O error, or invalid UTF-8.
pub fn read_file(path: &Path, max_size: u64) -> Result<String, CliError> {
    let file_size = std::fs::metadata(path)
        .map_err(|e| io_error_to_cli(&e, path))?
        .len();

    if file_size > max_size {
        return Err(CliError::FileTooLarge {
            source: path.display().to_string(),
            limit: max_size,
            actual: file_size,
        });
    }

    let bytes = std::fs::read(path).map_err(|e| io_error_to_cli(&e, path))?;
    bytes_to_string(bytes, &path.display().to_string())
}

/// Reads sources from the local filesystem; locations are paths.
#[derive(Debug, Clone, Copy)]
pub struct FsFetcher {
    max_size: u64,
}

impl FsFetcher {
    /// Creates a fetcher that rejects files larger than `max_size` bytes.
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }
}

impl SourceFetcher for FsFetcher {
    fn fetch(&self, location: &str) -> Result<String, FetchError> {
        read_file(Path::new(location), self.max_size).map_err(|e| {
            let message = e.message();
            FetchError::new(message.strip_prefix("error: ").unwrap_or(&message))
        })
    }
}

/// Turns the `--primary` / `--cache` paths into a manifest of locations.
pub fn manifest(sources: &SourceArgs) -> SourceManifest {
    SourceManifest {
        primaries: sources
            .primary
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        cache: sources.cache.as_ref().map(|p| p.display().to_string()),
    }
}

/// Maps a `std::io::Error` arising from a disk-file operation to a [`CliError`].
fn io_error_to_cli(e: &std::io::Error, path: &Path) -> CliError {
    let kind = e.kind();
    if kind == std::io::ErrorKind::NotFound {
        CliError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else if kind == std::io::ErrorKind::PermissionDenied {
        CliError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// UTF-8 conversion
// ---------------------------------------------------------------------------

/// Converts a byte buffer to a `String`, returning a [`CliError`] with the
/// byte offset of the first invalid sequence on failure.
fn bytes_to_string(bytes: Vec<u8>, source_label: &str) -> Result<String, CliError> {
    String::from_utf8(bytes).map_err(|e| CliError::InvalidUtf8 {
        source: source_label.to_owned(),
        byte_offset: e.utf8_error().valid_up_to(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
