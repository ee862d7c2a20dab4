/// Source loading: fetch and parse the fixed set of JSON inputs for one build.
///
/// `circref-core` never touches the filesystem or the network itself. Callers
/// supply a [`SourceFetcher`] that turns a location string into JSON text; the
/// CLI implements it over the filesystem, tests implement it over a
/// `HashMap`.
///
/// Every source is fetched and parsed independently. A source that cannot be
/// fetched or parsed is logged, recorded in the [`LoadReport`], and skipped;
/// the remaining sources still load.
use std::collections::HashMap;
use std::fmt;

use crate::source::{CacheDocument, PrimaryDocument};

// ---------------------------------------------------------------------------
// Fetcher seam
// ---------------------------------------------------------------------------

/// Error returned by a [`SourceFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    /// Human-readable reason the source could not be read.
    pub detail: String,
}

impl FetchError {
    /// Creates a fetch error from any displayable reason.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

impl std::error::Error for FetchError {}

/// Reads the raw text of a source given its location.
pub trait SourceFetcher {
    /// Returns the full JSON text stored at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the source is missing or unreadable.
    fn fetch(&self, location: &str) -> Result<String, FetchError>;
}

/// In-memory sources keyed by location.
impl SourceFetcher for HashMap<String, String> {
    fn fetch(&self, location: &str) -> Result<String, FetchError> {
        self.get(location)
            .cloned()
            .ok_or_else(|| FetchError::new(format!("no source at {location:?}")))
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// The set of sources that make up one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceManifest {
    /// Locations of primary department documents.
    pub primaries: Vec<String>,
    /// Location of the optional cache document.
    pub cache: Option<String>,
}

impl SourceManifest {
    /// Total number of sources named by the manifest.
    pub fn len(&self) -> usize {
        self.primaries.len() + usize::from(self.cache.is_some())
    }

    /// Returns `true` when the manifest names no sources.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Errors and report
// ---------------------------------------------------------------------------

/// Why a single source was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The fetcher could not produce the source text.
    Fetch {
        /// Source location.
        location: String,
        /// Underlying fetch failure.
        detail: String,
    },
    /// The source text is not a document of the expected shape.
    Parse {
        /// Source location.
        location: String,
        /// Underlying JSON error, with line and column.
        detail: String,
    },
}

impl LoadError {
    /// The location of the source that failed.
    pub fn location(&self) -> &str {
        match self {
            Self::Fetch { location, .. } | Self::Parse { location, .. } => location,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { location, detail } => {
                write!(f, "could not fetch source {location:?}: {detail}")
            }
            Self::Parse { location, detail } => {
                write!(f, "could not parse source {location:?}: {detail}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Loaded/total accounting for one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of sources that loaded successfully.
    pub loaded: usize,
    /// Number of sources named by the manifest.
    pub total: usize,
    /// One entry per skipped source.
    pub failures: Vec<LoadError>,
}

impl LoadReport {
    /// Returns `true` when at least one source was named and none loaded.
    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.loaded == 0
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} sources loaded", self.loaded, self.total)
    }
}

/// Parsed sources ready for the graph builder.
#[derive(Debug, Clone, Default)]
pub struct LoadedSources {
    /// Successfully parsed primary documents, in manifest order, with their
    /// locations.
    pub primaries: Vec<(String, PrimaryDocument)>,
    /// The cache document, when named and loaded.
    pub cache: Option<CacheDocument>,
    /// Loaded/total accounting.
    pub report: LoadReport,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Fetches and parses every source named by `manifest`.
///
/// Never fails as a whole: skipped sources are listed in
/// [`LoadedSources::report`].
pub fn load_sources(fetcher: &dyn SourceFetcher, manifest: &SourceManifest) -> LoadedSources {
    let mut out = LoadedSources {
        report: LoadReport {
            total: manifest.len(),
            ..LoadReport::default()
        },
        ..LoadedSources::default()
    };

    for location in &manifest.primaries {
        match fetch_and_parse(fetcher, location, PrimaryDocument::from_json) {
            Ok(doc) => {
                out.report.loaded += 1;
                out.primaries.push((location.clone(), doc));
            }
            Err(e) => record_failure(&mut out.report, e),
        }
    }

    if let Some(location) = &manifest.cache {
        match fetch_and_parse(fetcher, location, CacheDocument::from_json) {
            Ok(doc) => {
                out.report.loaded += 1;
                out.cache = Some(doc);
            }
            Err(e) => record_failure(&mut out.report, e),
        }
    }

    tracing::info!(
        loaded = out.report.loaded,
        total = out.report.total,
        "sources loaded"
    );
    out
}

fn fetch_and_parse<T>(
    fetcher: &dyn SourceFetcher,
    location: &str,
    parse: fn(&str) -> Result<T, serde_json::Error>,
) -> Result<T, LoadError> {
    let text = fetcher.fetch(location).map_err(|e| LoadError::Fetch {
        location: location.to_owned(),
        detail: e.detail,
    })?;
    parse(&text).map_err(|e| LoadError::Parse {
        location: location.to_owned(),
        detail: format!("line {}, column {}: {e}", e.line(), e.column()),
    })
}

fn record_failure(report: &mut LoadReport, error: LoadError) {
    tracing::warn!(source = error.location(), "{error}; skipping");
    report.failures.push(error);
}
