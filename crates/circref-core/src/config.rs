/// Tunables for graph construction, cycle detection, and filtering.
///
/// All structs implement [`Default`] with the values the viewer ships with;
/// the CLI overrides individual fields from flags and environment variables.
use std::time::Duration;

use crate::enums::RefType;

/// Default maximum nesting level of extracted references.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default debounce interval for free-text search input.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Fixed key under which the filter state record is persisted.
pub const FILTER_STATE_KEY: &str = "circref.filterState";

/// Configuration for [`crate::builder::GraphBuilder`] and cycle detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Maximum nesting level of references that are extracted. References on
    /// a document are level 1; references nested inside those are level 2,
    /// and so on. Deeper references are silently dropped.
    ///
    /// Default: 10.
    pub max_depth: usize,

    /// Reference type whose edges form the subgraph searched for cycles.
    ///
    /// Default: [`RefType::Circular`].
    pub cycle_ref_type: RefType,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            cycle_ref_type: RefType::Circular,
        }
    }
}

/// Configuration for [`crate::filter::FilterEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Quiet period after the last search keystroke before the query is
    /// applied.
    ///
    /// Default: 300 ms.
    pub search_debounce: Duration,

    /// Key of the persisted filter-state record.
    ///
    /// Default: `"circref.filterState"`.
    pub storage_key: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            storage_key: FILTER_STATE_KEY.to_owned(),
        }
    }
}

/// Configuration for a whole [`crate::session::Session`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Build and cycle-detection settings.
    pub build: BuildConfig,
    /// Filter engine settings.
    pub filter: FilterConfig,
}
