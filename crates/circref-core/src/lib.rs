#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod builder;
pub mod config;
pub mod doc_id;
pub mod enums;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod merge;
pub mod normalize;
pub mod serde_helpers;
pub mod session;
pub mod source;
pub mod structures;

pub use builder::{BuildOutput, BuildReport, GraphBuilder, build_graph};
pub use config::{
    BuildConfig, DEFAULT_MAX_DEPTH, DEFAULT_SEARCH_DEBOUNCE, FILTER_STATE_KEY, FilterConfig,
    SessionConfig,
};
pub use doc_id::{DerivedId, DocumentIdError, derive_document_id, synthetic_id};
pub use enums::{Department, DocumentKind, Provenance, RefType};
pub use filter::{
    FilterBounds, FilterEngine, FilterError, FilterState, FilterStateError, FilterStore,
    MemoryStore, RestoreOutcome, SearchDebouncer, StoreError, VisibilitySummary, apply_visibility,
    node_dimmed, node_hidden,
};
pub use graph::{
    Cycle, CycleReport, CycleSummary, GraphBuildError, GraphSnapshot, GraphStats, ReferenceGraph,
    annotate_cycles, cycles_for_node, find_cycles,
};
pub use loader::{
    FetchError, LoadError, LoadReport, LoadedSources, SourceFetcher, SourceManifest, load_sources,
};
pub use merge::merge_documents;
pub use normalize::{ParsedReference, normalize_title, parse_reference, registration_keys};
pub use session::{Session, SessionReport};
pub use source::{CacheDocument, PrimaryDocument, YearBucket};
pub use structures::{DocumentNode, ReferenceEdge, Visibility};

/// Returns the current version of the circref-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
