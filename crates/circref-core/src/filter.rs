/// Compound filtering of the reference graph.
///
/// # Visibility Rules
///
/// A node is **hidden** when any of these holds:
/// - its department is not among the allowed departments;
/// - its year is known and outside the inclusive year range;
/// - cycles-only is on and the node lies on no cycle;
/// - isolated nodes are not shown and the node has no edges.
///
/// A node is **dimmed** when the search query is non-empty and neither its id
/// nor its title contains the query, case-insensitively. Dimming is
/// independent of hiding.
///
/// An edge is hidden when either endpoint is hidden.
///
/// Every recomputation is a single pass over the nodes followed by a single
/// pass over the edges, and overwrites all visibility fields.
///
/// # Persistence
///
/// [`FilterEngine`] writes the whole [`FilterState`] to its [`FilterStore`]
/// after every change and reads it back once in [`FilterEngine::restore`].
pub mod debounce;
pub mod state;
pub mod store;

pub use debounce::SearchDebouncer;
pub use state::{FilterBounds, FilterState, FilterStateError};
pub use store::{FilterStore, MemoryStore, StoreError};

use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use serde::Serialize;

use crate::config::FilterConfig;
use crate::enums::Department;
use crate::graph::ReferenceGraph;
use crate::structures::{DocumentNode, Visibility};

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Evaluates the hidden predicate for one node.
///
/// `degree` is the node's total edge count (in plus out).
pub fn node_hidden(node: &DocumentNode, degree: usize, state: &FilterState) -> bool {
    !state.allows(node.department)
        || !state.year_in_range(node.year)
        || (state.show_cycles_only && !node.in_cycle)
        || (!state.show_isolated && degree == 0)
}

/// Evaluates the dimmed predicate for one node.
///
/// `query_lowered` must be lowercased and is matched as is; an empty query dims
/// nothing.
pub fn node_dimmed(node: &DocumentNode, query_lowered: &str) -> bool {
    !query_lowered.is_empty() && !node.matches_search(query_lowered)
}

/// Counts produced by one recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilitySummary {
    /// Nodes not hidden.
    pub visible_nodes: usize,
    /// Hidden nodes.
    pub hidden_nodes: usize,
    /// Dimmed nodes, hidden or not.
    pub dimmed_nodes: usize,
    /// Edges not hidden.
    pub visible_edges: usize,
    /// Hidden edges.
    pub hidden_edges: usize,
}

/// Recomputes every visibility field of `graph` under `state`.
pub fn apply_visibility(graph: &mut ReferenceGraph, state: &FilterState) -> VisibilitySummary {
    let query = state.search_query.to_lowercase();
    let mut summary = VisibilitySummary::default();

    let nodes: Vec<NodeIndex> = graph.graph().node_indices().collect();
    for idx in nodes {
        let degree = graph.degree(idx);
        let Some(node) = graph.node_weight_mut(idx) else {
            continue;
        };
        let visibility = Visibility {
            hidden: node_hidden(node, degree, state),
            dimmed: node_dimmed(node, &query),
        };
        node.visibility = visibility;

        if visibility.hidden {
            summary.hidden_nodes += 1;
        } else {
            summary.visible_nodes += 1;
        }
        if visibility.dimmed {
            summary.dimmed_nodes += 1;
        }
    }

    let edges: Vec<EdgeIndex> = graph.graph().edge_indices().collect();
    for idx in edges {
        let hidden = graph
            .graph()
            .edge_endpoints(idx)
            .map(|(s, t)| endpoint_hidden(graph, s) || endpoint_hidden(graph, t))
            .unwrap_or(true);
        if let Some(edge) = graph.edge_weight_mut(idx) {
            edge.hidden = hidden;
        }
        if hidden {
            summary.hidden_edges += 1;
        } else {
            summary.visible_edges += 1;
        }
    }

    summary
}

fn endpoint_hidden(graph: &ReferenceGraph, idx: NodeIndex) -> bool {
    graph
        .node_weight(idx)
        .is_none_or(|n| n.visibility.hidden)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// A filter change could not be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The requested state violates an invariant; nothing changed.
    State(FilterStateError),
    /// The state changed in memory but could not be persisted.
    Store(StoreError),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::State(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

impl From<FilterStateError> for FilterError {
    fn from(e: FilterStateError) -> Self {
        Self::State(e)
    }
}

impl From<StoreError> for FilterError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// What [`FilterEngine::restore`] found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// No record was stored; defaults apply.
    Defaults,
    /// A valid record was restored.
    Restored,
    /// A record was stored but rejected; it was removed and defaults apply.
    Discarded(FilterStateError),
    /// The store could not be read; defaults apply.
    Unreadable(StoreError),
}

/// Owns the filter state, its persistence, and search debouncing.
pub struct FilterEngine {
    config: FilterConfig,
    store: Box<dyn FilterStore>,
    bounds: FilterBounds,
    state: FilterState,
    debouncer: SearchDebouncer,
}

impl fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEngine")
            .field("config", &self.config)
            .field("bounds", &self.bounds)
            .field("state", &self.state)
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}

impl FilterEngine {
    /// Creates an engine in the default state. Nothing is read from the
    /// store until [`FilterEngine::restore`] is called.
    pub fn new(config: FilterConfig, store: Box<dyn FilterStore>, bounds: FilterBounds) -> Self {
        let debouncer = SearchDebouncer::new(config.search_debounce);
        Self {
            config,
            store,
            bounds,
            state: FilterState::defaults(bounds),
            debouncer,
        }
    }

    /// Loads the persisted record, if any.
    ///
    /// A record that fails validation is removed from the store, and a store
    /// that cannot be read is left alone; either way the defaults stay in
    /// effect.
    pub fn restore(&mut self) -> RestoreOutcome {
        let record = match self.store.get(&self.config.storage_key) {
            Ok(Some(record)) => record,
            Ok(None) => return RestoreOutcome::Defaults,
            Err(e) => {
                tracing::warn!("ignoring persisted filter state: {e}");
                self.state = FilterState::defaults(self.bounds);
                return RestoreOutcome::Unreadable(e);
            }
        };
        match FilterState::from_record(&record) {
            Ok(state) => {
                tracing::debug!("restored filter state");
                self.state = state;
                RestoreOutcome::Restored
            }
            Err(e) => {
                tracing::warn!("discarding persisted filter state: {e}");
                if let Err(remove_err) = self.store.remove(&self.config.storage_key) {
                    tracing::warn!("{remove_err}");
                }
                self.state = FilterState::defaults(self.bounds);
                RestoreOutcome::Discarded(e)
            }
        }
    }

    /// The current state.
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// The year span of the graph the engine was created for.
    pub fn bounds(&self) -> FilterBounds {
        self.bounds
    }

    /// Replaces the whole state and persists it.
    ///
    /// # Errors
    ///
    /// - [`FilterError::State`]: the state is invalid; nothing changed.
    /// - [`FilterError::Store`]: the state was applied but not persisted.
    pub fn update(&mut self, state: FilterState) -> Result<(), FilterError> {
        state.validate()?;
        self.state = state;
        self.persist()?;
        Ok(())
    }

    /// Sets the allowed departments.
    ///
    /// # Errors
    ///
    /// See [`FilterEngine::update`].
    pub fn set_departments(
        &mut self,
        departments: impl IntoIterator<Item = Department>,
    ) -> Result<(), FilterError> {
        let mut next = self.state.clone();
        next.departments = departments.into_iter().collect::<BTreeSet<_>>();
        self.update(next)
    }

    /// Sets the inclusive year range.
    ///
    /// # Errors
    ///
    /// See [`FilterEngine::update`].
    pub fn set_year_range(&mut self, year_min: i32, year_max: i32) -> Result<(), FilterError> {
        let mut next = self.state.clone();
        next.year_min = year_min;
        next.year_max = year_max;
        self.update(next)
    }

    /// Sets the search query immediately, bypassing the debouncer.
    ///
    /// # Errors
    ///
    /// See [`FilterEngine::update`].
    pub fn set_search_query(&mut self, query: impl Into<String>) -> Result<(), FilterError> {
        let mut next = self.state.clone();
        next.search_query = query.into();
        self.update(next)
    }

    /// Turns cycles-only on or off.
    ///
    /// # Errors
    ///
    /// See [`FilterEngine::update`].
    pub fn set_show_cycles_only(&mut self, on: bool) -> Result<(), FilterError> {
        let mut next = self.state.clone();
        next.show_cycles_only = on;
        self.update(next)
    }

    /// Turns labels on or off.
    ///
    /// # Errors
    ///
    /// See [`FilterEngine::update`].
    pub fn set_show_labels(&mut self, on: bool) -> Result<(), FilterError> {
        let mut next = self.state.clone();
        next.show_labels = on;
        self.update(next)
    }

    /// Shows or hides isolated nodes.
    ///
    /// # Errors
    ///
    /// See [`FilterEngine::update`].
    pub fn set_show_isolated(&mut self, on: bool) -> Result<(), FilterError> {
        let mut next = self.state.clone();
        next.show_isolated = on;
        self.update(next)
    }

    /// Feeds one search keystroke to the debouncer.
    pub fn search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.debouncer.input(text, now);
    }

    /// Applies the debounced search query once input has paused.
    ///
    /// Returns `true` when a new query was applied and the caller should
    /// recompute visibility.
    ///
    /// # Errors
    ///
    /// See [`FilterEngine::update`].
    pub fn poll_search(&mut self, now: Instant) -> Result<bool, FilterError> {
        match self.debouncer.poll(now) {
            Some(query) => {
                self.set_search_query(query)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Recomputes visibility of every node and edge under the current state.
    pub fn apply(&self, graph: &mut ReferenceGraph) -> VisibilitySummary {
        let summary = apply_visibility(graph, &self.state);
        tracing::debug!(
            visible = summary.visible_nodes,
            hidden = summary.hidden_nodes,
            dimmed = summary.dimmed_nodes,
            "filters applied"
        );
        summary
    }

    /// Restores the default state and clears the persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record could not be removed; the
    /// in-memory state is reset regardless.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.state = FilterState::defaults(self.bounds);
        self.debouncer.flush();
        self.store.remove(&self.config.storage_key)
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let record = self
            .state
            .to_record()
            .map_err(|e| StoreError::new(e.to_string()))?;
        self.store
            .set(&self.config.storage_key, &record)
            .inspect_err(|e| tracing::warn!("{e}"))
    }
}
