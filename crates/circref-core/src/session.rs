/// One loaded graph and its filter engine, wired together.
///
/// [`Session::load`] runs the whole pipeline once: fetch and parse sources,
/// build and validate the graph, detect cycles, restore the persisted filter
/// state, and apply it. A reload is a new `Session`; nothing carries over
/// except what the [`FilterStore`] persisted.
use serde::Serialize;

use crate::builder::{BuildReport, GraphBuilder};
use crate::config::SessionConfig;
use crate::filter::{
    FilterBounds, FilterEngine, FilterError, FilterState, FilterStore, RestoreOutcome, StoreError,
    VisibilitySummary,
};
use crate::graph::{CycleReport, CycleSummary, GraphSnapshot, GraphStats, ReferenceGraph};
use crate::graph::{annotate_cycles, cycles_for_node};
use crate::loader::{LoadReport, SourceFetcher, SourceManifest, load_sources};

/// Everything [`Session::load`] reports besides the graph itself.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    /// Loaded/total source accounting.
    #[serde(serialize_with = "serialize_load_report")]
    pub load: LoadReport,
    /// Graph construction counts.
    pub build: BuildReport,
    /// What the filter store held at startup.
    #[serde(skip)]
    pub restore: RestoreOutcome,
}

fn serialize_load_report<S: serde::Serializer>(
    report: &LoadReport,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeStruct;
    let failures: Vec<String> = report.failures.iter().map(ToString::to_string).collect();
    let mut s = serializer.serialize_struct("LoadReport", 3)?;
    s.serialize_field("loaded", &report.loaded)?;
    s.serialize_field("total", &report.total)?;
    s.serialize_field("failures", &failures)?;
    s.end()
}

/// A loaded, annotated, and filtered reference graph.
#[derive(Debug)]
pub struct Session {
    graph: ReferenceGraph,
    cycles: CycleReport,
    filter: FilterEngine,
    report: SessionReport,
    visibility: VisibilitySummary,
}

impl Session {
    /// Loads every source in `manifest` and prepares the graph for viewing.
    ///
    /// Failing sources are skipped; check [`SessionReport::load`] for how many
    /// loaded. A persisted filter record that is invalid or unreadable leaves
    /// the defaults in effect; see [`SessionReport::restore`].
    pub fn load(
        fetcher: &dyn SourceFetcher,
        manifest: &SourceManifest,
        config: SessionConfig,
        store: Box<dyn FilterStore>,
    ) -> Self {
        let loaded = load_sources(fetcher, manifest);

        let mut builder = GraphBuilder::new(config.build.clone());
        for (_, doc) in &loaded.primaries {
            builder.add_primary(doc);
        }
        if let Some(cache) = &loaded.cache {
            builder.add_cache(cache);
        }
        let output = builder.finish();

        Self::from_graph(output.graph, output.report, loaded.report, config, store)
    }

    /// Prepares an already built graph: detects cycles, restores and applies
    /// filters.
    pub fn from_graph(
        mut graph: ReferenceGraph,
        build: BuildReport,
        load: LoadReport,
        config: SessionConfig,
        store: Box<dyn FilterStore>,
    ) -> Self {
        let cycles = annotate_cycles(&mut graph, config.build.cycle_ref_type);
        let mut filter = FilterEngine::new(config.filter, store, FilterBounds::from_graph(&graph));
        let restore = filter.restore();
        let visibility = filter.apply(&mut graph);

        Self {
            graph,
            cycles,
            filter,
            report: SessionReport {
                load,
                build,
                restore,
            },
            visibility,
        }
    }

    /// The annotated graph as `{nodes, edges}`.
    pub fn graph(&self) -> GraphSnapshot<'_> {
        self.graph.snapshot()
    }

    /// Direct access to the underlying graph.
    pub fn reference_graph(&self) -> &ReferenceGraph {
        &self.graph
    }

    /// Every detected cycle.
    pub fn cycles(&self) -> &CycleReport {
        &self.cycles
    }

    /// Cycles passing through the node `id`; empty when the node is on none.
    ///
    /// Returns `None` when no node has that id.
    pub fn cycles_for_node(&self, id: &str) -> Option<Vec<CycleSummary>> {
        self.graph.node(id)?;
        Some(cycles_for_node(&self.cycles.cycles, id))
    }

    /// Replaces the filter state, persists it, and recomputes visibility.
    ///
    /// # Errors
    ///
    /// - [`FilterError::State`]: the state is invalid; nothing changed.
    /// - [`FilterError::Store`]: visibility was recomputed but the state
    ///   could not be persisted.
    pub fn apply_filters(&mut self, state: FilterState) -> Result<VisibilitySummary, FilterError> {
        match self.filter.update(state) {
            Err(FilterError::State(e)) => Err(FilterError::State(e)),
            persisted => {
                self.visibility = self.filter.apply(&mut self.graph);
                persisted.map(|()| self.visibility)
            }
        }
    }

    /// Resets every filter to its default, clears the persisted record, and
    /// recomputes visibility.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record could not be removed; visibility
    /// is recomputed regardless.
    pub fn reset_filters(&mut self) -> Result<VisibilitySummary, StoreError> {
        let cleared = self.filter.reset();
        self.visibility = self.filter.apply(&mut self.graph);
        cleared.map(|()| self.visibility)
    }

    /// The filter engine, for incremental setters and debounced search.
    pub fn filters(&self) -> &FilterEngine {
        &self.filter
    }

    /// Mutable access to the filter engine. Call [`Session::refresh`] after
    /// changing state through it.
    pub fn filters_mut(&mut self) -> &mut FilterEngine {
        &mut self.filter
    }

    /// Recomputes visibility under the engine's current state.
    pub fn refresh(&mut self) -> VisibilitySummary {
        self.visibility = self.filter.apply(&mut self.graph);
        self.visibility
    }

    /// The current filter state.
    pub fn filter_state(&self) -> &FilterState {
        self.filter.state()
    }

    /// Counts from the most recent visibility recomputation.
    pub fn visibility(&self) -> VisibilitySummary {
        self.visibility
    }

    /// Aggregate counts over the annotated graph.
    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }

    /// Load, build, and restore reports.
    pub fn report(&self) -> &SessionReport {
        &self.report
    }
}
