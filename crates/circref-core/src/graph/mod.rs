/// The reference graph: a `petgraph` [`StableDiGraph`] of [`DocumentNode`]s
/// and [`ReferenceEdge`]s with O(1) lookup by id.
///
/// Construction normally goes through [`crate::builder::GraphBuilder`], which
/// resolves identities and drops orphan edges before inserting anything.
/// [`ReferenceGraph::from_parts`] builds a graph directly from already
/// resolved nodes and edges and is what tests and benchmarks use.
///
/// # Cycle Detection
///
/// See the [`cycles`] submodule for the iterative DFS that enumerates every
/// cycle in the circular-reference subgraph and annotates the elements lying
/// on one.
pub mod cycles;

pub use cycles::{Cycle, CycleReport, CycleSummary, annotate_cycles, cycles_for_node, find_cycles};

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use serde::Serialize;

use crate::enums::{DocumentKind, RefType};
use crate::structures::{DocumentNode, ReferenceEdge};

/// Errors that can occur when inserting elements into a [`ReferenceGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphBuildError {
    /// Two nodes share the same id.
    ///
    /// The contained string is the duplicate id.
    DuplicateNodeId(String),
    /// Two edges share the same id.
    DuplicateEdgeId(String),
    /// An edge references a `source` or `target` node id that is not present
    /// in the node set.
    DanglingEdgeRef {
        /// The id of the edge that contains the dangling reference.
        edge_id: String,
        /// The node id that could not be resolved.
        missing_node_id: String,
    },
}

impl std::fmt::Display for GraphBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphBuildError::DuplicateNodeId(id) => {
                write!(f, "duplicate node id: {id:?}")
            }
            GraphBuildError::DuplicateEdgeId(id) => {
                write!(f, "duplicate edge id: {id:?}")
            }
            GraphBuildError::DanglingEdgeRef {
                edge_id,
                missing_node_id,
            } => {
                write!(
                    f,
                    "edge {edge_id:?} references unknown node {missing_node_id:?}"
                )
            }
        }
    }
}

impl std::error::Error for GraphBuildError {}

/// A directed multigraph of documents and the references between them.
///
/// Indices remain valid for the lifetime of the graph; the graph is built once
/// per load and never shrinks.
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    graph: StableDiGraph<DocumentNode, ReferenceEdge>,
    id_to_index: HashMap<String, NodeIndex>,
    edge_id_to_index: HashMap<String, EdgeIndex>,
    edges_by_type: HashMap<RefType, Vec<EdgeIndex>>,
}

impl ReferenceGraph {
    /// Creates an empty graph with room for `nodes` nodes and `edges` edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: StableDiGraph::with_capacity(nodes, edges),
            id_to_index: HashMap::with_capacity(nodes),
            edge_id_to_index: HashMap::with_capacity(edges),
            edges_by_type: HashMap::new(),
        }
    }

    /// Builds a graph from resolved nodes and edges and recomputes every
    /// node's `reference_count`.
    ///
    /// # Errors
    ///
    /// - [`GraphBuildError::DuplicateNodeId`]: two nodes share an id.
    /// - [`GraphBuildError::DuplicateEdgeId`]: two edges share an id.
    /// - [`GraphBuildError::DanglingEdgeRef`]: an edge names a node that
    ///   does not exist.
    pub fn from_parts(
        nodes: Vec<DocumentNode>,
        edges: Vec<ReferenceEdge>,
    ) -> Result<Self, GraphBuildError> {
        let mut graph = Self::with_capacity(nodes.len(), edges.len());
        for node in nodes {
            graph.add_node(node)?;
        }
        for edge in edges {
            graph.add_edge(edge)?;
        }
        graph.recompute_reference_counts();
        Ok(graph)
    }

    /// Inserts a node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphBuildError::DuplicateNodeId`] if the id is taken.
    pub fn add_node(&mut self, node: DocumentNode) -> Result<NodeIndex, GraphBuildError> {
        if self.id_to_index.contains_key(&node.id) {
            return Err(GraphBuildError::DuplicateNodeId(node.id));
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.id_to_index.insert(id, idx);
        Ok(idx)
    }

    /// Inserts an edge between two existing nodes.
    ///
    /// Does not update `reference_count`; call
    /// [`ReferenceGraph::recompute_reference_counts`] once all edges are in.
    ///
    /// # Errors
    ///
    /// Returns [`GraphBuildError::DuplicateEdgeId`] if the id is taken, or
    /// [`GraphBuildError::DanglingEdgeRef`] if either endpoint is missing.
    pub fn add_edge(&mut self, edge: ReferenceEdge) -> Result<EdgeIndex, GraphBuildError> {
        if self.edge_id_to_index.contains_key(&edge.id) {
            return Err(GraphBuildError::DuplicateEdgeId(edge.id));
        }
        let source = self.require_node(&edge.id, &edge.source)?;
        let target = self.require_node(&edge.id, &edge.target)?;

        let id = edge.id.clone();
        let ref_type = edge.ref_type;
        let idx = self.graph.add_edge(source, target, edge);
        self.edge_id_to_index.insert(id, idx);
        self.edges_by_type.entry(ref_type).or_default().push(idx);
        Ok(idx)
    }

    fn require_node(&self, edge_id: &str, node_id: &str) -> Result<NodeIndex, GraphBuildError> {
        self.id_to_index
            .get(node_id)
            .copied()
            .ok_or_else(|| GraphBuildError::DanglingEdgeRef {
                edge_id: edge_id.to_owned(),
                missing_node_id: node_id.to_owned(),
            })
    }

    /// Sets every node's `reference_count` to its in-degree.
    pub fn recompute_reference_counts(&mut self) {
        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        for idx in indices {
            let count = self
                .graph
                .edges_directed(idx, Direction::Incoming)
                .count();
            if let Some(node) = self.graph.node_weight_mut(idx) {
                node.reference_count = count;
            }
        }
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Looks up the [`NodeIndex`] for a node id.
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    /// Looks up the [`EdgeIndex`] for an edge id.
    pub fn edge_index(&self, id: &str) -> Option<EdgeIndex> {
        self.edge_id_to_index.get(id).copied()
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: &str) -> Option<&DocumentNode> {
        self.node_index(id).and_then(|idx| self.graph.node_weight(idx))
    }

    /// Returns the edge with the given id.
    pub fn edge(&self, id: &str) -> Option<&ReferenceEdge> {
        self.edge_index(id).and_then(|idx| self.graph.edge_weight(idx))
    }

    /// Returns the node at `idx`.
    pub fn node_weight(&self, idx: NodeIndex) -> Option<&DocumentNode> {
        self.graph.node_weight(idx)
    }

    /// Returns the edge at `idx`.
    pub fn edge_weight(&self, idx: EdgeIndex) -> Option<&ReferenceEdge> {
        self.graph.edge_weight(idx)
    }

    pub(crate) fn node_weight_mut(&mut self, idx: NodeIndex) -> Option<&mut DocumentNode> {
        self.graph.node_weight_mut(idx)
    }

    pub(crate) fn edge_weight_mut(&mut self, idx: EdgeIndex) -> Option<&mut ReferenceEdge> {
        self.graph.edge_weight_mut(idx)
    }

    /// Returns a reference to the underlying [`StableDiGraph`].
    pub fn graph(&self) -> &StableDiGraph<DocumentNode, ReferenceEdge> {
        &self.graph
    }

    /// Returns the [`EdgeIndex`] values for all edges of the given type, in
    /// insertion order.
    pub fn edges_of_type(&self, ref_type: RefType) -> &[EdgeIndex] {
        self.edges_by_type
            .get(&ref_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &DocumentNode> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
    }

    /// Iterates edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &ReferenceEdge> {
        self.graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx))
    }

    /// Total degree (in + out, self-loops counted twice) of the node at `idx`.
    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
            + self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    /// Borrowed `{nodes, edges}` view of the annotated graph.
    pub fn snapshot(&self) -> GraphSnapshot<'_> {
        GraphSnapshot {
            nodes: self.nodes().collect(),
            edges: self.edges().collect(),
        }
    }

    /// Aggregate counts over the annotated graph.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
            ..GraphStats::default()
        };
        let mut cycle_ids: BTreeSet<usize> = BTreeSet::new();

        for node in self.nodes() {
            match node.kind {
                DocumentKind::Circular => stats.circular_nodes += 1,
                DocumentKind::Pdf => stats.pdf_nodes += 1,
                DocumentKind::Web => stats.web_nodes += 1,
            }
            if node.in_cycle {
                stats.nodes_in_cycles_count += 1;
            }
        }
        for edge in self.edges() {
            if edge.is_cycle_edge {
                stats.edges_in_cycles_count += 1;
                cycle_ids.extend(edge.cycle_ids.iter().copied());
            }
        }
        stats.cycle_count = cycle_ids.len();
        stats
    }
}

/// The `{nodes, edges}` shape handed to the viewer.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot<'a> {
    /// Every node, in insertion order.
    pub nodes: Vec<&'a DocumentNode>,
    /// Every edge, in insertion order.
    pub edges: Vec<&'a ReferenceEdge>,
}

/// Aggregate counts over a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    /// Number of nodes.
    pub total_nodes: usize,
    /// Number of edges.
    pub total_edges: usize,
    /// Nodes of kind circular.
    pub circular_nodes: usize,
    /// Nodes of kind pdf.
    pub pdf_nodes: usize,
    /// Nodes of kind web.
    pub web_nodes: usize,
    /// Number of detected cycles.
    pub cycle_count: usize,
    /// Nodes lying on at least one cycle.
    pub nodes_in_cycles_count: usize,
    /// Edges lying on at least one cycle.
    pub edges_in_cycles_count: usize,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::enums::Provenance;

    fn circular(id: &str) -> DocumentNode {
        DocumentNode::new(id, DocumentKind::Circular, Provenance::Authoritative)
    }

    fn edge(id: &str, source: &str, target: &str) -> ReferenceEdge {
        ReferenceEdge::new(id, source, target, RefType::Circular)
    }

    #[test]
    fn empty_graph_builds() {
        let g = ReferenceGraph::from_parts(vec![], vec![]).expect("empty graph");
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.stats(), GraphStats::default());
    }

    #[test]
    fn counts_and_reference_counts() {
        let g = ReferenceGraph::from_parts(
            vec![circular("a"), circular("b"), circular("c")],
            vec![edge("e-0", "a", "b"), edge("e-1", "c", "b"), edge("e-2", "b", "c")],
        )
        .expect("build");
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.node("a").expect("a").reference_count, 0);
        assert_eq!(g.node("b").expect("b").reference_count, 2);
        assert_eq!(g.node("c").expect("c").reference_count, 1);
    }

    #[test]
    fn duplicate_node_id_is_rejected() {
        let err = ReferenceGraph::from_parts(vec![circular("a"), circular("a")], vec![])
            .expect_err("duplicate node");
        assert_eq!(err, GraphBuildError::DuplicateNodeId("a".to_owned()));
    }

    #[test]
    fn duplicate_edge_id_is_rejected() {
        let err = ReferenceGraph::from_parts(
            vec![circular("a"), circular("b")],
            vec![edge("e-0", "a", "b"), edge("e-0", "b", "a")],
        )
        .expect_err("duplicate edge");
        assert_eq!(err, GraphBuildError::DuplicateEdgeId("e-0".to_owned()));
    }

    #[test]
    fn dangling_edge_is_rejected() {
        let err = ReferenceGraph::from_parts(vec![circular("a")], vec![edge("e-0", "a", "ghost")])
            .expect_err("dangling");
        assert_eq!(
            err,
            GraphBuildError::DanglingEdgeRef {
                edge_id: "e-0".to_owned(),
                missing_node_id: "ghost".to_owned(),
            }
        );
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn degree_counts_both_directions() {
        let g = ReferenceGraph::from_parts(
            vec![circular("a"), circular("b"), circular("lonely")],
            vec![edge("e-0", "a", "b"), edge("e-1", "b", "b")],
        )
        .expect("build");
        let a = g.node_index("a").expect("a");
        let b = g.node_index("b").expect("b");
        let lonely = g.node_index("lonely").expect("lonely");
        assert_eq!(g.degree(a), 1);
        assert_eq!(g.degree(b), 3);
        assert_eq!(g.degree(lonely), 0);
    }

    #[test]
    fn edges_are_indexed_by_type() {
        let pdf = DocumentNode::new("pdf-1", DocumentKind::Pdf, Provenance::Authoritative);
        let g = ReferenceGraph::from_parts(
            vec![circular("a"), circular("b"), pdf],
            vec![
                edge("e-0", "a", "b"),
                ReferenceEdge::new("e-1", "a", "pdf-1", RefType::Pdf),
            ],
        )
        .expect("build");
        assert_eq!(g.edges_of_type(RefType::Circular).len(), 1);
        assert_eq!(g.edges_of_type(RefType::Pdf).len(), 1);
        assert!(g.edges_of_type(RefType::Web).is_empty());
    }

    #[test]
    fn snapshot_serializes_nodes_and_edges() {
        let g = ReferenceGraph::from_parts(
            vec![circular("a"), circular("b")],
            vec![edge("e-0", "a", "b")],
        )
        .expect("build");
        let v = serde_json::to_value(g.snapshot()).expect("serialize");
        assert_eq!(v["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(v["edges"][0]["source"], "a");
        assert_eq!(v["nodes"][1]["referenceCount"], 1);
    }

    #[test]
    fn stats_count_kinds_and_serialize_camel_case() {
        let g = ReferenceGraph::from_parts(
            vec![
                circular("a"),
                DocumentNode::new("pdf-1", DocumentKind::Pdf, Provenance::Cache),
                DocumentNode::new("web-1", DocumentKind::Web, Provenance::Cache),
            ],
            vec![],
        )
        .expect("build");
        let stats = g.stats();
        assert_eq!(stats.circular_nodes, 1);
        assert_eq!(stats.pdf_nodes, 1);
        assert_eq!(stats.web_nodes, 1);
        let v = serde_json::to_value(stats).expect("serialize");
        assert_eq!(v["totalNodes"], 3);
        assert_eq!(v["nodesInCyclesCount"], 0);
    }
}
