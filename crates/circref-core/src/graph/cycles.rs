/// Cycle enumeration over the subgraph of one reference type.
///
/// # Algorithm Overview
///
/// A depth-first search starts from every node not yet visited, so that
/// disconnected components are all covered. The search keeps the current
/// path and the position of each on-path node:
///
/// - an edge to an on-path node closes a cycle, made of the path slice from
///   that node to the current one plus the closing edge;
/// - an edge to a node never visited extends the path;
/// - an edge to a node visited earlier but no longer on the path is ignored.
///
/// Nodes are marked visited on entry and never unmarked, so every edge is
/// examined once. A self-loop closes a cycle of length 1.
///
/// The search runs on an explicit stack of `(node, next_child, incoming_edge)`
/// frames; call depth never grows with path length.
use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use serde::Serialize;

use crate::enums::RefType;
use crate::graph::ReferenceGraph;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One detected cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    /// Ordinal assigned in discovery order, starting at 0.
    pub id: usize,
    /// Node ids in traversal order. The closing edge runs from the last node
    /// back to the first.
    pub nodes: Vec<String>,
    /// Edge ids in traversal order; `edges[i]` leaves `nodes[i]`.
    pub edges: Vec<String>,
}

impl Cycle {
    /// Number of nodes (equivalently, edges) on the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; a cycle has at least one node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Result of [`annotate_cycles`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    /// Every detected cycle, ordered by id.
    pub cycles: Vec<Cycle>,
    /// Distinct nodes lying on at least one cycle.
    pub nodes_in_cycles: usize,
    /// Distinct edges lying on at least one cycle.
    pub edges_in_cycles: usize,
}

impl CycleReport {
    /// Number of detected cycles.
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }
}

/// A cycle as seen from one of its nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    /// Ordinal of the cycle.
    pub cycle_id: usize,
    /// Node ids in traversal order.
    pub node_sequence: Vec<String>,
    /// Number of nodes on the cycle.
    pub length: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Enumerates the cycles formed by edges of `ref_type` without touching any
/// annotation.
pub fn find_cycles(graph: &ReferenceGraph, ref_type: RefType) -> Vec<Cycle> {
    resolve_ids(graph, enumerate(graph, ref_type))
}

/// Enumerates the cycles formed by edges of `ref_type` and records
/// membership on every node and edge.
///
/// Any previous cycle annotation is cleared first, so running detection twice
/// yields the same annotations.
pub fn annotate_cycles(graph: &mut ReferenceGraph, ref_type: RefType) -> CycleReport {
    clear_annotations(graph);
    let raw = enumerate(graph, ref_type);

    let mut marked_nodes: HashSet<NodeIndex> = HashSet::new();
    let mut marked_edges: HashSet<EdgeIndex> = HashSet::new();
    for (cycle_id, (nodes, edges)) in raw.iter().enumerate() {
        for &idx in nodes {
            if let Some(node) = graph.node_weight_mut(idx) {
                node.in_cycle = true;
                node.cycle_ids.insert(cycle_id);
            }
            marked_nodes.insert(idx);
        }
        for &idx in edges {
            if let Some(edge) = graph.edge_weight_mut(idx) {
                edge.is_cycle_edge = true;
                edge.cycle_ids.insert(cycle_id);
            }
            marked_edges.insert(idx);
        }
    }

    let report = CycleReport {
        cycles: resolve_ids(graph, raw),
        nodes_in_cycles: marked_nodes.len(),
        edges_in_cycles: marked_edges.len(),
    };
    tracing::info!(
        cycles = report.cycle_count(),
        nodes = report.nodes_in_cycles,
        edges = report.edges_in_cycles,
        "cycle detection complete"
    );
    report
}

/// Returns every cycle that passes through the node `id`, in cycle-id order.
pub fn cycles_for_node(cycles: &[Cycle], id: &str) -> Vec<CycleSummary> {
    cycles
        .iter()
        .filter(|c| c.nodes.iter().any(|n| n == id))
        .map(|c| CycleSummary {
            cycle_id: c.id,
            node_sequence: c.nodes.clone(),
            length: c.len(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

type RawCycle = (Vec<NodeIndex>, Vec<EdgeIndex>);

struct Frame {
    node: NodeIndex,
    next_child: usize,
    incoming: Option<EdgeIndex>,
}

fn resolve_ids(graph: &ReferenceGraph, raw: Vec<RawCycle>) -> Vec<Cycle> {
    raw.into_iter()
        .enumerate()
        .map(|(id, (nodes, edges))| Cycle {
            id,
            nodes: nodes
                .iter()
                .filter_map(|&idx| graph.node_weight(idx).map(|n| n.id.clone()))
                .collect(),
            edges: edges
                .iter()
                .filter_map(|&idx| graph.edge_weight(idx).map(|e| e.id.clone()))
                .collect(),
        })
        .collect()
}

fn clear_annotations(graph: &mut ReferenceGraph) {
    let nodes: Vec<NodeIndex> = graph.graph().node_indices().collect();
    for idx in nodes {
        if let Some(node) = graph.node_weight_mut(idx) {
            node.in_cycle = false;
            node.cycle_ids.clear();
        }
    }
    let edges: Vec<EdgeIndex> = graph.graph().edge_indices().collect();
    for idx in edges {
        if let Some(edge) = graph.edge_weight_mut(idx) {
            edge.is_cycle_edge = false;
            edge.cycle_ids.clear();
        }
    }
}

/// Outgoing edges of `ref_type` per node, in edge insertion order.
fn adjacency(
    graph: &ReferenceGraph,
    ref_type: RefType,
) -> HashMap<NodeIndex, Vec<(EdgeIndex, NodeIndex)>> {
    let g = graph.graph();
    let mut adj: HashMap<NodeIndex, Vec<(EdgeIndex, NodeIndex)>> = HashMap::new();
    for &edge in graph.edges_of_type(ref_type) {
        if let Some((source, target)) = g.edge_endpoints(edge) {
            adj.entry(source).or_default().push((edge, target));
        }
    }
    adj
}

fn enumerate(graph: &ReferenceGraph, ref_type: RefType) -> Vec<RawCycle> {
    let adj = adjacency(graph, ref_type);
    if adj.is_empty() {
        return Vec::new();
    }

    let mut cycles: Vec<RawCycle> = Vec::new();
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut on_path: HashMap<NodeIndex, usize> = HashMap::new();
    let mut path_nodes: Vec<NodeIndex> = Vec::new();
    // path_edges[i] runs from path_nodes[i] to path_nodes[i + 1].
    let mut path_edges: Vec<EdgeIndex> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for start in graph.graph().node_indices() {
        if !adj.contains_key(&start) || !visited.insert(start) {
            continue;
        }
        on_path.insert(start, 0);
        path_nodes.push(start);
        stack.push(Frame {
            node: start,
            next_child: 0,
            incoming: None,
        });

        while let Some(frame) = stack.last_mut() {
            let step = adj
                .get(&frame.node)
                .and_then(|children| children.get(frame.next_child))
                .copied();

            let Some((edge, child)) = step else {
                let node = frame.node;
                let incoming = frame.incoming;
                stack.pop();
                on_path.remove(&node);
                path_nodes.pop();
                if incoming.is_some() {
                    path_edges.pop();
                }
                continue;
            };
            frame.next_child += 1;

            if let Some(&pos) = on_path.get(&child) {
                let nodes = path_nodes.get(pos..).map(<[_]>::to_vec).unwrap_or_default();
                let mut edges = path_edges.get(pos..).map(<[_]>::to_vec).unwrap_or_default();
                edges.push(edge);
                cycles.push((nodes, edges));
            } else if visited.insert(child) {
                on_path.insert(child, path_nodes.len());
                path_nodes.push(child);
                path_edges.push(edge);
                stack.push(Frame {
                    node: child,
                    next_child: 0,
                    incoming: Some(edge),
                });
            }
        }
    }

    cycles
}
