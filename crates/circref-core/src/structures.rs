/// `DocumentNode`, `ReferenceEdge`, and `Visibility`: the entity types of the
/// reference graph.
///
/// Both entity types serialize with camelCase keys, which is the shape the
/// external viewer consumes from `getGraph()`. Fields are grouped by writer:
///
/// - identity and descriptive fields are written once by the graph builder;
/// - `in_cycle` / `is_cycle_edge` and `cycle_ids` are written only by cycle
///   detection;
/// - `visibility` / `hidden` are written only by the filter engine.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::enums::{Department, DocumentKind, Provenance, RefType};

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

/// Derived display state of a node.
///
/// `hidden` and `dimmed` are independent: a hidden node may also be dimmed,
/// and a dimmed node is still present in the rendered graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Visibility {
    /// Excluded by at least one filter condition.
    pub hidden: bool,
    /// De-emphasized because it does not match the active search query.
    pub dimmed: bool,
}

// ---------------------------------------------------------------------------
// DocumentNode
// ---------------------------------------------------------------------------

/// A circular, PDF, or web page in the reference graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    /// Stable identifier, unique after deduplication.
    pub id: String,
    /// Display title; may be empty.
    pub title: String,
    /// Issue date as written by the source; may be empty.
    pub date: String,
    /// Issue year, when known.
    pub year: Option<i32>,
    /// Issuing department.
    pub department: Department,
    /// Canonical URL, when known.
    pub url: Option<String>,
    /// Opaque content blocks, passed through unmodified.
    pub content: Vec<serde_json::Value>,
    /// What the node represents.
    pub kind: DocumentKind,
    /// Number of validated edges targeting this node.
    pub reference_count: usize,
    /// Which kind of source the node's data came from.
    pub provenance: Provenance,
    /// `true` when the node lies on at least one detected cycle.
    pub in_cycle: bool,
    /// Ordinals of every cycle this node lies on.
    pub cycle_ids: BTreeSet<usize>,
    /// Filter-derived display state.
    pub visibility: Visibility,
}

impl DocumentNode {
    /// Creates a node with empty descriptive fields and no annotations.
    pub fn new(id: impl Into<String>, kind: DocumentKind, provenance: Provenance) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            date: String::new(),
            year: None,
            department: Department::Other,
            url: None,
            content: Vec::new(),
            kind,
            reference_count: 0,
            provenance,
            in_cycle: false,
            cycle_ids: BTreeSet::new(),
            visibility: Visibility::default(),
        }
    }

    /// Returns `true` if the lowercased `query` is a substring of the
    /// lowercased id or title.
    ///
    /// `query_lowered` must already be lowercase; the filter engine lowers it
    /// once per recomputation rather than once per node.
    pub fn matches_search(&self, query_lowered: &str) -> bool {
        self.id.to_lowercase().contains(query_lowered)
            || self.title.to_lowercase().contains(query_lowered)
    }
}

// ---------------------------------------------------------------------------
// ReferenceEdge
// ---------------------------------------------------------------------------

/// A directed reference from one document to another document, a PDF, or a
/// web page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEdge {
    /// Identifier, unique within the graph.
    pub id: String,
    /// Id of the referencing node.
    pub source: String,
    /// Id of the referenced node.
    pub target: String,
    /// Declared type of the reference.
    pub ref_type: RefType,
    /// Reference text as written in the source; not used for identity.
    pub ref_title: String,
    /// Reference URL, when present; not used for identity.
    pub ref_url: Option<String>,
    /// `true` when the edge lies on at least one detected cycle.
    pub is_cycle_edge: bool,
    /// Ordinals of every cycle this edge lies on.
    pub cycle_ids: BTreeSet<usize>,
    /// `true` when either endpoint is hidden.
    pub hidden: bool,
}

impl ReferenceEdge {
    /// Creates an edge with no annotations.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        ref_type: RefType,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            ref_type,
            ref_title: String::new(),
            ref_url: None,
            is_cycle_edge: false,
            cycle_ids: BTreeSet::new(),
            hidden: false,
        }
    }
}
