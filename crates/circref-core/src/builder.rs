/// Graph construction from loaded primary and cache sources.
///
/// A [`GraphBuilder`] is created fresh for every load and owns all of its
/// registries; nothing is shared between builds. Construction has two phases:
///
/// 1. **Extraction**: [`GraphBuilder::add_primary`] and
///    [`GraphBuilder::add_cache`] turn every record into a node and every
///    reference into a pending edge. Records that resolve to an id already
///    seen are merged field by field (see [`crate::merge`]). Nested
///    references are walked with an explicit work stack, down to
///    [`BuildConfig::max_depth`].
/// 2. **Validation**: [`GraphBuilder::finish`] resolves each pending edge's
///    endpoints (literal id first, then the normalized-title table), drops
///    edges that do not resolve as orphans, collapses edges that a later
///    record re-lists for an owner already extracted from another record,
///    and recomputes every node's `reference_count`. References listed
///    within one record always stay separate edges.
///
/// Primaries should be added before the cache: a cache entry whose key
/// resolves to an already registered document merges into it instead of
/// creating a second node.
use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::config::BuildConfig;
use crate::doc_id::derive_document_id;
use crate::enums::{Department, DocumentKind, Provenance, RefType};
use crate::graph::ReferenceGraph;
use crate::merge::merge_documents;
use crate::normalize::{normalize_title, parse_reference, registration_keys};
use crate::source::{
    CacheDocument, CacheEntry, CircularEntry, PrimaryDocument, RawReference, content_blocks,
    nested_references,
};
use crate::structures::{DocumentNode, ReferenceEdge};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Counts describing one build. Every non-fatal anomaly ends up here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    /// Nodes in the finished graph.
    pub nodes: usize,
    /// Edges in the finished graph.
    pub edges: usize,
    /// Edges dropped because an endpoint did not resolve.
    pub orphan_edges: usize,
    /// Edges dropped because a different record already produced an edge
    /// with the same resolved `(source, target, ref_type)`.
    pub duplicate_edges: usize,
    /// Records merged into a node that already existed.
    pub merged_nodes: usize,
    /// Normalized keys that already pointed at a different document when a
    /// second document tried to register them. The first registration wins.
    pub title_collisions: usize,
    /// Malformed records skipped during extraction.
    pub skipped_records: usize,
    /// References skipped because their declared type is unknown.
    pub skipped_references: usize,
}

/// A finished graph with its build report.
#[derive(Debug)]
pub struct BuildOutput {
    /// The validated graph, without cycle or visibility annotations.
    pub graph: ReferenceGraph,
    /// What happened during the build.
    pub report: BuildReport,
}

// ---------------------------------------------------------------------------
// Internal bookkeeping
// ---------------------------------------------------------------------------

/// One end of an edge that has not been validated yet.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    /// A node created by this builder.
    Id(String),
    /// Reference text still to be resolved against the title table.
    Title(String),
}

#[derive(Debug)]
struct PendingEdge {
    source: Endpoint,
    target: Endpoint,
    ref_type: RefType,
    ref_title: String,
    ref_url: Option<String>,
    record: usize,
}

/// A list of references still to be extracted, with the context shared by
/// all of them.
struct WorkItem<'a> {
    owner: Endpoint,
    references: &'a [Value],
    depth: usize,
    department: Department,
    provenance: Provenance,
    record: usize,
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Accumulates nodes and pending edges across sources, then validates them
/// into a [`ReferenceGraph`].
#[derive(Debug)]
pub struct GraphBuilder {
    config: BuildConfig,
    nodes: Vec<DocumentNode>,
    node_index: HashMap<String, usize>,
    title_index: HashMap<String, String>,
    pending: Vec<PendingEdge>,
    records: usize,
    report: BuildReport,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            node_index: HashMap::new(),
            title_index: HashMap::new(),
            pending: Vec::new(),
            records: 0,
            report: BuildReport::default(),
        }
    }

    /// Extracts every circular and circular letter of a primary document.
    ///
    /// A year bucket that is not an object is skipped and counted; its
    /// siblings are still extracted.
    pub fn add_primary(&mut self, doc: &PrimaryDocument) {
        for (year_label, bucket) in doc.buckets() {
            let bucket = match bucket {
                Ok(bucket) => bucket,
                Err(e) => {
                    tracing::warn!(year = year_label, "skipping malformed year: {e}");
                    self.report.skipped_records += 1;
                    continue;
                }
            };
            for raw in bucket.entries() {
                self.add_entry(doc.department.as_deref(), year_label, raw);
            }
        }
    }

    fn add_entry(&mut self, department_label: Option<&str>, year_label: &str, raw: &Value) {
        let entry = match CircularEntry::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(year = year_label, "skipping malformed entry: {e}");
                self.report.skipped_records += 1;
                return;
            }
        };

        let year = year_label.trim().parse::<i32>().ok().or_else(|| {
            entry
                .id
                .as_deref()
                .and_then(parse_reference)
                .and_then(|p| p.year)
        });
        let department = resolve_department(
            department_label,
            year,
            entry.url.as_deref(),
            entry.id.as_deref().or(entry.title.as_deref()),
        );

        let Some((id, registrable)) = self.assign_id(
            DocumentKind::Circular,
            entry.id.clone(),
            entry.url.as_deref(),
            entry.title.as_deref(),
        ) else {
            return;
        };

        let mut node = DocumentNode::new(id.clone(), DocumentKind::Circular, Provenance::Authoritative);
        node.title = entry.title.unwrap_or_default();
        node.date = entry.date.unwrap_or_default();
        node.year = year;
        node.department = department;
        node.url = entry.url;
        node.content = entry.content;

        if registrable {
            self.register(&id, &node.title, node.year);
        }
        self.insert_node(node);
        let record = self.next_record();
        self.extract_references(WorkItem {
            owner: Endpoint::Id(id),
            references: &entry.references,
            depth: 1,
            department,
            provenance: Provenance::Authoritative,
            record,
        });
    }

    /// Extracts every entry of the content cache.
    ///
    /// A cache key is reference text. When it resolves to a document already
    /// registered, the entry backfills that document; otherwise the key
    /// becomes the new document's id.
    pub fn add_cache(&mut self, cache: &CacheDocument) {
        for (key, raw) in &cache.entries {
            let entry = match CacheEntry::from_value(raw) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(key = key.as_str(), "skipping malformed cache entry: {e}");
                    self.report.skipped_records += 1;
                    continue;
                }
            };

            let parsed = parse_reference(key);
            let year = parsed.as_ref().and_then(|p| p.year);
            let department = resolve_department(
                parsed.as_ref().map(|p| p.department_token.as_str()),
                year,
                entry.url.as_deref(),
                None,
            );

            let known = self.resolve(&Endpoint::Title(key.clone()));
            let Some((id, registrable)) = (match known {
                Some(id) => Some((id, false)),
                None => self.assign_id(
                    DocumentKind::Circular,
                    Some(key.trim().to_owned()).filter(|k| !k.is_empty()),
                    entry.url.as_deref(),
                    entry.title.as_deref(),
                ),
            }) else {
                continue;
            };

            let mut node = DocumentNode::new(id.clone(), DocumentKind::Circular, Provenance::Cache);
            node.title = entry.title.unwrap_or_else(|| key.trim().to_owned());
            node.year = year;
            node.department = department;
            node.url = entry.url;
            node.content = entry.content;

            if registrable {
                self.register(&id, &node.title, node.year);
            }
            self.insert_node(node);
            let record = self.next_record();
            self.extract_references(WorkItem {
                owner: Endpoint::Id(id),
                references: &entry.references,
                depth: 1,
                department,
                provenance: Provenance::Cache,
                record,
            });
        }
    }

    /// Validates every pending edge and produces the graph.
    pub fn finish(self) -> BuildOutput {
        let mut report = self.report;
        let mut graph = ReferenceGraph::with_capacity(self.nodes.len(), self.pending.len());

        for node in self.nodes {
            if let Err(e) = graph.add_node(node) {
                tracing::warn!("{e}");
            }
        }

        let mut first_record: HashMap<(String, String, RefType), usize> =
            HashMap::with_capacity(self.pending.len());
        for pending in &self.pending {
            let source = resolve_in(&self.node_index, &self.title_index, &pending.source);
            let target = resolve_in(&self.node_index, &self.title_index, &pending.target);
            let (Some(source), Some(target)) = (source, target) else {
                tracing::debug!(
                    source = ?pending.source,
                    target = ?pending.target,
                    "dropping orphan edge"
                );
                report.orphan_edges += 1;
                continue;
            };

            let record = *first_record
                .entry((source.clone(), target.clone(), pending.ref_type))
                .or_insert(pending.record);
            if record != pending.record {
                report.duplicate_edges += 1;
                continue;
            }

            let mut edge = ReferenceEdge::new(
                format!("e-{}", graph.edge_count()),
                source,
                target,
                pending.ref_type,
            );
            edge.ref_title.clone_from(&pending.ref_title);
            edge.ref_url.clone_from(&pending.ref_url);
            if let Err(e) = graph.add_edge(edge) {
                tracing::warn!("{e}");
                report.orphan_edges += 1;
            }
        }

        graph.recompute_reference_counts();
        report.nodes = graph.node_count();
        report.edges = graph.edge_count();
        tracing::info!(
            nodes = report.nodes,
            edges = report.edges,
            orphans = report.orphan_edges,
            duplicates = report.duplicate_edges,
            merged = report.merged_nodes,
            "graph built"
        );
        BuildOutput { graph, report }
    }

    // -- extraction ---------------------------------------------------------

    fn extract_references(&mut self, root: WorkItem<'_>) {
        let mut stack = vec![root];

        while let Some(item) = stack.pop() {
            if item.depth > self.config.max_depth {
                continue;
            }

            for raw in item.references {
                let reference = match RawReference::from_value(raw) {
                    Ok(reference) => reference,
                    Err(e) => {
                        tracing::warn!("skipping malformed reference: {e}");
                        self.report.skipped_records += 1;
                        continue;
                    }
                };
                let Some(ref_type) = reference.ref_type.as_deref().and_then(RefType::parse) else {
                    tracing::debug!(ref_type = ?reference.ref_type, "skipping reference of unknown type");
                    self.report.skipped_references += 1;
                    continue;
                };
                if let Some(error) = &reference.error {
                    tracing::debug!(title = ?reference.title, "reference carries extraction error: {error}");
                }

                match ref_type {
                    RefType::Circular => {
                        let Some(title) = reference.title.clone().or_else(|| reference.url.clone())
                        else {
                            self.report.skipped_records += 1;
                            continue;
                        };
                        self.pending.push(PendingEdge {
                            source: item.owner.clone(),
                            target: Endpoint::Title(title.clone()),
                            ref_type,
                            ref_title: title.clone(),
                            ref_url: reference.url.clone(),
                            record: item.record,
                        });

                        let nested = nested_references(raw);
                        if !nested.is_empty() {
                            let department = parse_reference(&title)
                                .map(|p| p.department())
                                .filter(|d| *d != Department::Other)
                                .unwrap_or(item.department);
                            stack.push(WorkItem {
                                owner: Endpoint::Title(title),
                                references: nested,
                                depth: item.depth + 1,
                                department,
                                provenance: item.provenance,
                                record: item.record,
                            });
                        }
                    }
                    RefType::Pdf | RefType::Web => {
                        let kind = if ref_type == RefType::Pdf {
                            DocumentKind::Pdf
                        } else {
                            DocumentKind::Web
                        };
                        let Some((id, _)) = self.assign_id(
                            kind,
                            None,
                            reference.url.as_deref(),
                            reference.title.as_deref(),
                        ) else {
                            continue;
                        };

                        let mut node = DocumentNode::new(id.clone(), kind, item.provenance);
                        node.title = reference.title.clone().unwrap_or_default();
                        node.department = item.department;
                        node.url.clone_from(&reference.url);
                        node.content = content_blocks(raw).to_vec();
                        self.insert_node(node);

                        self.pending.push(PendingEdge {
                            source: item.owner.clone(),
                            target: Endpoint::Id(id.clone()),
                            ref_type,
                            ref_title: reference.title.clone().unwrap_or_default(),
                            ref_url: reference.url.clone(),
                            record: item.record,
                        });

                        let nested = nested_references(raw);
                        if kind == DocumentKind::Pdf && !nested.is_empty() {
                            stack.push(WorkItem {
                                owner: Endpoint::Id(id),
                                references: nested,
                                depth: item.depth + 1,
                                department: item.department,
                                provenance: item.provenance,
                                record: item.record,
                            });
                        }
                    }
                }
            }
        }
    }

    fn next_record(&mut self) -> usize {
        self.records += 1;
        self.records
    }

    // -- identity -----------------------------------------------------------

    /// Picks the id for a record: its own id if present, else a synthetic
    /// one. Returns the id and whether it may be registered for matching.
    fn assign_id(
        &mut self,
        kind: DocumentKind,
        id: Option<String>,
        url: Option<&str>,
        title: Option<&str>,
    ) -> Option<(String, bool)> {
        if let Some(id) = id {
            return Some((id, true));
        }
        match derive_document_id(kind, url, title) {
            Ok(derived) => Some((derived.value, !derived.random)),
            Err(e) => {
                tracing::warn!(kind = kind.as_str(), "skipping record without id: {e}");
                self.report.skipped_records += 1;
                None
            }
        }
    }

    fn register(&mut self, id: &str, title: &str, year: Option<i32>) {
        for key in registration_keys(id, title, year) {
            match self.title_index.get(&key) {
                Some(existing) if existing != id => {
                    tracing::debug!(
                        key = key.as_str(),
                        kept = existing.as_str(),
                        ignored = id,
                        "normalized title collision"
                    );
                    self.report.title_collisions += 1;
                }
                Some(_) => {}
                None => {
                    self.title_index.insert(key, id.to_owned());
                }
            }
        }
    }

    fn insert_node(&mut self, node: DocumentNode) {
        match self.node_index.get(&node.id) {
            Some(&i) => {
                let Some(slot) = self.nodes.get_mut(i) else {
                    return;
                };
                let placeholder = DocumentNode::new(String::new(), node.kind, node.provenance);
                let existing = std::mem::replace(slot, placeholder);
                tracing::debug!(id = existing.id.as_str(), "merging duplicate record");
                *slot = merge_documents(existing, node);
                self.report.merged_nodes += 1;
            }
            None => {
                self.node_index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    fn resolve(&self, endpoint: &Endpoint) -> Option<String> {
        resolve_in(&self.node_index, &self.title_index, endpoint)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(BuildConfig::default())
    }
}

/// Builds a graph from a set of primary documents and an optional cache.
pub fn build_graph(
    primaries: &[PrimaryDocument],
    cache: Option<&CacheDocument>,
    config: BuildConfig,
) -> BuildOutput {
    let mut builder = GraphBuilder::new(config);
    for doc in primaries {
        builder.add_primary(doc);
    }
    if let Some(cache) = cache {
        builder.add_cache(cache);
    }
    builder.finish()
}

fn resolve_in(
    node_index: &HashMap<String, usize>,
    title_index: &HashMap<String, String>,
    endpoint: &Endpoint,
) -> Option<String> {
    match endpoint {
        Endpoint::Id(id) => node_index.contains_key(id).then(|| id.clone()),
        Endpoint::Title(text) => {
            let literal = text.trim();
            if node_index.contains_key(literal) {
                return Some(literal.to_owned());
            }
            let key = normalize_title(text);
            if key.is_empty() {
                return None;
            }
            title_index.get(&key).cloned()
        }
    }
}

/// Resolves a department from, in order: the declared department name, the
/// URL path, and the department token of a reference-shaped id or title.
fn resolve_department(
    declared: Option<&str>,
    year: Option<i32>,
    url: Option<&str>,
    reference_text: Option<&str>,
) -> Department {
    declared
        .map(|d| Department::resolve(d, year))
        .filter(|d| *d != Department::Other)
        .or_else(|| url.and_then(Department::from_url))
        .or_else(|| {
            reference_text
                .and_then(parse_reference)
                .map(|p| p.department())
                .filter(|d| *d != Department::Other)
        })
        .unwrap_or(Department::Other)
}

#[cfg(test)]
mod tests;
