#![allow(clippy::expect_used)]

use serde_json::{Value, json};

use super::*;

fn primary(value: Value) -> PrimaryDocument {
    serde_json::from_value(value).expect("primary document")
}

fn cache(value: Value) -> CacheDocument {
    serde_json::from_value(value).expect("cache document")
}

fn build(primaries: &[PrimaryDocument], cache: Option<&CacheDocument>) -> BuildOutput {
    build_graph(primaries, cache, BuildConfig::default())
}

fn bprd_2014() -> PrimaryDocument {
    primary(json!({
        "department": "BPRD",
        "years": {
            "2014": {
                "circulars": [
                    {
                        "ID": "BPRD Circular No. 01",
                        "title": "Prudential Regulations for Corporate Banking",
                        "date": "January 29, 2014",
                        "url": "https://www.sbp.org.pk/bprd/2014/C1.htm",
                        "references": [
                            {"type": "circular", "title": "BPRD Circular No. 2 of 2014"},
                            {"type": "pdf", "title": "Annexure A", "url": "https://www.sbp.org.pk/bprd/2014/C1-Annex-A.pdf"},
                            {"type": "web", "title": "SBP home", "url": "https://www.sbp.org.pk"}
                        ]
                    },
                    {
                        "ID": "BPRD Circular No. 02",
                        "title": "Amendments",
                        "references": [
                            {"type": "circular", "title": "BPRD Circular No. 1 dated January 29, 2014"}
                        ]
                    }
                ],
                "circular_letters": [
                    {"ID": "BPRD Circular Letter No. 03", "title": "Clarification"}
                ]
            }
        }
    }))
}

#[test]
fn primary_entries_become_nodes() {
    let out = build(&[bprd_2014()], None);
    let g = &out.graph;
    let c1 = g.node("BPRD Circular No. 01").expect("circular 1");
    assert_eq!(c1.year, Some(2014));
    assert_eq!(c1.department, Department::Bprd);
    assert_eq!(c1.date, "January 29, 2014");
    assert_eq!(c1.kind, DocumentKind::Circular);
    assert_eq!(c1.provenance, Provenance::Authoritative);
    assert!(g.node("BPRD Circular Letter No. 03").is_some());
    assert_eq!(out.report.nodes, 5);
}

#[test]
fn circular_references_resolve_through_normalized_titles() {
    let out = build(&[bprd_2014()], None);
    let g = &out.graph;
    let circular_edges: Vec<_> = g.edges().filter(|e| e.ref_type == RefType::Circular).collect();
    assert_eq!(circular_edges.len(), 2);
    assert!(circular_edges.iter().any(|e| e.source == "BPRD Circular No. 01"
        && e.target == "BPRD Circular No. 02"
        && e.ref_title == "BPRD Circular No. 2 of 2014"));
    assert!(circular_edges
        .iter()
        .any(|e| e.source == "BPRD Circular No. 02" && e.target == "BPRD Circular No. 01"));
    assert_eq!(out.report.orphan_edges, 0);
    assert_eq!(g.node("BPRD Circular No. 01").expect("c1").reference_count, 1);
}

#[test]
fn pdf_and_web_references_create_nodes() {
    let out = build(&[bprd_2014()], None);
    let g = &out.graph;
    let pdf = g.nodes().find(|n| n.kind == DocumentKind::Pdf).expect("pdf node");
    assert!(pdf.id.starts_with("pdf-"));
    assert_eq!(pdf.title, "Annexure A");
    assert_eq!(pdf.department, Department::Bprd);
    assert_eq!(pdf.year, None);
    assert_eq!(pdf.reference_count, 1);

    let web = g.nodes().find(|n| n.kind == DocumentKind::Web).expect("web node");
    assert!(web.id.starts_with("web-"));
    assert_eq!(web.url.as_deref(), Some("https://www.sbp.org.pk"));
}

#[test]
fn orphan_edges_are_dropped_and_counted() {
    let doc = primary(json!({
        "department": "ACD",
        "years": {"2010": {"circulars": [{
            "ID": "AC&MFD Circular No. 04",
            "references": [
                {"type": "circular", "title": "AC&MFD Circular No. 99 of 1990"},
                {"type": "circular", "title": "Some unknown notification"},
                {"type": "web", "title": "site", "url": "https://example.org"}
            ]
        }]}}
    }));
    let out = build(&[doc], None);
    assert_eq!(out.report.orphan_edges, 2);
    assert_eq!(out.report.edges, 1);
    assert_eq!(out.graph.edge_count(), 1);
    for edge in out.graph.edges() {
        assert!(out.graph.node(&edge.source).is_some());
        assert!(out.graph.node(&edge.target).is_some());
    }
}

#[test]
fn unknown_reference_types_are_skipped_and_counted() {
    let doc = primary(json!({
        "department": "BPRD",
        "years": {"2014": {"circulars": [{
            "ID": "BPRD Circular No. 07",
            "references": [
                {"type": "email", "title": "x"},
                {"title": "no type"},
                {"type": "pdf", "title": "ok"}
            ]
        }]}}
    }));
    let out = build(&[doc], None);
    assert_eq!(out.report.skipped_references, 2);
    assert_eq!(out.report.edges, 1);
}

#[test]
fn malformed_records_do_not_abort_the_build() {
    let doc = primary(json!({
        "department": "BPRD",
        "years": {"2014": {"circulars": [
            "not an object",
            {"ID": "BPRD Circular No. 08", "references": [42, {"type": "pdf", "title": "p"}]}
        ]}}
    }));
    let out = build(&[doc], None);
    assert_eq!(out.report.skipped_records, 2);
    assert!(out.graph.node("BPRD Circular No. 08").is_some());
    assert_eq!(out.report.edges, 1);
}

#[test]
fn malformed_year_bucket_skips_only_that_year() {
    let doc = primary(json!({
        "department": "BPRD",
        "years": {
            "2014": {"circulars": [{"ID": "BPRD Circular No. 01"}]},
            "2015": "garbage",
            "2016": [1, 2]
        }
    }));
    let out = build(&[doc], None);
    assert_eq!(out.report.skipped_records, 2);
    assert_eq!(out.graph.node_count(), 1);
    assert!(out.graph.node("BPRD Circular No. 01").is_some());
}

#[test]
fn nested_circular_references_originate_from_the_referenced_circular() {
    let doc = primary(json!({
        "department": "BPRD",
        "years": {"2014": {"circulars": [
            {
                "ID": "BPRD Circular No. 01",
                "references": [{
                    "type": "circular",
                    "title": "BPRD Circular No. 2 of 2014",
                    "content": {"references": [
                        {"type": "circular", "title": "BPRD Circular No. 3 of 2014"},
                        {"type": "web", "title": "nested site", "url": "https://example.org/n"}
                    ]}
                }]
            },
            {"ID": "BPRD Circular No. 02"},
            {"ID": "BPRD Circular No. 03"}
        ]}}
    }));
    let out = build(&[doc], None);
    let g = &out.graph;
    assert!(g
        .edges()
        .any(|e| e.source == "BPRD Circular No. 02" && e.target == "BPRD Circular No. 03"));
    let web = g.nodes().find(|n| n.kind == DocumentKind::Web).expect("nested web node");
    assert!(g.edges().any(|e| e.source == "BPRD Circular No. 02" && e.target == web.id));
}

#[test]
fn pdf_references_are_descended_but_web_references_are_not() {
    let doc = primary(json!({
        "department": "BPRD",
        "years": {"2014": {"circulars": [
            {
                "ID": "BPRD Circular No. 01",
                "references": [
                    {
                        "type": "pdf",
                        "title": "Annex",
                        "url": "https://x/annex.pdf",
                        "content": {"references": [{"type": "circular", "title": "BPRD Circular No. 02"}]}
                    },
                    {
                        "type": "web",
                        "title": "Page",
                        "url": "https://x/page",
                        "content": {"references": [{"type": "circular", "title": "BPRD Circular No. 02"}]}
                    }
                ]
            },
            {"ID": "BPRD Circular No. 02"}
        ]}}
    }));
    let out = build(&[doc], None);
    let g = &out.graph;
    let pdf = g.nodes().find(|n| n.kind == DocumentKind::Pdf).expect("pdf");
    assert!(g.edges().any(|e| e.source == pdf.id && e.target == "BPRD Circular No. 02"));
    let web = g.nodes().find(|n| n.kind == DocumentKind::Web).expect("web");
    assert!(!g.edges().any(|e| e.source == web.id));
    assert_eq!(g.node("BPRD Circular No. 02").expect("c2").reference_count, 1);
}

fn nested_chain(levels: usize) -> Value {
    let mut reference = json!({"type": "pdf", "title": format!("level {levels}")});
    for level in (1..levels).rev() {
        reference = json!({
            "type": "pdf",
            "title": format!("level {level}"),
            "content": {"references": [reference]}
        });
    }
    json!({
        "department": "BPRD",
        "years": {"2014": {"circulars": [{"ID": "root", "references": [reference]}]}}
    })
}

#[test]
fn references_beyond_the_depth_cap_are_not_extracted() {
    let doc = primary(nested_chain(15));
    let out = build(&[doc], None);
    assert_eq!(out.report.nodes, 1 + 10);
    assert_eq!(out.report.edges, 10);

    let shallow = build_graph(
        &[primary(nested_chain(15))],
        None,
        BuildConfig {
            max_depth: 2,
            ..BuildConfig::default()
        },
    );
    assert_eq!(shallow.report.nodes, 3);
}

#[test]
fn raised_depth_cap_extracts_long_chains() {
    let doc = primary(nested_chain(200));
    let out = build_graph(
        &[doc],
        None,
        BuildConfig {
            max_depth: 1_000,
            ..BuildConfig::default()
        },
    );
    assert_eq!(out.report.nodes, 201);
}

#[test]
fn cache_backfills_the_authoritative_record() {
    let doc = primary(json!({
        "department": "BPRD",
        "years": {"2012": {"circulars": [{
            "ID": "BPRD Circular No. 03",
            "title": "Primary title"
        }]}}
    }));
    let cached = cache(json!({
        "BPRD Circular No. 3 of 2012": {
            "content": {
                "content": [{"type": "text", "text": "body"}],
                "references": [{"type": "web", "title": "w", "url": "https://w"}]
            },
            "url": "https://www.sbp.org.pk/bprd/2012/C3.htm",
            "extracted_at": "2025-01-01T00:00:00"
        }
    }));
    let out = build(&[doc], Some(&cached));
    let g = &out.graph;
    assert_eq!(g.nodes().filter(|n| n.kind == DocumentKind::Circular).count(), 1);
    let node = g.node("BPRD Circular No. 03").expect("merged node");
    assert_eq!(node.title, "Primary title");
    assert_eq!(node.provenance, Provenance::Authoritative);
    assert_eq!(node.content.len(), 1);
    assert_eq!(node.url.as_deref(), Some("https://www.sbp.org.pk/bprd/2012/C3.htm"));
    assert_eq!(out.report.merged_nodes, 1);
    assert!(g.edges().any(|e| e.source == "BPRD Circular No. 03"));
}

#[test]
fn cache_only_documents_get_cache_provenance() {
    let cached = cache(json!({
        "BSD Circular No. 7 of 2004": {"content": {"content": [], "references": []}}
    }));
    let out = build(&[], Some(&cached));
    let node = out.graph.node("BSD Circular No. 7 of 2004").expect("cache node");
    assert_eq!(node.provenance, Provenance::Cache);
    assert_eq!(node.department, Department::Bsd);
    assert_eq!(node.year, Some(2004));
}

#[test]
fn overlapping_sources_collapse_duplicate_edges() {
    let doc = bprd_2014();
    let once = build(std::slice::from_ref(&doc), None);
    let twice = build(&[doc.clone(), doc], None);
    assert_eq!(once.report.nodes, twice.report.nodes);
    assert_eq!(once.report.edges, twice.report.edges);
    assert_eq!(twice.report.duplicate_edges, once.report.edges);
    assert_eq!(twice.report.merged_nodes, once.report.nodes);
}

#[test]
fn references_within_one_record_stay_separate_edges() {
    let doc = primary(json!({
        "department": "BPRD",
        "years": {"2014": {"circulars": [
            {"ID": "BPRD Circular No. 01", "references": [
                {"type": "circular", "title": "BPRD Circular No. 2 of 2014"},
                {"type": "circular", "title": "BPRD Circular No. 02"},
                {"type": "circular", "title": "BPRD Circular No. 9 of 1999"}
            ]},
            {"ID": "BPRD Circular No. 02", "title": "Two"}
        ]}}
    }));
    let out = build(&[doc], None);
    assert_eq!(out.report.orphan_edges, 1);
    assert_eq!(out.report.duplicate_edges, 0);
    assert_eq!(out.graph.edge_count(), 2);
    let target = out.graph.node("BPRD Circular No. 02").expect("target");
    assert_eq!(target.reference_count, 2);
}

#[test]
fn cache_relisting_a_primary_reference_is_a_duplicate() {
    let doc = primary(json!({
        "department": "BPRD",
        "years": {"2014": {"circulars": [
            {"ID": "BPRD Circular No. 01", "references": [
                {"type": "circular", "title": "BPRD Circular No. 2 of 2014"}
            ]},
            {"ID": "BPRD Circular No. 02"}
        ]}}
    }));
    let cached = cache(json!({
        "BPRD Circular No. 1 of 2014": {"content": {"content": [], "references": [
            {"type": "circular", "title": "BPRD Circular No. 02"}
        ]}}
    }));
    let out = build(&[doc], Some(&cached));
    assert_eq!(out.report.merged_nodes, 1);
    assert_eq!(out.report.duplicate_edges, 1);
    assert_eq!(out.graph.edge_count(), 1);
}

#[test]
fn title_collisions_keep_the_first_registration() {
    let doc = primary(json!({
        "department": "BPRD",
        "years": {"2014": {"circulars": [
            {"ID": "first", "title": "Shared Title"},
            {"ID": "second", "title": "shared   title"},
            {"ID": "third", "references": [{"type": "circular", "title": "SHARED TITLE"}]}
        ]}}
    }));
    let out = build(&[doc], None);
    assert_eq!(out.report.title_collisions, 1);
    assert!(out
        .graph
        .edges()
        .any(|e| e.source == "third" && e.target == "first"));
}

#[test]
fn records_without_any_identity_get_unregistered_random_ids() {
    let doc = primary(json!({
        "department": "ACD",
        "years": {"2011": {"circulars": [
            {"date": "2011-02-01"},
            {"ID": "ACD Circular No. 1", "references": [{"type": "circular", "title": "doc-rand"}]}
        ]}}
    }));
    let out = build(&[doc], None);
    let random = out
        .graph
        .nodes()
        .find(|n| n.id.starts_with("doc-rand-"))
        .expect("random id node");
    assert_eq!(random.department, Department::Acd);
    assert_eq!(out.report.orphan_edges, 1);
}

#[test]
fn references_with_error_markers_are_still_extracted() {
    let doc = primary(json!({
        "department": "BPRD",
        "years": {"2014": {"circulars": [
            {"ID": "BPRD Circular No. 01", "references": [
                {"type": "circular", "title": "BPRD Circular No. 02", "error": "fetch failed"}
            ]},
            {"ID": "BPRD Circular No. 02"}
        ]}}
    }));
    let out = build(&[doc], None);
    assert_eq!(out.report.edges, 1);
}

#[test]
fn historical_department_names_resolve_by_year() {
    let doc = primary(json!({
        "department": "BPD",
        "years": {
            "2005": {"circulars": [{"ID": "BPD Circular No. 1"}]},
            "2008": {"circulars": [{"ID": "BPRD Circular No. 1"}]}
        }
    }));
    let out = build(&[doc], None);
    assert_eq!(out.graph.node("BPD Circular No. 1").expect("old").department, Department::Bpd);
    assert_eq!(out.graph.node("BPRD Circular No. 1").expect("new").department, Department::Bprd);
}

#[test]
fn self_references_are_kept() {
    let doc = primary(json!({
        "department": "BPRD",
        "years": {"2014": {"circulars": [{
            "ID": "BPRD Circular No. 05",
            "references": [{"type": "circular", "title": "BPRD Circular No. 5"}]
        }]}}
    }));
    let out = build(&[doc], None);
    let edge = out.graph.edges().next().expect("self edge");
    assert_eq!(edge.source, edge.target);
    assert_eq!(out.graph.node("BPRD Circular No. 05").expect("n").reference_count, 1);
}
