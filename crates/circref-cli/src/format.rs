/// Output formatting shared by the subcommands.
///
/// - **JSON mode**: one pretty-printed JSON object per command, camelCase
///   keys throughout, newline-terminated.
/// - **Human mode**: aligned `key: value` lines for reports, one line per
///   document or cycle for listings.
///
/// Every writer takes a generic `W: Write` so that commands can be tested
/// against a `Vec<u8>`.
use std::io::Write;

use serde::Serialize;

use circref_core::{
    BuildReport, Cycle, CycleSummary, DocumentNode, GraphStats, LoadReport, VisibilitySummary,
};

/// Writes `value` as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)
}

/// Writes the load report: counts, then one indented line per failure.
pub fn write_load_human<W: Write>(w: &mut W, report: &LoadReport) -> std::io::Result<()> {
    writeln!(w, "sources:        {}/{} loaded", report.loaded, report.total)?;
    for failure in &report.failures {
        writeln!(w, "  skipped: {failure}")?;
    }
    Ok(())
}

/// Writes the build report.
pub fn write_build_human<W: Write>(w: &mut W, report: &BuildReport) -> std::io::Result<()> {
    writeln!(w, "orphan edges:   {}", report.orphan_edges)?;
    writeln!(w, "duplicates:     {}", report.duplicate_edges)?;
    writeln!(w, "merged records: {}", report.merged_nodes)?;
    writeln!(w, "collisions:     {}", report.title_collisions)?;
    if report.skipped_records > 0 || report.skipped_references > 0 {
        writeln!(
            w,
            "skipped:        {} records, {} references",
            report.skipped_records, report.skipped_references
        )?;
    }
    Ok(())
}

/// Writes aggregate graph statistics.
pub fn write_stats_human<W: Write>(w: &mut W, stats: &GraphStats) -> std::io::Result<()> {
    writeln!(w, "nodes:          {}", stats.total_nodes)?;
    writeln!(w, "  circular: {}", stats.circular_nodes)?;
    writeln!(w, "  pdf: {}", stats.pdf_nodes)?;
    writeln!(w, "  web: {}", stats.web_nodes)?;
    writeln!(w, "edges:          {}", stats.total_edges)?;
    writeln!(w, "cycles:         {}", stats.cycle_count)?;
    writeln!(w, "  nodes in cycles: {}", stats.nodes_in_cycles_count)?;
    writeln!(w, "  edges in cycles: {}", stats.edges_in_cycles_count)
}

/// Writes one cycle as `cycle N (len L): a -> b -> a`.
pub fn write_cycle_human<W: Write>(w: &mut W, id: usize, nodes: &[String]) -> std::io::Result<()> {
    let mut path = nodes.join(" -> ");
    if let Some(first) = nodes.first() {
        path.push_str(" -> ");
        path.push_str(first);
    }
    writeln!(w, "cycle {id} (len {}): {path}", nodes.len())
}

/// Writes every cycle of a full report.
pub fn write_cycles_human<W: Write>(w: &mut W, cycles: &[Cycle]) -> std::io::Result<()> {
    for cycle in cycles {
        write_cycle_human(w, cycle.id, &cycle.nodes)?;
    }
    writeln!(w, "{} cycle(s)", cycles.len())
}

/// Writes the cycles touching one node.
pub fn write_summaries_human<W: Write>(
    w: &mut W,
    summaries: &[CycleSummary],
) -> std::io::Result<()> {
    for summary in summaries {
        write_cycle_human(w, summary.cycle_id, &summary.node_sequence)?;
    }
    writeln!(w, "{} cycle(s)", summaries.len())
}

/// Writes one visible document.
///
/// Format: `~* BPRD Circular No. 01  [BPRD 2014 circular]  Title`, where `~`
/// marks a document dimmed by the search and `*` one lying on a cycle.
pub fn write_node_human<W: Write>(w: &mut W, node: &DocumentNode) -> std::io::Result<()> {
    let dim = if node.visibility.dimmed { '~' } else { ' ' };
    let cycle = if node.in_cycle { '*' } else { ' ' };
    let year = node.year.map(|y| format!(" {y}")).unwrap_or_default();
    write!(
        w,
        "{dim}{cycle} {id}  [{dept}{year} {kind}]",
        id = node.id,
        dept = node.department,
        kind = node.kind.as_str(),
    )?;
    if node.title != node.id && !node.title.is_empty() {
        write!(w, "  {}", node.title)?;
    }
    writeln!(w)
}

/// Writes the counts of one visibility recomputation.
pub fn write_visibility_human<W: Write>(
    w: &mut W,
    summary: &VisibilitySummary,
) -> std::io::Result<()> {
    writeln!(
        w,
        "visible: {} of {} documents, {} of {} references; dimmed: {}",
        summary.visible_nodes,
        summary.visible_nodes + summary.hidden_nodes,
        summary.visible_edges,
        summary.visible_edges + summary.hidden_edges,
        summary.dimmed_nodes,
    )
}
