//! Plain text report

use crate::graph::BuildOutcome;
use crate::report::Analysis;
use crate::storage::member_ids;
use itertools::Itertools;
use std::io::{self, Write};

const RULE_WIDTH: usize = 60;

pub(super) fn write_report<W: Write>(out: &mut W, analysis: &Analysis, outcome: &BuildOutcome) -> io::Result<()> {
    let report = &analysis.report;
    let metrics = &analysis.metrics;
    let graph = &outcome.graph;
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out, "{}", rule)?;
    writeln!(out, "CONNECTIVITY REPORT")?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;
    writeln!(out, "Generated: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out)?;

    writeln!(out, "SUMMARY:")?;
    writeln!(out, "  - Nodes: {}", report.num_nodes)?;
    writeln!(out, "  - Edges: {}", report.num_edges)?;
    writeln!(out, "  - Density: {:.4}", metrics.density)?;
    writeln!(out, "  - Average degree: {:.2}", metrics.average_degree)?;
    writeln!(out, "  - Connected components: {}", report.connected_components.len())?;
    writeln!(out, "  - Connected: {}", if report.is_connected { "yes" } else { "no" })?;
    match metrics.diameter {
        Some(diameter) => writeln!(out, "  - Diameter: {}", diameter)?,
        None => writeln!(out, "  - Diameter: undefined")?,
    }
    if !metrics.hubs.is_empty() {
        writeln!(out, "  - Hubs: {}", metrics.hubs.join(", "))?;
    }
    writeln!(out)?;

    writeln!(out, "NODE DEGREES:")?;
    for (node, degree) in &report.degrees {
        writeln!(out, "  - {}: {} connection(s)", node, degree)?;
    }
    writeln!(out)?;

    if analysis.components.len() > 1 {
        writeln!(out, "CONNECTED COMPONENTS:")?;
        for component in &analysis.components {
            writeln!(
                out,
                "  Component {} ({} node(s), density {:.3}): {}",
                component.id + 1,
                component.size,
                component.density,
                member_ids(graph, &component.members).join(", ")
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "EDGES:")?;
    for (a, b) in graph.undirected_edges() {
        writeln!(out, "  - {} <-> {}", graph.id_of(a), graph.id_of(b))?;
    }
    writeln!(out)?;

    if !metrics.edge_lengths_km.is_empty() {
        writeln!(out, "DISTANCES:")?;
        for edge in &metrics.edge_lengths_km {
            writeln!(out, "  - {} <-> {}: {:.2} km", edge.source, edge.target, edge.km)?;
        }
        writeln!(out, "  Total: {:.2} km", metrics.total_length_km)?;
        writeln!(out, "  Average: {:.2} km", metrics.average_length_km)?;
        writeln!(out)?;
    }

    for (title, groups) in [("COMMUNITIES:", &metrics.communities), ("TECHNOLOGIES:", &metrics.technologies)] {
        if groups.is_empty() {
            continue;
        }
        writeln!(out, "{}", title)?;
        for (group, count) in groups.iter().sorted_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0))) {
            writeln!(out, "  - {}: {} point(s)", group, count)?;
        }
        writeln!(out)?;
    }

    if !report.shortest_paths_example.is_empty() {
        writeln!(out, "SHORTEST PATHS:")?;
        for (target, path) in &report.shortest_paths_example {
            writeln!(out, "  - to {}: {}", target, path.iter().join(" -> "))?;
        }
        writeln!(out)?;
    }

    if !outcome.diagnostics.is_empty() {
        writeln!(out, "WARNINGS:")?;
        for diagnostic in &outcome.diagnostics {
            writeln!(out, "  - {}", diagnostic)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{}", rule)?;

    Ok(())
}
