//! Standalone HTML report

use crate::graph::BuildOutcome;
use crate::report::Analysis;
use crate::storage::member_ids;
use itertools::Itertools;
use std::io::{self, Write};

pub(super) fn write_report<W: Write>(out: &mut W, analysis: &Analysis, outcome: &BuildOutcome) -> io::Result<()> {
    let report = &analysis.report;
    let metrics = &analysis.metrics;
    let graph = &outcome.graph;

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "  <meta charset=\"UTF-8\">")?;
    writeln!(out, "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">")?;
    writeln!(out, "  <title>Connectivity Report</title>")?;
    writeln!(out, "  <style>")?;
    writeln!(out, "    body {{ font-family: Arial, sans-serif; margin: 20px; }}")?;
    writeln!(out, "    h1, h2 {{ color: #333; }}")?;
    writeln!(out, "    table {{ border-collapse: collapse; margin-bottom: 20px; }}")?;
    writeln!(out, "    th, td {{ border: 1px solid #ddd; padding: 6px 12px; text-align: left; }}")?;
    writeln!(out, "    .component-list {{ display: flex; flex-wrap: wrap; }}")?;
    writeln!(out, "    .component-card {{ border: 1px solid #ddd; margin: 10px; padding: 15px; border-radius: 5px; width: 300px; }}")?;
    writeln!(out, "    .stats {{ background-color: #f9f9f9; padding: 15px; border-radius: 5px; }}")?;
    writeln!(out, "    .warning {{ color: #a15c00; }}")?;
    writeln!(out, "  </style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "  <h1>Connectivity Report</h1>")?;
    writeln!(
        out,
        "  <p>Generated {}</p>",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;

    writeln!(out, "  <div class=\"stats\">")?;
    writeln!(out, "    <h2>Summary Statistics</h2>")?;
    writeln!(out, "    <p>Nodes: {}</p>", report.num_nodes)?;
    writeln!(out, "    <p>Edges: {}</p>", report.num_edges)?;
    writeln!(out, "    <p>Density: {:.4}</p>", metrics.density)?;
    writeln!(out, "    <p>Average Degree: {:.2}</p>", metrics.average_degree)?;
    writeln!(out, "    <p>Connected: {}</p>", if report.is_connected { "yes" } else { "no" })?;
    if let Some(diameter) = metrics.diameter {
        writeln!(out, "    <p>Diameter: {}</p>", diameter)?;
    }
    writeln!(out, "  </div>")?;

    writeln!(out, "  <h2>Nodes</h2>")?;
    writeln!(out, "  <table>")?;
    writeln!(out, "    <tr><th>ID</th><th>Name</th><th>Lat</th><th>Lon</th><th>Degree</th></tr>")?;
    for node in 0..graph.node_count {
        let attrs = &graph.attributes[node];
        writeln!(
            out,
            "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&graph.node_ids[node]),
            escape(&attrs.name),
            attrs.lat,
            attrs.lon,
            graph.degree(node)
        )?;
    }
    writeln!(out, "  </table>")?;

    writeln!(out, "  <h2>Components</h2>")?;
    writeln!(out, "  <div class=\"component-list\">")?;
    for component in &analysis.components {
        writeln!(out, "    <div class=\"component-card\">")?;
        writeln!(out, "      <h3>Component {}</h3>", component.id + 1)?;
        writeln!(out, "      <p>Size: {} nodes</p>", component.size)?;
        writeln!(out, "      <p>Density: {:.4}</p>", component.density)?;
        writeln!(
            out,
            "      <p>Members: {}</p>",
            escape(&member_ids(graph, &component.members).join(", "))
        )?;
        writeln!(out, "    </div>")?;
    }
    writeln!(out, "  </div>")?;

    if !metrics.edge_lengths_km.is_empty() {
        writeln!(out, "  <h2>Distances</h2>")?;
        writeln!(out, "  <table>")?;
        writeln!(out, "    <tr><th>From</th><th>To</th><th>km</th></tr>")?;
        for edge in &metrics.edge_lengths_km {
            writeln!(
                out,
                "    <tr><td>{}</td><td>{}</td><td>{:.2}</td></tr>",
                escape(&edge.source),
                escape(&edge.target),
                edge.km
            )?;
        }
        writeln!(out, "  </table>")?;
        writeln!(
            out,
            "  <p>Total: {:.2} km, average: {:.2} km</p>",
            metrics.total_length_km, metrics.average_length_km
        )?;
    }

    for (title, groups) in [("Communities", &metrics.communities), ("Technologies", &metrics.technologies)] {
        if groups.is_empty() {
            continue;
        }
        writeln!(out, "  <h2>{}</h2>", title)?;
        writeln!(out, "  <table>")?;
        writeln!(out, "    <tr><th>Group</th><th>Points</th></tr>")?;
        for (group, count) in groups {
            writeln!(out, "    <tr><td>{}</td><td>{}</td></tr>", escape(group), count)?;
        }
        writeln!(out, "  </table>")?;
    }

    if !report.shortest_paths_example.is_empty() {
        writeln!(out, "  <h2>Shortest Paths</h2>")?;
        writeln!(out, "  <ul>")?;
        for (target, path) in &report.shortest_paths_example {
            writeln!(
                out,
                "    <li>{}: {}</li>",
                escape(target),
                path.iter().map(|id| escape(id)).join(" &rarr; ")
            )?;
        }
        writeln!(out, "  </ul>")?;
    }

    if !outcome.diagnostics.is_empty() {
        writeln!(out, "  <h2>Warnings</h2>")?;
        writeln!(out, "  <ul>")?;
        for diagnostic in &outcome.diagnostics {
            writeln!(out, "    <li class=\"warning\">{}</li>", escape(&diagnostic.to_string()))?;
        }
        writeln!(out, "  </ul>")?;
    }

    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;

    Ok(())
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
