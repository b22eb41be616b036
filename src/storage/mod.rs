//! Results persistence module

mod html;
mod text;

use anyhow::{Context, Result};
use crate::components::Component;
use crate::graph::{BuildOutcome, ConnectivityGraph};
use crate::report::Analysis;
use serde_json::{json, to_string_pretty};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output formats for the connectivity report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Json,
    Text,
    Csv,
    Html,
    /// Every concrete format
    All,
}

impl ReportFormat {
    /// Concrete formats in the order they are written
    pub fn concrete() -> &'static [ReportFormat] {
        &[
            ReportFormat::Json,
            ReportFormat::Text,
            ReportFormat::Csv,
            ReportFormat::Html,
        ]
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "text" | "txt" => Ok(ReportFormat::Text),
            "csv" => Ok(ReportFormat::Csv),
            "html" => Ok(ReportFormat::Html),
            "all" => Ok(ReportFormat::All),
            other => Err(format!(
                "unknown format '{}', expected one of json, text, csv, html, all",
                other
            )),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportFormat::Json => "json",
            ReportFormat::Text => "text",
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
            ReportFormat::All => "all",
        };
        f.write_str(name)
    }
}

/// Save analysis results in the requested formats, returning written paths
pub fn save_results(
    analysis: &Analysis,
    outcome: &BuildOutcome,
    formats: &[ReportFormat],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    log::info!("Saving report to {}", output_dir.display());

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Cannot create output directory {}", output_dir.display()))?;

    let mut written = Vec::new();
    for format in formats {
        match format {
            ReportFormat::Json => written.extend(save_json(analysis, outcome, output_dir)?),
            ReportFormat::Text => {
                let path = output_dir.join("connectivity_report.txt");
                write_file(&path, |out| text::write_report(out, analysis, outcome))?;
                written.push(path);
            }
            ReportFormat::Csv => written.extend(save_csv(analysis, &outcome.graph, output_dir)?),
            ReportFormat::Html => {
                let path = output_dir.join("connectivity_report.html");
                write_file(&path, |out| html::write_report(out, analysis, outcome))?;
                written.push(path);
            }
            ReportFormat::All => {
                for concrete in ReportFormat::concrete() {
                    written.extend(save_results(analysis, outcome, &[*concrete], output_dir)?);
                }
            }
        }
    }

    log::info!("Wrote {} file(s)", written.len());

    Ok(written)
}

/// Create a file and hand a buffered writer to `body`
fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    body(&mut out).with_context(|| format!("Cannot write {}", path.display()))?;
    out.flush()?;
    Ok(())
}

/// Save the canonical report and the extended metrics
fn save_json(analysis: &Analysis, outcome: &BuildOutcome, output_dir: &Path) -> Result<Vec<PathBuf>> {
    log::info!("Saving JSON report");

    let report_path = output_dir.join("connectivity_report.json");
    let report = to_string_pretty(&analysis.report)?;
    write_file(&report_path, |out| out.write_all(report.as_bytes()))?;

    let graph = &outcome.graph;
    let metrics_path = output_dir.join("graph_metrics.json");
    let metrics = json!({
        "metrics": analysis.metrics,
        "components": analysis.components.iter().map(|c| {
            json!({
                "id": c.id,
                "size": c.size,
                "density": c.density,
                "central_nodes": member_ids(graph, &c.central_nodes),
            })
        }).collect::<Vec<_>>(),
        "diagnostics": outcome.diagnostics,
    });
    let metrics = to_string_pretty(&metrics)?;
    write_file(&metrics_path, |out| out.write_all(metrics.as_bytes()))?;

    Ok(vec![report_path, metrics_path])
}

/// Save node and component tables
fn save_csv(analysis: &Analysis, graph: &ConnectivityGraph, output_dir: &Path) -> Result<Vec<PathBuf>> {
    log::info!("Saving CSV tables");

    let component_of = component_index(&analysis.components, graph.node_count);

    let nodes_path = output_dir.join("nodes.csv");
    write_file(&nodes_path, |out| {
        writeln!(out, "id,name,lat,lon,degree,component_id,community,technology")?;
        for node in 0..graph.node_count {
            let attrs = &graph.attributes[node];
            writeln!(
                out,
                "{},{},{},{},{},{},{},{}",
                csv_field(&graph.node_ids[node]),
                csv_field(&attrs.name),
                attrs.lat,
                attrs.lon,
                graph.degree(node),
                component_of[node],
                csv_field(attrs.community.as_deref().unwrap_or("")),
                csv_field(attrs.technology.as_deref().unwrap_or(""))
            )?;
        }
        Ok(())
    })?;

    let components_path = output_dir.join("components.csv");
    write_file(&components_path, |out| {
        writeln!(out, "component_id,size,density,central_nodes")?;
        for component in &analysis.components {
            writeln!(
                out,
                "{},{},{:.6},{}",
                component.id,
                component.size,
                component.density,
                csv_field(&member_ids(graph, &component.central_nodes).join(" "))
            )?;
        }
        Ok(())
    })?;

    Ok(vec![nodes_path, components_path])
}

/// Component id of every node index
pub(crate) fn component_index(components: &[Component], node_count: usize) -> Vec<u32> {
    let mut component_of = vec![0; node_count];
    for component in components {
        for &node in &component.members {
            component_of[node as usize] = component.id;
        }
    }
    component_of
}

pub(crate) fn member_ids(graph: &ConnectivityGraph, members: &[u32]) -> Vec<String> {
    members.iter().map(|&n| graph.id_of(n).to_string()).collect()
}

/// Quote a CSV field when it contains a delimiter, quote or newline
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
