//! Network export for external layout and visualization tools

use anyhow::{Context, Result};
use crate::components::Component;
use crate::graph::ConnectivityGraph;
use crate::storage::component_index;
use petgraph::dot::{Config as DotConfig, Dot};
use petgraph::graph::{NodeIndex, UnGraph};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write GraphML and Graphviz DOT files describing the graph
pub fn export_network(
    graph: &ConnectivityGraph,
    components: &[Component],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    log::info!("Exporting network with {} nodes", graph.node_count);

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Cannot create output directory {}", output_dir.display()))?;

    let graphml_path = output_dir.join("network.graphml");
    let file = File::create(&graphml_path)
        .with_context(|| format!("Cannot create {}", graphml_path.display()))?;
    let mut out = BufWriter::new(file);
    write_graphml(&mut out, graph, components)?;
    out.flush()?;

    let dot_path = output_dir.join("network.dot");
    fs::write(&dot_path, to_dot(graph)).with_context(|| format!("Cannot write {}", dot_path.display()))?;

    log::info!("Network files written to {}", output_dir.display());

    Ok(vec![graphml_path, dot_path])
}

/// GraphML document with name, coordinates, degree and component per node
pub fn write_graphml<W: Write>(
    out: &mut W,
    graph: &ConnectivityGraph,
    components: &[Component],
) -> std::io::Result<()> {
    let component_of = component_index(components, graph.node_count);

    // Write GraphML header
    writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(out, "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">")?;
    writeln!(out, "  <key id=\"name\" for=\"node\" attr.name=\"name\" attr.type=\"string\"/>")?;
    writeln!(out, "  <key id=\"lat\" for=\"node\" attr.name=\"lat\" attr.type=\"double\"/>")?;
    writeln!(out, "  <key id=\"lon\" for=\"node\" attr.name=\"lon\" attr.type=\"double\"/>")?;
    writeln!(out, "  <key id=\"degree\" for=\"node\" attr.name=\"degree\" attr.type=\"int\"/>")?;
    writeln!(out, "  <key id=\"component\" for=\"node\" attr.name=\"component\" attr.type=\"int\"/>")?;
    writeln!(out, "  <graph id=\"G\" edgedefault=\"undirected\">")?;

    // Write nodes
    for node in 0..graph.node_count {
        let attrs = &graph.attributes[node];
        writeln!(out, "    <node id=\"{}\">", xml_escape(&graph.node_ids[node]))?;
        writeln!(out, "      <data key=\"name\">{}</data>", xml_escape(&attrs.name))?;
        writeln!(out, "      <data key=\"lat\">{}</data>", attrs.lat)?;
        writeln!(out, "      <data key=\"lon\">{}</data>", attrs.lon)?;
        writeln!(out, "      <data key=\"degree\">{}</data>", graph.degree(node))?;
        writeln!(out, "      <data key=\"component\">{}</data>", component_of[node])?;
        writeln!(out, "    </node>")?;
    }

    // Write edges
    for (edge_id, (src, dst)) in graph.undirected_edges().enumerate() {
        writeln!(
            out,
            "    <edge id=\"e{}\" source=\"{}\" target=\"{}\"/>",
            edge_id,
            xml_escape(graph.id_of(src)),
            xml_escape(graph.id_of(dst))
        )?;
    }

    // Write GraphML footer
    writeln!(out, "  </graph>")?;
    writeln!(out, "</graphml>")?;

    Ok(())
}

/// Graphviz DOT text; `pos` pins nodes to their coordinates for `neato -n`
pub fn to_dot(graph: &ConnectivityGraph) -> String {
    let mut network: UnGraph<&str, &str> = UnGraph::with_capacity(graph.node_count, graph.edge_count());
    let indices: Vec<NodeIndex> = graph
        .node_ids
        .iter()
        .map(|id| network.add_node(id.as_str()))
        .collect();
    for (src, dst) in graph.undirected_edges() {
        network.add_edge(indices[src as usize], indices[dst as usize], "");
    }

    let edge_attrs = |_, _| String::new();
    let node_attrs = |_, (index, _): (NodeIndex, &&str)| {
        let attrs = &graph.attributes[index.index()];
        format!("pos=\"{},{}!\"", attrs.lon, attrs.lat)
    };
    let dot = Dot::with_attr_getters(&network, &[DotConfig::EdgeNoLabel], &edge_attrs, &node_attrs);

    format!("{}", dot)
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::find_connected_components;
    use crate::data::Point;
    use crate::graph::build_graph;

    fn sample() -> ConnectivityGraph {
        let mut a = Point::new("a", &["b"]);
        a.lat = -23.5;
        a.lon = -46.6;
        build_graph(&[a, Point::new("b", &[]), Point::new("c&d", &[])]).graph
    }

    #[test]
    fn test_graphml_contents() {
        let graph = sample();
        let components = find_connected_components(&graph, 1);

        let mut buffer = Vec::new();
        write_graphml(&mut buffer, &graph, &components).unwrap();
        let xml = String::from_utf8(buffer).unwrap();

        assert!(xml.contains("<node id=\"a\">"));
        assert!(xml.contains("<data key=\"lat\">-23.5</data>"));
        assert!(xml.contains("<node id=\"c&amp;d\">"));
        assert!(xml.contains("<edge id=\"e0\" source=\"a\" target=\"b\"/>"));
        assert_eq!(xml.matches("<edge ").count(), 1);
    }

    #[test]
    fn test_dot_contents() {
        let dot = to_dot(&sample());

        assert!(dot.starts_with("graph {"));
        assert!(dot.contains("pos=\"-46.6,-23.5!\""));
        assert!(dot.contains("0 -- 1"));
    }

    #[test]
    fn test_export_network_writes_files() {
        let graph = sample();
        let components = find_connected_components(&graph, 1);
        let dir = tempfile::tempdir().unwrap();

        let written = export_network(&graph, &components, dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.exists()));
    }
}
