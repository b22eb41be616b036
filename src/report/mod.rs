//! Connectivity report computation

use crate::components::metrics::identify_central_nodes;
use crate::components::{find_connected_components, Component};
use crate::graph::algorithms::{bfs, density, diameter, edge_lengths_km, path_from_parents};
use crate::graph::compressed::NodeAttributes;
use crate::graph::ConnectivityGraph;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Canonical connectivity report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityReport {
    pub num_nodes: usize,
    pub num_edges: usize,

    /// Sorted member ids per component, components ordered by smallest id
    pub connected_components: Vec<Vec<String>>,

    pub degrees: BTreeMap<String, usize>,

    /// True iff there is at most one component (an empty graph is connected)
    pub is_connected: bool,

    /// Target id -> path from the example source, both ends inclusive
    pub shortest_paths_example: BTreeMap<String, Vec<String>>,
}

/// Extended whole-graph metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphMetrics {
    pub density: f64,

    /// Omitted when the graph is disconnected or has fewer than two nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<usize>,

    pub average_degree: f64,
    pub max_degree: usize,
    pub isolated_nodes: Vec<String>,
    pub num_components: usize,
    pub largest_component_size: usize,

    /// Highest-degree nodes, most connected first
    pub hubs: Vec<String>,

    /// Great-circle length of each edge between two placed nodes
    pub edge_lengths_km: Vec<EdgeLength>,
    pub total_length_km: f64,
    pub average_length_km: f64,

    /// Node count per community; empty when no node records one
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub communities: BTreeMap<String, usize>,

    /// Node count per access technology; empty when no node records one
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub technologies: BTreeMap<String, usize>,
}

/// Geographic length of one edge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLength {
    pub source: String,
    pub target: String,
    pub km: f64,
}

/// Group label for nodes without a community
pub const UNASSIGNED_COMMUNITY: &str = "unassigned";

/// Group label for nodes without a technology
pub const UNKNOWN_TECHNOLOGY: &str = "unknown";

/// Knobs for a report run
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Source of the shortest-path examples; defaults to the smallest id
    pub source: Option<String>,

    /// Explicit path targets; when empty, illustrative targets are chosen
    pub targets: Vec<String>,

    /// Number of hub nodes listed in the metrics and per component
    pub hub_count: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            source: None,
            targets: Vec::new(),
            hub_count: 5,
        }
    }
}

/// Everything computed for one graph
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: ConnectivityReport,
    pub metrics: GraphMetrics,
    pub components: Vec<Component>,
}

/// Compute the canonical report with default options
pub fn analyze(graph: &ConnectivityGraph) -> ConnectivityReport {
    let components = find_connected_components(graph, 0);
    build_report(graph, &components, &AnalysisOptions::default())
}

/// Compute the report, extended metrics and component details
pub fn analyze_with(graph: &ConnectivityGraph, options: &AnalysisOptions) -> Analysis {
    log::info!(
        "Analysing graph with {} nodes and {} edges",
        graph.node_count,
        graph.edge_count()
    );

    let components = find_connected_components(graph, options.hub_count);
    let report = build_report(graph, &components, options);
    let metrics = compute_metrics(graph, &components, options.hub_count);

    Analysis {
        report,
        metrics,
        components,
    }
}

fn build_report(
    graph: &ConnectivityGraph,
    components: &[Component],
    options: &AnalysisOptions,
) -> ConnectivityReport {
    let connected_components: Vec<Vec<String>> = components
        .iter()
        .map(|c| c.members.iter().map(|&n| graph.id_of(n).to_string()).collect())
        .collect();

    let degrees: BTreeMap<String, usize> = (0..graph.node_count)
        .map(|node| (graph.node_ids[node].clone(), graph.degree(node)))
        .collect();

    ConnectivityReport {
        num_nodes: graph.node_count,
        num_edges: graph.edge_count(),
        is_connected: connected_components.len() <= 1,
        connected_components,
        degrees,
        shortest_paths_example: shortest_paths_example(graph, options),
    }
}

/// Extended metrics on their own
pub fn metrics(graph: &ConnectivityGraph, hub_count: usize) -> GraphMetrics {
    let components = find_connected_components(graph, 0);
    compute_metrics(graph, &components, hub_count)
}

fn compute_metrics(graph: &ConnectivityGraph, components: &[Component], hub_count: usize) -> GraphMetrics {
    let n = graph.node_count;

    let average_degree = if n == 0 {
        0.0
    } else {
        2.0 * graph.edge_count() as f64 / n as f64
    };

    let all_nodes: Vec<u32> = (0..n as u32).collect();

    let edge_lengths: Vec<EdgeLength> = edge_lengths_km(graph)
        .into_iter()
        .map(|(src, dst, km)| EdgeLength {
            source: graph.id_of(src).to_string(),
            target: graph.id_of(dst).to_string(),
            km,
        })
        .collect();
    let total_length_km: f64 = edge_lengths.iter().map(|e| e.km).sum();
    let average_length_km = if edge_lengths.is_empty() {
        0.0
    } else {
        total_length_km / edge_lengths.len() as f64
    };

    GraphMetrics {
        density: density(graph),
        diameter: diameter(graph).ok(),
        average_degree,
        max_degree: (0..n).map(|node| graph.degree(node)).max().unwrap_or(0),
        isolated_nodes: (0..n)
            .filter(|&node| graph.degree(node) == 0)
            .map(|node| graph.node_ids[node].clone())
            .collect(),
        num_components: components.len(),
        largest_component_size: components.iter().map(|c| c.size).max().unwrap_or(0),
        hubs: identify_central_nodes(graph, &all_nodes, hub_count)
            .into_iter()
            .map(|node| graph.id_of(node).to_string())
            .collect(),
        edge_lengths_km: edge_lengths,
        total_length_km,
        average_length_km,
        communities: count_groups(graph, UNASSIGNED_COMMUNITY, |attrs| attrs.community.as_deref()),
        technologies: count_groups(graph, UNKNOWN_TECHNOLOGY, |attrs| attrs.technology.as_deref()),
    }
}

/// Count nodes per group label; nodes without one fall under `missing`
fn count_groups<F>(graph: &ConnectivityGraph, missing: &str, label: F) -> BTreeMap<String, usize>
where
    F: Fn(&NodeAttributes) -> Option<&str>,
{
    let mut counts = BTreeMap::new();
    if graph.attributes.iter().all(|attrs| label(attrs).is_none()) {
        return counts;
    }

    for attrs in &graph.attributes {
        let group = label(attrs).unwrap_or(missing);
        *counts.entry(group.to_string()).or_insert(0) += 1;
    }

    counts
}

/// Example paths from a deterministic source.
///
/// Without explicit targets the source itself, the smallest other reachable
/// id and the farthest reachable id are reported. Unknown or unreachable
/// targets are left out.
fn shortest_paths_example(
    graph: &ConnectivityGraph,
    options: &AnalysisOptions,
) -> BTreeMap<String, Vec<String>> {
    let mut paths = BTreeMap::new();

    let source = match &options.source {
        Some(id) => match graph.index_of(id) {
            Some(idx) => idx,
            None => {
                log::warn!("Path source '{}' is not a node, skipping path examples", id);
                return paths;
            }
        },
        None if graph.is_empty() => return paths,
        None => 0,
    };

    let (distance, parent) = bfs(graph, source);

    let mut targets = vec![source];
    if options.targets.is_empty() {
        let reachable = || {
            (0..graph.node_count as u32)
                .filter(|&n| n != source)
                .filter_map(|n| distance[n as usize].map(|d| (n, d)))
        };

        if let Some((nearest, _)) = reachable().next() {
            targets.push(nearest);
        }
        if let Some((farthest, _)) = reachable().min_by_key(|&(n, d)| (Reverse(d), n)) {
            targets.push(farthest);
        }
    } else {
        for id in &options.targets {
            match graph.index_of(id) {
                Some(idx) => targets.push(idx),
                None => log::debug!("Path target '{}' is not a node", id),
            }
        }
    }

    for target in targets {
        if let Some(path) = path_from_parents(&parent, source, target) {
            let ids = path.into_iter().map(|n| graph.id_of(n).to_string()).collect();
            paths.insert(graph.id_of(target).to_string(), ids);
        }
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Point;
    use crate::graph::build_graph;

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_pairs() {
        let graph = build_graph(&[
            Point::new("1", &["2"]),
            Point::new("2", &["1"]),
            Point::new("3", &["4"]),
            Point::new("4", &["3"]),
        ])
        .graph;
        let report = analyze(&graph);

        assert_eq!(report.num_nodes, 4);
        assert_eq!(report.num_edges, 2);
        assert_eq!(report.connected_components, vec![ids(&["1", "2"]), ids(&["3", "4"])]);
        assert!(report.degrees.values().all(|&d| d == 1));
        assert!(!report.is_connected);
    }

    #[test]
    fn test_star_paths() {
        let graph = build_graph(&[
            Point::new("1", &["2", "3"]),
            Point::new("2", &[]),
            Point::new("3", &[]),
        ])
        .graph;
        let report = analyze(&graph);

        assert_eq!(report.num_edges, 2);
        assert!(report.is_connected);
        assert_eq!(report.shortest_paths_example["1"], ids(&["1"]));
        assert_eq!(report.shortest_paths_example["2"], ids(&["1", "2"]));
        assert_eq!(report.shortest_paths_example.len(), 2);
    }

    #[test]
    fn test_farthest_target_is_included() {
        let graph = build_graph(&[
            Point::new("a", &["b"]),
            Point::new("b", &["c"]),
            Point::new("c", &[]),
        ])
        .graph;
        let report = analyze(&graph);

        assert_eq!(report.shortest_paths_example["b"], ids(&["a", "b"]));
        assert_eq!(report.shortest_paths_example["c"], ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_explicit_source_and_targets() {
        let graph = build_graph(&[
            Point::new("a", &["b"]),
            Point::new("b", &["c"]),
            Point::new("c", &[]),
            Point::new("d", &[]),
        ])
        .graph;
        let options = AnalysisOptions {
            source: Some("c".into()),
            targets: ids(&["a", "d", "zz"]),
            ..Default::default()
        };
        let paths = analyze_with(&graph, &options).report.shortest_paths_example;

        assert_eq!(paths.len(), 2);
        assert_eq!(paths["c"], ids(&["c"]));
        assert_eq!(paths["a"], ids(&["c", "b", "a"]));
    }

    #[test]
    fn test_unknown_source_yields_no_paths() {
        let graph = build_graph(&[Point::new("a", &[])]).graph;
        let options = AnalysisOptions {
            source: Some("nope".into()),
            ..Default::default()
        };

        assert!(analyze_with(&graph, &options).report.shortest_paths_example.is_empty());
    }

    #[test]
    fn test_empty_graph_is_connected() {
        let report = analyze(&build_graph(&[]).graph);

        assert_eq!(report.num_nodes, 0);
        assert_eq!(report.num_edges, 0);
        assert!(report.connected_components.is_empty());
        assert!(report.is_connected);
        assert!(report.shortest_paths_example.is_empty());
    }

    #[test]
    fn test_single_node() {
        let report = analyze(&build_graph(&[Point::new("solo", &[])]).graph);

        assert!(report.is_connected);
        assert_eq!(report.degrees["solo"], 0);
        assert_eq!(report.shortest_paths_example["solo"], ids(&["solo"]));
    }

    #[test]
    fn test_metrics() {
        let graph = build_graph(&[
            Point::new("a", &["b"]),
            Point::new("b", &["c"]),
            Point::new("c", &[]),
            Point::new("d", &[]),
        ])
        .graph;
        let m = metrics(&graph, 1);

        assert!((m.density - 2.0 / 6.0).abs() < 1e-9);
        assert_eq!(m.diameter, None);
        assert_eq!(m.average_degree, 1.0);
        assert_eq!(m.max_degree, 2);
        assert_eq!(m.isolated_nodes, ids(&["d"]));
        assert_eq!(m.num_components, 2);
        assert_eq!(m.largest_component_size, 3);
        assert_eq!(m.hubs, ids(&["b"]));
    }

    #[test]
    fn test_metrics_diameter_when_connected() {
        let graph = build_graph(&[
            Point::new("a", &["b"]),
            Point::new("b", &["c"]),
            Point::new("c", &[]),
        ])
        .graph;
        assert_eq!(metrics(&graph, 3).diameter, Some(2));
    }

    #[test]
    fn test_report_json_shape() {
        let graph = build_graph(&[Point::new("a", &["b"]), Point::new("b", &[])]).graph;
        let value = serde_json::to_value(analyze(&graph)).unwrap();

        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "connected_components",
                "degrees",
                "is_connected",
                "num_edges",
                "num_nodes",
                "shortest_paths_example"
            ]
        );
    }

    #[test]
    fn test_analyze_matches_analyze_with_report() {
        let graph = build_graph(&[
            Point::new("a", &["b"]),
            Point::new("b", &["c"]),
            Point::new("c", &[]),
            Point::new("d", &[]),
        ])
        .graph;

        assert_eq!(analyze(&graph), analyze_with(&graph, &AnalysisOptions::default()).report);
    }

    #[test]
    fn test_metrics_edge_lengths() {
        let mut a = Point::new("a", &["b", "c"]);
        a.lon = 1.0;
        let mut b = Point::new("b", &["c"]);
        b.lon = 2.0;
        let mut c = Point::new("c", &[]);
        c.lon = 3.0;
        let graph = build_graph(&[a, b, c, Point::new("d", &["a"])]).graph;

        let m = metrics(&graph, 1);
        // d has no coordinates, so a-d is not measured
        assert_eq!(m.edge_lengths_km.len(), 3);
        assert_eq!(m.edge_lengths_km[0].source, "a");
        assert_eq!(m.edge_lengths_km[0].target, "b");
        assert!((m.total_length_km - 4.0 * 111.195).abs() < 0.1, "got {}", m.total_length_km);
        assert!((m.average_length_km - m.total_length_km / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_without_coordinates_or_groups() {
        let graph = build_graph(&[Point::new("a", &["b"]), Point::new("b", &[])]).graph;
        let m = metrics(&graph, 1);

        assert!(m.edge_lengths_km.is_empty());
        assert_eq!(m.total_length_km, 0.0);
        assert_eq!(m.average_length_km, 0.0);
        assert!(m.communities.is_empty());
        assert!(m.technologies.is_empty());

        let value = serde_json::to_value(&m).unwrap();
        assert!(value.get("communities").is_none());
    }

    #[test]
    fn test_metrics_group_counts() {
        let mut a = Point::new("a", &[]);
        a.extra.insert("comunidade".into(), serde_json::json!("Norte"));
        a.extra.insert("tecnologia".into(), serde_json::json!("Fibra"));
        let mut b = Point::new("b", &[]);
        b.extra.insert("comunidade".into(), serde_json::json!("Norte"));
        let graph = build_graph(&[a, b, Point::new("c", &[])]).graph;

        let m = metrics(&graph, 1);
        assert_eq!(m.communities["Norte"], 2);
        assert_eq!(m.communities[UNASSIGNED_COMMUNITY], 1);
        assert_eq!(m.technologies["Fibra"], 1);
        assert_eq!(m.technologies[UNKNOWN_TECHNOLOGY], 2);
    }
}
