//! Graph algorithms for analysis

use crate::error::{MapperError, Result};
use crate::graph::ConnectivityGraph;
use std::collections::VecDeque;

/// Breadth-first search from a single source.
///
/// Returns, for every node, its hop distance from `source` and its BFS
/// parent (`None` for the source and for unreachable nodes). Neighbors are
/// visited in ascending index order so the parent tree is deterministic.
pub fn bfs(graph: &ConnectivityGraph, source: u32) -> (Vec<Option<u32>>, Vec<Option<u32>>) {
    let mut distance = vec![None; graph.node_count];
    let mut parent = vec![None; graph.node_count];
    let mut queue = VecDeque::new();

    distance[source as usize] = Some(0);
    queue.push_back(source);

    while let Some(node) = queue.pop_front() {
        let next = distance[node as usize].map(|d| d + 1);
        for &neighbor in graph.neighbors(node as usize) {
            if distance[neighbor as usize].is_none() {
                distance[neighbor as usize] = next;
                parent[neighbor as usize] = Some(node);
                queue.push_back(neighbor);
            }
        }
    }

    (distance, parent)
}

/// Walk a BFS parent tree back from `target` to the search source
pub fn path_from_parents(parent: &[Option<u32>], source: u32, target: u32) -> Option<Vec<u32>> {
    let mut path = vec![target];
    let mut current = target;

    while current != source {
        current = parent[current as usize]?;
        path.push(current);
    }

    path.reverse();
    Some(path)
}

/// Shortest path between two ids, inclusive of both endpoints
pub fn shortest_path(graph: &ConnectivityGraph, source: &str, target: &str) -> Option<Vec<String>> {
    let src = graph.index_of(source)?;
    let dst = graph.index_of(target)?;

    let (_, parent) = bfs(graph, src);
    path_from_parents(&parent, src, dst)
        .map(|path| path.into_iter().map(|n| graph.id_of(n).to_string()).collect())
}

/// Ratio of existing edges to the maximum for a simple undirected graph
pub fn density(graph: &ConnectivityGraph) -> f64 {
    let n = graph.node_count;
    if n <= 1 {
        return 0.0;
    }

    2.0 * graph.edge_count() as f64 / (n * (n - 1)) as f64
}

/// Longest shortest-path distance over all node pairs.
///
/// Only defined for connected graphs with at least two nodes.
pub fn diameter(graph: &ConnectivityGraph) -> Result<usize> {
    if graph.node_count < 2 {
        return Err(MapperError::UndefinedMetric(format!(
            "diameter needs at least 2 nodes, graph has {}",
            graph.node_count
        )));
    }

    let mut longest = 0;
    for source in 0..graph.node_count {
        let (distance, _) = bfs(graph, source as u32);
        for d in distance {
            match d {
                Some(d) => longest = longest.max(d as usize),
                None => {
                    return Err(MapperError::UndefinedMetric(
                        "diameter is undefined for a disconnected graph".to_string(),
                    ))
                }
            }
        }
    }

    Ok(longest)
}

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two lat/lon pairs (degrees)
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Length of every edge whose endpoints both have coordinates.
///
/// A node at exactly (0, 0) is treated as unplaced, since that is what the
/// loader assigns when a record carries no coordinates.
pub fn edge_lengths_km(graph: &ConnectivityGraph) -> Vec<(u32, u32, f64)> {
    let placed = |node: u32| {
        let attrs = &graph.attributes[node as usize];
        attrs.lat != 0.0 || attrs.lon != 0.0
    };

    graph
        .undirected_edges()
        .filter(|&(src, dst)| placed(src) && placed(dst))
        .map(|(src, dst)| {
            let a = &graph.attributes[src as usize];
            let b = &graph.attributes[dst as usize];
            (src, dst, haversine_km(a.lat, a.lon, b.lat, b.lon))
        })
        .collect()
}
