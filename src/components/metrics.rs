//! Component statistics and metrics

use crate::graph::ConnectivityGraph;

/// Calculate density (actual edges / potential undirected edges)
pub fn calculate_density(graph: &ConnectivityGraph, members: &[u32]) -> f64 {
    let n = members.len();
    if n <= 1 {
        return 0.0;
    }

    let potential_edges = n * (n - 1) / 2;

    // A component is closed under adjacency, so every neighbor is a member
    let endpoint_count: usize = members.iter().map(|&node| graph.degree(node as usize)).sum();

    (endpoint_count / 2) as f64 / potential_edges as f64
}

/// Highest-degree members, ties broken by ascending id
pub fn identify_central_nodes(graph: &ConnectivityGraph, members: &[u32], top_n: usize) -> Vec<u32> {
    let mut degrees: Vec<(u32, usize)> = members
        .iter()
        .map(|&node| (node, graph.degree(node as usize)))
        .collect();

    // Sort by degree (highest first); indices follow id order
    degrees.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    degrees
        .into_iter()
        .take(top_n)
        .map(|(node, _)| node)
        .collect()
}
