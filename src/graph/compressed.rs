//! Compressed undirected graph representation

use serde::Serialize;
use std::collections::HashMap;

/// Layout attributes carried by every node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeAttributes {
    /// Display name
    pub name: String,

    /// Latitude
    pub lat: f64,

    /// Longitude
    pub lon: f64,

    /// Community the point serves, if recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,

    /// Access technology, if recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
}

/// Compressed sparse row representation of an undirected simple graph.
///
/// Every edge {u, v} is stored twice, once in each endpoint's adjacency
/// range. Nodes are indexed in ascending id order and adjacency ranges are
/// sorted, so two graphs built from the same point set compare equal
/// regardless of input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectivityGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: offsets[i] to offsets[i+1] is the neighbor range of node i
    pub offsets: Vec<u32>,

    /// Concatenated, sorted neighbor lists
    pub edges: Vec<u32>,

    /// Node string ids, sorted ascending
    pub node_ids: Vec<String>,

    /// Per-node attributes, parallel to `node_ids`
    pub attributes: Vec<NodeAttributes>,

    #[serde(skip)]
    id_to_index: HashMap<String, u32>,
}

impl ConnectivityGraph {
    /// Assemble a graph from pre-sorted parts
    pub(crate) fn from_parts(
        node_ids: Vec<String>,
        attributes: Vec<NodeAttributes>,
        offsets: Vec<u32>,
        edges: Vec<u32>,
    ) -> Self {
        let id_to_index = node_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx as u32))
            .collect();

        Self {
            node_count: node_ids.len(),
            offsets,
            edges,
            node_ids,
            attributes,
            id_to_index,
        }
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Neighbors of a node
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Number of edges touching a node
    pub fn degree(&self, node: usize) -> usize {
        (self.offsets[node + 1] - self.offsets[node]) as usize
    }

    /// Index of a node by its string id
    pub fn index_of(&self, id: &str) -> Option<u32> {
        self.id_to_index.get(id).copied()
    }

    /// String id of a node index
    pub fn id_of(&self, node: u32) -> &str {
        &self.node_ids[node as usize]
    }

    /// Iterate over every undirected edge once, as (lower, higher) index pairs
    pub fn undirected_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.node_count).flat_map(move |src| {
            self.neighbors(src)
                .iter()
                .filter(move |&&dst| (src as u32) < dst)
                .map(move |&dst| (src as u32, dst))
        })
    }
}
