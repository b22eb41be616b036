//! Connected component detection

use crate::components::metrics::{calculate_density, identify_central_nodes};
use crate::components::Component;
use crate::graph::ConnectivityGraph;
use std::collections::BTreeMap;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set, valid at roots (for union by size)
    size: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        // Path compression: point every visited node at the root
        let mut current = x;
        while self.parent[current as usize] != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }

        root
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Attach smaller tree under root of larger tree
        let (big, small) = if self.size[root_x as usize] >= self.size[root_y as usize] {
            (root_x, root_y)
        } else {
            (root_y, root_x)
        };
        self.parent[small as usize] = big;
        self.size[big as usize] += self.size[small as usize];
    }
}

/// Partition the graph into connected components.
///
/// Components are ordered by their smallest member id and members are
/// listed in ascending id order; isolated nodes form singleton components.
pub fn find_connected_components(graph: &ConnectivityGraph, central_count: usize) -> Vec<Component> {
    log::debug!("Finding connected components of {} nodes", graph.node_count);

    let mut sets = DisjointSets::new(graph.node_count);
    for (src, dst) in graph.undirected_edges() {
        sets.union(src, dst);
    }

    // Nodes are visited in index order, so each member list is already
    // sorted and the first node seen for a root is its minimum member
    let mut by_root: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    let mut first_seen: Vec<u32> = Vec::new();
    for node in 0..graph.node_count as u32 {
        let root = sets.find(node);
        let members = by_root.entry(root).or_default();
        if members.is_empty() {
            first_seen.push(root);
        }
        members.push(node);
    }

    let components: Vec<Component> = first_seen
        .into_iter()
        .enumerate()
        .filter_map(|(id, root)| by_root.remove(&root).map(|members| (id, members)))
        .map(|(id, members)| Component {
            id: id as u32,
            size: members.len(),
            density: calculate_density(graph, &members),
            central_nodes: identify_central_nodes(graph, &members, central_count),
            members,
        })
        .collect();

    log::info!("Found {} connected component(s)", components.len());

    components
}
