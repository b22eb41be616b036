//! Connected component analysis module

pub mod detection;
pub mod metrics;

pub use detection::{find_connected_components, DisjointSets};

use serde::Serialize;

/// A connected component of the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Position in the component ordering (by smallest member id)
    pub id: u32,

    /// Member node indices, ascending (and so ascending by id)
    pub members: Vec<u32>,

    /// Number of members
    pub size: usize,

    /// Internal density: edges / potential undirected edges
    pub density: f64,

    /// Highest-degree members, most connected first
    pub central_nodes: Vec<u32>,
}
