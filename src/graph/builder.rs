//! Graph construction module

use crate::data::Point;
use crate::graph::compressed::NodeAttributes;
use crate::graph::ConnectivityGraph;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Non-fatal problem found while materializing edges
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A point is declared more than once; the last record was kept
    DuplicateId { id: String },

    /// A neighbor entry names an id that is not a loaded point
    DanglingReference { point_id: String, neighbor_id: String },

    /// A point lists itself as a neighbor
    SelfLoop { point_id: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateId { id } => {
                write!(f, "point '{}' declared more than once, keeping the last record", id)
            }
            Diagnostic::DanglingReference { point_id, neighbor_id } => {
                write!(f, "point '{}' references unknown neighbor '{}'", point_id, neighbor_id)
            }
            Diagnostic::SelfLoop { point_id } => {
                write!(f, "point '{}' lists itself as a neighbor", point_id)
            }
        }
    }
}

/// A built graph plus everything dropped while building it
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    pub graph: ConnectivityGraph,
    pub diagnostics: Vec<Diagnostic>,
}

struct PendingNode {
    attributes: NodeAttributes,
    neighbors: Vec<String>,
}

/// Builder for incrementally constructing a ConnectivityGraph
pub struct GraphBuilder {
    /// Declared nodes keyed by id; ordered so node indices follow id order
    nodes: BTreeMap<String, PendingNode>,

    /// Problems found so far
    diagnostics: Vec<Diagnostic>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Register a point; a later point with the same id replaces it
    pub fn add_point(&mut self, point: &Point) {
        let pending = PendingNode {
            attributes: NodeAttributes {
                name: point.name.clone(),
                lat: point.lat,
                lon: point.lon,
                community: point.community().map(str::to_string),
                technology: point.technology().map(str::to_string),
            },
            neighbors: point.neighbors.clone(),
        };

        if self.nodes.insert(point.id.clone(), pending).is_some() {
            self.diagnostics.push(Diagnostic::DuplicateId {
                id: point.id.clone(),
            });
        }
    }

    /// Materialize edges and build the compressed graph
    pub fn build(self) -> BuildOutcome {
        let GraphBuilder {
            nodes,
            mut diagnostics,
        } = self;

        let index: BTreeMap<&str, u32> = nodes
            .keys()
            .enumerate()
            .map(|(idx, id)| (id.as_str(), idx as u32))
            .collect();

        let mut adjacency_lists: Vec<Vec<u32>> = vec![Vec::new(); nodes.len()];

        for (src_idx, (id, node)) in nodes.iter().enumerate() {
            for neighbor in &node.neighbors {
                if neighbor == id {
                    diagnostics.push(Diagnostic::SelfLoop {
                        point_id: id.clone(),
                    });
                    continue;
                }

                match index.get(neighbor.as_str()) {
                    Some(&dst_idx) => {
                        adjacency_lists[src_idx].push(dst_idx);
                        adjacency_lists[dst_idx as usize].push(src_idx as u32);
                    }
                    None => diagnostics.push(Diagnostic::DanglingReference {
                        point_id: id.clone(),
                        neighbor_id: neighbor.clone(),
                    }),
                }
            }
        }

        // Create offsets and edges; duplicate declarations collapse here
        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        offsets.push(0);
        let mut edges = Vec::new();

        for list in &mut adjacency_lists {
            list.sort_unstable();
            list.dedup();
            edges.extend_from_slice(list);
            offsets.push(edges.len() as u32);
        }

        diagnostics.sort();
        diagnostics.dedup();
        for diagnostic in &diagnostics {
            log::warn!("{}", diagnostic);
        }

        let (node_ids, attributes): (Vec<String>, Vec<NodeAttributes>) = nodes
            .into_iter()
            .map(|(id, node)| (id, node.attributes))
            .unzip();

        let graph = ConnectivityGraph::from_parts(node_ids, attributes, offsets, edges);

        log::info!(
            "Built graph with {} nodes and {} edges ({} diagnostic(s))",
            graph.node_count,
            graph.edge_count(),
            diagnostics.len()
        );

        BuildOutcome { graph, diagnostics }
    }
}

/// Build an undirected graph from a list of points
pub fn build_graph(points: &[Point]) -> BuildOutcome {
    let mut builder = GraphBuilder::new();
    for point in points {
        builder.add_point(point);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_undirected_and_unique() {
        let points = vec![
            Point::new("A", &["B", "B"]),
            Point::new("B", &["A"]),
        ];
        let outcome = build_graph(&points);

        assert_eq!(outcome.graph.node_count, 2);
        assert_eq!(outcome.graph.edge_count(), 1);
        assert_eq!(outcome.graph.degree(0), 1);
        assert_eq!(outcome.graph.degree(1), 1);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_one_sided_declaration_creates_edge() {
        let outcome = build_graph(&[Point::new("A", &[]), Point::new("B", &["A"])]);
        let a = outcome.graph.index_of("A").unwrap() as usize;
        let b = outcome.graph.index_of("B").unwrap();

        assert!(outcome.graph.neighbors(a).contains(&b));
    }

    #[test]
    fn test_group_attributes_come_from_extra_fields() {
        let mut a = Point::new("A", &[]);
        a.extra.insert("comunidade".into(), serde_json::json!("Vila Nova"));
        a.extra.insert("technology".into(), serde_json::json!("Starlink"));
        let outcome = build_graph(&[a, Point::new("B", &[])]);

        let attrs = &outcome.graph.attributes[0];
        assert_eq!(attrs.community.as_deref(), Some("Vila Nova"));
        assert_eq!(attrs.technology.as_deref(), Some("Starlink"));
        assert_eq!(outcome.graph.attributes[1].community, None);
    }

    #[test]
    fn test_dangling_reference_is_skipped() {
        let outcome = build_graph(&[Point::new("A", &["ghost"])]);

        assert_eq!(outcome.graph.node_count, 1);
        assert_eq!(outcome.graph.edge_count(), 0);
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::DanglingReference {
                point_id: "A".into(),
                neighbor_id: "ghost".into(),
            }]
        );
    }

    #[test]
    fn test_self_loop_is_dropped() {
        let outcome = build_graph(&[Point::new("A", &["A"])]);

        assert_eq!(outcome.graph.edge_count(), 0);
        assert_eq!(outcome.graph.degree(0), 0);
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::SelfLoop {
                point_id: "A".into()
            }]
        );
    }

    #[test]
    fn test_duplicate_id_keeps_last_record() {
        let mut first = Point::new("A", &["B"]);
        first.name = "first".into();
        let mut second = Point::new("A", &[]);
        second.name = "second".into();

        let outcome = build_graph(&[first, Point::new("B", &[]), second]);

        assert_eq!(outcome.graph.node_count, 2);
        assert_eq!(outcome.graph.edge_count(), 0);
        assert_eq!(outcome.graph.attributes[0].name, "second");
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::DuplicateId { id: "A".into() }]
        );
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let forward = build_graph(&[
            Point::new("1", &["2", "3"]),
            Point::new("2", &["3"]),
            Point::new("3", &[]),
        ]);
        let reversed = build_graph(&[
            Point::new("3", &[]),
            Point::new("2", &["3"]),
            Point::new("1", &["3", "2"]),
        ]);

        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_empty_input() {
        let outcome = build_graph(&[]);
        assert!(outcome.graph.is_empty());
        assert_eq!(outcome.graph.edge_count(), 0);
        assert_eq!(outcome.graph.offsets, vec![0]);
    }
}
