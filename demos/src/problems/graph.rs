//! Weighted routing graph.
//!
//! Nodes are `0..n` and map one-to-one onto qubits. Edges are undirected and
//! carry a distance. Construction rejects anything that would make that
//! mapping ambiguous: edges naming nodes outside the range, self loops,
//! repeated edges and (for [`RoutingGraph::from_edges`]) gaps in the node
//! numbering.

use std::fmt;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Graph construction errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// An edge names a node outside `0..num_nodes`.
    #[error("edge ({a}, {b}) names a node outside 0..{num_nodes}")]
    NodeOutOfRange {
        /// First endpoint.
        a: usize,
        /// Second endpoint.
        b: usize,
        /// Declared node count.
        num_nodes: usize,
    },

    /// Edge from a node to itself.
    #[error("self loop on node {0}")]
    SelfLoop(usize),

    /// The same node pair appears twice.
    #[error("duplicate edge ({0}, {1})")]
    DuplicateEdge(usize, usize),

    /// Node numbering skips an index.
    #[error("node {missing} does not appear in any edge; nodes must be numbered 0..{num_nodes} without gaps")]
    NonContiguous {
        /// First unused index.
        missing: usize,
        /// Inferred node count.
        num_nodes: usize,
    },

    /// Edge weight is NaN or infinite.
    #[error("edge ({a}, {b}) has non-finite weight {weight}")]
    InvalidWeight {
        /// First endpoint.
        a: usize,
        /// Second endpoint.
        b: usize,
        /// The offending weight.
        weight: f64,
    },

    /// A graph needs at least one node.
    #[error("graph has no nodes")]
    Empty,

    /// A relabeling is not a permutation of `0..n`.
    #[error("relabeling is not a permutation of 0..{0}")]
    InvalidPermutation(usize),
}

/// An undirected weighted graph over nodes `0..n`.
#[derive(Debug, Clone)]
pub struct RoutingGraph {
    graph: UnGraph<(), f64>,
}

/// Plain edge-list form, used for (de)serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EdgeList {
    num_nodes: usize,
    edges: Vec<(usize, usize, f64)>,
}

impl RoutingGraph {
    /// Build a graph with an explicit node count. Isolated nodes are allowed.
    pub fn with_nodes(num_nodes: usize, edges: &[(usize, usize, f64)]) -> Result<Self, GraphError> {
        if num_nodes == 0 {
            return Err(GraphError::Empty);
        }

        let mut graph = UnGraph::with_capacity(num_nodes, edges.len());
        for _ in 0..num_nodes {
            graph.add_node(());
        }

        for &(a, b, weight) in edges {
            if a >= num_nodes || b >= num_nodes {
                return Err(GraphError::NodeOutOfRange { a, b, num_nodes });
            }
            if a == b {
                return Err(GraphError::SelfLoop(a));
            }
            if !weight.is_finite() {
                return Err(GraphError::InvalidWeight { a, b, weight });
            }
            let (na, nb) = (NodeIndex::new(a), NodeIndex::new(b));
            if graph.find_edge(na, nb).is_some() {
                return Err(GraphError::DuplicateEdge(a.min(b), a.max(b)));
            }
            graph.add_edge(na, nb, weight);
        }

        Ok(Self { graph })
    }

    /// Build a graph whose node count is inferred from the edges.
    ///
    /// Every index in `0..=max` must appear in some edge.
    pub fn from_edges(edges: &[(usize, usize, f64)]) -> Result<Self, GraphError> {
        let num_nodes = edges
            .iter()
            .map(|&(a, b, _)| a.max(b) + 1)
            .max()
            .ok_or(GraphError::Empty)?;

        let mut seen = vec![false; num_nodes];
        for &(a, b, _) in edges {
            seen[a] = true;
            seen[b] = true;
        }
        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(GraphError::NonContiguous { missing, num_nodes });
        }

        Self::with_nodes(num_nodes, edges)
    }

    /// The four-city instance used by the routing demo.
    ///
    /// ```text
    ///   0 ──10── 1
    ///   │ ╲    ╱ │
    ///  20  15 25 35
    ///   │ ╱    ╲ │
    ///   3 ──30── 2
    /// ```
    pub fn four_cities() -> Self {
        // Literal edge list; validation cannot fail.
        let edges = [
            (0, 1, 10.0),
            (0, 2, 15.0),
            (0, 3, 20.0),
            (1, 2, 35.0),
            (1, 3, 25.0),
            (2, 3, 30.0),
        ];
        let mut graph = UnGraph::with_capacity(4, edges.len());
        let nodes: Vec<_> = (0..4).map(|_| graph.add_node(())).collect();
        for (a, b, w) in edges {
            graph.add_edge(nodes[a], nodes[b], w);
        }
        Self { graph }
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edges as `(a, b, weight)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
    }

    /// Weight of the edge between `a` and `b`.
    pub fn weight(&self, a: usize, b: usize) -> Option<f64> {
        if a >= self.num_nodes() || b >= self.num_nodes() {
            return None;
        }
        self.graph
            .find_edge(NodeIndex::new(a), NodeIndex::new(b))
            .map(|e| self.graph[e])
    }

    /// Check for an edge between `a` and `b`.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.weight(a, b).is_some()
    }

    /// First node pair without an edge, if any.
    pub fn missing_edge(&self) -> Option<(usize, usize)> {
        let n = self.num_nodes();
        (0..n)
            .flat_map(|a| (a + 1..n).map(move |b| (a, b)))
            .find(|&(a, b)| !self.has_edge(a, b))
    }

    /// Check whether every pair of nodes is connected.
    pub fn is_complete(&self) -> bool {
        self.missing_edge().is_none()
    }

    /// Rename node `i` to `perm[i]`.
    pub fn relabel(&self, perm: &[usize]) -> Result<Self, GraphError> {
        let n = self.num_nodes();
        let mut seen = vec![false; n];
        if perm.len() != n {
            return Err(GraphError::InvalidPermutation(n));
        }
        for &p in perm {
            if p >= n || std::mem::replace(&mut seen[p], true) {
                return Err(GraphError::InvalidPermutation(n));
            }
        }

        let edges: Vec<_> = self
            .edges()
            .map(|(a, b, w)| (perm[a], perm[b], w))
            .collect();
        Self::with_nodes(n, &edges)
    }

    /// The underlying petgraph graph.
    pub fn inner(&self) -> &UnGraph<(), f64> {
        &self.graph
    }
}

impl fmt::Display for RoutingGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Graph: {} nodes, {} edges",
            self.num_nodes(),
            self.num_edges()
        )?;
        for (a, b, w) in self.edges() {
            writeln!(f, "  {a} ── {b}  (w = {w})")?;
        }
        Ok(())
    }
}

impl Serialize for RoutingGraph {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EdgeList {
            num_nodes: self.num_nodes(),
            edges: self.edges().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RoutingGraph {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = EdgeList::deserialize(deserializer)?;
        Self::with_nodes(list.num_nodes, &list.edges).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_cities() {
        let graph = RoutingGraph::four_cities();
        assert_eq!(graph.num_nodes(), 4);
        assert_eq!(graph.num_edges(), 6);
        assert!(graph.is_complete());
        assert_eq!(graph.weight(1, 3), Some(25.0));
        assert_eq!(graph.weight(3, 1), Some(25.0));
    }

    #[test]
    fn test_from_edges_infers_node_count() {
        let graph = RoutingGraph::from_edges(&[(0, 1, 1.0), (1, 2, 2.0)]).unwrap();
        assert_eq!(graph.num_nodes(), 3);
        assert!(!graph.is_complete());
        assert_eq!(graph.missing_edge(), Some((0, 2)));
    }

    #[test]
    fn test_gap_in_numbering_is_rejected() {
        let err = RoutingGraph::from_edges(&[(0, 1, 1.0), (1, 3, 1.0)]).unwrap_err();
        assert_eq!(
            err,
            GraphError::NonContiguous {
                missing: 2,
                num_nodes: 4
            }
        );
    }

    #[test]
    fn test_out_of_range_edge_is_rejected() {
        let err = RoutingGraph::with_nodes(3, &[(0, 1, 1.0), (2, 5, 1.0)]).unwrap_err();
        assert!(matches!(err, GraphError::NodeOutOfRange { b: 5, .. }));
    }

    #[test]
    fn test_self_loop_and_duplicates_are_rejected() {
        assert_eq!(
            RoutingGraph::with_nodes(2, &[(1, 1, 1.0)]).unwrap_err(),
            GraphError::SelfLoop(1)
        );
        assert_eq!(
            RoutingGraph::with_nodes(2, &[(0, 1, 1.0), (1, 0, 2.0)]).unwrap_err(),
            GraphError::DuplicateEdge(0, 1)
        );
    }

    #[test]
    fn test_empty_graph_is_rejected() {
        assert_eq!(RoutingGraph::from_edges(&[]).unwrap_err(), GraphError::Empty);
        assert_eq!(RoutingGraph::with_nodes(0, &[]).unwrap_err(), GraphError::Empty);
    }

    #[test]
    fn test_relabel_preserves_weights() {
        let graph = RoutingGraph::four_cities();
        let relabeled = graph.relabel(&[3, 2, 1, 0]).unwrap();
        assert_eq!(relabeled.num_edges(), 6);
        assert_eq!(relabeled.weight(3, 2), Some(10.0));
        assert_eq!(relabeled.weight(0, 1), Some(30.0));

        assert!(graph.relabel(&[0, 0, 1, 2]).is_err());
        assert!(graph.relabel(&[0, 1]).is_err());
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let json = serde_json::to_string(&RoutingGraph::four_cities()).unwrap();
        let back: RoutingGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back.num_edges(), 6);

        let bad = r#"{"num_nodes": 2, "edges": [[0, 4, 1.0]]}"#;
        assert!(serde_json::from_str::<RoutingGraph>(bad).is_err());
    }
}
