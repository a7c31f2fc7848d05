//! Travelling-salesman encoding of a routing graph.
//!
//! Variable `x[i·n + t]` is 1 when node `i` is visited at step `t`. The
//! objective is the tour length plus two one-hot penalties:
//!
//! ```text
//! Σ_{i≠j} w_ij Σ_t x[i,t]·x[j,t+1 mod n]
//!   + A Σ_t (1 − Σ_i x[i,t])²
//!   + A Σ_i (1 − Σ_t x[i,t])²
//! ```

use thiserror::Error;

use super::graph::RoutingGraph;
use super::qubo::Qubo;

/// Penalty weight used when none is given.
pub const DEFAULT_PENALTY: f64 = 1e5;

/// TSP encoding and decoding errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TspError {
    /// Some pair of nodes has no distance.
    #[error("graph is not complete: no edge between {0} and {1}")]
    Incomplete(usize, usize),

    /// A tour needs at least two nodes.
    #[error("a tour needs at least 2 nodes, graph has {0}")]
    TooFewNodes(usize),

    /// Penalty must be positive and finite.
    #[error("penalty must be positive and finite, got {0}")]
    InvalidPenalty(f64),

    /// Assignment length does not match `n²`.
    #[error("assignment has {got} variables, expected {expected}")]
    WrongLength {
        /// `n²`.
        expected: usize,
        /// What was passed.
        got: usize,
    },

    /// Assignment is not a permutation matrix.
    #[error("assignment is not a valid tour: {0}")]
    Infeasible(String),
}

/// A routing graph encoded as a TSP QUBO.
#[derive(Debug, Clone)]
pub struct TspEncoding {
    num_nodes: usize,
    distances: Vec<Vec<f64>>,
    penalty: f64,
    qubo: Qubo,
}

impl TspEncoding {
    /// Encode a complete graph.
    pub fn from_graph(graph: &RoutingGraph, penalty: f64) -> Result<Self, TspError> {
        let n = graph.num_nodes();
        if n < 2 {
            return Err(TspError::TooFewNodes(n));
        }
        if !(penalty.is_finite() && penalty > 0.0) {
            return Err(TspError::InvalidPenalty(penalty));
        }
        if let Some((a, b)) = graph.missing_edge() {
            return Err(TspError::Incomplete(a, b));
        }

        let mut distances = vec![vec![0.0; n]; n];
        for (a, b, w) in graph.edges() {
            distances[a][b] = w;
            distances[b][a] = w;
        }

        let var = |i: usize, t: usize| i * n + t;
        let mut qubo = Qubo::new(n * n);

        // Tour length.
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                for t in 0..n {
                    qubo.add_quadratic(var(i, t), var(j, (t + 1) % n), distances[i][j]);
                }
            }
        }

        // A(1 − Σ x)² = A − A Σ x + 2A Σ_{k<l} x_k x_l, using x² = x.
        let mut one_hot = |vars: Vec<usize>| {
            qubo.add_offset(penalty);
            for (k, &a) in vars.iter().enumerate() {
                qubo.add_linear(a, -penalty);
                for &b in &vars[k + 1..] {
                    qubo.add_quadratic(a, b, 2.0 * penalty);
                }
            }
        };
        for t in 0..n {
            one_hot((0..n).map(|i| var(i, t)).collect());
        }
        for i in 0..n {
            one_hot((0..n).map(|t| var(i, t)).collect());
        }

        Ok(Self {
            num_nodes: n,
            distances,
            penalty,
            qubo,
        })
    }

    /// Encode with [`DEFAULT_PENALTY`].
    pub fn with_default_penalty(graph: &RoutingGraph) -> Result<Self, TspError> {
        Self::from_graph(graph, DEFAULT_PENALTY)
    }

    /// Number of cities.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of binary variables (`n²`).
    pub fn num_variables(&self) -> usize {
        self.num_nodes * self.num_nodes
    }

    /// Penalty weight `A`.
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    /// The encoded objective.
    pub fn qubo(&self) -> &Qubo {
        &self.qubo
    }

    /// Visiting order of a feasible assignment.
    pub fn decode_route(&self, x: &[u8]) -> Result<Vec<usize>, TspError> {
        let n = self.num_nodes;
        if x.len() != n * n {
            return Err(TspError::WrongLength {
                expected: n * n,
                got: x.len(),
            });
        }

        let mut route = Vec::with_capacity(n);
        for t in 0..n {
            let at_step: Vec<usize> = (0..n).filter(|&i| x[i * n + t] == 1).collect();
            match at_step.as_slice() {
                [node] => route.push(*node),
                [] => return Err(TspError::Infeasible(format!("no node at step {t}"))),
                many => {
                    return Err(TspError::Infeasible(format!(
                        "nodes {many:?} all at step {t}"
                    )));
                }
            }
        }

        let mut visited = vec![false; n];
        for &node in &route {
            if std::mem::replace(&mut visited[node], true) {
                return Err(TspError::Infeasible(format!("node {node} visited twice")));
            }
        }
        Ok(route)
    }

    /// Length of the closed tour through `route`.
    pub fn route_cost(&self, route: &[usize]) -> f64 {
        route
            .iter()
            .zip(route.iter().cycle().skip(1))
            .map(|(&a, &b)| self.distances[a][b])
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One-hot assignment for a visiting order.
    fn assignment(route: &[usize]) -> Vec<u8> {
        let n = route.len();
        let mut x = vec![0u8; n * n];
        for (t, &i) in route.iter().enumerate() {
            x[i * n + t] = 1;
        }
        x
    }

    #[test]
    fn test_encoding_size() {
        let tsp = TspEncoding::with_default_penalty(&RoutingGraph::four_cities()).unwrap();
        assert_eq!(tsp.num_nodes(), 4);
        assert_eq!(tsp.num_variables(), 16);
        assert_eq!(tsp.qubo().num_vars(), 16);
        assert_eq!(tsp.penalty(), DEFAULT_PENALTY);
    }

    #[test]
    fn test_feasible_tour_objective_equals_length() {
        let tsp = TspEncoding::with_default_penalty(&RoutingGraph::four_cities()).unwrap();
        for route in [[0, 1, 3, 2], [0, 1, 2, 3], [2, 0, 1, 3]] {
            let x = assignment(&route);
            assert_eq!(tsp.qubo().evaluate(&x), tsp.route_cost(&route));
        }
        assert_eq!(tsp.route_cost(&[0, 1, 3, 2]), 80.0);
        assert_eq!(tsp.route_cost(&[0, 1, 2, 3]), 95.0);
    }

    #[test]
    fn test_infeasible_assignment_is_penalized() {
        let tsp = TspEncoding::with_default_penalty(&RoutingGraph::four_cities()).unwrap();
        let empty = vec![0u8; 16];
        assert_eq!(tsp.qubo().evaluate(&empty), 8.0 * DEFAULT_PENALTY);
    }

    #[test]
    fn test_decode_route() {
        let tsp = TspEncoding::with_default_penalty(&RoutingGraph::four_cities()).unwrap();
        assert_eq!(
            tsp.decode_route(&assignment(&[2, 0, 3, 1])).unwrap(),
            vec![2, 0, 3, 1]
        );

        let mut twice = assignment(&[0, 1, 2, 3]);
        twice[3] = 1; // node 0 also at step 3
        twice[15] = 0;
        assert!(matches!(
            tsp.decode_route(&twice),
            Err(TspError::Infeasible(_))
        ));

        assert!(matches!(
            tsp.decode_route(&[1, 0]),
            Err(TspError::WrongLength { expected: 16, got: 2 })
        ));
    }

    #[test]
    fn test_incomplete_graph_is_rejected() {
        let path = RoutingGraph::from_edges(&[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
        assert_eq!(
            TspEncoding::with_default_penalty(&path).unwrap_err(),
            TspError::Incomplete(0, 2)
        );
    }

    #[test]
    fn test_bad_penalty_is_rejected() {
        let graph = RoutingGraph::four_cities();
        assert!(matches!(
            TspEncoding::from_graph(&graph, 0.0),
            Err(TspError::InvalidPenalty(_))
        ));
        assert!(matches!(
            TspEncoding::from_graph(&graph, f64::NAN),
            Err(TspError::InvalidPenalty(_))
        ));
    }
}
