//! Problem definitions: the routing graph and its TSP QUBO encoding.

pub mod graph;
pub mod qubo;
pub mod tsp;

pub use graph::{GraphError, RoutingGraph};
pub use qubo::{Ising, Qubo};
pub use tsp::{DEFAULT_PENALTY, TspEncoding, TspError};
