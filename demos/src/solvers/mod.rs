//! Minimum-eigenvalue solvers and the QUBO optimizer built on them.

mod eigensolver;
mod optimizer;

pub use eigensolver::{
    DEFAULT_MAX_QUBITS, Eigenstate, ExactEigensolver, MinimumEigenResult, MinimumEigenSolver,
    QaoaEigensolver, SolverError, sample_most_likely,
};
pub use optimizer::{MinimumEigenOptimizer, OptimizationResult};
