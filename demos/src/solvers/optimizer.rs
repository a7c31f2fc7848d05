//! QUBO minimization through a minimum-eigenvalue solver.

use serde::Serialize;
use tracing::info;

use super::eigensolver::{Eigenstate, MinimumEigenSolver, SolverError, sample_most_likely};
use crate::problems::Qubo;

/// Solution of a QUBO.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    /// Most likely assignment, `x[k]` for variable `k`.
    pub x: Vec<u8>,
    /// Objective value of `x`.
    pub fval: f64,
    /// Energy reported by the eigensolver.
    pub eigenvalue: f64,
    /// State reported by the eigensolver.
    #[serde(skip)]
    pub eigenstate: Eigenstate,
    /// Variational parameters, empty for exact solvers.
    pub optimal_parameters: Vec<f64>,
    /// Energy evaluations spent by the eigensolver.
    pub num_evaluations: usize,
}

/// Converts a QUBO to Ising form and hands it to a [`MinimumEigenSolver`].
#[derive(Debug, Clone)]
pub struct MinimumEigenOptimizer<S> {
    solver: S,
}

impl<S: MinimumEigenSolver> MinimumEigenOptimizer<S> {
    /// Wrap a solver.
    pub fn new(solver: S) -> Self {
        Self { solver }
    }

    /// The wrapped solver.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Minimize `qubo`.
    pub fn solve(&self, qubo: &Qubo) -> Result<OptimizationResult, SolverError> {
        let ising = qubo.to_ising();
        let result = self.solver.compute_minimum_eigenvalue(&ising)?;

        let x = sample_most_likely(&result.eigenstate)?;
        if x.len() != qubo.num_vars() {
            return Err(SolverError::MalformedEigenstate(format!(
                "{} bits for {} variables",
                x.len(),
                qubo.num_vars()
            )));
        }
        let fval = qubo.evaluate(&x);
        info!(solver = self.solver.name(), fval, eigenvalue = result.eigenvalue, "QUBO solved");

        Ok(OptimizationResult {
            x,
            fval,
            eigenvalue: result.eigenvalue,
            eigenstate: result.eigenstate,
            optimal_parameters: result.optimal_parameters,
            num_evaluations: result.num_evaluations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::{Ising, RoutingGraph, TspEncoding};
    use crate::solvers::{ExactEigensolver, MinimumEigenResult, QaoaEigensolver};

    #[test]
    fn test_exact_optimizer_solves_four_city_tour() {
        let tsp = TspEncoding::with_default_penalty(&RoutingGraph::four_cities()).unwrap();
        let result = MinimumEigenOptimizer::new(ExactEigensolver::new())
            .solve(tsp.qubo())
            .unwrap();

        assert_eq!(result.x.len(), 16);
        assert!((result.fval - 80.0).abs() < 1e-6);
        assert!((result.eigenvalue - 80.0).abs() < 1e-6);
        let route = tsp.decode_route(&result.x).unwrap();
        assert_eq!(tsp.route_cost(&route), 80.0);
    }

    #[test]
    fn test_qaoa_optimizer_returns_feasible_length() {
        let mut qubo = Qubo::new(2);
        qubo.add_linear(0, -1.0);
        qubo.add_linear(1, 1.0);
        let result = MinimumEigenOptimizer::new(QaoaEigensolver::new(1))
            .solve(&qubo)
            .unwrap();
        assert_eq!(result.x.len(), 2);
        assert_eq!(result.fval, qubo.evaluate(&result.x));
        assert!(result.num_evaluations > 0);
    }

    struct WrongWidth;

    impl MinimumEigenSolver for WrongWidth {
        fn name(&self) -> &str {
            "wrong-width"
        }

        fn compute_minimum_eigenvalue(
            &self,
            _ising: &Ising,
        ) -> Result<MinimumEigenResult, SolverError> {
            Ok(MinimumEigenResult {
                eigenvalue: 0.0,
                eigenstate: Eigenstate::Counts([("1".to_string(), 1)].into_iter().collect()),
                optimal_parameters: Vec::new(),
                num_evaluations: 0,
            })
        }
    }

    #[test]
    fn test_width_mismatch_is_malformed() {
        let err = MinimumEigenOptimizer::new(WrongWidth)
            .solve(&Qubo::new(3))
            .unwrap_err();
        assert!(matches!(err, SolverError::MalformedEigenstate(_)));
    }
}
