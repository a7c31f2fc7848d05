//! Classical optimizers for variational angles.

mod cobyla;

pub use cobyla::Cobyla;

/// Outcome of a minimization.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Best parameters found.
    pub params: Vec<f64>,
    /// Objective value at `params`.
    pub value: f64,
    /// Objective evaluations spent.
    pub num_evaluations: usize,
    /// Outer iterations run.
    pub num_iterations: usize,
    /// Best value after each improvement, starting with the initial point.
    pub history: Vec<f64>,
    /// Whether the stopping tolerance was reached before `maxiter`.
    pub converged: bool,
}

/// A derivative-free minimizer.
pub trait Optimizer {
    /// Minimize `objective` starting from `initial`.
    fn minimize<F>(&self, objective: F, initial: Vec<f64>) -> Minimum
    where
        F: FnMut(&[f64]) -> f64;
}
