//! Minimum-eigenvalue solvers for diagonal Ising Hamiltonians.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, instrument};

use qsolve_adapter_sim::Statevector;

use crate::optimizers::{Cobyla, Optimizer};
use crate::problems::Ising;

/// Largest register either solver will expand into a dense vector.
pub const DEFAULT_MAX_QUBITS: usize = 20;

/// Solver and decoding errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// The eigenstate cannot be read as a bit assignment.
    #[error("malformed eigenstate: {0}")]
    MalformedEigenstate(String),

    /// The Hamiltonian is too large for a dense statevector.
    #[error("{num_qubits} qubits exceeds the solver limit of {max}")]
    TooManyQubits {
        /// Qubits required.
        num_qubits: usize,
        /// Configured limit.
        max: usize,
    },

    /// A QAOA solver needs at least one layer.
    #[error("QAOA needs at least one layer")]
    NoLayers,

    /// An explicit initial point has the wrong length.
    #[error("initial point has {got} angles, expected {expected}")]
    InitialPointLength {
        /// `2 · reps`.
        expected: usize,
        /// What was given.
        got: usize,
    },
}

/// State reached by a solver.
#[derive(Debug, Clone, PartialEq)]
pub enum Eigenstate {
    /// Dense amplitudes, indexed little-endian.
    Amplitudes(Vec<Complex64>),
    /// Sampled bitstrings, bit 0 rightmost.
    Counts(BTreeMap<String, u64>),
}

/// What a [`MinimumEigenSolver`] returns.
#[derive(Debug, Clone)]
pub struct MinimumEigenResult {
    /// Lowest energy found (including the Hamiltonian's offset).
    pub eigenvalue: f64,
    /// State attaining it.
    pub eigenstate: Eigenstate,
    /// Variational parameters, empty for exact solvers.
    pub optimal_parameters: Vec<f64>,
    /// Energy evaluations spent.
    pub num_evaluations: usize,
}

/// Finds the lowest eigenvalue of a diagonal Hamiltonian.
pub trait MinimumEigenSolver {
    /// Short solver name for logs and reports.
    fn name(&self) -> &str;

    /// Compute the minimum eigenvalue and a state attaining it.
    fn compute_minimum_eigenvalue(&self, ising: &Ising) -> Result<MinimumEigenResult, SolverError>;
}

fn check_size(num_qubits: usize, max: usize) -> Result<(), SolverError> {
    if num_qubits > max {
        return Err(SolverError::TooManyQubits { num_qubits, max });
    }
    Ok(())
}

/// Brute-force minimum over every basis state.
#[derive(Debug, Clone)]
pub struct ExactEigensolver {
    max_qubits: usize,
}

impl Default for ExactEigensolver {
    fn default() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }
}

impl ExactEigensolver {
    /// Solver with the default size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the size limit.
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }
}

impl MinimumEigenSolver for ExactEigensolver {
    fn name(&self) -> &str {
        "exact"
    }

    #[instrument(skip_all, fields(num_qubits = ising.num_qubits))]
    fn compute_minimum_eigenvalue(&self, ising: &Ising) -> Result<MinimumEigenResult, SolverError> {
        check_size(ising.num_qubits, self.max_qubits)?;
        let energies = ising.diagonal();

        // Lowest index wins ties.
        let (index, eigenvalue) = energies
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (i, e)| if e < best.1 { (i, e) } else { best });

        let mut amplitudes = vec![Complex64::new(0.0, 0.0); energies.len()];
        amplitudes[index] = Complex64::new(1.0, 0.0);
        debug!(index, eigenvalue, "exact minimum");

        Ok(MinimumEigenResult {
            eigenvalue,
            eigenstate: Eigenstate::Amplitudes(amplitudes),
            optimal_parameters: Vec::new(),
            num_evaluations: energies.len(),
        })
    }
}

/// QAOA on the statevector simulator with COBYLA-style angle search.
///
/// Parameters are laid out as `[γ₀ … γₚ₋₁, β₀ … βₚ₋₁]`. Without an explicit
/// initial point the search starts from a linear ramp, or from a random point
/// when a seed is set.
#[derive(Debug, Clone)]
pub struct QaoaEigensolver {
    reps: usize,
    optimizer: Cobyla,
    initial_point: Option<Vec<f64>>,
    seed: Option<u64>,
    max_qubits: usize,
}

impl Default for QaoaEigensolver {
    fn default() -> Self {
        Self::new(1)
    }
}

impl QaoaEigensolver {
    /// Solver with `reps` cost/mixer layers.
    pub fn new(reps: usize) -> Self {
        Self {
            reps,
            optimizer: Cobyla::new(),
            initial_point: None,
            seed: None,
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }

    /// Number of layers.
    pub fn reps(&self) -> usize {
        self.reps
    }

    /// Replace the optimizer.
    pub fn with_optimizer(mut self, optimizer: Cobyla) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Start the search from these angles.
    pub fn with_initial_point(mut self, point: Vec<f64>) -> Self {
        self.initial_point = Some(point);
        self
    }

    /// Draw the starting angles from a seeded generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Change the size limit.
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    fn initial_point(&self) -> Result<Vec<f64>, SolverError> {
        let p = self.reps;
        if let Some(point) = &self.initial_point {
            if point.len() != 2 * p {
                return Err(SolverError::InitialPointLength {
                    expected: 2 * p,
                    got: point.len(),
                });
            }
            return Ok(point.clone());
        }

        Ok(match self.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..2 * p).map(|_| rng.gen_range(0.0..PI)).collect()
            }
            None => {
                let ramp = |k: usize| (k as f64 + 0.5) / p as f64;
                let gammas = (0..p).map(|k| 0.75 * ramp(k));
                let betas = (0..p).map(|k| 0.75 * (1.0 - ramp(k)));
                gammas.chain(betas).collect()
            }
        })
    }

    /// State prepared by the ansatz at `params`.
    pub fn prepare(&self, energies: &[f64], num_qubits: usize, params: &[f64]) -> Statevector {
        let (gammas, betas) = params.split_at(params.len() / 2);
        let mut state = Statevector::new(num_qubits);
        state.h_all();
        for (&gamma, &beta) in gammas.iter().zip(betas) {
            state.apply_diagonal_evolution(energies, gamma);
            state.rx_all(2.0 * beta);
        }
        state
    }
}

impl MinimumEigenSolver for QaoaEigensolver {
    fn name(&self) -> &str {
        "qaoa"
    }

    #[instrument(skip_all, fields(num_qubits = ising.num_qubits, reps = self.reps))]
    fn compute_minimum_eigenvalue(&self, ising: &Ising) -> Result<MinimumEigenResult, SolverError> {
        if self.reps == 0 {
            return Err(SolverError::NoLayers);
        }
        check_size(ising.num_qubits, self.max_qubits)?;

        let n = ising.num_qubits;
        let energies = ising.diagonal();
        let initial = self.initial_point()?;

        let minimum = self.optimizer.minimize(
            |params| self.prepare(&energies, n, params).expectation_diagonal(&energies),
            initial,
        );
        info!(
            energy = minimum.value,
            evaluations = minimum.num_evaluations,
            converged = minimum.converged,
            "QAOA angles optimized"
        );

        let state = self.prepare(&energies, n, &minimum.params);
        Ok(MinimumEigenResult {
            eigenvalue: minimum.value,
            eigenstate: Eigenstate::Amplitudes(state.into_amplitudes()),
            optimal_parameters: minimum.params,
            num_evaluations: minimum.num_evaluations,
        })
    }
}

/// Most probable bit assignment of an eigenstate, `x[k]` being qubit `k`.
///
/// Ties go to the lowest basis index, or the lexicographically smallest
/// bitstring for counts.
pub fn sample_most_likely(eigenstate: &Eigenstate) -> Result<Vec<u8>, SolverError> {
    match eigenstate {
        Eigenstate::Amplitudes(amplitudes) => {
            let len = amplitudes.len();
            if len == 0 {
                return Err(SolverError::MalformedEigenstate("no amplitudes".into()));
            }
            if !len.is_power_of_two() {
                return Err(SolverError::MalformedEigenstate(format!(
                    "{len} amplitudes is not a power of two"
                )));
            }
            let n = len.trailing_zeros() as usize;

            let mut best = (0, f64::NEG_INFINITY);
            for (i, amp) in amplitudes.iter().enumerate() {
                let p = amp.norm_sqr();
                if p > best.1 {
                    best = (i, p);
                }
            }
            Ok((0..n).map(|k| ((best.0 >> k) & 1) as u8).collect())
        }
        Eigenstate::Counts(counts) => {
            let mut width = None;
            let mut best: Option<(&str, u64)> = None;
            for (bits, &count) in counts {
                if bits.is_empty() || bits.bytes().any(|b| b != b'0' && b != b'1') {
                    return Err(SolverError::MalformedEigenstate(format!(
                        "'{bits}' is not a bitstring"
                    )));
                }
                if *width.get_or_insert(bits.len()) != bits.len() {
                    return Err(SolverError::MalformedEigenstate(format!(
                        "'{bits}' does not have width {}",
                        width.unwrap_or_default()
                    )));
                }
                if best.is_none_or(|(_, c)| count > c) {
                    best = Some((bits, count));
                }
            }
            let (bits, _) =
                best.ok_or_else(|| SolverError::MalformedEigenstate("no counts".into()))?;
            Ok(bits.bytes().rev().map(|b| b - b'0').collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::Qubo;

    fn small_ising() -> Ising {
        // Minimum at x = [1, 0, 1] with value -4.
        let mut qubo = Qubo::new(3);
        qubo.add_linear(0, -2.0);
        qubo.add_linear(1, 1.0);
        qubo.add_linear(2, -1.0);
        qubo.add_quadratic(0, 2, -1.0);
        qubo.add_quadratic(0, 1, 2.0);
        qubo.to_ising()
    }

    #[test]
    fn test_exact_solver_finds_minimum() {
        let result = ExactEigensolver::new()
            .compute_minimum_eigenvalue(&small_ising())
            .unwrap();
        assert!((result.eigenvalue + 4.0).abs() < 1e-9);
        assert_eq!(sample_most_likely(&result.eigenstate).unwrap(), vec![1, 0, 1]);
        assert!(result.optimal_parameters.is_empty());
    }

    #[test]
    fn test_qaoa_solver_does_not_exceed_start_energy() {
        let ising = small_ising();
        let solver = QaoaEigensolver::new(2);
        let start = solver.initial_point().unwrap();
        let energies = ising.diagonal();
        let start_energy = solver.prepare(&energies, 3, &start).expectation_diagonal(&energies);

        let result = solver.compute_minimum_eigenvalue(&ising).unwrap();
        assert_eq!(result.optimal_parameters.len(), 4);
        assert!(result.eigenvalue <= start_energy + 1e-12);
        // A variational energy can never undercut the true minimum.
        assert!(result.eigenvalue >= -4.0 - 1e-9);
    }

    #[test]
    fn test_qaoa_seeded_start_is_reproducible() {
        let a = QaoaEigensolver::new(1).with_seed(7).initial_point().unwrap();
        let b = QaoaEigensolver::new(1).with_seed(7).initial_point().unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|x| (0.0..PI).contains(x)));
    }

    #[test]
    fn test_qaoa_rejects_bad_configuration() {
        let ising = small_ising();
        assert_eq!(
            QaoaEigensolver::new(0).compute_minimum_eigenvalue(&ising).unwrap_err(),
            SolverError::NoLayers
        );
        assert_eq!(
            QaoaEigensolver::new(1)
                .with_initial_point(vec![0.1])
                .compute_minimum_eigenvalue(&ising)
                .unwrap_err(),
            SolverError::InitialPointLength { expected: 2, got: 1 }
        );
        assert!(matches!(
            ExactEigensolver::new()
                .with_max_qubits(2)
                .compute_minimum_eigenvalue(&ising),
            Err(SolverError::TooManyQubits { num_qubits: 3, max: 2 })
        ));
    }

    #[test]
    fn test_sample_most_likely_amplitudes() {
        let mut amps = vec![Complex64::new(0.1, 0.0); 8];
        amps[0b110] = Complex64::new(0.0, 0.9);
        let x = sample_most_likely(&Eigenstate::Amplitudes(amps)).unwrap();
        assert_eq!(x, vec![0, 1, 1]);
    }

    #[test]
    fn test_sample_most_likely_counts() {
        let counts = BTreeMap::from([("011".to_string(), 40), ("100".to_string(), 60)]);
        assert_eq!(
            sample_most_likely(&Eigenstate::Counts(counts)).unwrap(),
            vec![0, 0, 1]
        );
    }

    #[test]
    fn test_sample_most_likely_rejects_malformed() {
        let malformed = [
            Eigenstate::Amplitudes(Vec::new()),
            Eigenstate::Amplitudes(vec![Complex64::new(1.0, 0.0); 3]),
            Eigenstate::Counts(BTreeMap::new()),
            Eigenstate::Counts(BTreeMap::from([("01".to_string(), 1), ("1".to_string(), 2)])),
            Eigenstate::Counts(BTreeMap::from([("0x1".to_string(), 1)])),
        ];
        for state in &malformed {
            assert!(
                matches!(sample_most_likely(state), Err(SolverError::MalformedEigenstate(_))),
                "{state:?}"
            );
        }
    }
}
