//! Simulator backend implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use qsolve_hal::{
    Backend, Capabilities, Counts, ExecutionResult, HalError, HalResult, Job, JobId, JobStatus,
    ValidationResult,
};
use qsolve_ir::{Circuit, ClbitId, QubitId};

use crate::statevector::Statevector;

const DEFAULT_MAX_QUBITS: u32 = 20;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local noiseless statevector simulator.
///
/// The circuit is evolved once and every shot is drawn from the final
/// distribution. With a seed, identical submissions produce identical counts.
pub struct SimulatorBackend {
    capabilities: Capabilities,
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    seed: Option<u64>,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self {
            capabilities: Capabilities::simulator(max_qubits),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            seed: None,
        }
    }

    /// Seed the sampler so repeated runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The configured seed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn check(&self, circuit: &Circuit) -> Vec<String> {
        let mut reasons = Vec::new();
        let max_qubits = self.capabilities.num_qubits as usize;
        if circuit.num_qubits() > max_qubits {
            reasons.push(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                max_qubits
            ));
        }
        if circuit.measurement_map().is_empty() {
            reasons.push("Circuit has no measurements".into());
        }
        reasons
    }

    /// Run simulation synchronously.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> ExecutionResult {
        let start = Instant::now();
        debug!(
            "Starting simulation: {} qubits, {} shots",
            circuit.num_qubits(),
            shots
        );

        let sv = Statevector::from_circuit(circuit);
        let map = circuit.measurement_map();
        let width = circuit.num_clbits();

        let mut rng = self.rng();
        let mut counts = Counts::new();
        for outcome in sv.sample_many(shots, &mut rng) {
            counts.insert(outcome_to_bitstring(outcome, &map, width), 1);
        }

        let elapsed = start.elapsed();
        debug!(distinct = counts.len(), "Simulation completed in {:?}", elapsed);

        ExecutionResult::new(counts, shots).with_execution_time(elapsed.as_millis() as u64)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Project a basis state onto the classical register.
///
/// Classical bit 0 is the rightmost character; unmeasured bits read `0`. A
/// later measurement into the same clbit overwrites an earlier one.
pub(crate) fn outcome_to_bitstring(
    outcome: usize,
    map: &[(QubitId, ClbitId)],
    width: usize,
) -> String {
    let mut bits = vec![b'0'; width];
    for (q, c) in map {
        let value = (outcome >> q.index()) & 1;
        bits[width - 1 - c.index()] = if value == 1 { b'1' } else { b'0' };
    }
    bits.into_iter().map(char::from).collect()
}

/// Exact probability of each classical outcome, without sampling.
pub fn outcome_probabilities(circuit: &Circuit) -> BTreeMap<String, f64> {
    let sv = Statevector::from_circuit(circuit);
    let map = circuit.measurement_map();
    let width = circuit.num_clbits();

    let mut probs = BTreeMap::new();
    for (outcome, p) in sv.probabilities().into_iter().enumerate() {
        if p > 1e-12 {
            *probs
                .entry(outcome_to_bitstring(outcome, &map, width))
                .or_insert(0.0) += p;
        }
    }
    probs
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.capabilities.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let reasons = self.check(circuit);
        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} (allowed 1..={})",
                self.capabilities.max_shots
            )));
        }
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }
        if circuit.measurement_map().is_empty() {
            return Err(HalError::InvalidCircuit("Circuit has no measurements".into()));
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), shots).with_backend(self.name());

        {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            jobs.insert(job_id.0.clone(), SimJob { job, result: None });
        }

        debug!("Submitted job: {}", job_id);

        let result = self.run_simulation(circuit, shots);

        {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(sim_job) = jobs.get_mut(&job_id.0) {
                sim_job.result = Some(result);
                sim_job.job.transition(JobStatus::Running);
                sim_job.job.transition(JobStatus::Completed);
            }
        }

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id.0)
            .and_then(|j| j.result.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bell() -> Circuit {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure_all().unwrap();
        circuit
    }

    #[test]
    fn test_simulator_capabilities() {
        let backend = SimulatorBackend::new();
        let caps = backend.capabilities();
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
    }

    #[test]
    fn test_bitstring_puts_clbit_zero_rightmost() {
        let map = [(QubitId(0), ClbitId(0)), (QubitId(1), ClbitId(1))];
        // Only qubit 0 set.
        assert_eq!(outcome_to_bitstring(0b01, &map, 2), "01");
        assert_eq!(outcome_to_bitstring(0b10, &map, 2), "10");

        // Crossed wiring: qubit 0 lands in clbit 2.
        let crossed = [(QubitId(0), ClbitId(2))];
        assert_eq!(outcome_to_bitstring(0b1, &crossed, 3), "100");
    }

    #[tokio::test]
    async fn test_simulator_bell_state() {
        let backend = SimulatorBackend::new();
        let job_id = backend.submit(&bell(), 1000).await.unwrap();

        assert_eq!(backend.status(&job_id).await.unwrap(), JobStatus::Completed);

        let result = backend.result(&job_id).await.unwrap();
        assert_eq!(result.shots, 1000);
        let counts = &result.counts;
        assert_eq!(counts.get("00") + counts.get("11"), 1000);
        assert_eq!(counts.get("01") + counts.get("10"), 0);
    }

    #[tokio::test]
    async fn test_seeded_runs_are_identical() {
        let backend = SimulatorBackend::new().with_seed(7);
        let a = backend.submit(&bell(), 500).await.unwrap();
        let b = backend.submit(&bell(), 500).await.unwrap();

        let ra = backend.wait(&a).await.unwrap();
        let rb = backend.wait(&b).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(ra.counts, rb.counts);
    }

    #[tokio::test]
    async fn test_simulator_too_many_qubits() {
        let backend = SimulatorBackend::with_max_qubits(5);

        let mut circuit = Circuit::with_size("test", 10, 10);
        circuit.measure_all().unwrap();
        let result = backend.submit(&circuit, 100).await;
        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));

        let validation = backend.validate(&circuit).await.unwrap();
        assert!(!validation.is_valid());
    }

    #[tokio::test]
    async fn test_rejects_unmeasured_circuit_and_zero_shots() {
        let backend = SimulatorBackend::new();
        let circuit = Circuit::with_size("empty", 1, 1);
        assert!(matches!(
            backend.submit(&circuit, 10).await,
            Err(HalError::InvalidCircuit(_))
        ));
        assert!(matches!(
            backend.submit(&bell(), 0).await,
            Err(HalError::InvalidShots(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let backend = SimulatorBackend::new();
        let missing = JobId::new("nope");
        assert!(matches!(
            backend.status(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
        assert!(matches!(
            backend.result(&missing).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[test]
    fn test_builder_sets_width_and_seed() {
        let backend = SimulatorBackend::with_max_qubits(8).with_seed(99);
        assert_eq!(backend.capabilities().num_qubits, 8);
        assert_eq!(backend.seed(), Some(99));
        assert_eq!(backend.name(), "simulator");
    }

    #[test]
    fn test_outcome_probabilities_are_exact() {
        let probs = outcome_probabilities(&bell());
        assert_eq!(probs.len(), 2);
        assert!((probs["00"] - 0.5).abs() < 1e-12);
        assert!((probs["11"] - 0.5).abs() < 1e-12);
    }
}
