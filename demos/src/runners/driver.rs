//! Execution driver: pick a backend, submit, block, check the histogram.

use tracing::{info, instrument};

use qsolve_adapter_sim::SimulatorBackend;
use qsolve_hal::{
    Backend, BackendFilter, BackendProvider, DeviceDescriptor, ExecutionResult, HalResult,
    Session, WaitPolicy,
};
use qsolve_ir::Circuit;

use super::report::Histogram;
use crate::error::DemoResult;
use crate::job_spinner;

/// Shots for the Deutsch-Jozsa pipeline.
pub const DEUTSCH_JOZSA_SHOTS: u32 = 1024;

/// Shots for the QAOA routing pipeline.
pub const QAOA_SHOTS: u32 = 1000;

/// A finished run.
#[derive(Debug, Clone)]
pub struct Run {
    /// Backend that executed the circuit.
    pub backend: String,
    /// Raw backend result.
    pub result: ExecutionResult,
    /// Checked histogram.
    pub histogram: Histogram,
}

/// Filter for the Deutsch-Jozsa device: real hardware, operational, with at
/// least `min_qubits` qubits.
pub fn hardware_filter(min_qubits: u32) -> BackendFilter {
    BackendFilter::new()
        .min_qubits(min_qubits)
        .hardware_only()
        .operational_only()
}

/// The local noiseless simulator, optionally seeded.
pub fn local_simulator(seed: Option<u64>) -> SimulatorBackend {
    match seed {
        Some(seed) => SimulatorBackend::new().with_seed(seed),
        None => SimulatorBackend::new(),
    }
}

/// Select the least busy matching device and open a backend on it.
pub async fn select_backend(
    provider: &dyn BackendProvider,
    session: &Session,
    filter: &BackendFilter,
) -> HalResult<(DeviceDescriptor, Box<dyn Backend>)> {
    let device = provider.select(session, filter).await?;
    let backend = provider.open(session, &device).await?;
    Ok((device, backend))
}

/// Submit `circuit` and wait for its result under a spinner.
#[instrument(skip(backend, circuit, policy), fields(backend = backend.name(), circuit = circuit.name()))]
pub async fn run_on(
    backend: &dyn Backend,
    circuit: &Circuit,
    shots: u32,
    policy: WaitPolicy,
) -> HalResult<ExecutionResult> {
    let spinner = job_spinner("Submitting job...");

    let job_id = backend.submit(circuit, shots).await?;
    info!(job = %job_id, "submitted");
    spinner.set_message(format!("Running job {job_id} on {}...", backend.name()));

    let outcome = backend.wait_with(&job_id, policy).await;
    spinner.finish_and_clear();
    outcome
}

/// [`run_on`], then check the counts against `shots` and the register width.
pub async fn execute(
    backend: &dyn Backend,
    circuit: &Circuit,
    shots: u32,
    policy: WaitPolicy,
) -> DemoResult<Run> {
    let result = run_on(backend, circuit, shots, policy).await?;
    let histogram = Histogram::from_result(&result, shots, circuit.num_clbits())?;
    Ok(Run {
        backend: backend.name().to_string(),
        result,
        histogram,
    })
}

/// Run on the least busy device of `provider` that passes
/// [`hardware_filter`] for the circuit's width.
pub async fn execute_on_least_busy(
    provider: &dyn BackendProvider,
    session: &Session,
    circuit: &Circuit,
    shots: u32,
    policy: WaitPolicy,
) -> DemoResult<Run> {
    let filter = hardware_filter(circuit.num_qubits() as u32);
    let (device, backend) = select_backend(provider, session, &filter).await?;
    info!(device = %device.name, pending_jobs = device.pending_jobs, "running on hardware");
    execute(backend.as_ref(), circuit, shots, policy).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::{PhaseOracle, phase_oracle_circuit, routing_circuit};
    use crate::problems::RoutingGraph;
    use qsolve_hal::{HalError, StaticProvider};

    fn fleet() -> StaticProvider {
        StaticProvider::new(
            "fixture",
            vec![
                DeviceDescriptor::new("sim_big", 32).simulator(),
                DeviceDescriptor::new("ibm_tiny", 2),
                DeviceDescriptor::new("ibm_busy", 7).with_pending_jobs(40),
                DeviceDescriptor::new("ibm_quiet", 5).with_pending_jobs(2),
                DeviceDescriptor::new("ibm_down", 27).offline("maintenance"),
            ],
        )
        .with_backend(|device| {
            let backend = SimulatorBackend::with_max_qubits(device.num_qubits).with_seed(1);
            Ok(Box::new(backend) as Box<dyn Backend>)
        })
    }

    #[tokio::test]
    async fn test_selects_least_busy_hardware() {
        let session = Session::anonymous("fixture");
        let (device, _) = select_backend(&fleet(), &session, &hardware_filter(3))
            .await
            .unwrap();
        assert_eq!(device.name, "ibm_quiet");
    }

    #[tokio::test]
    async fn test_no_matching_device_is_configuration_error() {
        let session = Session::anonymous("fixture");
        let err = select_backend(&fleet(), &session, &hardware_filter(100))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, HalError::NoMatchingBackend { candidates: 5, .. }));
    }

    #[tokio::test]
    async fn test_execute_on_least_busy_checks_histogram() {
        let session = Session::anonymous("fixture");
        let circuit = phase_oracle_circuit(PhaseOracle::ConstantZero).unwrap();
        let run = execute_on_least_busy(
            &fleet(),
            &session,
            &circuit,
            DEUTSCH_JOZSA_SHOTS,
            WaitPolicy::default(),
        )
        .await
        .unwrap();
        assert_eq!(run.backend, "simulator");
        assert_eq!(run.histogram.get("000"), 1024);
    }

    #[tokio::test]
    async fn test_qaoa_run_on_simulator() {
        let circuit = routing_circuit(&RoutingGraph::four_cities(), 0.5, 0.5, 1).unwrap();
        let run = execute(&local_simulator(Some(3)), &circuit, QAOA_SHOTS, WaitPolicy::default())
            .await
            .unwrap();
        assert_eq!(run.histogram.shots(), 1000);
        assert!(run.histogram.counts().keys().all(|k| k.len() == 4));
    }
}
