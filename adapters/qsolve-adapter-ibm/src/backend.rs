//! IBM Quantum backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use qsolve_hal::{
    Backend, Capabilities, Counts, DeviceDescriptor, ExecutionResult, HalError, HalResult, JobId,
    JobStatus, ValidationResult,
};
use qsolve_ir::Circuit;
use qsolve_qasm3::emit;

use crate::api::{BackendInfo, IbmClient, JobResultResponse};
use crate::error::{IbmError, IbmResult};

/// How long cached device info stays fresh.
const BACKEND_INFO_TTL: Duration = Duration::from_secs(5 * 60);

/// A single IBM Quantum device behind the [`Backend`] trait.
pub struct IbmBackend {
    client: Arc<IbmClient>,
    target: String,
    capabilities: Capabilities,
    backend_info: RwLock<Option<(BackendInfo, Instant)>>,
    /// Classical register width of each submitted job, for decoding hex samples.
    clbit_widths: Mutex<HashMap<String, usize>>,
}

impl IbmBackend {
    /// Open a backend on a device chosen by the provider.
    pub fn new(client: Arc<IbmClient>, device: &DeviceDescriptor) -> Self {
        Self {
            client,
            target: device.name.clone(),
            capabilities: Capabilities::ibm(&device.name, device.num_qubits, device.is_simulator),
            backend_info: RwLock::new(None),
            clbit_widths: Mutex::new(HashMap::new()),
        }
    }

    /// Device name.
    pub fn target(&self) -> &str {
        &self.target
    }

    async fn get_backend_info(&self) -> IbmResult<BackendInfo> {
        {
            let cached = self.backend_info.read().await;
            if let Some((info, fetched_at)) = cached.as_ref() {
                if fetched_at.elapsed() < BACKEND_INFO_TTL {
                    return Ok(info.clone());
                }
            }
        }

        let info = self.client.get_backend(&self.target).await?;
        *self.backend_info.write().await = Some((info.clone(), Instant::now()));
        Ok(info)
    }

    fn remember_width(&self, job_id: &str, width: usize) {
        self.clbit_widths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job_id.to_string(), width);
    }

    fn width_of(&self, job_id: &str) -> Option<usize> {
        self.clbit_widths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(job_id)
            .copied()
    }
}

/// Smallest width that fits every sample; at least one bit.
fn infer_bit_width<'a>(samples: impl IntoIterator<Item = &'a String>) -> usize {
    let max_val = samples
        .into_iter()
        .filter_map(|s| u64::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16).ok())
        .max()
        .unwrap_or(0);
    (64 - max_val.leading_zeros() as usize).max(1)
}

/// Decode a hex outcome into a bitstring of exactly `width` characters.
///
/// Classical bit 0 is the least significant bit, so it lands rightmost.
fn hex_to_bitstring(sample: &str, width: usize) -> IbmResult<String> {
    let digits = sample.strip_prefix("0x").unwrap_or(sample);
    let value = u64::from_str_radix(digits, 16).map_err(|e| IbmError::MalformedSample {
        sample: sample.to_string(),
        reason: e.to_string(),
    })?;
    if width < 64 && value >> width != 0 {
        return Err(IbmError::MalformedSample {
            sample: sample.to_string(),
            reason: format!("does not fit in {width} classical bits"),
        });
    }
    Ok(format!("{value:0>width$b}"))
}

/// Aggregate sampler output into counts over a `width`-bit register.
///
/// `width` is `None` when the job was not submitted through this backend;
/// the width is then inferred from the largest sample.
fn results_to_counts(results: &JobResultResponse, width: Option<usize>) -> IbmResult<Counts> {
    let mut counts = Counts::new();
    let Some(result) = results.results.first() else {
        return Ok(counts);
    };

    if let Some(data) = &result.data {
        let register = data.get("c").or_else(|| data.values().next());
        if let Some(register) = register {
            let width = width.unwrap_or_else(|| infer_bit_width(&register.samples));
            for sample in &register.samples {
                counts.insert(hex_to_bitstring(sample, width)?, 1);
            }
        }
        return Ok(counts);
    }

    if let Some(raw) = &result.counts {
        let width = width.unwrap_or_else(|| infer_bit_width(raw.keys()));
        for (outcome, &count) in raw {
            counts.insert(hex_to_bitstring(outcome, width)?, count);
        }
    }
    Ok(counts)
}

#[async_trait]
impl Backend for IbmBackend {
    fn name(&self) -> &str {
        &self.target
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let caps = self.capabilities();
        let mut reasons = Vec::new();

        if circuit.num_qubits() > caps.num_qubits as usize {
            reasons.push(format!(
                "Circuit requires {} qubits but backend only has {}",
                circuit.num_qubits(),
                caps.num_qubits
            ));
        }
        if let Some(gate) = circuit
            .instructions()
            .iter()
            .filter_map(|inst| inst.as_gate())
            .find(|gate| !caps.gate_set.contains(gate.name()))
        {
            reasons.push(format!("Unsupported gate: {}", gate.name()));
        }
        if circuit.measurement_map().is_empty() {
            reasons.push("Circuit has no measurements".to_string());
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit), fields(backend = %self.target, circuit = circuit.name()))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} not in 1..={}",
                self.capabilities.max_shots
            )));
        }
        if let ValidationResult::Invalid { reasons } = self.validate(circuit).await? {
            return Err(HalError::InvalidCircuit(reasons.join("; ")));
        }

        let info = self.get_backend_info().await?;
        if circuit.num_qubits() > info.num_qubits {
            return Err(IbmError::TooManyQubits {
                required: circuit.num_qubits(),
                available: info.num_qubits,
            }
            .into());
        }
        if !info.status.operational {
            return Err(HalError::BackendUnavailable(match info.status.status_msg {
                Some(msg) => format!("{} ({msg})", self.target),
                None => self.target.clone(),
            }));
        }

        let qasm = emit(circuit);
        debug!(bytes = qasm.len(), "emitted OpenQASM 3");

        let response = self
            .client
            .submit_sampler_job(&self.target, vec![qasm], shots)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;

        self.remember_width(&response.id, circuit.num_clbits());
        info!(job = %response.id, shots, "submitted sampler job");
        Ok(JobId(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self.client.get_job_status(&job_id.0).await?;

        let job_status = match status.status.to_uppercase().as_str() {
            "QUEUED" => JobStatus::Queued,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" | "ERROR" => JobStatus::Failed(
                status
                    .error_message()
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
            "CANCELLED" => JobStatus::Cancelled,
            // VALIDATING, RUNNING and anything newer than this client.
            _ => JobStatus::Running,
        };
        Ok(job_status)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let status = self.client.get_job_status(&job_id.0).await?;
        if status.is_failed() {
            let msg = status
                .error_message()
                .unwrap_or_else(|| "job failed".to_string());
            return Err(IbmError::JobFailed(msg).into());
        }
        if status.is_cancelled() {
            return Err(IbmError::JobCancelled(job_id.0.clone()).into());
        }
        if !status.is_completed() {
            return Err(HalError::Backend(format!(
                "job {} not yet completed",
                job_id.0
            )));
        }

        let results = self.client.get_job_results(&job_id.0).await?;
        let counts = results_to_counts(&results, self.width_of(&job_id.0))?;
        let shots = u32::try_from(counts.total_shots()).unwrap_or(u32::MAX);

        let mut result = ExecutionResult::new(counts, shots);
        if let Some(metadata) = results.results.first().and_then(|r| r.metadata.clone()) {
            result = result.with_metadata(metadata);
        }
        Ok(result)
    }
}
