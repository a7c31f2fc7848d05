//! IBM Quantum REST client.
//!
//! Two authentication modes are supported:
//!
//! - **Cloud**: an IBM Cloud API key is exchanged for an IAM bearer token and
//!   every request carries the `Service-CRN` header
//!   (`quantum.cloud.ibm.com/api`).
//! - **Legacy**: a Quantum Platform token is sent as the bearer token
//!   directly (`api.quantum-computing.ibm.com`).
//!
//! Jobs are submitted through the Sampler primitive with OpenQASM 3 source.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IbmError, IbmResult};

/// IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// Legacy IBM Quantum Platform endpoint.
pub const LEGACY_ENDPOINT: &str = "https://api.quantum-computing.ibm.com";

const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

const IBM_API_VERSION: &str = "2026-02-01";

/// Requests with reqwest's default user agent get blocked at the edge.
const USER_AGENT: &str = concat!("qsolve/", env!("CARGO_PKG_VERSION"));

/// IBM Quantum API client.
pub struct IbmClient {
    client: Client,
    endpoint: String,
    /// Hub/group/project, legacy mode only.
    instance: Option<String>,
    cloud_api: bool,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .field("cloud_api", &self.cloud_api)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

fn json_headers(bearer: &str) -> IbmResult<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {bearer}"))
            .map_err(|_| IbmError::InvalidToken)?,
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

fn build_client(headers: header::HeaderMap) -> IbmResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

/// Turn a non-success response into an [`IbmError`].
async fn api_error(response: Response, context: &str) -> IbmError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());

    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(parsed) if !parsed.message.is_empty() => IbmError::Api {
            code: parsed.code,
            message: format!("{context}: {}", parsed.message),
        },
        _ => IbmError::Api {
            code: Some(status.as_u16().to_string()),
            message: format!("{context}: {body}"),
        },
    }
}

impl IbmClient {
    /// Client for the legacy endpoint using a Quantum Platform token.
    pub fn new(endpoint: impl Into<String>, token: &str) -> IbmResult<Self> {
        if token.is_empty() {
            return Err(IbmError::MissingToken);
        }
        Ok(Self {
            client: build_client(json_headers(token)?)?,
            endpoint: endpoint.into(),
            instance: None,
            cloud_api: false,
        })
    }

    /// Client for the Cloud API: exchanges `api_key` for an IAM bearer token.
    pub async fn connect(api_key: &str, service_crn: &str) -> IbmResult<Self> {
        Self::connect_to(DEFAULT_ENDPOINT, api_key, service_crn).await
    }

    /// Like [`connect`](Self::connect) but against a custom endpoint.
    pub async fn connect_to(
        endpoint: impl Into<String>,
        api_key: &str,
        service_crn: &str,
    ) -> IbmResult<Self> {
        if api_key.is_empty() {
            return Err(IbmError::MissingToken);
        }

        let iam = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let response = iam
            .post(IAM_TOKEN_URL)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!(
                "grant_type=urn:ibm:params:oauth:grant-type:apikey&apikey={api_key}"
            ))
            .send()
            .await
            .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::IamTokenExchange(format!(
                "IAM returned {status}: {body}"
            )));
        }

        let iam_token: IamTokenResponse = response.json().await.map_err(|e| {
            IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}"))
        })?;
        debug!(expires_in = ?iam_token.expires_in, "IAM token acquired");

        let mut headers = json_headers(&iam_token.access_token)?;
        headers.insert(
            header::HeaderName::from_static("service-crn"),
            header::HeaderValue::from_str(service_crn)
                .map_err(|_| IbmError::InvalidParameter("invalid Service-CRN value".into()))?,
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        Ok(Self {
            client: build_client(headers)?,
            endpoint: endpoint.into(),
            instance: None,
            cloud_api: true,
        })
    }

    /// Set the hub/group/project used for legacy submissions.
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Whether this client talks to the Cloud API.
    pub fn is_cloud_api(&self) -> bool {
        self.cloud_api
    }

    /// Endpoint base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List every backend with configuration and queue status.
    pub async fn list_backends(&self) -> IbmResult<Vec<BackendInfo>> {
        let url = format!("{}/v1/backends", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, "list backends failed").await);
        }

        if !self.cloud_api {
            let listing: LegacyBackendsResponse = response.json().await?;
            return Ok(listing.backends);
        }

        let listing: DevicesResponse = response.json().await?;
        let mut backends = Vec::with_capacity(listing.devices.len());
        for device in &listing.devices {
            match self.get_backend(&device.name).await {
                Ok(info) => backends.push(info),
                Err(e) => warn!(backend = %device.name, "skipping backend: {e}"),
            }
        }
        Ok(backends)
    }

    /// Fetch one backend.
    pub async fn get_backend(&self, name: &str) -> IbmResult<BackendInfo> {
        if !self.cloud_api {
            let url = format!("{}/v1/backends/{}", self.endpoint, name);
            let response = self.client.get(&url).send().await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(IbmError::BackendUnavailable(name.to_string()));
            }
            if !response.status().is_success() {
                return Err(api_error(response, "backend lookup failed").await);
            }
            return Ok(response.json().await?);
        }

        let config_url = format!("{}/v1/backends/{}/configuration", self.endpoint, name);
        let response = self.client.get(&config_url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::BackendUnavailable(name.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, &format!("configuration of {name} failed")).await);
        }
        let config: BackendConfigResponse = response.json().await?;

        let status_url = format!("{}/v1/backends/{}/status", self.endpoint, name);
        let response = self.client.get(&status_url).send().await?;
        let status = if response.status().is_success() {
            let status: BackendStatusResponse = response.json().await?;
            status.into()
        } else {
            // Without a status report the device cannot be ranked; treat it as offline.
            BackendStatus {
                operational: false,
                status_msg: Some(format!("status unavailable ({})", response.status())),
                pending_jobs: None,
            }
        };

        Ok(BackendInfo::from_cloud(config, status))
    }

    /// Submit OpenQASM 3 circuits to the Sampler primitive.
    pub async fn submit_sampler_job(
        &self,
        backend: &str,
        circuits: Vec<String>,
        shots: u32,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);
        let body = if self.cloud_api {
            SamplerJobRequest::v2(backend, circuits, shots)
        } else {
            SamplerJobRequest::v1(backend, circuits, shots, self.instance.clone())
        };

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, "job submission failed").await);
        }
        Ok(response.json().await?)
    }

    /// Poll a job.
    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{}", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, "job status failed").await);
        }
        Ok(response.json().await?)
    }

    /// Fetch the results of a completed job.
    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{}/results", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, "job results failed").await);
        }
        Ok(response.json().await?)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SamplerJobRequest {
    program_id: &'static str,
    backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hub: Option<String>,
    params: serde_json::Value,
}

impl SamplerJobRequest {
    /// Sampler V2: one PUB `[circuit, params, shots]` per circuit.
    fn v2(backend: &str, circuits: Vec<String>, shots: u32) -> Self {
        let pubs: Vec<serde_json::Value> = circuits
            .into_iter()
            .map(|c| serde_json::json!([c, {}, shots]))
            .collect();
        Self {
            program_id: "sampler",
            backend: backend.to_string(),
            hub: None,
            params: serde_json::json!({
                "version": 2,
                "pubs": pubs,
                // Layout and routing onto the device happen server-side.
                "options": { "optimization_level": 1 },
            }),
        }
    }

    fn v1(backend: &str, circuits: Vec<String>, shots: u32, hub: Option<String>) -> Self {
        Self {
            program_id: "sampler",
            backend: backend.to_string(),
            hub,
            params: serde_json::json!({
                "circuits": circuits,
                "shots": shots,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LegacyBackendsResponse {
    backends: Vec<BackendInfo>,
}

#[derive(Debug, Deserialize)]
struct BackendConfigResponse {
    backend_name: String,
    n_qubits: usize,
    #[serde(default)]
    basis_gates: Vec<String>,
    #[serde(default)]
    simulator: Option<bool>,
    #[serde(default)]
    max_shots: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct BackendStatusResponse {
    state: bool,
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    length_queue: u64,
}

impl From<BackendStatusResponse> for BackendStatus {
    fn from(s: BackendStatusResponse) -> Self {
        let status_msg = if s.message.is_empty() {
            s.status
        } else {
            format!("{}: {}", s.status, s.message)
        };
        Self {
            operational: s.state,
            status_msg: Some(status_msg),
            pending_jobs: Some(u32::try_from(s.length_queue).unwrap_or(u32::MAX)),
        }
    }
}

/// A backend as reported by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: usize,
    /// Queue and operational state.
    pub status: BackendStatus,
    /// Native gates.
    #[serde(default)]
    pub basis_gates: Vec<String>,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
    /// Shot limit.
    #[serde(default)]
    pub max_shots: Option<u32>,
}

impl BackendInfo {
    fn from_cloud(config: BackendConfigResponse, status: BackendStatus) -> Self {
        Self {
            name: config.backend_name,
            num_qubits: config.n_qubits,
            status,
            basis_gates: config.basis_gates,
            simulator: config.simulator.unwrap_or(false),
            max_shots: config.max_shots,
        }
    }
}

/// Operational state of a backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    /// Whether the backend accepts jobs.
    pub operational: bool,
    /// Status text.
    #[serde(default)]
    pub status_msg: Option<String>,
    /// Jobs waiting in the queue.
    #[serde(default)]
    pub pending_jobs: Option<u32>,
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job id.
    pub id: String,
    /// Initial status.
    #[serde(default)]
    pub status: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job id.
    pub id: String,
    /// Status; the Cloud API uses mixed case ("Completed").
    pub status: String,
    /// Backend name.
    #[serde(default)]
    pub backend: Option<String>,
    /// Failure details (legacy API).
    #[serde(default)]
    pub error: Option<JobError>,
    /// Failure details (Cloud API).
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Legacy failure details.
#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Error message.
    pub message: String,
}

/// Cloud API failure details.
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    /// Status string.
    #[serde(default)]
    pub status: String,
    /// Failure reason.
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    fn normalized_status(&self) -> String {
        self.status.to_uppercase()
    }

    /// Finished, one way or another.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.normalized_status().as_str(),
            "COMPLETED" | "FAILED" | "CANCELLED" | "ERROR"
        )
    }

    /// Finished successfully.
    pub fn is_completed(&self) -> bool {
        self.normalized_status() == "COMPLETED"
    }

    /// Finished with an error.
    pub fn is_failed(&self) -> bool {
        matches!(self.normalized_status().as_str(), "FAILED" | "ERROR")
    }

    /// Cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.normalized_status() == "CANCELLED"
    }

    /// Failure reason, preferring the Cloud API field.
    pub fn error_message(&self) -> Option<String> {
        self.state
            .as_ref()
            .and_then(|s| s.reason.clone())
            .or_else(|| self.error.as_ref().map(|e| e.message.clone()))
    }
}

/// Job results.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    /// One entry per submitted circuit.
    pub results: Vec<SamplerResult>,
}

/// Sampler output for one circuit.
#[derive(Debug, Deserialize)]
pub struct SamplerResult {
    /// V2: per-register hex samples, one per shot.
    #[serde(default)]
    pub data: Option<HashMap<String, RegisterSamples>>,
    /// V1: aggregated counts keyed by hex outcome.
    #[serde(default)]
    pub counts: Option<HashMap<String, u64>>,
    /// Metadata.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// V2 samples of one classical register.
#[derive(Debug, Deserialize)]
pub struct RegisterSamples {
    /// Hex strings such as `"0x3"`.
    pub samples: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: &str) -> JobStatusResponse {
        JobStatusResponse {
            id: "job".into(),
            status: status.into(),
            backend: None,
            error: None,
            state: None,
        }
    }

    #[test]
    fn test_job_status_classification() {
        assert!(status("COMPLETED").is_completed());
        assert!(status("Completed").is_terminal());
        assert!(status("Failed").is_failed());
        assert!(status("ERROR").is_failed());
        assert!(status("Cancelled").is_cancelled());
        assert!(!status("Queued").is_terminal());
        assert!(!status("Running").is_terminal());
    }

    #[test]
    fn test_error_message_prefers_cloud_reason() {
        let mut failed = status("Failed");
        failed.error = Some(JobError {
            code: None,
            message: "legacy message".into(),
        });
        assert_eq!(failed.error_message().as_deref(), Some("legacy message"));

        failed.state = Some(JobState {
            status: "Failed".into(),
            reason: Some("circuit too deep".into()),
        });
        assert_eq!(failed.error_message().as_deref(), Some("circuit too deep"));
    }

    #[test]
    fn test_v2_request_shape() {
        let request = SamplerJobRequest::v2("ibm_torino", vec!["OPENQASM 3.0;".into()], 1024);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["program_id"], "sampler");
        assert_eq!(json["backend"], "ibm_torino");
        assert_eq!(json["params"]["version"], 2);
        assert_eq!(json["params"]["pubs"][0][2], 1024);
        assert!(json.get("hub").is_none());
    }

    #[test]
    fn test_v1_request_carries_hub() {
        let request = SamplerJobRequest::v1(
            "ibm_lagos",
            vec!["OPENQASM 3.0;".into()],
            1024,
            Some("ibm-q/open/main".into()),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["hub"], "ibm-q/open/main");
        assert_eq!(json["params"]["shots"], 1024);
    }

    #[test]
    fn test_devices_listing_deserializes() {
        let json = r#"{"devices": [
            {"name": "ibm_fez", "status": {"name": "online"}},
            {"name": "ibm_torino", "status": {"name": "online"}}
        ]}"#;
        let listing: DevicesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(listing.devices.len(), 2);
        assert_eq!(listing.devices[1].name, "ibm_torino");
    }

    #[test]
    fn test_cloud_backend_info_merge() {
        let config: BackendConfigResponse = serde_json::from_str(
            r#"{
                "backend_name": "ibm_torino",
                "n_qubits": 133,
                "basis_gates": ["cz", "id", "rx", "rz", "sx", "x"],
                "simulator": false
            }"#,
        )
        .unwrap();
        let status: BackendStatusResponse = serde_json::from_str(
            r#"{"state": true, "status": "active", "message": "", "length_queue": 7}"#,
        )
        .unwrap();

        let info = BackendInfo::from_cloud(config, status.into());
        assert_eq!(info.name, "ibm_torino");
        assert_eq!(info.num_qubits, 133);
        assert!(!info.simulator);
        assert!(info.status.operational);
        assert_eq!(info.status.pending_jobs, Some(7));
        assert_eq!(info.status.status_msg.as_deref(), Some("active"));
    }

    #[test]
    fn test_legacy_backend_info_deserializes() {
        let json = r#"{"backends": [{
            "name": "ibmq_qasm_simulator",
            "num_qubits": 32,
            "simulator": true,
            "status": {"operational": true, "pending_jobs": 2}
        }]}"#;
        let listing: LegacyBackendsResponse = serde_json::from_str(json).unwrap();
        let info = &listing.backends[0];
        assert!(info.simulator);
        assert_eq!(info.status.pending_jobs, Some(2));
    }

    #[test]
    fn test_v2_results_deserialize() {
        let json = r#"{
            "results": [{
                "data": {"c": {"samples": ["0x0", "0x3", "0x0", "0x3"]}},
                "metadata": {"version": 2}
            }]
        }"#;
        let response: JobResultResponse = serde_json::from_str(json).unwrap();
        let data = response.results[0].data.as_ref().unwrap();
        assert_eq!(data["c"].samples.len(), 4);
    }

    #[test]
    fn test_legacy_client_requires_token() {
        assert!(matches!(
            IbmClient::new(LEGACY_ENDPOINT, ""),
            Err(IbmError::MissingToken)
        ));

        let client = IbmClient::new(LEGACY_ENDPOINT, "s3cr3t-value").unwrap();
        assert!(!client.is_cloud_api());
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("s3cr3t-value"));
    }
}
