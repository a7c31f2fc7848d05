//! Device discovery and least-busy selection.
//!
//! A [`BackendProvider`] lists the devices a [`Session`] can reach and opens
//! a [`Backend`] for one of them. Two implementations exist: the live IBM
//! provider (in `qsolve-adapter-ibm`) and [`StaticProvider`], a fixed device
//! list for tests and offline runs.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::Backend;
use crate::error::{HalError, HalResult};
use crate::session::Session;

/// What a provider reports about one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Device name (e.g. "ibm_brisbane").
    pub name: String,
    /// Number of qubits.
    pub num_qubits: u32,
    /// Whether the device is a simulator.
    pub is_simulator: bool,
    /// Whether the device currently accepts jobs.
    pub operational: bool,
    /// Jobs waiting in the device queue.
    pub pending_jobs: u32,
    /// Provider status text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl DeviceDescriptor {
    /// Describe an operational device with an empty queue.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            is_simulator: false,
            operational: true,
            pending_jobs: 0,
            status_message: None,
        }
    }

    /// Mark as a simulator.
    pub fn simulator(mut self) -> Self {
        self.is_simulator = true;
        self
    }

    /// Set the queue depth.
    pub fn with_pending_jobs(mut self, pending: u32) -> Self {
        self.pending_jobs = pending;
        self
    }

    /// Mark as offline.
    pub fn offline(mut self, reason: impl Into<String>) -> Self {
        self.operational = false;
        self.status_message = Some(reason.into());
        self
    }
}

/// Predicate over devices, followed by a deterministic least-busy pick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendFilter {
    /// Minimum number of qubits.
    pub min_qubits: u32,
    /// Reject simulators.
    pub hardware_only: bool,
    /// Reject devices that are not operational.
    pub operational_only: bool,
}

impl BackendFilter {
    /// A filter that accepts every device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require at least `n` qubits.
    pub fn min_qubits(mut self, n: u32) -> Self {
        self.min_qubits = n;
        self
    }

    /// Reject simulators.
    pub fn hardware_only(mut self) -> Self {
        self.hardware_only = true;
        self
    }

    /// Reject offline devices.
    pub fn operational_only(mut self) -> Self {
        self.operational_only = true;
        self
    }

    /// Check a single device against the predicate.
    pub fn matches(&self, device: &DeviceDescriptor) -> bool {
        device.num_qubits >= self.min_qubits
            && !(self.hardware_only && device.is_simulator)
            && !(self.operational_only && !device.operational)
    }

    /// Pick the matching device with the fewest pending jobs.
    ///
    /// Equal queues are broken by name so the choice never depends on the
    /// order the provider listed devices in. An empty match set is a
    /// configuration error; there is no fallback device.
    pub fn least_busy<'a>(
        &self,
        devices: &'a [DeviceDescriptor],
    ) -> HalResult<&'a DeviceDescriptor> {
        devices
            .iter()
            .filter(|d| self.matches(d))
            .min_by(|a, b| {
                a.pending_jobs
                    .cmp(&b.pending_jobs)
                    .then_with(|| a.name.cmp(&b.name))
            })
            .ok_or_else(|| HalError::NoMatchingBackend {
                filter: self.to_string(),
                candidates: devices.len(),
            })
    }
}

impl fmt::Display for BackendFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n_qubits >= {}", self.min_qubits)?;
        if self.hardware_only {
            write!(f, ", hardware only")?;
        }
        if self.operational_only {
            write!(f, ", operational")?;
        }
        Ok(())
    }
}

/// A source of devices and the backends that run on them.
#[async_trait]
pub trait BackendProvider: Send + Sync {
    /// Provider name.
    fn name(&self) -> &str;

    /// List every device visible to the session.
    async fn devices(&self, session: &Session) -> HalResult<Vec<DeviceDescriptor>>;

    /// Open a backend for a device returned by [`devices`](Self::devices).
    async fn open(
        &self,
        session: &Session,
        device: &DeviceDescriptor,
    ) -> HalResult<Box<dyn Backend>>;

    /// List devices and pick the least busy one that passes `filter`.
    async fn select(
        &self,
        session: &Session,
        filter: &BackendFilter,
    ) -> HalResult<DeviceDescriptor> {
        let devices = self.devices(session).await?;
        debug!(provider = self.name(), count = devices.len(), "listed devices");

        let chosen = filter.least_busy(&devices)?;
        info!(
            provider = self.name(),
            device = %chosen.name,
            pending_jobs = chosen.pending_jobs,
            "selected least busy device"
        );
        Ok(chosen.clone())
    }
}

type BackendBuilder = dyn Fn(&DeviceDescriptor) -> HalResult<Box<dyn Backend>> + Send + Sync;

/// A fixed device list, for deterministic selection without a live service.
pub struct StaticProvider {
    name: String,
    devices: Vec<DeviceDescriptor>,
    builder: Option<Box<BackendBuilder>>,
}

impl StaticProvider {
    /// Create a fixture over the given devices.
    pub fn new(name: impl Into<String>, devices: Vec<DeviceDescriptor>) -> Self {
        Self {
            name: name.into(),
            devices,
            builder: None,
        }
    }

    /// Set how a backend is built for a selected device.
    pub fn with_backend<F>(mut self, builder: F) -> Self
    where
        F: Fn(&DeviceDescriptor) -> HalResult<Box<dyn Backend>> + Send + Sync + 'static,
    {
        self.builder = Some(Box::new(builder));
        self
    }
}

impl fmt::Debug for StaticProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticProvider")
            .field("name", &self.name)
            .field("devices", &self.devices)
            .field("has_builder", &self.builder.is_some())
            .finish()
    }
}

#[async_trait]
impl BackendProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn devices(&self, _session: &Session) -> HalResult<Vec<DeviceDescriptor>> {
        Ok(self.devices.clone())
    }

    async fn open(
        &self,
        _session: &Session,
        device: &DeviceDescriptor,
    ) -> HalResult<Box<dyn Backend>> {
        if !self.devices.iter().any(|d| d.name == device.name) {
            return Err(HalError::BackendUnavailable(device.name.clone()));
        }
        match &self.builder {
            Some(build) => build(device),
            None => Err(HalError::Unsupported(format!(
                "{} fixture cannot open backends",
                self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet() -> Vec<DeviceDescriptor> {
        vec![
            DeviceDescriptor::new("ibmq_armonk", 1),
            DeviceDescriptor::new("ibm_lagos", 7).with_pending_jobs(12),
            DeviceDescriptor::new("ibm_nairobi", 7).with_pending_jobs(3),
            DeviceDescriptor::new("ibm_perth", 7)
                .with_pending_jobs(0)
                .offline("maintenance"),
            DeviceDescriptor::new("ibmq_qasm_simulator", 32).simulator(),
        ]
    }

    fn dj_filter() -> BackendFilter {
        BackendFilter::new()
            .min_qubits(3)
            .hardware_only()
            .operational_only()
    }

    #[test]
    fn test_filter_predicate() {
        let filter = dj_filter();
        let devices = fleet();
        let matching: Vec<_> = devices
            .iter()
            .filter(|d| filter.matches(d))
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(matching, vec!["ibm_lagos", "ibm_nairobi"]);
    }

    #[test]
    fn test_least_busy_picks_shortest_queue() {
        let devices = fleet();
        let chosen = dj_filter().least_busy(&devices).unwrap();
        assert_eq!(chosen.name, "ibm_nairobi");
    }

    #[test]
    fn test_least_busy_tie_is_broken_by_name() {
        let devices = vec![
            DeviceDescriptor::new("ibm_zeta", 5).with_pending_jobs(2),
            DeviceDescriptor::new("ibm_alpha", 5).with_pending_jobs(2),
        ];
        let reversed: Vec<_> = devices.iter().rev().cloned().collect();

        let filter = dj_filter();
        assert_eq!(filter.least_busy(&devices).unwrap().name, "ibm_alpha");
        assert_eq!(filter.least_busy(&reversed).unwrap().name, "ibm_alpha");
    }

    #[test]
    fn test_empty_match_set_is_configuration_error() {
        let devices = vec![
            DeviceDescriptor::new("ibmq_armonk", 1),
            DeviceDescriptor::new("ibmq_qasm_simulator", 32).simulator(),
            DeviceDescriptor::new("ibm_perth", 7).offline("maintenance"),
        ];
        let err = dj_filter().least_busy(&devices).unwrap_err();
        assert!(matches!(
            err,
            HalError::NoMatchingBackend { candidates: 3, .. }
        ));

        let err = dj_filter().least_busy(&[]).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(
            dj_filter().to_string(),
            "n_qubits >= 3, hardware only, operational"
        );
        assert_eq!(BackendFilter::new().to_string(), "n_qubits >= 0");
    }

    #[tokio::test]
    async fn test_static_provider_select() {
        let provider = StaticProvider::new("fixture", fleet());
        let session = Session::anonymous("fixture");

        let chosen = provider.select(&session, &dj_filter()).await.unwrap();
        assert_eq!(chosen.name, "ibm_nairobi");
    }

    #[tokio::test]
    async fn test_static_provider_without_builder_cannot_open() {
        let provider = StaticProvider::new("fixture", fleet());
        let session = Session::anonymous("fixture");
        let device = DeviceDescriptor::new("ibm_nairobi", 7);

        let err = provider.open(&session, &device).await.err().unwrap();
        assert!(matches!(err, HalError::Unsupported(_)));

        let unknown = DeviceDescriptor::new("ibm_unknown", 7);
        let err = provider.open(&session, &unknown).await.err().unwrap();
        assert!(matches!(err, HalError::BackendUnavailable(_)));
    }
}
