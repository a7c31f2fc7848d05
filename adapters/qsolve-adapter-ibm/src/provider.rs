//! IBM Quantum as a [`BackendProvider`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use qsolve_hal::{Backend, BackendProvider, DeviceDescriptor, HalError, HalResult, Session};

use crate::api::{BackendInfo, DEFAULT_ENDPOINT, IbmClient, LEGACY_ENDPOINT};
use crate::backend::IbmBackend;

/// Lists IBM devices and opens backends on them.
///
/// The HTTP client is built from the first session it sees and reused for
/// every later call.
#[derive(Debug, Default)]
pub struct IbmProvider {
    client: OnceCell<Arc<IbmClient>>,
}

impl IbmProvider {
    /// Provider name used for sessions.
    pub const NAME: &'static str = "ibm";

    /// Create a provider; nothing is contacted until the first call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already connected client.
    pub fn with_client(client: IbmClient) -> Self {
        Self {
            client: OnceCell::new_with(Some(Arc::new(client))),
        }
    }

    async fn client(&self, session: &Session) -> HalResult<Arc<IbmClient>> {
        self.client
            .get_or_try_init(|| connect(session))
            .await
            .cloned()
    }
}

/// A session scoped to an IBM Cloud CRN authenticates with an API key;
/// anything else is a Quantum Platform token.
async fn connect(session: &Session) -> HalResult<Arc<IbmClient>> {
    let token = session.token()?;
    let client = match session.instance() {
        Some(crn) if crn.starts_with("crn:") => {
            info!("connecting to IBM Cloud API");
            IbmClient::connect_to(session.endpoint().unwrap_or(DEFAULT_ENDPOINT), token, crn)
                .await?
        }
        instance => {
            info!("connecting to IBM Quantum Platform");
            let client = IbmClient::new(session.endpoint().unwrap_or(LEGACY_ENDPOINT), token)?;
            match instance {
                Some(hub) => client.with_instance(hub),
                None => client,
            }
        }
    };
    Ok(Arc::new(client))
}

impl From<&BackendInfo> for DeviceDescriptor {
    fn from(info: &BackendInfo) -> Self {
        Self {
            name: info.name.clone(),
            num_qubits: u32::try_from(info.num_qubits).unwrap_or(u32::MAX),
            is_simulator: info.simulator,
            operational: info.status.operational,
            // Unknown queue depth ranks last.
            pending_jobs: info.status.pending_jobs.unwrap_or(u32::MAX),
            status_message: info.status.status_msg.clone(),
        }
    }
}

#[async_trait]
impl BackendProvider for IbmProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn devices(&self, session: &Session) -> HalResult<Vec<DeviceDescriptor>> {
        let client = self.client(session).await?;
        let backends = client.list_backends().await?;
        debug!(count = backends.len(), "listed IBM backends");
        Ok(backends.iter().map(DeviceDescriptor::from).collect())
    }

    async fn open(
        &self,
        session: &Session,
        device: &DeviceDescriptor,
    ) -> HalResult<Box<dyn Backend>> {
        if !device.operational {
            return Err(HalError::BackendUnavailable(device.name.clone()));
        }
        let client = self.client(session).await?;
        Ok(Box::new(IbmBackend::new(client, device)))
    }
}
