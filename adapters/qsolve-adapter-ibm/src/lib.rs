//! IBM Quantum adapter for qsolve.
//!
//! [`IbmProvider`] lists devices with their queue depth so the driver can
//! pick the least busy one; [`IbmBackend`] submits circuits to that device
//! through the Sampler primitive.
//!
//! Credentials come from the [`Session`](qsolve_hal::Session):
//!
//! ```bash
//! # Quantum Platform token
//! export IBM_QUANTUM_TOKEN="your-token"
//!
//! # or IBM Cloud
//! export IBM_API_KEY="your-api-key"
//! export IBM_SERVICE_CRN="crn:v1:bluemix:public:quantum-computing:..."
//! ```
//!
//! ```ignore
//! use qsolve_adapter_ibm::IbmProvider;
//! use qsolve_hal::{BackendFilter, BackendProvider, EnvTokenProvider, Session};
//!
//! let session = Session::acquire(IbmProvider::NAME, &EnvTokenProvider::ibm()).await?;
//! let provider = IbmProvider::new();
//! let filter = BackendFilter::new().min_qubits(3).hardware_only().operational_only();
//! let device = provider.select(&session, &filter).await?;
//! let backend = provider.open(&session, &device).await?;
//! ```

mod api;
mod backend;
mod error;
mod provider;

pub use api::{DEFAULT_ENDPOINT, IbmClient, LEGACY_ENDPOINT};
pub use backend::IbmBackend;
pub use error::{IbmError, IbmResult};
pub use provider::IbmProvider;
