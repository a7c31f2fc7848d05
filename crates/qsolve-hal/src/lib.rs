//! qsolve Hardware Abstraction Layer
//!
//! Everything the pipelines need to run a circuit somewhere:
//!
//! - [`Backend`]: async job lifecycle (validate, submit, poll, fetch results)
//! - [`Capabilities`]: what a backend accepts
//! - [`Counts`] / [`ExecutionResult`]: measurement histograms
//! - [`Session`] / [`TokenProvider`]: explicit provider credentials
//! - [`BackendProvider`] / [`BackendFilter`]: device discovery and
//!   least-busy selection, with a [`StaticProvider`] fixture
//!
//! # Example
//!
//! ```ignore
//! use qsolve_hal::{Backend, BackendFilter, BackendProvider, Session};
//!
//! let session = Session::acquire("ibm", &EnvTokenProvider::ibm()).await?;
//! let filter = BackendFilter::new().min_qubits(3).hardware_only().operational_only();
//! let device = provider.select(&session, &filter).await?;
//! let backend = provider.open(&session, &device).await?;
//!
//! let job_id = backend.submit(&circuit, 1024).await?;
//! let result = backend.wait(&job_id).await?;
//! session.close();
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;
pub mod selection;
pub mod session;

pub use backend::{Backend, ValidationResult, WaitPolicy};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
pub use selection::{BackendFilter, BackendProvider, DeviceDescriptor, StaticProvider};
pub use session::{EnvTokenProvider, Session, StaticTokenProvider, TokenProvider};
