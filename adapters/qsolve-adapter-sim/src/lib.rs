//! qsolve Local Statevector Simulator
//!
//! A noiseless statevector simulator behind the [`Backend`](qsolve_hal::Backend)
//! trait, plus the [`Statevector`] engine itself for variational loops that
//! need amplitudes rather than shot counts.
//!
//! # Features
//!
//! - **Exact Simulation**: Full statevector representation
//! - **Seeded Sampling**: `with_seed` makes repeated runs bit-identical
//! - **Exact Outcome Probabilities**: [`outcome_probabilities`] skips sampling
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 16 | ~1 MB |
//! | 20 | ~16 MB |
//!
//! # Example
//!
//! ```ignore
//! use qsolve_adapter_sim::SimulatorBackend;
//! use qsolve_hal::Backend;
//!
//! let backend = SimulatorBackend::new().with_seed(42);
//! let job_id = backend.submit(&circuit, 1000).await?;
//! let result = backend.wait(&job_id).await?;
//! println!("{:?}", result.counts);
//! ```

mod simulator;
mod statevector;

pub use simulator::{SimulatorBackend, outcome_probabilities};
pub use statevector::Statevector;
