//! `OpenQASM` 3 emitter for qsolve circuits.
//!
//! Remote backends accept circuits as `OpenQASM` 3 source. [`emit`] writes a
//! [`Circuit`](qsolve_ir::Circuit) using the standard gate library, declaring
//! any gate that `stdgates.inc` lacks.
//!
//! # Example
//!
//! ```rust
//! use qsolve_ir::{Circuit, QubitId};
//! use qsolve_qasm3::emit;
//!
//! let mut circuit = Circuit::with_size("bell", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! let qasm = emit(&circuit);
//! assert!(qasm.contains("cx q[0], q[1];"));
//! ```

mod emitter;

pub use emitter::emit;
