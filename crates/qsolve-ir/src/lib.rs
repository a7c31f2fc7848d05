//! qsolve Circuit Representation
//!
//! Core data structures for the circuits built by the qsolve pipelines: an
//! ordered, validated instruction list over fixed-size quantum and classical
//! registers.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`]
//! - **Gates**: [`StandardGate`], angles inlined as radians
//! - **Instructions**: [`Instruction`] combining a gate, measurement or barrier
//!   with its operands
//! - **Gate-operation records**: [`GateOp`] for declarative, `const` gate tables
//! - **Circuit**: [`Circuit`] builder with construction-time validation
//! - **Drawing**: [`draw`] renders a circuit as text
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qsolve_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I`, `X`, `Y`, `Z` | 1 | Identity and Pauli gates |
//! | `H` | 1 | Hadamard gate |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase gates |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotations and phase |
//! | `CX`, `CZ` | 2 | Controlled-NOT and controlled-Z |
//! | `Swap` | 2 | SWAP gate |
//! | `RZZ` | 2 | ZZ interaction |
//! | `CCX` | 3 | Toffoli (CCNOT) gate |

pub mod circuit;
pub mod draw;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod op;
pub mod qubit;

pub use circuit::Circuit;
pub use draw::draw;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use op::{GateOp, OpKind};
pub use qubit::{ClbitId, QubitId};
