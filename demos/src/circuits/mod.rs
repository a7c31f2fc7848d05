//! Circuit builders for the two pipelines.

pub mod deutsch_jozsa;
pub mod qaoa;

pub use deutsch_jozsa::{
    FunctionClass, PhaseOracle, SCRIPT_ORACLE, classify, phase_oracle_circuit, script_circuit,
};
pub use qaoa::{qaoa_ansatz, routing_circuit};
