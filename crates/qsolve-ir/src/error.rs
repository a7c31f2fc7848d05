//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors raised while constructing a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit outside the declared quantum register.
    #[error("Qubit {qubit} not found in circuit{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit outside the declared classical register.
    #[error("Classical bit {clbit} not found in circuit{}", format_gate_context(.gate_name))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// A unitary gate was placed on a qubit that has already been measured.
    #[error("Gate '{gate_name}' applied to {qubit} after it was measured")]
    GateAfterMeasure {
        /// The measured qubit.
        qubit: QubitId,
        /// Name of the offending gate.
        gate_name: String,
    },

    /// A gate-op record names an operation that needs a parameter but has none.
    #[error("Operation '{0}' requires a parameter")]
    MissingParameter(String),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_gate_context() {
        let err = IrError::QubitNotFound {
            qubit: QubitId(7),
            gate_name: Some("cx".into()),
        };
        assert_eq!(err.to_string(), "Qubit q7 not found in circuit (gate: cx)");

        let err = IrError::ClbitNotFound {
            clbit: ClbitId(3),
            gate_name: None,
        };
        assert_eq!(err.to_string(), "Classical bit c3 not found in circuit");
    }

    #[test]
    fn test_gate_after_measure_display() {
        let err = IrError::GateAfterMeasure {
            qubit: QubitId(1),
            gate_name: "h".into(),
        };
        assert!(err.to_string().contains("after it was measured"));
    }
}
