//! Gate definitions.

use serde::{Deserialize, Serialize};

/// Built-in gates with their rotation angles inlined.
///
/// Angles are plain radians: every gate in this crate is fully bound at
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity.
    I,
    /// Pauli-X (bit flip).
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z (phase flip).
    Z,

    // Single-qubit Clifford gates
    /// Hadamard.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger.
    Sdg,
    /// T gate (sqrt(S)).
    T,
    /// T-dagger.
    Tdg,

    // Single-qubit rotations
    /// Rotation around X.
    Rx(f64),
    /// Rotation around Y.
    Ry(f64),
    /// Rotation around Z.
    Rz(f64),
    /// Phase gate.
    P(f64),

    // Two-qubit gates
    /// Controlled-X (CNOT).
    CX,
    /// Controlled-Z.
    CZ,
    /// SWAP.
    Swap,
    /// ZZ interaction exp(-i θ/2 Z⊗Z).
    RZZ(f64),

    // Three-qubit gates
    /// Toffoli (CCX).
    CCX,
}

impl StandardGate {
    /// Lower-case gate name, matching OpenQASM naming.
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::Swap => "swap",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
        }
    }

    /// Number of qubits the gate acts on.
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CX | StandardGate::CZ | StandardGate::Swap | StandardGate::RZZ(_) => 2,
            StandardGate::CCX => 3,
            _ => 1,
        }
    }

    /// Rotation angle, for parameterized gates.
    pub fn parameter(&self) -> Option<f64> {
        match self {
            StandardGate::Rx(theta)
            | StandardGate::Ry(theta)
            | StandardGate::Rz(theta)
            | StandardGate::P(theta)
            | StandardGate::RZZ(theta) => Some(*theta),
            _ => None,
        }
    }

    /// Check whether the gate carries an angle.
    pub fn is_parameterized(&self) -> bool {
        self.parameter().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_arity() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::RZZ(0.1).num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
    }

    #[test]
    fn test_gate_parameters() {
        assert_eq!(StandardGate::Rz(0.5).parameter(), Some(0.5));
        assert!(StandardGate::Rx(1.0).is_parameterized());
        assert!(!StandardGate::CCX.is_parameterized());
        assert_eq!(StandardGate::CCX.name(), "ccx");
    }
}
