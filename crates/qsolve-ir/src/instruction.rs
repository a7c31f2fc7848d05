//! One step of a circuit: an operation plus the wires it touches.

use serde::{Deserialize, Serialize};

use crate::gate::StandardGate;
use crate::qubit::{ClbitId, QubitId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    Gate(StandardGate),
    /// `qubits[k]` is read into `clbits[k]`.
    Measure,
    /// No effect on the state; kept for drawing and emission.
    Barrier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    /// Gate operands in gate order; control qubits come first.
    pub qubits: Vec<QubitId>,
    /// Empty unless this is a measurement.
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    pub fn gate(gate: StandardGate, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    pub fn two_qubit_gate(gate: StandardGate, q0: QubitId, q1: QubitId) -> Self {
        Self::gate(gate, [q0, q1])
    }

    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// One measurement over several qubit/clbit pairs, zipped by position.
    pub fn measure_all(
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: qubits.into_iter().collect(),
            clbits: clbits.into_iter().collect(),
        }
    }

    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    pub fn as_gate(&self) -> Option<&StandardGate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Lowercase mnemonic, as counted by `Circuit::count_ops`.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Barrier => "barrier",
        }
    }

    /// The (qubit, clbit) pairs a measurement writes. Empty for anything else.
    pub fn measured_pairs(&self) -> impl Iterator<Item = (QubitId, ClbitId)> + '_ {
        let pairs = if self.is_measure() { self.qubits.len() } else { 0 };
        self.qubits
            .iter()
            .copied()
            .zip(self.clbits.iter().copied())
            .take(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_pairs_operands() {
        let inst = Instruction::measure_all([QubitId(0), QubitId(1)], [ClbitId(0), ClbitId(1)]);
        assert!(inst.is_measure());
        assert_eq!(inst.name(), "measure");
        let pairs: Vec<_> = inst.measured_pairs().collect();
        assert_eq!(pairs, vec![(QubitId(0), ClbitId(0)), (QubitId(1), ClbitId(1))]);
        assert_eq!(Instruction::barrier([QubitId(0)]).measured_pairs().count(), 0);
    }

    #[test]
    fn test_as_gate() {
        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(1), QubitId(0));
        assert_eq!(inst.as_gate(), Some(&StandardGate::CX));
        assert!(Instruction::barrier([QubitId(0)]).as_gate().is_none());
    }
}
