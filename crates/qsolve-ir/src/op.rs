//! Declarative gate-operation records.
//!
//! A [`GateOp`] is pure data: an operation tag, operand indices and an
//! optional angle. Fixed gate sequences (oracles, preparation blocks) are
//! written as `const` tables of records and applied with
//! [`Circuit::apply_ops`](crate::Circuit::apply_ops), so their shape can be
//! inspected without building or running anything.
//!
//! ```rust
//! use qsolve_ir::{Circuit, GateOp, OpKind};
//!
//! const FLIP_AND_ENTANGLE: &[GateOp] = &[
//!     GateOp::new(OpKind::X, &[0]),
//!     GateOp::new(OpKind::CX, &[0, 1]),
//! ];
//!
//! let mut circuit = Circuit::with_size("demo", 2, 2);
//! circuit.apply_ops(FLIP_AND_ENTANGLE).unwrap();
//! assert_eq!(circuit.instructions().len(), 2);
//! ```

use serde::Serialize;

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::{ClbitId, QubitId};

/// Operation tag of a [`GateOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OpKind {
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    Rx,
    Ry,
    Rz,
    P,
    CX,
    CZ,
    Swap,
    RZZ,
    CCX,
    /// Operands are `[qubit, clbit]`.
    Measure,
    Barrier,
}

impl OpKind {
    fn needs_parameter(self) -> bool {
        matches!(
            self,
            OpKind::Rx | OpKind::Ry | OpKind::Rz | OpKind::P | OpKind::RZZ
        )
    }

    fn name(self) -> &'static str {
        match self {
            OpKind::Measure => "measure",
            OpKind::Barrier => "barrier",
            // Any angle will do for the name lookup.
            other => other.gate(0.0).map_or("unknown", |g| g.name()),
        }
    }

    fn gate(self, theta: f64) -> Option<StandardGate> {
        Some(match self {
            OpKind::I => StandardGate::I,
            OpKind::X => StandardGate::X,
            OpKind::Y => StandardGate::Y,
            OpKind::Z => StandardGate::Z,
            OpKind::H => StandardGate::H,
            OpKind::S => StandardGate::S,
            OpKind::Sdg => StandardGate::Sdg,
            OpKind::T => StandardGate::T,
            OpKind::Tdg => StandardGate::Tdg,
            OpKind::Rx => StandardGate::Rx(theta),
            OpKind::Ry => StandardGate::Ry(theta),
            OpKind::Rz => StandardGate::Rz(theta),
            OpKind::P => StandardGate::P(theta),
            OpKind::CX => StandardGate::CX,
            OpKind::CZ => StandardGate::CZ,
            OpKind::Swap => StandardGate::Swap,
            OpKind::RZZ => StandardGate::RZZ(theta),
            OpKind::CCX => StandardGate::CCX,
            OpKind::Measure | OpKind::Barrier => return None,
        })
    }
}

/// One declarative operation: tag, operand indices, optional angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GateOp {
    pub kind: OpKind,
    pub operands: &'static [u32],
    pub param: Option<f64>,
}

impl GateOp {
    /// A parameter-free operation.
    pub const fn new(kind: OpKind, operands: &'static [u32]) -> Self {
        Self {
            kind,
            operands,
            param: None,
        }
    }

    /// An operation carrying an angle.
    pub const fn with_param(kind: OpKind, operands: &'static [u32], param: f64) -> Self {
        Self {
            kind,
            operands,
            param: Some(param),
        }
    }

    /// Lower the record into an [`Instruction`].
    ///
    /// Operand ranges are checked later, when the instruction is applied to a
    /// circuit.
    pub fn to_instruction(&self) -> IrResult<Instruction> {
        match self.kind {
            OpKind::Measure => match self.operands {
                [qubit, clbit] => Ok(Instruction::measure(QubitId(*qubit), ClbitId(*clbit))),
                other => Err(IrError::QubitCountMismatch {
                    gate_name: "measure".into(),
                    expected: 2,
                    got: other.len() as u32,
                }),
            },
            OpKind::Barrier => Ok(Instruction::barrier(
                self.operands.iter().copied().map(QubitId),
            )),
            kind => {
                let theta = match (kind.needs_parameter(), self.param) {
                    (true, Some(theta)) => theta,
                    (true, None) => return Err(IrError::MissingParameter(kind.name().into())),
                    (false, _) => 0.0,
                };
                let gate = kind
                    .gate(theta)
                    .ok_or_else(|| IrError::MissingParameter(kind.name().into()))?;
                Ok(Instruction::gate(
                    gate,
                    self.operands.iter().copied().map(QubitId),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::InstructionKind;

    #[test]
    fn test_record_lowers_to_gate() {
        let op = GateOp::new(OpKind::CCX, &[0, 1, 2]);
        let inst = op.to_instruction().unwrap();
        assert_eq!(inst.kind, InstructionKind::Gate(StandardGate::CCX));
        assert_eq!(inst.qubits, vec![QubitId(0), QubitId(1), QubitId(2)]);
    }

    #[test]
    fn test_parameterized_record() {
        let op = GateOp::with_param(OpKind::Rz, &[1], 0.5);
        let inst = op.to_instruction().unwrap();
        assert_eq!(inst.as_gate(), Some(&StandardGate::Rz(0.5)));
    }

    #[test]
    fn test_missing_parameter_is_rejected() {
        let op = GateOp::new(OpKind::Rx, &[0]);
        assert!(matches!(
            op.to_instruction(),
            Err(IrError::MissingParameter(name)) if name == "rx"
        ));
    }

    #[test]
    fn test_measure_record() {
        let inst = GateOp::new(OpKind::Measure, &[2, 1]).to_instruction().unwrap();
        assert!(inst.is_measure());
        assert_eq!(inst.clbits, vec![ClbitId(1)]);

        assert!(GateOp::new(OpKind::Measure, &[2]).to_instruction().is_err());
    }
}
