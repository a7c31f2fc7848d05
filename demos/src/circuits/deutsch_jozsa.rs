//! Deutsch-Jozsa circuits.
//!
//! Two flavours are built here:
//!
//! - [`script_circuit`]: the fixed three-qubit pipeline circuit. A Hadamard
//!   layer, the [`SCRIPT_ORACLE`] gate table, then measurement. There is no
//!   closing Hadamard layer, so the measured distribution is uniform.
//! - [`phase_oracle_circuit`]: the textbook form, Hadamard layer, phase
//!   oracle, Hadamard layer, measurement. A constant oracle always reads
//!   `000`; a balanced one never does.

use qsolve_hal::Counts;
use qsolve_ir::{Circuit, GateOp, IrResult, OpKind, QubitId};

/// Register size of the Deutsch-Jozsa pipeline.
pub const NUM_QUBITS: u32 = 3;

/// X on every qubit, a Toffoli conjugated by H on the last qubit, X on every
/// qubit again.
pub const SCRIPT_ORACLE: &[GateOp] = &[
    GateOp::new(OpKind::X, &[0]),
    GateOp::new(OpKind::X, &[1]),
    GateOp::new(OpKind::X, &[2]),
    GateOp::new(OpKind::H, &[2]),
    GateOp::new(OpKind::CCX, &[0, 1, 2]),
    GateOp::new(OpKind::H, &[2]),
    GateOp::new(OpKind::X, &[0]),
    GateOp::new(OpKind::X, &[1]),
    GateOp::new(OpKind::X, &[2]),
];

/// f(x) = 0: no gates.
pub const CONSTANT_ZERO_ORACLE: &[GateOp] = &[];

/// f(x) = x₀: a phase flip on qubit 0.
pub const BALANCED_ORACLE: &[GateOp] = &[GateOp::new(OpKind::Z, &[0])];

/// Phase oracles for the textbook circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOracle {
    /// f(x) = 0 for every input.
    ConstantZero,
    /// f(x) = x₀.
    Balanced,
}

impl PhaseOracle {
    /// Gate table of this oracle.
    pub fn ops(self) -> &'static [GateOp] {
        match self {
            PhaseOracle::ConstantZero => CONSTANT_ZERO_ORACLE,
            PhaseOracle::Balanced => BALANCED_ORACLE,
        }
    }
}

/// Verdict read off a textbook Deutsch-Jozsa histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionClass {
    /// Every shot measured all zeros.
    Constant,
    /// Some shot measured something else.
    Balanced,
}

fn hadamard_layer(circuit: &mut Circuit) -> IrResult<()> {
    for q in 0..NUM_QUBITS {
        circuit.h(QubitId(q))?;
    }
    Ok(())
}

/// The pipeline circuit: H layer, [`SCRIPT_ORACLE`], measure qubit k into bit k.
pub fn script_circuit() -> IrResult<Circuit> {
    let mut circuit = Circuit::with_size("deutsch_jozsa", NUM_QUBITS, NUM_QUBITS);
    hadamard_layer(&mut circuit)?;
    circuit.apply_ops(SCRIPT_ORACLE)?;
    circuit.measure_all()?;
    Ok(circuit)
}

/// The textbook circuit around a phase oracle.
pub fn phase_oracle_circuit(oracle: PhaseOracle) -> IrResult<Circuit> {
    let mut circuit = Circuit::with_size("deutsch_jozsa_phase", NUM_QUBITS, NUM_QUBITS);
    hadamard_layer(&mut circuit)?;
    circuit.apply_ops(oracle.ops())?;
    hadamard_layer(&mut circuit)?;
    circuit.measure_all()?;
    Ok(circuit)
}

/// Classify a textbook histogram. An empty histogram is neither, and is
/// reported as balanced.
pub fn classify(counts: &Counts) -> FunctionClass {
    let zeros = "0".repeat(NUM_QUBITS as usize);
    let total = counts.total_shots();
    if total > 0 && counts.get(&zeros) == total {
        FunctionClass::Constant
    } else {
        FunctionClass::Balanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsolve_adapter_sim::outcome_probabilities;
    use qsolve_ir::{ClbitId, InstructionKind, StandardGate};

    #[test]
    fn test_script_circuit_structure() {
        let circuit = script_circuit().unwrap();
        let ops = circuit.count_ops();

        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(ops["ccx"], 1);
        assert_eq!(ops["measure"], 3);
        assert_eq!(ops["x"], 6);
        // 3 before the oracle, 2 around the Toffoli
        assert_eq!(ops["h"], 5);

        let leading_h = circuit
            .instructions()
            .iter()
            .take_while(|i| matches!(i.kind, InstructionKind::Gate(StandardGate::H)))
            .count();
        assert_eq!(leading_h, 3);

        let expected: Vec<_> = (0..3).map(|k| (QubitId(k), ClbitId(k))).collect();
        assert_eq!(circuit.measurement_map(), expected);
    }

    #[test]
    fn test_script_circuit_distribution_is_uniform() {
        let probs = outcome_probabilities(&script_circuit().unwrap());
        assert_eq!(probs.len(), 8);
        for (bits, p) in probs {
            assert_eq!(bits.len(), 3);
            assert!((p - 0.125).abs() < 1e-9, "{bits}: {p}");
        }
    }

    #[test]
    fn test_constant_oracle_reads_all_zeros() {
        let probs = outcome_probabilities(&phase_oracle_circuit(PhaseOracle::ConstantZero).unwrap());
        assert!((probs["000"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_balanced_oracle_never_reads_zeros() {
        let probs = outcome_probabilities(&phase_oracle_circuit(PhaseOracle::Balanced).unwrap());
        assert!(probs.get("000").copied().unwrap_or(0.0) < 1e-9);
        // Qubit 0 flips, and clbit 0 is the rightmost character.
        assert!((probs["001"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(&Counts::from_pairs([("000", 1024)])),
            FunctionClass::Constant
        );
        assert_eq!(
            classify(&Counts::from_pairs([("000", 1000), ("001", 24)])),
            FunctionClass::Balanced
        );
        assert_eq!(classify(&Counts::new()), FunctionClass::Balanced);
    }
}
