//! QASM3 emitter for serializing circuits.

use qsolve_ir::{Circuit, ClbitId, Instruction, InstructionKind, QubitId, StandardGate};

/// Emit a circuit as QASM3 source code.
pub fn emit(circuit: &Circuit) -> String {
    Emitter::new().emit_circuit(circuit)
}

/// QASM3 emitter.
struct Emitter {
    output: String,
}

impl Emitter {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn emit_circuit(mut self, circuit: &Circuit) -> String {
        self.writeln("OPENQASM 3.0;");
        self.writeln("include \"stdgates.inc\";");
        self.writeln("");

        // rzz is not part of stdgates.inc.
        let needs_rzz = circuit
            .instructions()
            .iter()
            .any(|i| matches!(i.as_gate(), Some(StandardGate::RZZ(_))));
        if needs_rzz {
            self.writeln("gate rzz(theta) a, b { cx a, b; rz(theta) b; cx a, b; }");
            self.writeln("");
        }

        let num_qubits = circuit.num_qubits();
        if num_qubits > 0 {
            self.writeln(&format!("qubit[{num_qubits}] q;"));
        }

        let num_clbits = circuit.num_clbits();
        if num_clbits > 0 {
            self.writeln(&format!("bit[{num_clbits}] c;"));
        }

        if num_qubits > 0 || num_clbits > 0 {
            self.writeln("");
        }

        for instruction in circuit.instructions() {
            self.emit_instruction(instruction);
        }

        self.output
    }

    fn emit_instruction(&mut self, instruction: &Instruction) {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits = emit_qubits(&instruction.qubits);
                match gate.parameter() {
                    Some(theta) => {
                        self.writeln(&format!("{}({}) {qubits};", gate.name(), emit_angle(theta)));
                    }
                    None => self.writeln(&format!("{} {qubits};", gate.name())),
                }
            }

            InstructionKind::Measure => {
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    self.writeln(&format!("{} = measure {};", emit_clbit(*c), emit_qubit(*q)));
                }
            }

            InstructionKind::Barrier => {
                let qubits = emit_qubits(&instruction.qubits);
                if qubits.is_empty() {
                    self.writeln("barrier;");
                } else {
                    self.writeln(&format!("barrier {qubits};"));
                }
            }
        }
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

fn emit_angle(v: f64) -> String {
    let pi = std::f64::consts::PI;
    if (v - pi).abs() < 1e-10 {
        "pi".into()
    } else if (v - pi / 2.0).abs() < 1e-10 {
        "pi/2".into()
    } else if (v + pi / 2.0).abs() < 1e-10 {
        "-pi/2".into()
    } else {
        format!("{v}")
    }
}

fn emit_qubit(q: QubitId) -> String {
    format!("q[{}]", q.0)
}

fn emit_clbit(c: ClbitId) -> String {
    format!("c[{}]", c.0)
}

fn emit_qubits(qubits: &[QubitId]) -> String {
    qubits
        .iter()
        .map(|q| emit_qubit(*q))
        .collect::<Vec<_>>()
        .join(", ")
}
