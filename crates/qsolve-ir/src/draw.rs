//! Plain-text circuit drawing.
//!
//! One row per qubit, one column per instruction:
//!
//! ```text
//! q0: ─H──■──M0─
//! q1: ────X──M1─
//! ```

use std::fmt::Write as _;

use crate::circuit::Circuit;
use crate::gate::StandardGate;
use crate::instruction::InstructionKind;

const WIRE: char = '─';

fn gate_label(gate: &StandardGate) -> String {
    match gate.parameter() {
        Some(theta) => format!("{}({theta:.2})", gate.name().to_uppercase()),
        None => gate.name().to_uppercase(),
    }
}

/// Render a circuit as text, one newline-terminated row per qubit.
pub fn draw(circuit: &Circuit) -> String {
    let n = circuit.num_qubits();
    let prefix: Vec<String> = (0..n).map(|q| format!("q{q}: ")).collect();
    let prefix_width = prefix.iter().map(|p| p.chars().count()).max().unwrap_or(0);

    let mut rows: Vec<String> = prefix
        .into_iter()
        .map(|p| format!("{p:<prefix_width$}"))
        .collect();

    for inst in circuit.instructions() {
        let mut cells: Vec<Option<String>> = vec![None; n];

        match &inst.kind {
            InstructionKind::Gate(gate) => match gate {
                StandardGate::CX | StandardGate::CCX => {
                    let (target, controls) = inst.qubits.split_last().unzip();
                    for c in controls.into_iter().flatten() {
                        cells[c.index()] = Some("■".into());
                    }
                    if let Some(t) = target {
                        cells[t.index()] = Some("X".into());
                    }
                }
                StandardGate::CZ => {
                    for q in &inst.qubits {
                        cells[q.index()] = Some("■".into());
                    }
                }
                StandardGate::Swap => {
                    for q in &inst.qubits {
                        cells[q.index()] = Some("x".into());
                    }
                }
                other => {
                    let label = gate_label(other);
                    for q in &inst.qubits {
                        cells[q.index()] = Some(label.clone());
                    }
                }
            },
            InstructionKind::Measure => {
                for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                    cells[q.index()] = Some(format!("M{}", c.0));
                }
            }
            InstructionKind::Barrier => {
                for q in &inst.qubits {
                    cells[q.index()] = Some("░".into());
                }
            }
        }

        // Wires crossed by a multi-qubit gate.
        if inst.is_gate() && inst.qubits.len() > 1 {
            let lo = inst.qubits.iter().map(|q| q.index()).min().unwrap_or(0);
            let hi = inst.qubits.iter().map(|q| q.index()).max().unwrap_or(0);
            for cell in cells.iter_mut().take(hi).skip(lo + 1) {
                if cell.is_none() {
                    *cell = Some("┼".into());
                }
            }
        }

        let width = cells
            .iter()
            .flatten()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(1);

        for (row, cell) in rows.iter_mut().zip(&cells) {
            let label = cell.as_deref().unwrap_or("");
            let pad = width - label.chars().count();
            let _ = write!(
                row,
                "{WIRE}{label}{}{WIRE}",
                WIRE.to_string().repeat(pad)
            );
        }
    }

    rows.into_iter().fold(String::new(), |mut out, row| {
        out.push_str(&row);
        out.push('\n');
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qubit::QubitId;

    #[test]
    fn test_draw_bell() {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure_all().unwrap();

        let text = draw(&circuit);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "q0: ─H──■──M0─");
        assert_eq!(lines[1], "q1: ────X──M1─");
    }

    #[test]
    fn test_draw_ends_every_row() {
        let mut circuit = Circuit::with_size("x", 2, 0);
        circuit.x(QubitId(1)).unwrap();
        let text = draw(&circuit);
        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('\n').count(), 2);
        assert_eq!(draw(&Circuit::with_size("empty", 0, 0)), "");
    }

    #[test]
    fn test_draw_toffoli_and_params() {
        let mut circuit = Circuit::with_size("t", 3, 0);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        circuit.rz(0.5, QubitId(1)).unwrap();

        let text = draw(&circuit);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains('■'));
        assert!(lines[1].contains("RZ(0.50)"));
        assert!(lines[2].contains('X'));
        // Every row has the same visible width.
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_draw_crossing_wire() {
        let mut circuit = Circuit::with_size("span", 3, 0);
        circuit.cx(QubitId(2), QubitId(0)).unwrap();
        let text = draw(&circuit);
        assert!(text.lines().nth(1).unwrap().contains('┼'));
    }
}
