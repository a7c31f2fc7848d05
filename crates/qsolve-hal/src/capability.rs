//! Backend capability introspection.

use serde::{Deserialize, Serialize};

/// Hardware capabilities of a quantum backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set (OpenQASM 3 naming convention).
    pub gate_set: GateSet,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Additional capability flags such as `"statevector"` or `"seeded"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Capabilities of the local statevector simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::universal(),
            max_shots: 1_000_000,
            is_simulator: true,
            features: vec!["statevector".into(), "seeded".into()],
        }
    }

    /// Capabilities of an IBM Quantum device.
    ///
    /// IBM transpiles submitted circuits server-side, so the gate set lists
    /// what the service accepts rather than the device's native gates.
    pub fn ibm(name: impl Into<String>, num_qubits: u32, is_simulator: bool) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::ibm(),
            max_shots: 100_000,
            is_simulator,
            features: vec![],
        }
    }
}

/// Gates a backend accepts, by OpenQASM name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Three-qubit gates supported.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub three_qubit: Vec<String>,
    /// Gates executed without decomposition.
    pub native: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl GateSet {
    /// Every gate of the circuit IR.
    pub fn universal() -> Self {
        let single = names(&[
            "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "rx", "ry", "rz", "p",
        ]);
        let two = names(&["cx", "cz", "swap", "rzz"]);
        let three = names(&["ccx"]);
        let native = single
            .iter()
            .chain(&two)
            .chain(&three)
            .cloned()
            .collect();
        Self {
            single_qubit: single,
            two_qubit: two,
            three_qubit: three,
            native,
        }
    }

    /// Gates accepted by the IBM Sampler service (transpiled on the server).
    pub fn ibm() -> Self {
        Self {
            single_qubit: names(&["id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "rx", "ry", "rz", "p", "sx"]),
            two_qubit: names(&["cx", "cz", "swap", "rzz", "ecr"]),
            three_qubit: names(&["ccx"]),
            native: names(&["rz", "sx", "x", "ecr", "cz"]),
        }
    }

    /// Check if a gate name is accepted.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit
            .iter()
            .chain(&self.two_qubit)
            .chain(&self.three_qubit)
            .any(|g| g == gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_capabilities() {
        let caps = Capabilities::simulator(20);
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
        assert!(caps.gate_set.contains("ccx"));
        assert!(caps.gate_set.contains("rzz"));
        assert!(!caps.gate_set.contains("ecr"));
    }

    #[test]
    fn test_ibm_capabilities() {
        let caps = Capabilities::ibm("ibm_brisbane", 127, false);
        assert!(!caps.is_simulator);
        assert!(caps.gate_set.contains("h"));
        assert!(caps.gate_set.contains("ccx"));
        assert!(caps.gate_set.native.contains(&"ecr".to_string()));
    }
}
