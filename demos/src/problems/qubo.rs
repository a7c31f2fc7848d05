//! Quadratic unconstrained binary optimization and its Ising form.
//!
//! Variable `k` of a [`Qubo`] is qubit `k`: in a basis state index, bit `k`
//! holds the value of `x[k]`. The Ising form uses `x = (1 - z) / 2`, so a
//! variable set to 1 is spin `z = -1`.

use std::collections::BTreeMap;


/// `offset + Σ linear[i]·x_i + Σ_{i<j} quadratic[(i, j)]·x_i·x_j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Qubo {
    num_vars: usize,
    linear: Vec<f64>,
    quadratic: BTreeMap<(usize, usize), f64>,
    offset: f64,
}

impl Qubo {
    /// An all-zero objective over `num_vars` variables.
    pub fn new(num_vars: usize) -> Self {
        Self {
            num_vars,
            linear: vec![0.0; num_vars],
            quadratic: BTreeMap::new(),
            offset: 0.0,
        }
    }

    /// Number of binary variables.
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Constant term.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Linear coefficients.
    pub fn linear(&self) -> &[f64] {
        &self.linear
    }

    /// Quadratic coefficients keyed by `(i, j)` with `i < j`.
    pub fn quadratic(&self) -> &BTreeMap<(usize, usize), f64> {
        &self.quadratic
    }

    /// Add to the constant term.
    pub fn add_offset(&mut self, value: f64) {
        self.offset += value;
    }

    /// Add `coeff·x_i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn add_linear(&mut self, i: usize, coeff: f64) {
        self.linear[i] += coeff;
    }

    /// Add `coeff·x_i·x_j`. Since `x² = x`, a diagonal term is linear.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of range.
    pub fn add_quadratic(&mut self, i: usize, j: usize, coeff: f64) {
        assert!(i < self.num_vars && j < self.num_vars, "variable out of range");
        if i == j {
            self.linear[i] += coeff;
        } else {
            *self.quadratic.entry((i.min(j), i.max(j))).or_insert(0.0) += coeff;
        }
    }

    /// Objective value of an assignment (`x[k]` in `{0, 1}`).
    pub fn evaluate(&self, x: &[u8]) -> f64 {
        let linear: f64 = self
            .linear
            .iter()
            .zip(x)
            .filter(|&(_, &xi)| xi != 0)
            .map(|(c, _)| c)
            .sum();
        let quadratic: f64 = self
            .quadratic
            .iter()
            .filter(|&(&(i, j), _)| x[i] != 0 && x[j] != 0)
            .map(|(_, c)| c)
            .sum();
        self.offset + linear + quadratic
    }

    /// Objective value of every basis state, indexed little-endian.
    pub fn diagonal(&self) -> Vec<f64> {
        let n = self.num_vars;
        let mut x = vec![0u8; n];
        (0..1usize << n)
            .map(|index| {
                for (k, xk) in x.iter_mut().enumerate() {
                    *xk = ((index >> k) & 1) as u8;
                }
                self.evaluate(&x)
            })
            .collect()
    }

    /// Rewrite in spin variables.
    pub fn to_ising(&self) -> Ising {
        let n = self.num_vars;
        let mut h = vec![0.0; n];
        let mut couplings = BTreeMap::new();
        let mut offset = self.offset;

        for (i, &a) in self.linear.iter().enumerate() {
            offset += a / 2.0;
            h[i] -= a / 2.0;
        }
        for (&(i, j), &b) in &self.quadratic {
            offset += b / 4.0;
            h[i] -= b / 4.0;
            h[j] -= b / 4.0;
            couplings.insert((i, j), b / 4.0);
        }

        Ising {
            num_qubits: n,
            h,
            couplings,
            offset,
        }
    }
}

/// `offset + Σ h_i·z_i + Σ_{i<j} J_ij·z_i·z_j` over spins `z ∈ {+1, -1}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ising {
    /// Number of spins.
    pub num_qubits: usize,
    /// Local fields.
    pub h: Vec<f64>,
    /// Couplings keyed by `(i, j)` with `i < j`.
    pub couplings: BTreeMap<(usize, usize), f64>,
    /// Constant term.
    pub offset: f64,
}

impl Ising {
    /// Energy of the basis state `index` (bit `k` set means `z_k = -1`).
    pub fn energy(&self, index: usize) -> f64 {
        let z = |k: usize| if (index >> k) & 1 == 1 { -1.0 } else { 1.0 };
        let fields: f64 = self.h.iter().enumerate().map(|(k, h)| h * z(k)).sum();
        let couplings: f64 = self
            .couplings
            .iter()
            .map(|(&(i, j), jij)| jij * z(i) * z(j))
            .sum();
        self.offset + fields + couplings
    }

    /// Energy of every basis state.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..1usize << self.num_qubits).map(|i| self.energy(i)).collect()
    }
}
