//! COBYLA-style trust-region simplex search.
//!
//! Steps are bounded by a radius `rho` that starts at `rhobeg` and halves
//! whenever the simplex flattens out, down to `rhoend`. Within a radius the
//! search moves by reflection, expansion and contraction of the worst vertex.

use tracing::trace;

use super::{Minimum, Optimizer};

/// Trust-region simplex optimizer settings.
#[derive(Debug, Clone)]
pub struct Cobyla {
    /// Maximum number of outer iterations.
    pub maxiter: usize,
    /// Spread between best and worst vertex treated as flat.
    pub tol: f64,
    /// Initial step radius.
    pub rhobeg: f64,
    /// Final step radius.
    pub rhoend: f64,
}

impl Default for Cobyla {
    fn default() -> Self {
        Self {
            maxiter: 100,
            tol: 1e-6,
            rhobeg: 0.5,
            rhoend: 1e-4,
        }
    }
}

impl Cobyla {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration limit.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the flatness tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the initial and final step radius.
    pub fn with_trust_region(mut self, rhobeg: f64, rhoend: f64) -> Self {
        self.rhobeg = rhobeg;
        self.rhoend = rhoend;
        self
    }
}

#[derive(Debug, Clone)]
struct Vertex {
    point: Vec<f64>,
    value: f64,
}

/// Objective wrapper that counts calls and maps NaN to +∞.
struct Counted<F> {
    objective: F,
    calls: usize,
}

impl<F: FnMut(&[f64]) -> f64> Counted<F> {
    fn eval(&mut self, point: Vec<f64>) -> Vertex {
        self.calls += 1;
        let value = (self.objective)(&point);
        Vertex {
            point,
            value: if value.is_nan() { f64::INFINITY } else { value },
        }
    }

    /// `origin` plus one vertex per axis, offset by `rho`.
    fn simplex_around(&mut self, origin: Vertex, rho: f64) -> Vec<Vertex> {
        let n = origin.point.len();
        let mut simplex = Vec::with_capacity(n + 1);
        for axis in 0..n {
            let mut point = origin.point.clone();
            point[axis] += rho;
            simplex.push(self.eval(point));
        }
        simplex.push(origin);
        simplex
    }
}

/// `from + scale·(to − from)`.
fn along(from: &[f64], to: &[f64], scale: f64) -> Vec<f64> {
    from.iter()
        .zip(to)
        .map(|(f, t)| f + scale * (t - f))
        .collect()
}

impl Optimizer for Cobyla {
    fn minimize<F>(&self, objective: F, initial: Vec<f64>) -> Minimum
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = initial.len();
        let mut f = Counted {
            objective,
            calls: 0,
        };
        let start = f.eval(initial);
        let mut history = vec![start.value];

        if n == 0 {
            return Minimum {
                params: start.point,
                value: start.value,
                num_evaluations: f.calls,
                num_iterations: 0,
                history,
                converged: true,
            };
        }

        let mut rho = self.rhobeg;
        let mut simplex = f.simplex_around(start, rho);
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.maxiter {
            iterations += 1;
            simplex.sort_by(|a, b| a.value.total_cmp(&b.value));

            let best = simplex[0].value;
            let worst = simplex[n].value;
            if best < history[history.len() - 1] {
                history.push(best);
            }

            if worst - best < self.tol {
                if rho <= self.rhoend {
                    converged = true;
                    break;
                }
                rho = (rho * 0.5).max(self.rhoend);
                trace!(rho, best, "shrinking trust region");
                let anchor = simplex.swap_remove(0);
                simplex = f.simplex_around(anchor, rho);
                continue;
            }

            let mut centroid = vec![0.0; n];
            for vertex in &simplex[..n] {
                for (c, x) in centroid.iter_mut().zip(&vertex.point) {
                    *c += x / n as f64;
                }
            }

            // Reflect the worst vertex, clamping each coordinate to the radius.
            let reflected: Vec<f64> = along(&simplex[n].point, &centroid, 2.0)
                .into_iter()
                .zip(&centroid)
                .map(|(r, c)| c + (r - c).clamp(-rho, rho))
                .collect();
            let reflected = f.eval(reflected);

            if reflected.value < best {
                let expanded = f.eval(along(&centroid, &reflected.point, 2.0));
                simplex[n] = if expanded.value < reflected.value {
                    expanded
                } else {
                    reflected
                };
            } else if reflected.value < simplex[n - 1].value {
                simplex[n] = reflected;
            } else {
                let contracted = f.eval(along(&centroid, &simplex[n].point, 0.5));
                if contracted.value < worst {
                    simplex[n] = contracted;
                } else {
                    let anchor = simplex[0].point.clone();
                    for vertex in simplex.iter_mut().skip(1) {
                        *vertex = f.eval(along(&anchor, &vertex.point, 0.5));
                    }
                }
            }
        }

        let Vertex { point, value } = simplex
            .into_iter()
            .min_by(|a, b| a.value.total_cmp(&b.value))
            .unwrap_or(Vertex {
                point: Vec::new(),
                value: f64::INFINITY,
            });
        if value < history[history.len() - 1] {
            history.push(value);
        }

        Minimum {
            params: point,
            value,
            num_evaluations: f.calls,
            num_iterations: iterations,
            history,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_bowl() {
        let result = Cobyla::new().with_maxiter(200).minimize(
            |p| (p[0] - 1.0).powi(2) + (p[1] - 2.0).powi(2),
            vec![0.0, 0.0],
        );

        assert!(result.value < 0.01, "{}", result.value);
        assert!((result.params[0] - 1.0).abs() < 0.1);
        assert!((result.params[1] - 2.0).abs() < 0.1);
        assert!(result.num_evaluations > result.num_iterations);
    }

    #[test]
    fn test_rosenbrock_improves() {
        let result = Cobyla::new().with_maxiter(500).minimize(
            |p| (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0].powi(2)).powi(2),
            vec![0.0, 0.0],
        );
        assert!(result.value < 1.0);
    }

    #[test]
    fn test_history_is_decreasing() {
        let result = Cobyla::new().minimize(|p| p[0].abs() + p[1].abs(), vec![1.5, -0.7]);
        assert!(result.history.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(result.history.last().copied(), Some(result.value));
    }

    #[test]
    fn test_nan_is_treated_as_worst() {
        let result = Cobyla::new().minimize(
            |p| if p[0] > 0.8 { f64::NAN } else { (p[0] - 0.5).powi(2) },
            vec![0.0],
        );
        assert!(result.value.is_finite());
        assert!((result.params[0] - 0.5).abs() < 0.1);
    }

    #[test]
    fn test_no_parameters() {
        let result = Cobyla::new().minimize(|_| 3.0, Vec::new());
        assert_eq!(result.value, 3.0);
        assert_eq!(result.num_evaluations, 1);
        assert!(result.converged);
    }
}
