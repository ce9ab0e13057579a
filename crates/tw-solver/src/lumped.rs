//! Lumped-element nodal model of the winding.
//!
//! Every boundary group is one node. Each turn becomes a branch with
//! impedance `Zb = Γ(R + jωL)` (mutual terms included) between the groups
//! at its start and end, and the turn capacitance is split evenly over its
//! two ends: `Yc = Pᵀ Γ(G + jωC) P` with `P` averaging each turn's end
//! voltages. Source and load terminals add one MNA current unknown each.
//!
//! `Zb` and the assembled system are condition-checked before use; an
//! ill-conditioned frequency is reported as an error, never solved through.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use tracing::{debug, trace};
use tw_core::{Frequency, omega};
use tw_rlc::MatrixCalculator;
use tw_winding::Topology;
use uom::si::frequency::hertz;

use crate::error::{SolverError, SolverResult};
use crate::expm::CMatrix;
use crate::mtl::check_shape;
use crate::response::{PointResponse, ResponseModel};
use crate::terminal::{Boundary, TurnEnd, boundary_groups};

#[derive(Debug, Clone, PartialEq)]
pub struct LumpedConfig {
    /// Dielectric loss tangent of the insulation.
    pub loss_tangent: f64,
    /// Largest accepted 2-norm condition number.
    pub max_condition: f64,
}

impl Default for LumpedConfig {
    fn default() -> Self {
        Self {
            loss_tangent: 0.005,
            max_condition: 1.0e15,
        }
    }
}

pub struct LumpedModel<'a> {
    topology: &'a Topology,
    calculator: &'a dyn MatrixCalculator,
    config: LumpedConfig,
    c: DMatrix<f64>,
    gamma: DVector<f64>,
    /// (start group, end group) of every turn
    turn_groups: Vec<(usize, usize)>,
    num_groups: usize,
    source: (usize, Boundary),
    loads: Vec<(usize, Boundary)>,
}

/// `sigma_max / sigma_min`; infinite for a singular matrix.
pub fn condition_number(m: &CMatrix) -> f64 {
    let sv = m.singular_values();
    let max = sv.max();
    let min = sv.min();
    if min > 0.0 { max / min } else { f64::INFINITY }
}

impl<'a> LumpedModel<'a> {
    pub fn new(
        topology: &'a Topology,
        calculator: &'a dyn MatrixCalculator,
        config: LumpedConfig,
    ) -> SolverResult<Self> {
        if !(config.loss_tangent >= 0.0) || !(config.max_condition > 1.0) {
            return Err(SolverError::InvalidInput {
                what: format!(
                    "loss tangent {} / condition limit {} out of range",
                    config.loss_tangent, config.max_condition
                ),
            });
        }
        let n = topology.num_turns();
        let c = calculator.c_matrix(topology)?;
        check_shape(&c, n, "C")?;
        let gamma = DVector::from_column_slice(topology.turn_lengths());

        let groups = boundary_groups(topology)?;
        let mut start_of = vec![usize::MAX; n];
        let mut end_of = vec![usize::MAX; n];
        let mut source = None;
        let mut loads = Vec::new();
        for (g, group) in groups.iter().enumerate() {
            for m in &group.members {
                match *m {
                    TurnEnd::Start(t) => start_of[t] = g,
                    TurnEnd::End(t) => end_of[t] = g,
                }
            }
            match group.boundary {
                Boundary::Source { .. } => source = Some((g, group.boundary)),
                Boundary::Load { .. } => loads.push((g, group.boundary)),
                Boundary::Floating => {}
            }
        }
        let source = source.ok_or_else(|| SolverError::Topology {
            what: "no source terminal on the winding".to_string(),
        })?;
        let turn_groups: Vec<(usize, usize)> = start_of.into_iter().zip(end_of).collect();

        debug!(
            turns = n,
            nodes = groups.len(),
            loads = loads.len(),
            "lumped model initialized"
        );
        Ok(Self {
            topology,
            calculator,
            config,
            c,
            gamma,
            turn_groups,
            num_groups: groups.len(),
            source,
            loads,
        })
    }

    fn check_condition(&self, m: &CMatrix, what: &str, f: f64) -> SolverResult<()> {
        let condition = condition_number(m);
        trace!(freq_hz = f, what, condition, "condition check");
        if !(condition <= self.config.max_condition) {
            return Err(SolverError::IllConditioned {
                condition,
                limit: self.config.max_condition,
            });
        }
        Ok(())
    }

    /// Nodal admittance of the turns: `A Yb Aᵀ + Pᵀ Γ Y' P`.
    fn nodal_admittance(&self, yb: &CMatrix, w: f64) -> CMatrix {
        let n = self.gamma.len();
        let g = self.num_groups;

        let mut inc = CMatrix::zeros(g, n);
        let mut avg = CMatrix::zeros(n, g);
        for (t, &(from, to)) in self.turn_groups.iter().enumerate() {
            inc[(from, t)] += Complex64::new(1.0, 0.0);
            inc[(to, t)] -= Complex64::new(1.0, 0.0);
            avg[(t, from)] += Complex64::new(0.5, 0.0);
            avg[(t, to)] += Complex64::new(0.5, 0.0);
        }

        let y_scale = Complex64::new(self.config.loss_tangent * w, w);
        let shunt = CMatrix::from_fn(n, n, |i, j| self.gamma[i] * y_scale * self.c[(i, j)]);

        &inc * yb * inc.transpose() + avg.transpose() * shunt * &avg
    }
}

impl ResponseModel for LumpedModel<'_> {
    fn name(&self) -> &'static str {
        "lumped"
    }

    fn num_turns(&self) -> usize {
        self.gamma.len()
    }

    fn response_at(&self, freq: Frequency) -> SolverResult<PointResponse> {
        let f = freq.get::<hertz>();
        if !(f > 0.0 && f.is_finite()) {
            return Err(SolverError::InvalidInput {
                what: format!("frequency must be positive, got {f} Hz"),
            });
        }
        let n = self.gamma.len();
        let w = omega(f);

        let l = self.calculator.l_matrix(self.topology, freq)?;
        let r = self.calculator.r_matrix(self.topology, freq)?;
        check_shape(&l, n, "L")?;
        check_shape(&r, n, "R")?;

        let zb = CMatrix::from_fn(n, n, |i, j| {
            self.gamma[i] * Complex64::new(r[(i, j)], w * l[(i, j)])
        });
        self.check_condition(&zb, "branch impedance", f)?;
        let yb = zb.try_inverse().ok_or_else(|| SolverError::Singular {
            what: format!("branch impedance at {f} Hz"),
        })?;

        // unknowns: group voltages, source current, load currents
        let g = self.num_groups;
        let size = g + 1 + self.loads.len();
        let mut m = CMatrix::zeros(size, size);
        m.view_mut((0, 0), (g, g))
            .copy_from(&self.nodal_admittance(&yb, w));

        let one = Complex64::new(1.0, 0.0);
        let (src, src_boundary) = self.source;
        m[(src, g)] = -one;
        m[(g, src)] = one;
        m[(g, g)] = src_boundary.impedance(w);
        for (k, &(node, boundary)) in self.loads.iter().enumerate() {
            let col = g + 1 + k;
            m[(node, col)] = one;
            m[(col, node)] = one;
            m[(col, col)] = -boundary.impedance(w);
        }
        self.check_condition(&m, "nodal system", f)?;

        let mut rhs = DVector::<Complex64>::zeros(size);
        rhs[g] = one;
        let x = m.lu().solve(&rhs).ok_or_else(|| SolverError::Singular {
            what: format!("nodal system at {f} Hz"),
        })?;

        let v_src = x[src];
        let i_src = x[g];
        if i_src.norm() == 0.0 || v_src.norm() == 0.0 {
            return Err(SolverError::Singular {
                what: format!("zero source voltage or current at {f} Hz"),
            });
        }
        Ok(PointResponse {
            impedance: i_src.inv(),
            terminal_impedance: v_src / i_src,
            gains: self
                .turn_groups
                .iter()
                .map(|&(_, end)| x[end] / v_src)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_of_identity_and_singular() {
        let id = CMatrix::identity(3, 3);
        assert!((condition_number(&id) - 1.0).abs() < 1e-12);
        let singular = CMatrix::from_element(2, 2, Complex64::new(1.0, 0.0));
        assert!(condition_number(&singular) > 1e15);
    }
}
