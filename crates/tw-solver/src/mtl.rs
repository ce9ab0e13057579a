//! Multiconductor transmission line model of the winding.
//!
//! Each turn is a line of its own length. With `x` normalised to `[0, 1]`
//! along every turn, the line equations are `d/dx [V; I] = A [V; I]` with
//!
//! ```text
//! A = [[0, -Γ(R + jωL)], [-Γ(G + jωC), 0]],   G = tanδ · ω · C
//! ```
//!
//! and `Γ = diag(turn lengths)`. The transfer matrix `Φ = exp(A)` links the
//! start and end of every turn; the boundary rows from
//! [`TerminalMatrixFactory`] close the system. Unknowns are ordered
//! `[V_start, V_end, I_start, I_end]`.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use tracing::{debug, trace};
use tw_core::{Frequency, omega};
use tw_rlc::MatrixCalculator;
use tw_winding::Topology;
use uom::si::frequency::hertz;

use crate::error::{SolverError, SolverResult};
use crate::expm::{CMatrix, expm_with_method};
use crate::response::{PointResponse, ResponseModel};
use crate::terminal::TerminalMatrixFactory;

#[derive(Debug, Clone, PartialEq)]
pub struct MtlConfig {
    /// Dielectric loss tangent of the insulation.
    pub loss_tangent: f64,
}

impl Default for MtlConfig {
    fn default() -> Self {
        Self {
            loss_tangent: 0.005,
        }
    }
}

pub struct MtlModel<'a> {
    topology: &'a Topology,
    calculator: &'a dyn MatrixCalculator,
    config: MtlConfig,
    c: DMatrix<f64>,
    gamma: DVector<f64>,
    terminals: TerminalMatrixFactory,
}

impl<'a> MtlModel<'a> {
    /// Evaluate the frequency-independent parts: C, Γ and HA.
    pub fn new(
        topology: &'a Topology,
        calculator: &'a dyn MatrixCalculator,
        config: MtlConfig,
    ) -> SolverResult<Self> {
        if !(config.loss_tangent >= 0.0) {
            return Err(SolverError::InvalidInput {
                what: format!("loss tangent must be non-negative, got {}", config.loss_tangent),
            });
        }
        let n = topology.num_turns();
        let c = calculator.c_matrix(topology)?;
        check_shape(&c, n, "C")?;
        let gamma = DVector::from_column_slice(topology.turn_lengths());
        let terminals = TerminalMatrixFactory::new(topology)?;

        debug!(turns = n, loss_tangent = config.loss_tangent, "MTL model initialized");
        Ok(Self {
            topology,
            calculator,
            config,
            c,
            gamma,
            terminals,
        })
    }

    pub fn terminals(&self) -> &TerminalMatrixFactory {
        &self.terminals
    }

    /// The system matrix `A` at angular frequency `w`.
    fn system_matrix(&self, w: f64, r: &DMatrix<f64>, l: &DMatrix<f64>) -> CMatrix {
        let n = self.gamma.len();
        let y_scale = Complex64::new(self.config.loss_tangent * w, w);
        let mut a = CMatrix::zeros(2 * n, 2 * n);
        for i in 0..n {
            let g = self.gamma[i];
            for j in 0..n {
                a[(i, n + j)] = -g * Complex64::new(r[(i, j)], w * l[(i, j)]);
                a[(n + i, j)] = -g * y_scale * self.c[(i, j)];
            }
        }
        a
    }

    /// Assemble `B` from the transfer matrix and the boundary rows.
    fn boundary_system(&self, phi: &CMatrix, w: f64) -> CMatrix {
        let n = self.gamma.len();
        let one = Complex64::new(1.0, 0.0);
        let mut b = CMatrix::zeros(4 * n, 4 * n);

        // Φ [V_s; I_s] - [V_e; I_e] = 0
        for i in 0..2 * n {
            for j in 0..n {
                b[(i, j)] = phi[(i, j)];
                b[(i, 2 * n + j)] = phi[(i, n + j)];
            }
        }
        for i in 0..n {
            b[(i, n + i)] = -one;
            b[(n + i, 3 * n + i)] = -one;
        }

        let ha = self.terminals.ha();
        let hb = self.terminals.hb(w);
        for i in 0..2 * n {
            for j in 0..2 * n {
                b[(2 * n + i, j)] = Complex64::new(ha[(i, j)], 0.0);
                b[(2 * n + i, 2 * n + j)] = hb[(i, j)];
            }
        }
        b
    }
}

pub(crate) fn check_shape(m: &DMatrix<f64>, n: usize, what: &str) -> SolverResult<()> {
    if m.shape() != (n, n) {
        return Err(SolverError::InvalidInput {
            what: format!("{what} matrix is {:?}, expected {n}x{n}", m.shape()),
        });
    }
    Ok(())
}

impl ResponseModel for MtlModel<'_> {
    fn name(&self) -> &'static str {
        "mtl"
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

        let a = self.system_matrix(w, &r, &l);
        let (phi, method) = expm_with_method(&a)?;
        trace!(freq_hz = f, ?method, "transfer matrix");

        let b = self.boundary_system(&phi, w);
        let mut v = DVector::<Complex64>::zeros(4 * n);
        v[2 * n] = Complex64::new(1.0, 0.0);
        let x = b.lu().solve(&v).ok_or_else(|| SolverError::Singular {
            what: format!("MTL boundary system at {f} Hz"),
        })?;
        if x.iter().any(|z| !(z.re.is_finite() && z.im.is_finite())) {
            return Err(SolverError::NonFinite {
                what: format!("MTL solution at {f} Hz"),
            });
        }

        let src = self.terminals.source_group();
        let v_src = x[src.members[0].column(n)];
        let i_src: Complex64 = src
            .members
            .iter()
            .map(|m| x[2 * n + m.column(n)] * m.outflow_sign())
            .sum();
        if i_src.norm() == 0.0 || v_src.norm() == 0.0 {
            return Err(SolverError::Singular {
                what: format!("zero source voltage or current at {f} Hz"),
            });
        }

        Ok(PointResponse {
            impedance: i_src.inv(),
            terminal_impedance: v_src / i_src,
            gains: (0..n).map(|t| x[n + t] / v_src).collect(),
        })
    }
}
