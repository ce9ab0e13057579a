//! The per-unit-length matrix interface consumed by the solvers.

use nalgebra::DMatrix;
use tw_core::Frequency;
use tw_winding::Topology;

use crate::error::RlcResult;

/// Source of per-unit-length line parameters for every turn of a topology.
///
/// All matrices are `N x N` in the topology's global turn order. `C` and `L`
/// are symmetric; `R` is normally diagonal.
pub trait MatrixCalculator: Send + Sync {
    /// Capacitance (F/m), Maxwell form. Frequency independent.
    fn c_matrix(&self, topology: &Topology) -> RlcResult<DMatrix<f64>>;

    /// Inductance (H/m) at `freq`.
    fn l_matrix(&self, topology: &Topology, freq: Frequency) -> RlcResult<DMatrix<f64>>;

    /// Resistance (ohm/m) at `freq`.
    fn r_matrix(&self, topology: &Topology, freq: Frequency) -> RlcResult<DMatrix<f64>>;
}
