//! The per-frequency response interface shared by the MTL and lumped models.

use num_complex::Complex64;
use tw_core::{Frequency, to_db};

use crate::error::SolverResult;

/// Solution of one frequency point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointResponse {
    /// Driving-point impedance `1 / I_src` under the unit excitation,
    /// source impedance included (ohm).
    pub impedance: Complex64,
    /// Impedance of the winding alone at the source node, `V_src / I_src`.
    pub terminal_impedance: Complex64,
    /// `V_end(t) / V_src` for every turn in global order.
    pub gains: Vec<Complex64>,
}

impl PointResponse {
    /// `20 log10 |gain|` per turn.
    pub fn gains_db(&self) -> Vec<f64> {
        self.gains.iter().map(|g| to_db(g.norm())).collect()
    }
}

/// A model that can be evaluated at independent frequencies.
///
/// Frequency-independent setup happens when the model is constructed; each
/// call only rebuilds what depends on frequency. Models are shared between
/// sweep workers, hence `Sync`.
pub trait ResponseModel: Sync {
    fn name(&self) -> &'static str;

    fn num_turns(&self) -> usize;

    fn response_at(&self, freq: Frequency) -> SolverResult<PointResponse>;
}

/// Which model to build for a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Mtl,
    Lumped,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Mtl => "mtl",
            ModelKind::Lumped => "lumped",
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mtl" => Ok(ModelKind::Mtl),
            "lumped" => Ok(ModelKind::Lumped),
            other => Err(format!("unknown model '{other}' (expected mtl or lumped)")),
        }
    }
}
