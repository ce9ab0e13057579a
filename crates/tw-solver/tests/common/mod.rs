//! Fixtures shared by the solver integration tests.

#![allow(dead_code)]

use nalgebra::DMatrix;
use tw_core::{Frequency, henry, ohm};
use tw_rlc::{MatrixCalculator, RlcResult};
use tw_winding::geometry::{ConductorSize, HelicalGeometry, WindingGeometry};
use tw_winding::{Terminal, TerminalImpedance, TerminalLocation, Topology, Transformer};

/// Frequency-independent per-unit-length parameters: `diag` on the diagonal,
/// `mutual` between every pair of turns.
pub struct FixedLine {
    pub r: f64,
    pub l: f64,
    pub l_mutual: f64,
    pub c_ground: f64,
    pub c_mutual: f64,
}

impl FixedLine {
    pub fn single() -> Self {
        Self {
            r: 1.0e-3,
            l: 1.0e-6,
            l_mutual: 0.0,
            c_ground: 1.0e-10,
            c_mutual: 0.0,
        }
    }

    pub fn coupled() -> Self {
        Self {
            r: 1.0e-3,
            l: 1.0e-6,
            l_mutual: 0.5e-6,
            c_ground: 1.0e-10,
            c_mutual: 0.2e-10,
        }
    }

    /// Series impedance only; nothing ties a winding to ground or to its
    /// neighbours through capacitance.
    pub fn without_capacitance() -> Self {
        Self {
            r: 1.0e-3,
            l: 1.0e-6,
            l_mutual: 0.0,
            c_ground: 0.0,
            c_mutual: 0.0,
        }
    }

    fn fill(n: usize, diag: f64, off: f64) -> DMatrix<f64> {
        DMatrix::from_fn(n, n, |i, j| if i == j { diag } else { off })
    }
}

impl MatrixCalculator for FixedLine {
    fn c_matrix(&self, topology: &Topology) -> RlcResult<DMatrix<f64>> {
        let n = topology.num_turns();
        let diag = self.c_ground + (n as f64 - 1.0) * self.c_mutual;
        Ok(Self::fill(n, diag, -self.c_mutual))
    }

    fn l_matrix(&self, topology: &Topology, _freq: Frequency) -> RlcResult<DMatrix<f64>> {
        Ok(Self::fill(topology.num_turns(), self.l, self.l_mutual))
    }

    fn r_matrix(&self, topology: &Topology, _freq: Frequency) -> RlcResult<DMatrix<f64>> {
        Ok(Self::fill(topology.num_turns(), self.r, 0.0))
    }
}

pub fn helix(turns: usize) -> WindingGeometry {
    WindingGeometry::Helical(HelicalGeometry {
        inner_radius_m: 0.3,
        z_bottom_m: 0.0,
        num_turns: turns,
        conductor: ConductorSize {
            width_m: 0.003,
            height_m: 0.01,
        },
        turn_gap_m: 0.002,
    })
}

/// One helical segment, source (`source_ohm`) at its start and a load
/// (`load_ohm`, 0 for a solid ground) at its end.
pub fn single_segment(turns: usize, source_ohm: f64, load_ohm: f64) -> Topology {
    let mut t = Transformer::new();
    let w = t.add_winding("HV").unwrap();
    t.add_segment(w, "S", helix(turns), vec![]).unwrap();
    t.add_terminal(Terminal::source(
        "IN",
        TerminalLocation::SegmentStart {
            segment: "S".into(),
        },
        TerminalImpedance::new(ohm(source_ohm), henry(0.0)),
    ))
    .unwrap();
    let out = TerminalLocation::SegmentEnd {
        segment: "S".into(),
    };
    let load = if load_ohm == 0.0 {
        Terminal::ground("OUT", out)
    } else {
        Terminal::load("OUT", out, TerminalImpedance::new(ohm(load_ohm), henry(0.0)))
    };
    t.add_terminal(load).unwrap();
    t.finalize().unwrap()
}

/// A driven one-turn winding plus a second one-turn winding with no
/// terminals at all.
pub fn with_floating_winding() -> Topology {
    let mut t = Transformer::new();
    let hv = t.add_winding("HV").unwrap();
    t.add_segment(hv, "S", helix(1), vec![]).unwrap();
    let lv = t.add_winding("LV").unwrap();
    let far = WindingGeometry::Helical(HelicalGeometry {
        inner_radius_m: 0.4,
        z_bottom_m: 0.0,
        num_turns: 1,
        conductor: ConductorSize {
            width_m: 0.003,
            height_m: 0.01,
        },
        turn_gap_m: 0.002,
    });
    t.add_segment(lv, "F", far, vec![]).unwrap();
    t.add_terminal(Terminal::source(
        "IN",
        TerminalLocation::SegmentStart {
            segment: "S".into(),
        },
        TerminalImpedance::new(ohm(10.0), henry(0.0)),
    ))
    .unwrap();
    t.add_terminal(Terminal::ground(
        "OUT",
        TerminalLocation::SegmentEnd {
            segment: "S".into(),
        },
    ))
    .unwrap();
    t.finalize().unwrap()
}
