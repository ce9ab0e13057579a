//! Closed-form RLC parameters for axisymmetric turns.
//!
//! Each turn is treated as a circular filament at its conductor centre:
//! - L: Maxwell's mutual inductance of coaxial loops (elliptic integrals),
//!   self terms through the geometric mean distance of the cross-section,
//!   internal inductance reduced as the skin depth shrinks.
//! - R: DC resistance over the skin-limited conducting area, diagonal.
//! - C: parallel-plate coupling between facing neighbours plus a
//!   wire-over-plane term to the core, assembled in Maxwell form.

use std::f64::consts::PI;

use nalgebra::DMatrix;
use tracing::debug;
use tw_core::{EPSILON_0, Frequency, MU_0, ensure_finite};
use tw_winding::{Conductor, Topology};
use uom::si::frequency::hertz;

use crate::calculator::MatrixCalculator;
use crate::elliptic::complete_ke;
use crate::error::{RlcError, RlcResult};
use crate::neumann;

/// GMD of a rectangular section relative to its perimeter half-sum.
const RECT_GMD_FACTOR: f64 = 0.2235;

/// Moduli this close to one mean the two filaments coincide.
const MAX_MODULUS_SQ: f64 = 1.0 - 1e-14;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InductanceMethod {
    /// Closed form with complete elliptic integrals.
    Elliptic,
    /// Direct Simpson integration of Neumann's formula.
    Neumann { points: usize },
}

/// Material and model parameters for [`AnalyticCalculator`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticConfig {
    /// Conductor resistivity (ohm m).
    pub resistivity_ohm_m: f64,
    /// Relative permittivity of the insulation.
    pub relative_permittivity: f64,
    /// Radius of the grounded core surface (m).
    pub core_radius_m: f64,
    /// Turns couple capacitively when their facing gap is at most this
    /// multiple of the larger conductor dimension.
    pub neighbour_gap_factor: f64,
    pub inductance: InductanceMethod,
}

impl Default for AnalyticConfig {
    fn default() -> Self {
        Self {
            resistivity_ohm_m: 1.72e-8,
            relative_permittivity: 3.5,
            core_radius_m: 0.1,
            neighbour_gap_factor: 2.0,
            inductance: InductanceMethod::Elliptic,
        }
    }
}

impl AnalyticConfig {
    pub fn validate(&self) -> RlcResult<()> {
        let bad = |what: String| Err(RlcError::InvalidConfig { what });
        if !(self.resistivity_ohm_m > 0.0) {
            return bad(format!("resistivity must be positive, got {}", self.resistivity_ohm_m));
        }
        if !(self.relative_permittivity >= 1.0) {
            return bad(format!(
                "relative permittivity must be >= 1, got {}",
                self.relative_permittivity
            ));
        }
        if !(self.core_radius_m >= 0.0) {
            return bad(format!("core radius must be non-negative, got {}", self.core_radius_m));
        }
        if !(self.neighbour_gap_factor > 0.0) {
            return bad("neighbour gap factor must be positive".to_string());
        }
        if let InductanceMethod::Neumann { points } = self.inductance {
            if points < 16 {
                return bad(format!("Neumann integration needs >= 16 points, got {points}"));
            }
        }
        Ok(())
    }
}

/// Skin depth (m) at `freq_hz`; infinite at DC.
pub fn skin_depth(resistivity_ohm_m: f64, freq_hz: f64) -> f64 {
    if freq_hz <= 0.0 {
        return f64::INFINITY;
    }
    (resistivity_ohm_m / (PI * freq_hz * MU_0)).sqrt()
}

/// Geometric mean distance of a rectangular section (m).
pub fn rect_gmd(width_m: f64, height_m: f64) -> f64 {
    RECT_GMD_FACTOR * (width_m + height_m)
}

/// Mutual inductance (H) of coaxial loops of radii `a`, `b` at axial
/// separation `d`.
pub fn loop_mutual_inductance(a: f64, b: f64, d: f64) -> RlcResult<f64> {
    let k2 = 4.0 * a * b / ((a + b).powi(2) + d * d);
    if !(k2 < MAX_MODULUS_SQ) {
        return Err(RlcError::NonFinite {
            what: "mutual inductance of coincident loops",
            value: k2,
        });
    }
    let k = k2.sqrt();
    let (big_k, big_e) = complete_ke(k);
    Ok(MU_0 * (a * b).sqrt() * ((2.0 / k - k) * big_k - 2.0 / k * big_e))
}

/// Self inductance (H) of one turn with a rectangular section.
///
/// `internal_fraction` scales the uniform-current internal inductance
/// (`mu0 r / 4`): 1 at DC, towards 0 as current crowds to the surface.
pub fn loop_self_inductance(conductor: &Conductor, internal_fraction: f64) -> f64 {
    let r = conductor.r_m;
    let g = rect_gmd(conductor.width_m, conductor.height_m);
    let dc = MU_0 * r * ((8.0 * r / g).ln() - 2.0);
    dc - 0.25 * MU_0 * r * (1.0 - internal_fraction.clamp(0.0, 1.0))
}

/// Per-unit-length RLC from conductor geometry alone.
#[derive(Debug, Clone, Default)]
pub struct AnalyticCalculator {
    config: AnalyticConfig,
}

impl AnalyticCalculator {
    pub fn new(config: AnalyticConfig) -> RlcResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyticConfig {
        &self.config
    }

    fn skin_depth(&self, freq: Frequency) -> f64 {
        skin_depth(self.config.resistivity_ohm_m, freq.get::<hertz>())
    }

    /// Fraction of the section's half thickness reached by the skin depth.
    fn penetration(conductor: &Conductor, delta: f64) -> f64 {
        let half = 0.5 * conductor.width_m.min(conductor.height_m);
        (delta / half).min(1.0)
    }

    fn mutual(&self, a: &Conductor, b: &Conductor) -> RlcResult<f64> {
        let d = (a.z_m - b.z_m).abs();
        match self.config.inductance {
            InductanceMethod::Elliptic => loop_mutual_inductance(a.r_m, b.r_m, d),
            InductanceMethod::Neumann { points } => {
                Ok(neumann::mutual_inductance(a.r_m, b.r_m, d, points))
            }
        }
    }

    fn self_inductance(&self, c: &Conductor, internal_fraction: f64) -> f64 {
        match self.config.inductance {
            InductanceMethod::Elliptic => loop_self_inductance(c, internal_fraction),
            InductanceMethod::Neumann { points } => {
                // a loop seen from its own GMD, minus the lost internal part
                let g = rect_gmd(c.width_m, c.height_m);
                neumann::mutual_inductance(c.r_m, c.r_m, g, points)
                    - 0.25 * MU_0 * c.r_m * (1.0 - internal_fraction)
            }
        }
    }

    /// Facing-plate capacitance per unit length between two turns (F/m).
    fn plate_coupling(&self, i: usize, a: &Conductor, j: usize, b: &Conductor) -> RlcResult<f64> {
        let z_overlap = a.z_top().min(b.z_top()) - a.z_bottom().max(b.z_bottom());
        let r_overlap = a.r_outer().min(b.r_outer()) - a.r_inner().max(b.r_inner());

        let (area, gap) = match (z_overlap > 0.0, r_overlap > 0.0) {
            (true, false) => (z_overlap, -r_overlap),
            (false, true) => (r_overlap, -z_overlap),
            (true, true) => {
                return Err(RlcError::Geometry {
                    turn: i,
                    what: format!("conductor overlaps turn {j}"),
                });
            }
            (false, false) => return Ok(0.0),
        };
        if gap <= 0.0 {
            return Err(RlcError::Geometry {
                turn: i,
                what: format!("conductor touches turn {j}"),
            });
        }

        let reach = self.config.neighbour_gap_factor
            * a.width_m.max(a.height_m).max(b.width_m.max(b.height_m));
        if gap > reach {
            return Ok(0.0);
        }
        Ok(EPSILON_0 * self.config.relative_permittivity * area / gap)
    }

    /// Wire-over-plane capacitance from a turn to the core (F/m).
    fn ground_coupling(&self, i: usize, c: &Conductor) -> RlcResult<f64> {
        let h = c.r_m - self.config.core_radius_m;
        let a_eq = 0.25 * (c.width_m + c.height_m);
        if !(h > a_eq) {
            return Err(RlcError::Geometry {
                turn: i,
                what: format!(
                    "conductor at r={} m reaches the core (radius {} m)",
                    c.r_m, self.config.core_radius_m
                ),
            });
        }
        Ok(2.0 * PI * EPSILON_0 * self.config.relative_permittivity / (h / a_eq).acosh())
    }
}

fn turns(topology: &Topology) -> RlcResult<&[Conductor]> {
    let conductors = topology.conductors();
    if conductors.is_empty() {
        return Err(RlcError::Empty);
    }
    Ok(conductors)
}

impl MatrixCalculator for AnalyticCalculator {
    fn c_matrix(&self, topology: &Topology) -> RlcResult<DMatrix<f64>> {
        let cond = turns(topology)?;
        let n = cond.len();
        let mut c = DMatrix::<f64>::zeros(n, n);

        for i in 0..n {
            c[(i, i)] += self.ground_coupling(i, &cond[i])?;
            for j in (i + 1)..n {
                let cij = self.plate_coupling(i, &cond[i], j, &cond[j])?;
                if cij > 0.0 {
                    c[(i, i)] += cij;
                    c[(j, j)] += cij;
                    c[(i, j)] -= cij;
                    c[(j, i)] -= cij;
                }
            }
        }

        debug!(turns = n, "capacitance matrix assembled");
        Ok(c)
    }

    fn l_matrix(&self, topology: &Topology, freq: Frequency) -> RlcResult<DMatrix<f64>> {
        let cond = turns(topology)?;
        let n = cond.len();
        let delta = self.skin_depth(freq);
        let mut l = DMatrix::<f64>::zeros(n, n);

        for i in 0..n {
            let internal = Self::penetration(&cond[i], delta);
            let lii = self.self_inductance(&cond[i], internal);
            l[(i, i)] = lii / cond[i].turn_length();
            for j in (i + 1)..n {
                let m = self.mutual(&cond[i], &cond[j])?;
                // per unit length along the mean of the two turn lengths
                let lij = m / (PI * (cond[i].r_m + cond[j].r_m));
                l[(i, j)] = lij;
                l[(j, i)] = lij;
            }
        }

        for &v in l.iter() {
            ensure_finite(v, "inductance")?;
        }
        Ok(l)
    }

    fn r_matrix(&self, topology: &Topology, freq: Frequency) -> RlcResult<DMatrix<f64>> {
        let cond = turns(topology)?;
        let delta = self.skin_depth(freq);
        let per_turn: Vec<f64> = cond
            .iter()
            .map(|c| {
                let area = c.area();
                let skin_area = 2.0 * (c.width_m + c.height_m) * delta;
                self.config.resistivity_ohm_m / area.min(skin_area)
            })
            .collect();
        Ok(DMatrix::from_diagonal(&nalgebra::DVector::from_vec(per_turn)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conductor(r_m: f64, z_m: f64) -> Conductor {
        Conductor {
            r_m,
            z_m,
            width_m: 0.004,
            height_m: 0.01,
        }
    }

    #[test]
    fn skin_depth_of_copper_at_50hz() {
        let d = skin_depth(1.72e-8, 50.0);
        assert!((d - 9.33e-3).abs() < 0.05e-3);
        assert!(skin_depth(1.72e-8, 0.0).is_infinite());
    }

    #[test]
    fn elliptic_matches_far_field_dipole_limit() {
        // far apart: M -> mu0 pi a^2 b^2 / (2 d^3)
        let (a, b, d) = (0.1, 0.1, 10.0);
        let exact = loop_mutual_inductance(a, b, d).unwrap();
        let dipole = MU_0 * PI * a * a * b * b / (2.0 * d.powi(3));
        assert!(((exact - dipole) / dipole).abs() < 1e-3);
    }

    #[test]
    fn coincident_loops_rejected() {
        assert!(loop_mutual_inductance(0.5, 0.5, 0.0).is_err());
    }

    #[test]
    fn internal_inductance_shrinks_with_skin_effect() {
        let c = conductor(0.5, 0.0);
        let dc = loop_self_inductance(&c, 1.0);
        let hf = loop_self_inductance(&c, 0.0);
        assert!((dc - hf - 0.25 * MU_0 * 0.5).abs() < 1e-15);
    }

    #[test]
    fn plates_couple_only_nearby_faces() {
        let calc = AnalyticCalculator::default();
        let a = conductor(0.5, 0.0);
        // axial neighbour 2 mm above
        let b = conductor(0.5, 0.012);
        let c = calc.plate_coupling(0, &a, 1, &b).unwrap();
        let expected = EPSILON_0 * 3.5 * 0.004 / 0.002;
        assert!((c - expected).abs() < 1e-18);
        // too far away
        let far = conductor(0.5, 0.5);
        assert_eq!(calc.plate_coupling(0, &a, 1, &far).unwrap(), 0.0);
        // diagonal neighbours do not face each other
        let diag = conductor(0.506, 0.012);
        assert_eq!(calc.plate_coupling(0, &a, 1, &diag).unwrap(), 0.0);
    }

    #[test]
    fn overlapping_conductors_rejected() {
        let calc = AnalyticCalculator::default();
        let a = conductor(0.5, 0.0);
        let b = conductor(0.501, 0.001);
        assert!(matches!(
            calc.plate_coupling(0, &a, 1, &b),
            Err(RlcError::Geometry { .. })
        ));
    }

    #[test]
    fn config_validation() {
        assert!(AnalyticConfig::default().validate().is_ok());
        let cfg = AnalyticConfig {
            relative_permittivity: 0.5,
            ..AnalyticConfig::default()
        };
        assert!(AnalyticCalculator::new(cfg).is_err());
        let cfg = AnalyticConfig {
            inductance: InductanceMethod::Neumann { points: 4 },
            ..AnalyticConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
