use crate::{TwError, TwResult};

/// Floating point type used throughout system
pub type Real = f64;

/// Vacuum permeability (H/m).
pub const MU_0: Real = 4.0e-7 * core::f64::consts::PI;

/// Vacuum permittivity (F/m).
pub const EPSILON_0: Real = 8.854_187_812_8e-12;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> TwResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TwError::NonFinite { what, value: v })
    }
}

/// Angular frequency for a frequency in hertz.
#[inline]
pub fn omega(freq_hz: Real) -> Real {
    2.0 * core::f64::consts::PI * freq_hz
}

/// Magnitude in decibels; zero magnitude maps to negative infinity.
#[inline]
pub fn to_db(magnitude: Real) -> Real {
    20.0 * magnitude.log10()
}

/// `n` points spaced logarithmically from `start` to `end`, both included.
///
/// The last point is pinned to `end` so the endpoint is exact.
pub fn log_space(start: Real, end: Real, n: usize) -> TwResult<Vec<Real>> {
    if !(start > 0.0 && end > 0.0) {
        return Err(TwError::InvalidArg {
            what: format!("log spacing needs positive bounds, got {start}..{end}"),
        });
    }
    match n {
        0 => Ok(Vec::new()),
        1 => Ok(vec![start]),
        _ => {
            let log_start = start.ln();
            let log_delta = (end.ln() - log_start) / (n - 1) as Real;
            let mut points: Vec<Real> = (0..n)
                .map(|i| (log_start + i as Real * log_delta).exp())
                .collect();
            points[0] = start;
            points[n - 1] = end;
            Ok(points)
        }
    }
}
