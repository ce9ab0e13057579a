//! Mutual inductance of coaxial circular filaments by direct integration of
//! Neumann's formula.
//!
//! Slow compared to the closed form in [`crate::analytic`] but independent of
//! it, so each can check the other.

use std::f64::consts::PI;

use tw_core::MU_0;

/// `M` between coaxial loops of radii `a`, `b` separated axially by `d` (H).
///
/// `M = mu0 a b / 2 * integral_0^2pi cos(phi) / sqrt(a^2 + b^2 - 2ab cos(phi) + d^2)`
/// evaluated with composite Simpson on `points` intervals (rounded up to even).
pub fn mutual_inductance(a: f64, b: f64, d: f64, points: usize) -> f64 {
    let n = (points.max(2) + 1) & !1;
    let h = 2.0 * PI / n as f64;
    let f = |phi: f64| {
        let c = phi.cos();
        c / (a * a + b * b - 2.0 * a * b * c + d * d).sqrt()
    };

    let mut sum = f(0.0) + f(2.0 * PI);
    for i in 1..n {
        let w = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += w * f(i as f64 * h);
    }
    0.5 * MU_0 * a * b * sum * h / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_in_radii() {
        let m1 = mutual_inductance(0.3, 0.5, 0.05, 2000);
        let m2 = mutual_inductance(0.5, 0.3, 0.05, 2000);
        assert!((m1 - m2).abs() < 1e-15);
    }

    #[test]
    fn decays_with_separation() {
        let near = mutual_inductance(0.5, 0.5, 0.01, 4000);
        let far = mutual_inductance(0.5, 0.5, 0.5, 4000);
        assert!(near > far);
        assert!(far > 0.0);
    }

    #[test]
    fn odd_point_count_is_rounded_up() {
        let a = mutual_inductance(0.5, 0.5, 0.1, 999);
        let b = mutual_inductance(0.5, 0.5, 0.1, 1000);
        assert_eq!(a, b);
    }
}
