//! Complete elliptic integrals via the arithmetic-geometric mean.

use std::f64::consts::PI;

const AGM_TOL: f64 = 1e-15;
const AGM_MAX_ITERS: usize = 64;

/// Complete elliptic integrals `(K(k), E(k))` for modulus `0 <= k < 1`.
///
/// Uses the AGM of `1` and `sqrt(1 - k^2)`; `E` follows from the same
/// iteration through the sum of `2^(n-1) c_n^2`.
pub fn complete_ke(k: f64) -> (f64, f64) {
    debug_assert!((0.0..1.0).contains(&k), "modulus out of range: {k}");

    let mut a = 1.0_f64;
    let mut b = (1.0 - k * k).sqrt();
    let mut c = k;
    let mut pow2 = 0.5;
    let mut sum = pow2 * c * c;

    for _ in 0..AGM_MAX_ITERS {
        if c.abs() <= AGM_TOL * a {
            break;
        }
        let a_next = 0.5 * (a + b);
        c = 0.5 * (a - b);
        b = (a * b).sqrt();
        a = a_next;
        pow2 *= 2.0;
        sum += pow2 * c * c;
    }

    let big_k = PI / (2.0 * a);
    (big_k, big_k * (1.0 - sum))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_modulus() {
        let (k, e) = complete_ke(0.0);
        assert!((k - PI / 2.0).abs() < 1e-15);
        assert!((e - PI / 2.0).abs() < 1e-15);
    }

    #[test]
    fn tabulated_values() {
        // k = sin(45 deg)
        let (k, e) = complete_ke(std::f64::consts::FRAC_1_SQRT_2);
        assert!((k - 1.854_074_677_301_372).abs() < 1e-12);
        assert!((e - 1.350_643_881_047_675).abs() < 1e-12);
    }

    #[test]
    fn k_grows_towards_unit_modulus() {
        let (k1, e1) = complete_ke(0.9);
        let (k2, e2) = complete_ke(0.999);
        assert!(k2 > k1);
        assert!(e2 < e1);
        assert!(e2 > 1.0);
    }
}
