//! Matrix exponential of complex square matrices.
//!
//! Three tiers, tried in order:
//! 1. diagonal input: elementwise `exp` of the diagonal;
//! 2. Hermitian input: eigendecomposition `V exp(D) V^H`;
//! 3. everything else: scaled [5/5] Padé approximant with repeated squaring.

use nalgebra::{DMatrix, SymmetricEigen};
use num_complex::Complex64;
use tracing::trace;

use crate::error::{SolverError, SolverResult};

pub type CMatrix = DMatrix<Complex64>;

/// Padé numerator and denominator degree.
const PADE_ORDER: usize = 5;

/// Scale until the 1-norm is at most this before applying Padé.
const PADE_NORM_LIMIT: f64 = 0.5;

/// Which tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpmMethod {
    Diagonal,
    /// Hermitian input only. Complex-symmetric matrices that are not
    /// Hermitian, such as `[[0, i], [i, 0]]`, take the Padé tier.
    SymmetricEigen,
    Pade { squarings: u32 },
}

/// `exp(m)`.
pub fn expm(m: &CMatrix) -> SolverResult<CMatrix> {
    expm_with_method(m).map(|(e, _)| e)
}

/// `exp(m)` together with the tier that computed it.
pub fn expm_with_method(m: &CMatrix) -> SolverResult<(CMatrix, ExpmMethod)> {
    let n = m.nrows();
    if n == 0 || m.ncols() != n {
        return Err(SolverError::InvalidInput {
            what: format!("matrix exponential of a {}x{} matrix", n, m.ncols()),
        });
    }
    if m.iter().any(|z| !(z.re.is_finite() && z.im.is_finite())) {
        return Err(SolverError::NonFinite {
            what: "matrix exponential input".to_string(),
        });
    }

    if is_diagonal(m) {
        trace!(n, "expm: diagonal");
        return Ok((exp_diagonal(m), ExpmMethod::Diagonal));
    }

    if is_hermitian(m) {
        if let Some(e) = exp_hermitian(m) {
            trace!(n, "expm: symmetric eigen");
            return Ok((e, ExpmMethod::SymmetricEigen));
        }
        trace!(n, "expm: eigendecomposition failed, falling back to Pade");
    }

    let (e, squarings) = exp_pade(m)?;
    trace!(n, squarings, "expm: Pade");
    Ok((e, ExpmMethod::Pade { squarings }))
}

/// Exact-zero test on every off-diagonal entry.
fn is_diagonal(m: &CMatrix) -> bool {
    let zero = Complex64::new(0.0, 0.0);
    (0..m.ncols()).all(|j| (0..m.nrows()).all(|i| i == j || m[(i, j)] == zero))
}

/// Exact test for `m == m^H`.
fn is_hermitian(m: &CMatrix) -> bool {
    let n = m.nrows();
    (0..n).all(|i| (i..n).all(|j| m[(i, j)] == m[(j, i)].conj()))
}

fn exp_diagonal(m: &CMatrix) -> CMatrix {
    let n = m.nrows();
    let mut out = CMatrix::zeros(n, n);
    for i in 0..n {
        out[(i, i)] = m[(i, i)].exp();
    }
    out
}

fn exp_hermitian(m: &CMatrix) -> Option<CMatrix> {
    let eig = SymmetricEigen::try_new(m.clone(), f64::EPSILON, 0)?;
    let v = &eig.eigenvectors;
    let mut scaled = v.clone();
    for (j, lambda) in eig.eigenvalues.iter().enumerate() {
        let e = lambda.exp();
        for z in scaled.column_mut(j).iter_mut() {
            *z *= e;
        }
    }
    let out = scaled * v.adjoint();
    out.iter()
        .all(|z| z.re.is_finite() && z.im.is_finite())
        .then_some(out)
}

/// Maximum absolute column sum.
pub fn one_norm(m: &CMatrix) -> f64 {
    m.column_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Coefficients `c_j = (p+q-j)! p! / ((p+q)! j! (p-j)!)` for `p = q`.
fn pade_coefficients() -> [f64; PADE_ORDER + 1] {
    let p = PADE_ORDER as f64;
    let q = PADE_ORDER as f64;
    let mut c = [1.0; PADE_ORDER + 1];
    for j in 1..=PADE_ORDER {
        let jf = j as f64;
        c[j] = c[j - 1] * (p - jf + 1.0) / (jf * (p + q - jf + 1.0));
    }
    c
}

fn exp_pade(m: &CMatrix) -> SolverResult<(CMatrix, u32)> {
    let n = m.nrows();
    let norm = one_norm(m);
    let squarings = if norm > PADE_NORM_LIMIT {
        norm.log2().ceil().max(0.0) as u32
    } else {
        0
    };
    let x = m.map(|z| z / 2f64.powi(squarings as i32));

    let c = pade_coefficients();
    let identity = CMatrix::identity(n, n);
    let mut numer = identity.clone();
    let mut denom = identity.clone();
    let mut power = identity;
    for (j, &cj) in c.iter().enumerate().skip(1) {
        power = &power * &x;
        let term = power.map(|z| z * cj);
        numer += &term;
        if j % 2 == 0 {
            denom += &term;
        } else {
            denom -= &term;
        }
    }

    let mut e = denom
        .lu()
        .solve(&numer)
        .ok_or_else(|| SolverError::Singular {
            what: "Pade denominator".to_string(),
        })?;
    for _ in 0..squarings {
        e = &e * &e;
    }

    if e.iter().any(|z| !(z.re.is_finite() && z.im.is_finite())) {
        return Err(SolverError::NonFinite {
            what: "matrix exponential result".to_string(),
        });
    }
    Ok((e, squarings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::E;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn real(rows: usize, data: &[f64]) -> CMatrix {
        CMatrix::from_row_iterator(rows, rows, data.iter().map(|&v| c(v)))
    }

    fn assert_close(a: &CMatrix, b: &CMatrix, tol: f64) {
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < tol, "{x} vs {y}");
        }
    }

    #[test]
    fn exp_of_zero_is_identity() {
        for n in [1, 2, 5] {
            let (e, method) = expm_with_method(&CMatrix::zeros(n, n)).unwrap();
            assert_eq!(method, ExpmMethod::Diagonal);
            assert_close(&e, &CMatrix::identity(n, n), 1e-15);
        }
    }

    #[test]
    fn diagonal_fast_path() {
        let m = CMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![
            c(1.0),
            Complex64::new(-2.0, 0.5),
        ]));
        let (e, method) = expm_with_method(&m).unwrap();
        assert_eq!(method, ExpmMethod::Diagonal);
        assert!((e[(0, 0)] - c(E)).norm() < 1e-14);
        assert!((e[(1, 1)] - Complex64::new(-2.0, 0.5).exp()).norm() < 1e-14);
        assert_eq!(e[(0, 1)], c(0.0));
    }

    #[test]
    fn symmetric_path() {
        let m = real(2, &[2.0, 1.0, 1.0, 2.0]);
        let (e, method) = expm_with_method(&m).unwrap();
        assert_eq!(method, ExpmMethod::SymmetricEigen);
        let e3 = E.powi(3);
        let expected = real(2, &[(e3 + E) / 2.0, (e3 - E) / 2.0, (e3 - E) / 2.0, (e3 + E) / 2.0]);
        assert_close(&e, &expected, 1e-10);
    }

    #[test]
    fn pade_upper_triangular() {
        let m = real(2, &[1.0, 2.0, 0.0, 3.0]);
        let (e, method) = expm_with_method(&m).unwrap();
        assert!(matches!(method, ExpmMethod::Pade { squarings: 3 }));
        let e3 = E.powi(3);
        let expected = real(2, &[E, e3 - E, 0.0, e3]);
        assert_close(&e, &expected, 1e-6);
    }

    #[test]
    fn pade_rotation() {
        let theta = 0.7;
        let m = real(2, &[0.0, theta, -theta, 0.0]);
        let e = expm(&m).unwrap();
        let expected = real(2, &[theta.cos(), theta.sin(), -theta.sin(), theta.cos()]);
        assert_close(&e, &expected, 1e-9);
    }

    #[test]
    fn pade_matches_eigen_on_hermitian_input() {
        let m = CMatrix::from_row_slice(
            2,
            2,
            &[
                c(0.3),
                Complex64::new(0.2, -0.4),
                Complex64::new(0.2, 0.4),
                c(-1.1),
            ],
        );
        let (eig, method) = expm_with_method(&m).unwrap();
        assert_eq!(method, ExpmMethod::SymmetricEigen);
        let (pade, _) = exp_pade(&m).unwrap();
        assert_close(&eig, &pade, 1e-9);
    }

    #[test]
    fn complex_symmetric_goes_to_pade() {
        let off = Complex64::new(0.0, 1.0);
        let m = CMatrix::from_row_slice(2, 2, &[c(0.0), off, off, c(0.0)]);
        let (e, method) = expm_with_method(&m).unwrap();
        assert!(matches!(method, ExpmMethod::Pade { .. }));
        // exp(i X) = cos(1) I + i sin(1) X
        assert!((e[(0, 0)] - c(1f64.cos())).norm() < 1e-9);
        assert!((e[(0, 1)] - Complex64::new(0.0, 1f64.sin())).norm() < 1e-9);
    }

    #[test]
    fn rejects_empty_and_non_square() {
        assert!(expm(&CMatrix::zeros(0, 0)).is_err());
        assert!(expm(&CMatrix::zeros(2, 3)).is_err());
    }

    #[test]
    fn coefficients() {
        let c = pade_coefficients();
        let expected = [1.0, 0.5, 1.0 / 9.0, 1.0 / 72.0, 1.0 / 1008.0, 1.0 / 30240.0];
        for (a, b) in c.iter().zip(expected) {
            assert!((a - b).abs() < 1e-15);
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn complex_matrix(n: usize) -> impl Strategy<Value = CMatrix> {
        prop::collection::vec((-1.0_f64..1.0, -1.0_f64..1.0), n * n).prop_map(move |v| {
            CMatrix::from_iterator(n, n, v.into_iter().map(|(re, im)| Complex64::new(re, im)))
        })
    }

    fn max_deviation(a: &CMatrix, b: &CMatrix) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).norm()).fold(0.0, f64::max)
    }

    proptest! {
        #[test]
        fn exp_of_negation_is_inverse(m in complex_matrix(3)) {
            let e = expm(&m).unwrap();
            let e_neg = expm(&(-m)).unwrap();
            let product = e * e_neg;
            let dev = max_deviation(&product, &CMatrix::identity(3, 3));
            prop_assert!(dev < 1e-9, "deviation {}", dev);
        }

        #[test]
        fn eigen_and_pade_agree_on_hermitian_input(m in complex_matrix(4)) {
            let h = &m + m.adjoint();
            let (eigen, method) = expm_with_method(&h).unwrap();
            prop_assert_eq!(method, ExpmMethod::SymmetricEigen);
            let (pade, _) = exp_pade(&h).unwrap();
            let scale = pade.iter().map(|z| z.norm()).fold(1.0, f64::max);
            let dev = max_deviation(&eigen, &pade);
            prop_assert!(dev < 1e-9 * scale, "deviation {} at scale {}", dev, scale);
        }
    }
}
