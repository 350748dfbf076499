// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Eigenvalues of dense Hermitian matrices.
//!
//! A Hermitian `A + iB` is mapped to the real symmetric `[[A, -B], [B, A]]`,
//! whose spectrum is that of `A + iB` with every eigenvalue doubled. The
//! real matrix is reduced to tridiagonal form by Householder reflections
//! and its eigenvalues are found by Sturm bisection.
//!
//! Ref: Golub & Van Loan, "Matrix Computations" (2013), §8.3 and §8.4.

use ndarray::{s, Array1, Array2};
use num_complex::Complex64;

use crate::error::{Result, ValidationError};

/// Pivot floor of the Sturm sequence.
const STURM_PIVOT_GUARD: f64 = 1e-300;

/// Count eigenvalues of a symmetric tridiagonal matrix strictly below λ.
///
/// The number of negative pivots of the LDLᵀ factorization of `T − λ`.
pub fn sturm_count(diagonal: &[f64], off_diag: &[f64], lambda: f64) -> usize {
    let n = diagonal.len();
    if n == 0 {
        return 0;
    }

    let mut count = 0;
    let mut q = diagonal[0] - lambda;
    if q < 0.0 {
        count += 1;
    }
    for i in 1..n {
        let q_safe = if q.abs() < STURM_PIVOT_GUARD {
            STURM_PIVOT_GUARD.copysign(q)
        } else {
            q
        };
        q = (diagonal[i] - lambda) - off_diag[i - 1] * off_diag[i - 1] / q_safe;
        if q < 0.0 {
            count += 1;
        }
    }
    count
}

/// All eigenvalues of a symmetric tridiagonal matrix, ascending.
pub fn tridiagonal_eigenvalues(diagonal: &[f64], off_diag: &[f64]) -> Vec<f64> {
    let n = diagonal.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![diagonal[0]];
    }

    // Gershgorin bounds
    let mut lo = f64::MAX;
    let mut hi = f64::MIN;
    for i in 0..n {
        let e_left = if i > 0 { off_diag[i - 1].abs() } else { 0.0 };
        let e_right = if i < n - 1 { off_diag[i].abs() } else { 0.0 };
        lo = lo.min(diagonal[i] - e_left - e_right);
        hi = hi.max(diagonal[i] + e_left + e_right);
    }
    lo -= 1.0;
    hi += 1.0;

    (0..n)
        .map(|k| {
            let mut a = lo;
            let mut b = hi;
            for _ in 0..200 {
                let mid = 0.5 * (a + b);
                if (b - a) < 2.0 * f64::EPSILON * mid.abs().max(1.0) {
                    break;
                }
                if sturm_count(diagonal, off_diag, mid) <= k {
                    a = mid;
                } else {
                    b = mid;
                }
            }
            0.5 * (a + b)
        })
        .collect()
}

/// Householder reduction of a real symmetric matrix to tridiagonal form.
///
/// Returns the diagonal and the sub-diagonal.
pub fn tridiagonalize(mut a: Array2<f64>) -> (Vec<f64>, Vec<f64>) {
    let n = a.nrows();
    for k in 0..n.saturating_sub(2) {
        let x = a.slice(s![k + 1.., k]).to_owned();
        let norm = x.dot(&x).sqrt();
        if norm == 0.0 {
            continue;
        }
        let alpha = -norm.copysign(x[0]);
        let mut v = x;
        v[0] -= alpha;
        let v_norm = v.dot(&v).sqrt();
        if v_norm == 0.0 {
            continue;
        }
        v /= v_norm;

        // A ← H A H with H = I − 2vvᵀ on the trailing block
        let mut block = a.slice_mut(s![k + 1.., k + 1..]);
        let p: Array1<f64> = block.dot(&v);
        let kappa = v.dot(&p);
        let q = &p - &(&v * kappa);
        for i in 0..v.len() {
            for j in 0..v.len() {
                block[[i, j]] -= 2.0 * (v[i] * q[j] + q[i] * v[j]);
            }
        }

        a[[k + 1, k]] = alpha;
        a[[k, k + 1]] = alpha;
        for i in k + 2..n {
            a[[i, k]] = 0.0;
            a[[k, i]] = 0.0;
        }
    }

    let diagonal = (0..n).map(|i| a[[i, i]]).collect();
    let off_diag = (0..n.saturating_sub(1)).map(|i| a[[i + 1, i]]).collect();
    (diagonal, off_diag)
}

/// Eigenvalues of a Hermitian matrix, ascending.
pub fn eigvalsh(m: &Array2<Complex64>) -> Result<Vec<f64>> {
    let n = m.nrows();
    if m.ncols() != n {
        return Err(ValidationError::Field {
            field: "matrix".into(),
            message: format!("must be square, got {} × {}", n, m.ncols()),
        }
        .into());
    }
    let scale = m.iter().map(|z| z.norm()).fold(0.0, f64::max).max(1.0);
    for i in 0..n {
        for j in i..n {
            if (m[[i, j]] - m[[j, i]].conj()).norm() > 1e-10 * scale {
                return Err(ValidationError::PhysicsConstraint(format!(
                    "matrix is not Hermitian at ({}, {})",
                    i, j
                ))
                .into());
            }
        }
    }

    let mut real = Array2::zeros((2 * n, 2 * n));
    for ((i, j), z) in m.indexed_iter() {
        real[[i, j]] = z.re;
        real[[i + n, j + n]] = z.re;
        real[[i, j + n]] = -z.im;
        real[[i + n, j]] = z.im;
    }
    let (diagonal, off_diag) = tridiagonalize(real);
    let doubled = tridiagonal_eigenvalues(&diagonal, &off_diag);
    Ok(doubled.into_iter().step_by(2).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{c, sigma_x, sigma_y};
    use approx::assert_relative_eq;

    #[test]
    fn test_sturm_count_2x2() {
        // [[1, -1], [-1, 3]] has eigenvalues 2 ∓ √2
        let d = [1.0, 3.0];
        let e = [-1.0];
        assert_eq!(sturm_count(&d, &e, 0.0), 0);
        assert_eq!(sturm_count(&d, &e, 1.0), 1);
        assert_eq!(sturm_count(&d, &e, 4.0), 2);
    }

    #[test]
    fn test_clean_chain_spectrum() {
        // d_i = 0, e_i = -1: eigenvalues 2 cos(kπ/(N+1))
        let n = 40;
        let evals = tridiagonal_eigenvalues(&vec![0.0; n], &vec![-1.0; n - 1]);
        assert_eq!(evals.len(), n);
        for k in 1..=n {
            let exact = 2.0 * (k as f64 * std::f64::consts::PI / (n as f64 + 1.0)).cos();
            let closest = evals
                .iter()
                .map(|&ev| (ev - exact).abs())
                .fold(f64::MAX, f64::min);
            assert!(closest < 1e-10, "k={}, closest error={:.2e}", k, closest);
        }
    }

    #[test]
    fn test_tridiagonalize_preserves_spectrum() {
        // diag(1, 2, 3, 4) rotated is still {1, 2, 3, 4}
        let a = ndarray::arr2(&[
            [2.5, 0.5, 0.0, 0.5],
            [0.5, 2.5, 0.5, 0.0],
            [0.0, 0.5, 2.5, 0.5],
            [0.5, 0.0, 0.5, 2.5],
        ]);
        let (d, e) = tridiagonalize(a);
        let evals = tridiagonal_eigenvalues(&d, &e);
        // circulant: 2.5 + cos(2πk/4)
        let expected = [1.5, 2.5, 2.5, 3.5];
        for (ev, ex) in evals.iter().zip(expected) {
            assert_relative_eq!(*ev, ex, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_eigvalsh_pauli() {
        for m in [sigma_x(), sigma_y()] {
            let evals = eigvalsh(&m).unwrap();
            assert_relative_eq!(evals[0], -1.0, epsilon = 1e-12);
            assert_relative_eq!(evals[1], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_eigvalsh_degenerate() {
        let mut m = Array2::zeros((3, 3));
        m[[0, 0]] = c(2.0, 0.0);
        m[[1, 1]] = c(2.0, 0.0);
        m[[2, 2]] = c(-1.0, 0.0);
        let evals = eigvalsh(&m).unwrap();
        assert_relative_eq!(evals[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(evals[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(evals[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_eigvalsh_rejects_non_hermitian() {
        let mut m = Array2::zeros((2, 2));
        m[[0, 1]] = c(1.0, 0.0);
        assert!(eigvalsh(&m).is_err());
    }
}
