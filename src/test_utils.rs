// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities: single-site matrices, a dissipative chain fixture
//! and matrix comparison.

use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;

use crate::hilbert::{HilbertRef, Spin};
use crate::operator::LocalOperator;
use crate::sparse::{dagger, kron_dense};

pub fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

pub fn identity(n: usize) -> Array2<Complex64> {
    Array2::eye(n)
}

pub fn sigma_x() -> Array2<Complex64> {
    ndarray::arr2(&[[c(0.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]])
}

pub fn sigma_y() -> Array2<Complex64> {
    ndarray::arr2(&[[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]])
}

/// +1 on local index 0 (spin up).
pub fn sigma_z() -> Array2<Complex64> {
    ndarray::arr2(&[[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-1.0, 0.0)]])
}

/// Raises down (index 1) to up (index 0).
pub fn sigma_plus() -> Array2<Complex64> {
    ndarray::arr2(&[[c(0.0, 0.0), c(1.0, 0.0)], [c(0.0, 0.0), c(0.0, 0.0)]])
}

pub fn sigma_minus() -> Array2<Complex64> {
    ndarray::arr2(&[[c(0.0, 0.0), c(0.0, 0.0)], [c(1.0, 0.0), c(0.0, 0.0)]])
}

/// Element-wise comparison with an absolute tolerance.
pub fn assert_matrix_eq(actual: &Array2<Complex64>, expected: &Array2<Complex64>, tol: f64) {
    assert_eq!(actual.dim(), expected.dim(), "shape mismatch");
    for ((idx, a), e) in actual.indexed_iter().zip(expected.iter()) {
        assert!(
            (a - e).norm() <= tol,
            "mismatch at {:?}: {} vs {} (tol {:.1e})",
            idx,
            a,
            e,
            tol
        );
    }
}

/// Spin-1/2 ring `H = Σ σx_i + Σ σz_i σz_{(i+1)%L}` with jumps `σ⁻_i`.
pub fn ising_chain(length: usize) -> (LocalOperator, Vec<LocalOperator>) {
    let hi: HilbertRef = Arc::new(Spin::new(0.5, length).unwrap());
    let sx = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
    let szsz = kron_dense(&sigma_z(), &sigma_z());

    let mut hamiltonian = LocalOperator::new(hi.clone());
    for i in 0..length {
        hamiltonian += &LocalOperator::from_rows(hi.clone(), &sx, &[i]).unwrap();
        hamiltonian +=
            &LocalOperator::from_matrix(hi.clone(), szsz.clone(), &[i, (i + 1) % length]).unwrap();
    }

    let jump_ops = (0..length)
        .map(|i| LocalOperator::from_matrix(hi.clone(), sigma_minus(), &[i]).unwrap())
        .collect();
    (hamiltonian, jump_ops)
}

/// Deterministic full-rank density matrix with complex coherences.
pub fn mixed_test_state(n: usize) -> Array2<Complex64> {
    let a = Array2::from_shape_fn((n, n), |(i, j)| {
        c(
            1.0 + ((3 * i + 5 * j) % 7) as f64 / 7.0,
            (i as f64 - 0.5 * j as f64) * 0.3,
        )
    });
    let rho = a.dot(&dagger(&a));
    let trace: Complex64 = rho.diag().sum();
    rho.mapv(|z| z / trace)
}
