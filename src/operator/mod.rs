// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Operators over discrete Hilbert spaces.
//!
//! An operator is described row by row: for a basis configuration `x`,
//! [`AbstractOperator::get_conn`] lists the configurations `x'` with a
//! non-zero matrix element `⟨x|O|x'⟩`. Sparse and dense matrices are
//! materialized by enumerating every basis state of the Hilbert space.
//!
//! - [`LocalOperator`]: sums of few-site terms
//! - [`LocalLiouvillian`]: Lindblad generator on the doubled space
//! - [`spin`], [`boson`]: single-site constructors

use std::fmt;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::debug;

use crate::config::ResourceLimits;
use crate::error::{HilbertError, Result};
use crate::hilbert::{AbstractHilbert, HilbertRef};
use crate::sparse::SparseMatrix;
use crate::validation::{validate_dense_dim, validate_n_states};

pub mod boson;
pub mod liouvillian;
pub mod local;
pub mod spin;

pub use liouvillian::LocalLiouvillian;
pub use local::LocalOperator;

pub(crate) const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// An operator acting on the states of a discrete Hilbert space.
pub trait AbstractOperator: Send + Sync + fmt::Debug {
    /// Hilbert space the operator acts on.
    fn hilbert(&self) -> &HilbertRef;

    /// Append the connected configurations of `x` and their matrix elements.
    ///
    /// `x_primes` receives one configuration of `hilbert().size()` values per
    /// element pushed to `mels`. Entries may repeat a configuration; their
    /// elements add up.
    fn get_conn_flattened(
        &self,
        x: &[f64],
        x_primes: &mut Vec<f64>,
        mels: &mut Vec<Complex64>,
    ) -> Result<()>;

    /// Upper bound on the number of entries `get_conn` returns for any `x`.
    fn max_conn_size(&self) -> usize;

    /// Connected configurations (one per row) and matrix elements `⟨x|O|x'⟩`.
    fn get_conn(&self, x: &[f64]) -> Result<(Array2<f64>, Vec<Complex64>)> {
        let mut x_primes = Vec::with_capacity(self.max_conn_size() * x.len());
        let mut mels = Vec::with_capacity(self.max_conn_size());
        self.get_conn_flattened(x, &mut x_primes, &mut mels)?;
        let x_primes = Array2::from_shape_vec((mels.len(), self.hilbert().size()), x_primes)?;
        Ok((x_primes, mels))
    }

    /// Number of connected configurations of `x`.
    fn n_conn(&self, x: &[f64]) -> Result<usize> {
        let mut x_primes = Vec::new();
        let mut mels = Vec::new();
        self.get_conn_flattened(x, &mut x_primes, &mut mels)?;
        Ok(mels.len())
    }

    /// Sparse matrix with the default resource limits.
    fn to_sparse(&self) -> Result<SparseMatrix> {
        self.to_sparse_with(&ResourceLimits::default())
    }

    /// Sparse matrix, row `n` holding `⟨n|O|n'⟩`.
    fn to_sparse_with(&self, limits: &ResourceLimits) -> Result<SparseMatrix> {
        assemble_sparse(self, limits)
    }

    /// Dense matrix with the default resource limits.
    fn to_dense(&self) -> Result<Array2<Complex64>> {
        self.to_dense_with(&ResourceLimits::default())
    }

    /// Dense matrix, refused above `limits.max_dense_dim`.
    fn to_dense_with(&self, limits: &ResourceLimits) -> Result<Array2<Complex64>> {
        validate_dense_dim(self.hilbert().n_states()?, limits)?;
        Ok(self.to_sparse_with(limits)?.to_dense())
    }

    /// Matrix-vector product `O v`.
    fn apply(&self, v: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        self.to_sparse()?.dot(v)
    }
}

/// Build the CSR matrix of `op` one basis state per row.
///
/// Connected configurations outside a constrained basis are dropped, which
/// projects the operator onto the constrained subspace.
fn assemble_sparse<O: AbstractOperator + ?Sized>(
    op: &O,
    limits: &ResourceLimits,
) -> Result<SparseMatrix> {
    let hilbert = op.hilbert();
    let n_states = hilbert.n_states()?;
    validate_n_states(n_states, limits)?;
    let size = hilbert.size();
    let constrained = hilbert.is_constrained();

    let row = |number: usize| -> Result<Vec<(usize, Complex64)>> {
        let mut x = vec![0.0; size];
        hilbert.number_to_state_into(number, &mut x)?;
        let mut x_primes = Vec::with_capacity(op.max_conn_size() * size);
        let mut mels = Vec::with_capacity(op.max_conn_size());
        op.get_conn_flattened(&x, &mut x_primes, &mut mels)?;

        let mut entries = Vec::with_capacity(mels.len());
        for (x_prime, mel) in x_primes.chunks_exact(size).zip(mels) {
            if mel == ZERO || (constrained && !hilbert.constraint_ok(x_prime)) {
                continue;
            }
            entries.push((hilbert.state_to_number(x_prime)?, mel));
        }
        Ok(entries)
    };

    let rows: Vec<Vec<(usize, Complex64)>> = if n_states < limits.parallel_threshold {
        (0..n_states).map(row).collect::<Result<_>>()?
    } else {
        (0..n_states).into_par_iter().map(row).collect::<Result<_>>()?
    };

    let matrix = SparseMatrix::from_rows(n_states, rows)?;
    debug!(
        n_states,
        nnz = matrix.nnz(),
        parallel = n_states >= limits.parallel_threshold,
        "Assembled sparse operator"
    );
    Ok(matrix)
}

/// Check that a configuration has one value per site of `hilbert`.
pub(crate) fn check_state_len(hilbert: &dyn AbstractHilbert, x: &[f64]) -> Result<()> {
    if x.len() != hilbert.size() {
        return Err(HilbertError::SizeMismatch {
            expected: hilbert.size(),
            actual: x.len(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hilbert::{Qubit, Spin};
    use crate::sparse::kron_dense;
    use crate::test_utils::{assert_matrix_eq, c, sigma_x, sigma_z};
    use std::sync::Arc;

    #[test]
    fn test_get_conn_shapes() {
        let hi: HilbertRef = Arc::new(Spin::new(0.5, 3).unwrap());
        let op = LocalOperator::from_matrix(hi, sigma_x(), &[1]).unwrap();
        let (x_primes, mels) = op.get_conn(&[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(x_primes.nrows(), mels.len());
        assert_eq!(x_primes.ncols(), 3);
        // diagonal first, then the flipped site
        assert_eq!(x_primes.row(1).to_vec(), vec![1.0, -1.0, 1.0]);
        assert_eq!(mels[1], c(1.0, 0.0));
        assert_eq!(op.n_conn(&[1.0, 1.0, 1.0]).unwrap(), 2);
    }

    #[test]
    fn test_parallel_and_serial_assembly_agree() {
        let hi: HilbertRef = Arc::new(Spin::new(0.5, 6).unwrap());
        let mut op = LocalOperator::new(hi.clone());
        for i in 0..6 {
            op += LocalOperator::from_matrix(hi.clone(), sigma_x(), &[i]).unwrap();
            op += LocalOperator::from_matrix(
                hi.clone(),
                kron_dense(&sigma_z(), &sigma_z()),
                &[i, (i + 1) % 6],
            )
            .unwrap();
        }
        let serial = ResourceLimits {
            parallel_threshold: usize::MAX,
            ..ResourceLimits::default()
        };
        let parallel = ResourceLimits {
            parallel_threshold: 1,
            ..ResourceLimits::default()
        };
        assert_eq!(
            op.to_sparse_with(&serial).unwrap(),
            op.to_sparse_with(&parallel).unwrap()
        );
    }

    #[test]
    fn test_dense_limit_enforced() {
        let hi: HilbertRef = Arc::new(Qubit::new(4).unwrap());
        let op = LocalOperator::identity(hi);
        let limits = ResourceLimits {
            max_dense_dim: 8,
            ..ResourceLimits::default()
        };
        assert!(op.to_dense_with(&limits).is_err());
        assert!(op.to_dense().is_ok());
    }

    #[test]
    fn test_apply_matches_dense() {
        let hi: HilbertRef = Arc::new(Spin::new(0.5, 2).unwrap());
        let op = LocalOperator::from_matrix(hi, sigma_x(), &[0]).unwrap();
        let v = Array1::from(vec![c(1.0, 0.0), c(2.0, 0.0), c(0.0, 1.0), c(0.0, 0.0)]);
        let dense = op.to_dense().unwrap();
        assert_matrix_eq(
            &op.apply(&v).unwrap().insert_axis(ndarray::Axis(1)),
            &dense.dot(&v).insert_axis(ndarray::Axis(1)),
            1e-14,
        );
    }

    #[test]
    fn test_constrained_space_projection() {
        // σz σz conserves magnetization, σx does not
        let hi: HilbertRef = Arc::new(Spin::with_total_sz(0.5, 2, 0.0).unwrap());
        let zz =
            LocalOperator::from_matrix(hi.clone(), kron_dense(&sigma_z(), &sigma_z()), &[0, 1])
                .unwrap();
        let dense = zz.to_dense().unwrap();
        assert_eq!(dense.dim(), (2, 2));
        assert_eq!(dense[[0, 0]], c(-1.0, 0.0));

        let x = LocalOperator::from_matrix(hi, sigma_x(), &[0]).unwrap();
        assert_eq!(x.to_sparse().unwrap().nnz(), 0);
    }
}
