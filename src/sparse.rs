// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Complex matrices in Compressed Sparse Row format.
//!
//! Operators over a lattice have a handful of non-zero elements per row
//! (one diagonal element plus one per off-diagonal local transition), so
//! CSR is the natural storage for both the Hamiltonian and the Liouvillian.
//! Rows are kept sorted by column with duplicates merged and exact zeros
//! dropped.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::{Result, ValidationError};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Sparse complex matrix in CSR layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<Complex64>,
}

impl SparseMatrix {
    /// The `nrows × ncols` zero matrix.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            row_ptr: vec![0; nrows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// The `n × n` identity.
    pub fn identity(n: usize) -> Self {
        Self {
            nrows: n,
            ncols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![Complex64::new(1.0, 0.0); n],
        }
    }

    /// Assemble from per-row `(column, value)` lists in any order.
    ///
    /// Duplicated columns are summed, zeros are dropped.
    pub fn from_rows(ncols: usize, rows: Vec<Vec<(usize, Complex64)>>) -> Result<Self> {
        let nrows = rows.len();
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for mut row in rows {
            if let Some(&(col, _)) = row.iter().find(|(col, _)| *col >= ncols) {
                return Err(ValidationError::Field {
                    field: "column".into(),
                    message: format!("index {} out of range for {} columns", col, ncols),
                }
                .into());
            }
            compress_row(&mut row);
            for (col, value) in row {
                col_idx.push(col);
                values.push(value);
            }
            row_ptr.push(col_idx.len());
        }
        Ok(Self {
            nrows,
            ncols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Assemble from `(row, column, value)` triplets.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: &[(usize, usize, Complex64)],
    ) -> Result<Self> {
        let mut rows = vec![Vec::new(); nrows];
        for &(i, j, value) in triplets {
            if i >= nrows {
                return Err(ValidationError::Field {
                    field: "row".into(),
                    message: format!("index {} out of range for {} rows", i, nrows),
                }
                .into());
            }
            rows[i].push((j, value));
        }
        Self::from_rows(ncols, rows)
    }

    /// Sparse copy of a dense matrix, dropping entries with `|z| <= tol`.
    pub fn from_dense(dense: &Array2<Complex64>, tol: f64) -> Self {
        let (nrows, ncols) = dense.dim();
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for row in dense.rows() {
            for (j, &z) in row.iter().enumerate() {
                if z.norm() > tol {
                    col_idx.push(j);
                    values.push(z);
                }
            }
            row_ptr.push(col_idx.len());
        }
        Self {
            nrows,
            ncols,
            row_ptr,
            col_idx,
            values,
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Number of stored non-zero entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    pub fn values(&self) -> &[Complex64] {
        &self.values
    }

    /// Stored entries of row `i` as `(column, value)`.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, Complex64)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Element `(i, j)`, zero when not stored.
    pub fn get(&self, i: usize, j: usize) -> Complex64 {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        match self.col_idx[range.clone()].binary_search(&j) {
            Ok(pos) => self.values[range.start + pos],
            Err(_) => ZERO,
        }
    }

    /// Dense copy.
    pub fn to_dense(&self) -> Array2<Complex64> {
        let mut dense = Array2::zeros((self.nrows, self.ncols));
        for i in 0..self.nrows {
            for (j, z) in self.row(i) {
                dense[[i, j]] = z;
            }
        }
        dense
    }

    /// Sparse matrix-vector product: y = A * x.
    ///
    /// Panics unless `x` has `ncols` and `y` has `nrows` entries.
    pub(crate) fn spmv(&self, x: &[Complex64], y: &mut [Complex64]) {
        assert_eq!(x.len(), self.ncols, "spmv: x has wrong length");
        assert_eq!(y.len(), self.nrows, "spmv: y has wrong length");
        for (i, yi) in y.iter_mut().enumerate() {
            let mut sum = ZERO;
            for k in self.row_ptr[i]..self.row_ptr[i + 1] {
                sum += self.values[k] * x[self.col_idx[k]];
            }
            *yi = sum;
        }
    }

    /// `A x` for an owned vector.
    pub fn dot(&self, x: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        if x.len() != self.ncols {
            return Err(ValidationError::Field {
                field: "vector".into(),
                message: format!("length {} does not match {} columns", x.len(), self.ncols),
            }
            .into());
        }
        let x = x.to_vec();
        let mut y = vec![ZERO; self.nrows];
        self.spmv(&x, &mut y);
        Ok(Array1::from(y))
    }

    /// Transpose.
    pub fn transpose(&self) -> Self {
        let mut rows = vec![Vec::new(); self.ncols];
        for i in 0..self.nrows {
            for (j, z) in self.row(i) {
                rows[j].push((i, z));
            }
        }
        Self::assemble_sorted(self.nrows, rows)
    }

    /// Element-wise complex conjugate.
    pub fn conj(&self) -> Self {
        let mut out = self.clone();
        for z in &mut out.values {
            *z = z.conj();
        }
        out
    }

    /// Conjugate transpose A†.
    pub fn adjoint(&self) -> Self {
        self.transpose().conj()
    }

    /// `c · A`.
    pub fn scale(&self, c: Complex64) -> Self {
        if c == ZERO {
            return Self::zeros(self.nrows, self.ncols);
        }
        let mut out = self.clone();
        for z in &mut out.values {
            *z *= c;
        }
        out
    }

    /// `A + B`.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.check_same_shape(other)?;
        let rows = (0..self.nrows)
            .map(|i| self.row(i).chain(other.row(i)).collect())
            .collect();
        Self::from_rows(self.ncols, rows)
    }

    /// Matrix product `A B`.
    pub fn matmul(&self, other: &Self) -> Result<Self> {
        if self.ncols != other.nrows {
            return Err(ValidationError::Field {
                field: "shape".into(),
                message: format!(
                    "cannot multiply {}×{} by {}×{}",
                    self.nrows, self.ncols, other.nrows, other.ncols
                ),
            }
            .into());
        }
        let rows = (0..self.nrows)
            .map(|i| {
                self.row(i)
                    .flat_map(|(k, a)| other.row(k).map(move |(j, b)| (j, a * b)))
                    .collect()
            })
            .collect();
        Self::from_rows(other.ncols, rows)
    }

    /// Kronecker product `A ⊗ B`.
    pub fn kron(&self, other: &Self) -> Self {
        let nrows = self.nrows * other.nrows;
        let ncols = self.ncols * other.ncols;
        let mut rows = Vec::with_capacity(nrows);
        for i in 0..self.nrows {
            for k in 0..other.nrows {
                let row = self
                    .row(i)
                    .flat_map(|(j, a)| other.row(k).map(move |(l, b)| (j * other.ncols + l, a * b)))
                    .collect();
                rows.push(row);
            }
        }
        Self::assemble_sorted(ncols, rows)
    }

    /// Whether `‖A − A†‖_max ≤ tol`.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        if self.nrows != self.ncols {
            return false;
        }
        // every stored entry is compared with its mirror, which covers
        // entries missing on either side
        (0..self.nrows).all(|i| {
            self.row(i)
                .all(|(j, z)| (z - self.get(j, i).conj()).norm() <= tol)
        })
    }

    fn check_same_shape(&self, other: &Self) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(ValidationError::Field {
                field: "shape".into(),
                message: format!(
                    "{}×{} does not match {}×{}",
                    self.nrows, self.ncols, other.nrows, other.ncols
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Build from rows whose columns are already in range and unique.
    fn assemble_sorted(ncols: usize, rows: Vec<Vec<(usize, Complex64)>>) -> Self {
        let nrows = rows.len();
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for mut row in rows {
            compress_row(&mut row);
            for (col, value) in row {
                col_idx.push(col);
                values.push(value);
            }
            row_ptr.push(col_idx.len());
        }
        Self {
            nrows,
            ncols,
            row_ptr,
            col_idx,
            values,
        }
    }
}

/// Sort a row by column, sum duplicates and drop zeros.
pub(crate) fn compress_row(row: &mut Vec<(usize, Complex64)>) {
    row.sort_by_key(|&(col, _)| col);
    let mut merged: Vec<(usize, Complex64)> = Vec::with_capacity(row.len());
    for &(col, value) in row.iter() {
        match merged.last_mut() {
            Some((last, acc)) if *last == col => *acc += value,
            _ => merged.push((col, value)),
        }
    }
    merged.retain(|&(_, value)| value != ZERO);
    *row = merged;
}

/// Dense Kronecker product `A ⊗ B`.
pub fn kron_dense(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    let mut out = Array2::zeros((ar * br, ac * bc));
    for ((i, j), &x) in a.indexed_iter() {
        if x == ZERO {
            continue;
        }
        for ((k, l), &y) in b.indexed_iter() {
            out[[i * br + k, j * bc + l]] = x * y;
        }
    }
    out
}

/// Conjugate transpose (dagger) of a dense matrix.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}
