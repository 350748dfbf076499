// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Operators built from few-site terms.
//!
//! A [`LocalOperator`] is `c·I + Σ_k O_k`, where each `O_k` is a dense
//! matrix acting on a handful of sites and as the identity elsewhere. Local
//! matrices use the same digit order as the Hilbert space: the first site
//! of `acting_on` is the most significant, so `kron(A, B)` on `[i, j]`
//! applies `A` to site `i` and `B` to site `j`.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;

use super::{check_state_len, AbstractOperator, ZERO};
use crate::error::{HilbertError, OperatorError, Result, ValidationError};
use crate::hilbert::{local_position, AbstractHilbert, HilbertRef};
use crate::validation::{validate_acting_on, validate_local_matrix};

/// Tolerance of the term-wise Hermiticity check.
const HERMITIAN_TOL: f64 = 1e-12;

/// A dense matrix on a sorted set of sites.
#[derive(Debug, Clone)]
struct LocalTerm {
    acting_on: Vec<usize>,
    local_states: Vec<Vec<f64>>,
    strides: Vec<usize>,
    matrix: Array2<Complex64>,
}

impl LocalTerm {
    /// `acting_on` must be sorted and `matrix` sized to its sites.
    fn new(hilbert: &dyn AbstractHilbert, acting_on: Vec<usize>, matrix: Array2<Complex64>) -> Self {
        let local_states: Vec<Vec<f64>> = acting_on
            .iter()
            .map(|&site| hilbert.states_at(site).to_vec())
            .collect();
        let dims: Vec<usize> = local_states.iter().map(Vec::len).collect();
        Self {
            acting_on,
            strides: strides(&dims),
            local_states,
            matrix,
        }
    }

    /// Local basis number of the sites of `x` this term acts on.
    fn local_number(&self, x: &[f64]) -> Result<usize> {
        let mut number = 0;
        for ((&site, states), stride) in self
            .acting_on
            .iter()
            .zip(&self.local_states)
            .zip(&self.strides)
        {
            let value = x[site];
            let digit = local_position(states, value)
                .ok_or(HilbertError::UnknownLocalState { site, value })?;
            number += digit * stride;
        }
        Ok(number)
    }

    /// Overwrite the sites of `out` with local basis state `number`.
    fn write_local_state(&self, mut number: usize, out: &mut [f64]) {
        for ((&site, states), &stride) in self
            .acting_on
            .iter()
            .zip(&self.local_states)
            .zip(&self.strides)
        {
            out[site] = states[number / stride];
            number %= stride;
        }
    }

    /// Largest number of off-diagonal non-zeros in a row.
    fn max_off_diagonal(&self) -> usize {
        self.matrix
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|&(j, &z)| j != i && z != ZERO)
                    .count()
            })
            .max()
            .unwrap_or(0)
    }

    fn dims(&self) -> Vec<usize> {
        self.local_states.iter().map(Vec::len).collect()
    }

    /// Product of two terms on the union of their sites.
    fn matmul(&self, other: &Self, hilbert: &dyn AbstractHilbert) -> Result<Self> {
        let mut union = self.acting_on.clone();
        union.extend_from_slice(&other.acting_on);
        union.sort_unstable();
        union.dedup();
        let dims: Vec<usize> = union.iter().map(|&site| hilbert.local_size(site)).collect();

        let a = embed(&self.matrix, &self.acting_on, &self.dims(), &union, &dims)?;
        let b = embed(&other.matrix, &other.acting_on, &other.dims(), &union, &dims)?;
        Ok(Self::new(hilbert, union, a.dot(&b)))
    }
}

/// Row-major strides of a mixed-radix number with digit sizes `dims`.
fn strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1];
    }
    strides
}

/// Re-express `matrix`, whose digits follow `sites`, on `target_sites`.
///
/// Sites of `target_sites` missing from `sites` get the identity. Used both
/// to sort the sites of a term and to extend a term before a product.
fn embed(
    matrix: &Array2<Complex64>,
    sites: &[usize],
    dims: &[usize],
    target_sites: &[usize],
    target_dims: &[usize],
) -> Result<Array2<Complex64>> {
    let positions = sites
        .iter()
        .map(|site| {
            target_sites
                .iter()
                .position(|t| t == site)
                .ok_or(OperatorError::SiteOutOfRange {
                    site: *site,
                    size: target_sites.len(),
                })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let spectators: Vec<usize> = (0..target_sites.len())
        .filter(|p| !positions.contains(p))
        .collect();

    let target_strides = strides(target_dims);
    let dim: usize = target_dims.iter().product();
    let digits: Vec<Vec<usize>> = (0..dim)
        .map(|n| {
            target_strides
                .iter()
                .zip(target_dims)
                .map(|(&stride, &d)| (n / stride) % d)
                .collect()
        })
        .collect();
    let sub_number = |digits: &[usize]| {
        positions
            .iter()
            .zip(dims)
            .fold(0, |acc, (&p, &d)| acc * d + digits[p])
    };

    let mut out = Array2::zeros((dim, dim));
    for (r, row_digits) in digits.iter().enumerate() {
        let sub_r = sub_number(row_digits);
        for (c, col_digits) in digits.iter().enumerate() {
            if spectators.iter().all(|&p| row_digits[p] == col_digits[p]) {
                out[[r, c]] = matrix[[sub_r, sub_number(col_digits)]];
            }
        }
    }
    Ok(out)
}

/// Whether two handles name the same (or an equivalent) Hilbert space.
pub(crate) fn check_compatible(a: &HilbertRef, b: &HilbertRef) -> Result<()> {
    if Arc::ptr_eq(a, b) || a.is_compatible(b.as_ref()) {
        return Ok(());
    }
    Err(OperatorError::IncompatibleHilbert(format!(
        "{} sites with shape {:?} vs {} sites with shape {:?}",
        a.size(),
        a.shape(),
        b.size(),
        b.shape()
    ))
    .into())
}

/// Sum of a constant and few-site terms.
#[derive(Debug, Clone)]
pub struct LocalOperator {
    hilbert: HilbertRef,
    terms: Vec<LocalTerm>,
    constant: Complex64,
}

impl LocalOperator {
    /// The zero operator.
    pub fn new(hilbert: HilbertRef) -> Self {
        Self::with_constant(hilbert, ZERO)
    }

    /// `constant · I`.
    pub fn with_constant(hilbert: HilbertRef, constant: Complex64) -> Self {
        Self {
            hilbert,
            terms: Vec::new(),
            constant,
        }
    }

    /// The identity.
    pub fn identity(hilbert: HilbertRef) -> Self {
        Self::with_constant(hilbert, Complex64::new(1.0, 0.0))
    }

    /// A single term `matrix` acting on `acting_on`.
    ///
    /// Sites may be listed in any order; the matrix is permuted so that the
    /// stored term acts on sorted sites.
    pub fn from_matrix(
        hilbert: HilbertRef,
        matrix: Array2<Complex64>,
        acting_on: &[usize],
    ) -> Result<Self> {
        validate_acting_on(acting_on, hilbert.size())?;
        let dims: Vec<usize> = acting_on
            .iter()
            .map(|&site| hilbert.local_size(site))
            .collect();
        validate_local_matrix(&matrix, dims.iter().product())?;

        let mut sorted = acting_on.to_vec();
        sorted.sort_unstable();
        let matrix = if sorted == acting_on {
            matrix
        } else {
            let sorted_dims: Vec<usize> =
                sorted.iter().map(|&site| hilbert.local_size(site)).collect();
            embed(&matrix, acting_on, &dims, &sorted, &sorted_dims)?
        };

        let term = LocalTerm::new(hilbert.as_ref(), sorted, matrix);
        let mut op = Self::new(hilbert);
        op.push_term(term);
        Ok(op)
    }

    /// A single term given as nested rows, e.g. `[[0, 1], [1, 0]]`.
    pub fn from_rows<T>(hilbert: HilbertRef, rows: &[Vec<T>], acting_on: &[usize]) -> Result<Self>
    where
        T: Copy + Into<Complex64>,
    {
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != ncols) {
            return Err(ValidationError::Field {
                field: "matrix".into(),
                message: format!("ragged rows of length {} and {}", ncols, row.len()),
            }
            .into());
        }
        let data = rows.iter().flatten().map(|&z| z.into()).collect();
        let matrix = Array2::from_shape_vec((rows.len(), ncols), data)?;
        Self::from_matrix(hilbert, matrix, acting_on)
    }

    /// Number of stored terms.
    pub fn n_operators(&self) -> usize {
        self.terms.len()
    }

    /// Sorted sites of every term.
    pub fn acting_on(&self) -> Vec<&[usize]> {
        self.terms.iter().map(|t| t.acting_on.as_slice()).collect()
    }

    /// Local matrices of every term.
    pub fn operators(&self) -> Vec<&Array2<Complex64>> {
        self.terms.iter().map(|t| &t.matrix).collect()
    }

    /// Coefficient of the identity.
    pub fn constant(&self) -> Complex64 {
        self.constant
    }

    fn push_term(&mut self, term: LocalTerm) {
        match self
            .terms
            .iter_mut()
            .find(|t| t.acting_on == term.acting_on)
        {
            Some(existing) => existing.matrix += &term.matrix,
            None => self.terms.push(term),
        }
    }

    fn scale(&mut self, factor: Complex64) {
        self.constant *= factor;
        for term in &mut self.terms {
            term.matrix.mapv_inplace(|z| z * factor);
        }
    }

    fn map_terms(&self, f: impl Fn(&Array2<Complex64>) -> Array2<Complex64>) -> Self {
        let mut out = self.clone();
        for term in &mut out.terms {
            term.matrix = f(&term.matrix);
        }
        out
    }

    /// `self += other`.
    pub fn try_add_assign(&mut self, other: &LocalOperator) -> Result<()> {
        check_compatible(&self.hilbert, &other.hilbert)?;
        self.constant += other.constant;
        for term in &other.terms {
            self.push_term(term.clone());
        }
        Ok(())
    }

    /// `self + other`.
    pub fn try_add(&self, other: &LocalOperator) -> Result<Self> {
        let mut out = self.clone();
        out.try_add_assign(other)?;
        Ok(out)
    }

    /// `self - other`.
    pub fn try_sub(&self, other: &LocalOperator) -> Result<Self> {
        self.try_add(&-other.clone())
    }

    /// Operator product `self · other`.
    pub fn matmul(&self, other: &LocalOperator) -> Result<Self> {
        check_compatible(&self.hilbert, &other.hilbert)?;
        let hilbert = self.hilbert.as_ref();
        let mut out = Self::with_constant(self.hilbert.clone(), self.constant * other.constant);

        if other.constant != ZERO {
            for term in &self.terms {
                let mut term = term.clone();
                term.matrix.mapv_inplace(|z| z * other.constant);
                out.push_term(term);
            }
        }
        if self.constant != ZERO {
            for term in &other.terms {
                let mut term = term.clone();
                term.matrix.mapv_inplace(|z| self.constant * z);
                out.push_term(term);
            }
        }
        for a in &self.terms {
            for b in &other.terms {
                out.push_term(a.matmul(b, hilbert)?);
            }
        }
        Ok(out)
    }

    /// Element-wise complex conjugate.
    pub fn conjugate(&self) -> Self {
        let mut out = self.map_terms(|m| m.mapv(|z| z.conj()));
        out.constant = out.constant.conj();
        out
    }

    /// Transpose.
    pub fn transpose(&self) -> Self {
        self.map_terms(|m| m.t().to_owned())
    }

    /// Hermitian conjugate.
    pub fn adjoint(&self) -> Self {
        let mut out = self.map_terms(|m| m.t().mapv(|z| z.conj()));
        out.constant = out.constant.conj();
        out
    }

    /// Whether the operator equals its adjoint.
    ///
    /// Decided term by term when possible, otherwise on the sparse matrix.
    pub fn is_hermitian(&self) -> Result<bool> {
        let termwise = self.constant.im.abs() <= HERMITIAN_TOL
            && self.terms.iter().all(|t| {
                t.matrix
                    .indexed_iter()
                    .all(|((i, j), &z)| (z - t.matrix[[j, i]].conj()).norm() <= HERMITIAN_TOL)
            });
        if termwise {
            return Ok(true);
        }
        Ok(self.to_sparse()?.is_hermitian(HERMITIAN_TOL))
    }
}

impl AbstractOperator for LocalOperator {
    fn hilbert(&self) -> &HilbertRef {
        &self.hilbert
    }

    fn get_conn_flattened(
        &self,
        x: &[f64],
        x_primes: &mut Vec<f64>,
        mels: &mut Vec<Complex64>,
    ) -> Result<()> {
        check_state_len(self.hilbert.as_ref(), x)?;

        // diagonal first
        let diag = mels.len();
        x_primes.extend_from_slice(x);
        mels.push(self.constant);

        for term in &self.terms {
            let row = term.local_number(x)?;
            mels[diag] += term.matrix[[row, row]];
            for (col, &mel) in term.matrix.row(row).iter().enumerate() {
                if col == row || mel == ZERO {
                    continue;
                }
                let offset = x_primes.len();
                x_primes.extend_from_slice(x);
                term.write_local_state(col, &mut x_primes[offset..]);
                mels.push(mel);
            }
        }
        Ok(())
    }

    fn max_conn_size(&self) -> usize {
        1 + self
            .terms
            .iter()
            .map(LocalTerm::max_off_diagonal)
            .sum::<usize>()
    }
}

// Operator arithmetic panics on incompatible Hilbert spaces, as ndarray
// arithmetic does on mismatched shapes. The `try_*` methods report instead.

impl AddAssign<&LocalOperator> for LocalOperator {
    fn add_assign(&mut self, rhs: &LocalOperator) {
        if let Err(e) = self.try_add_assign(rhs) {
            panic!("{}", e);
        }
    }
}

impl AddAssign<LocalOperator> for LocalOperator {
    fn add_assign(&mut self, rhs: LocalOperator) {
        *self += &rhs;
    }
}

impl SubAssign<&LocalOperator> for LocalOperator {
    fn sub_assign(&mut self, rhs: &LocalOperator) {
        *self += -rhs.clone();
    }
}

impl SubAssign<LocalOperator> for LocalOperator {
    fn sub_assign(&mut self, rhs: LocalOperator) {
        *self += -rhs;
    }
}

impl Add<&LocalOperator> for LocalOperator {
    type Output = LocalOperator;

    fn add(mut self, rhs: &LocalOperator) -> LocalOperator {
        self += rhs;
        self
    }
}

impl Add<LocalOperator> for LocalOperator {
    type Output = LocalOperator;

    fn add(mut self, rhs: LocalOperator) -> LocalOperator {
        self += &rhs;
        self
    }
}

impl Sub<&LocalOperator> for LocalOperator {
    type Output = LocalOperator;

    fn sub(mut self, rhs: &LocalOperator) -> LocalOperator {
        self -= rhs;
        self
    }
}

impl Sub<LocalOperator> for LocalOperator {
    type Output = LocalOperator;

    fn sub(mut self, rhs: LocalOperator) -> LocalOperator {
        self -= rhs;
        self
    }
}

impl Mul<&LocalOperator> for &LocalOperator {
    type Output = LocalOperator;

    fn mul(self, rhs: &LocalOperator) -> LocalOperator {
        match self.matmul(rhs) {
            Ok(op) => op,
            Err(e) => panic!("{}", e),
        }
    }
}

impl Mul<Complex64> for LocalOperator {
    type Output = LocalOperator;

    fn mul(mut self, rhs: Complex64) -> LocalOperator {
        self.scale(rhs);
        self
    }
}

impl Mul<f64> for LocalOperator {
    type Output = LocalOperator;

    fn mul(self, rhs: f64) -> LocalOperator {
        self * Complex64::new(rhs, 0.0)
    }
}

impl Mul<LocalOperator> for Complex64 {
    type Output = LocalOperator;

    fn mul(self, rhs: LocalOperator) -> LocalOperator {
        rhs * self
    }
}

impl Mul<LocalOperator> for f64 {
    type Output = LocalOperator;

    fn mul(self, rhs: LocalOperator) -> LocalOperator {
        rhs * self
    }
}

impl Add<Complex64> for LocalOperator {
    type Output = LocalOperator;

    fn add(mut self, rhs: Complex64) -> LocalOperator {
        self.constant += rhs;
        self
    }
}

impl Add<f64> for LocalOperator {
    type Output = LocalOperator;

    fn add(self, rhs: f64) -> LocalOperator {
        self + Complex64::new(rhs, 0.0)
    }
}

impl Sub<Complex64> for LocalOperator {
    type Output = LocalOperator;

    fn sub(self, rhs: Complex64) -> LocalOperator {
        self + (-rhs)
    }
}

impl Sub<f64> for LocalOperator {
    type Output = LocalOperator;

    fn sub(self, rhs: f64) -> LocalOperator {
        self + (-rhs)
    }
}

impl Neg for LocalOperator {
    type Output = LocalOperator;

    fn neg(mut self) -> LocalOperator {
        self.scale(Complex64::new(-1.0, 0.0));
        self
    }
}
