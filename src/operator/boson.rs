// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Truncated bosonic ladder operators.

use ndarray::Array2;
use num_complex::Complex64;

use super::LocalOperator;
use crate::error::{OperatorError, Result};
use crate::hilbert::HilbertRef;

/// Annihilation operator `a` on `site`.
pub fn destroy(hilbert: HilbertRef, site: usize) -> Result<LocalOperator> {
    let n_max = n_max_of_site(&hilbert, site)?;
    let mut matrix = Array2::zeros((n_max + 1, n_max + 1));
    for n in 1..=n_max {
        matrix[[n - 1, n]] = Complex64::new((n as f64).sqrt(), 0.0);
    }
    LocalOperator::from_matrix(hilbert, matrix, &[site])
}

/// Creation operator `a†` on `site`.
pub fn create(hilbert: HilbertRef, site: usize) -> Result<LocalOperator> {
    Ok(destroy(hilbert, site)?.adjoint())
}

/// Number operator `a†a` on `site`.
pub fn number(hilbert: HilbertRef, site: usize) -> Result<LocalOperator> {
    let n_max = n_max_of_site(&hilbert, site)?;
    let matrix = Array2::from_diag(
        &(0..=n_max)
            .map(|n| Complex64::new(n as f64, 0.0))
            .collect::<ndarray::Array1<_>>(),
    );
    LocalOperator::from_matrix(hilbert, matrix, &[site])
}

/// Cutoff of a site whose local states are `0, 1, ..., n_max`.
fn n_max_of_site(hilbert: &HilbertRef, site: usize) -> Result<usize> {
    if site >= hilbert.size() {
        return Err(OperatorError::SiteOutOfRange {
            site,
            size: hilbert.size(),
        }
        .into());
    }
    let states = hilbert.states_at(site);
    if !states
        .iter()
        .enumerate()
        .all(|(n, &v)| (v - n as f64).abs() < 1e-10)
    {
        return Err(OperatorError::Unsupported(format!(
            "site {} with local states {:?} is not a boson mode",
            site, states
        ))
        .into());
    }
    Ok(states.len() - 1)
}
