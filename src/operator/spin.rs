// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pauli-normalized spin operators.
//!
//! For spin-s sites, `sigmax`, `sigmay` and `sigmaz` are `2S_x`, `2S_y` and
//! `2S_z`, which reduce to the Pauli matrices for s = 1/2. `sigmap` and
//! `sigmam` are the ladder operators `S⁺` and `S⁻`.

use ndarray::Array2;
use num_complex::Complex64;

use super::LocalOperator;
use crate::error::{OperatorError, Result};
use crate::hilbert::HilbertRef;

/// `2S_x` on `site`.
pub fn sigmax(hilbert: HilbertRef, site: usize) -> Result<LocalOperator> {
    let plus = spin_plus(&hilbert, site)?;
    let matrix = &plus + &plus.t();
    LocalOperator::from_matrix(hilbert, matrix, &[site])
}

/// `2S_y` on `site`.
pub fn sigmay(hilbert: HilbertRef, site: usize) -> Result<LocalOperator> {
    let plus = spin_plus(&hilbert, site)?;
    let minus_i = Complex64::new(0.0, -1.0);
    let matrix = (&plus - &plus.t()).mapv(|z| minus_i * z);
    LocalOperator::from_matrix(hilbert, matrix, &[site])
}

/// `2S_z` on `site`.
pub fn sigmaz(hilbert: HilbertRef, site: usize) -> Result<LocalOperator> {
    let two_s = two_s_of_site(&hilbert, site)?;
    let mut matrix = Array2::zeros((two_s + 1, two_s + 1));
    for k in 0..=two_s {
        // 2m for m = s - k
        matrix[[k, k]] = Complex64::new(two_s as f64 - 2.0 * k as f64, 0.0);
    }
    LocalOperator::from_matrix(hilbert, matrix, &[site])
}

/// Raising operator `S⁺` on `site`.
pub fn sigmap(hilbert: HilbertRef, site: usize) -> Result<LocalOperator> {
    let matrix = spin_plus(&hilbert, site)?;
    LocalOperator::from_matrix(hilbert, matrix, &[site])
}

/// Lowering operator `S⁻` on `site`.
pub fn sigmam(hilbert: HilbertRef, site: usize) -> Result<LocalOperator> {
    let matrix = spin_plus(&hilbert, site)?.t().to_owned();
    LocalOperator::from_matrix(hilbert, matrix, &[site])
}

/// `S⁺` in the local basis `m = s, s-1, ..., -s`.
fn spin_plus(hilbert: &HilbertRef, site: usize) -> Result<Array2<Complex64>> {
    let two_s = two_s_of_site(hilbert, site)?;
    let s = two_s as f64 / 2.0;
    let mut matrix = Array2::zeros((two_s + 1, two_s + 1));
    for k in 1..=two_s {
        // S⁺|m⟩ = sqrt(s(s+1) - m(m+1)) |m+1⟩
        let m = s - k as f64;
        matrix[[k - 1, k]] = Complex64::new((s * (s + 1.0) - m * (m + 1.0)).sqrt(), 0.0);
    }
    Ok(matrix)
}

/// `2s` of a site whose local states are `2s, 2s-2, ..., -2s`.
fn two_s_of_site(hilbert: &HilbertRef, site: usize) -> Result<usize> {
    if site >= hilbert.size() {
        return Err(OperatorError::SiteOutOfRange {
            site,
            size: hilbert.size(),
        }
        .into());
    }
    let states = hilbert.states_at(site);
    let two_s = states.len() - 1;
    let is_spin = states
        .iter()
        .enumerate()
        .all(|(k, &v)| (v - (two_s as f64 - 2.0 * k as f64)).abs() < 1e-10);
    if !is_spin {
        return Err(OperatorError::Unsupported(format!(
            "site {} with local states {:?} is not a spin",
            site, states
        ))
        .into());
    }
    Ok(two_s)
}
