// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Mixed-radix enumeration of discrete basis states.
//!
//! A configuration `x = (x_0, ..., x_{N-1})` is numbered with site 0 as the
//! most significant digit:
//!
//!   n(x) = Σ_i k_i(x_i) · Π_{j>i} d_j
//!
//! where `k_i` is the position of `x_i` among the local states of site `i`
//! and `d_j` the local dimension of site `j`. This is the ordering produced
//! by `A_0 ⊗ A_1 ⊗ ... ⊗ A_{N-1}`.
//!
//! Constrained spaces keep the sorted list of unconstrained numbers that
//! satisfy the constraint and number states by their position in that list.

use ndarray::Array2;

use super::MAX_STATES;
use crate::error::HilbertError;

/// Tolerance used to match a configuration value against a local state.
const LOCAL_STATE_TOL: f64 = 1e-8;

/// Position of `value` among `states`, if present.
pub(crate) fn local_position(states: &[f64], value: f64) -> Option<usize> {
    states
        .iter()
        .position(|s| (s - value).abs() < LOCAL_STATE_TOL)
}

/// Enumerator for a discrete (optionally constrained) Hilbert space.
#[derive(Debug, Clone)]
pub struct HilbertIndex {
    local_states: Vec<Vec<f64>>,
    /// Stride of each site's digit.
    basis: Vec<usize>,
    n_unconstrained: usize,
    /// Sorted unconstrained numbers of the allowed states.
    allowed: Option<Vec<usize>>,
}

impl HilbertIndex {
    /// Build an index over `local_states[i]` for each site `i`.
    ///
    /// When `constraint` is given, every unconstrained state is visited once
    /// to collect the allowed numbers.
    pub fn new(
        local_states: Vec<Vec<f64>>,
        constraint: Option<&dyn Fn(&[f64]) -> bool>,
    ) -> Result<Self, HilbertError> {
        let mut total: u128 = 1;
        for states in &local_states {
            if states.is_empty() {
                return Err(HilbertError::InvalidParameter(
                    "every site needs at least one local state".into(),
                ));
            }
            total = total.saturating_mul(states.len() as u128);
        }
        if total > MAX_STATES as u128 {
            return Err(HilbertError::TooLarge {
                n_states: total,
                max_states: MAX_STATES,
            });
        }
        let n_unconstrained = total as usize;

        let n_sites = local_states.len();
        let mut basis = vec![0usize; n_sites];
        let mut stride = 1usize;
        for site in (0..n_sites).rev() {
            basis[site] = stride;
            stride *= local_states[site].len();
        }

        let mut index = Self {
            local_states,
            basis,
            n_unconstrained,
            allowed: None,
        };

        if let Some(accept) = constraint {
            let mut buffer = vec![0.0; n_sites];
            let allowed: Vec<usize> = (0..n_unconstrained)
                .filter(|&n| {
                    index.decode(n, &mut buffer);
                    accept(&buffer)
                })
                .collect();
            if allowed.is_empty() {
                return Err(HilbertError::ConstraintViolated(
                    "no basis state satisfies the constraint".into(),
                ));
            }
            index.allowed = Some(allowed);
        }

        Ok(index)
    }

    /// Number of sites.
    pub fn size(&self) -> usize {
        self.local_states.len()
    }

    /// Number of (allowed) basis states.
    pub fn n_states(&self) -> usize {
        match &self.allowed {
            Some(allowed) => allowed.len(),
            None => self.n_unconstrained,
        }
    }

    /// Whether a constraint restricts the basis.
    pub fn is_constrained(&self) -> bool {
        self.allowed.is_some()
    }

    /// Local states of `site`.
    pub fn local_states(&self, site: usize) -> &[f64] {
        &self.local_states[site]
    }

    fn decode(&self, mut raw: usize, out: &mut [f64]) {
        for (site, slot) in out.iter_mut().enumerate() {
            let digit = raw / self.basis[site];
            raw %= self.basis[site];
            *slot = self.local_states[site][digit];
        }
    }

    fn raw_number(&self, state: &[f64]) -> Result<usize, HilbertError> {
        if state.len() != self.size() {
            return Err(HilbertError::SizeMismatch {
                expected: self.size(),
                actual: state.len(),
            });
        }
        let mut number = 0usize;
        for (site, &value) in state.iter().enumerate() {
            let digit = local_position(&self.local_states[site], value)
                .ok_or(HilbertError::UnknownLocalState { site, value })?;
            number += digit * self.basis[site];
        }
        Ok(number)
    }

    /// Basis number of `state`.
    pub fn state_to_number(&self, state: &[f64]) -> Result<usize, HilbertError> {
        let raw = self.raw_number(state)?;
        match &self.allowed {
            Some(allowed) => allowed.binary_search(&raw).map_err(|_| {
                HilbertError::ConstraintViolated(format!("state {:?} is not allowed", state))
            }),
            None => Ok(raw),
        }
    }

    /// Write the configuration of basis state `number` into `out`.
    pub fn number_to_state_into(&self, number: usize, out: &mut [f64]) -> Result<(), HilbertError> {
        let n_states = self.n_states();
        if number >= n_states {
            return Err(HilbertError::NumberOutOfRange { number, n_states });
        }
        if out.len() != self.size() {
            return Err(HilbertError::SizeMismatch {
                expected: self.size(),
                actual: out.len(),
            });
        }
        let raw = match &self.allowed {
            Some(allowed) => allowed[number],
            None => number,
        };
        self.decode(raw, out);
        Ok(())
    }

    /// All basis states, one per row, in numbering order.
    pub fn all_states(&self) -> Array2<f64> {
        let n_sites = self.size();
        let mut out = Array2::zeros((self.n_states(), n_sites));
        for (number, mut row) in out.rows_mut().into_iter().enumerate() {
            let raw = match &self.allowed {
                Some(allowed) => allowed[number],
                None => number,
            };
            if let Some(slot) = row.as_slice_mut() {
                self.decode(raw, slot);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin_half(n: usize) -> Vec<Vec<f64>> {
        vec![vec![1.0, -1.0]; n]
    }

    #[test]
    fn test_site_zero_is_most_significant() {
        let index = HilbertIndex::new(spin_half(3), None).unwrap();
        assert_eq!(index.n_states(), 8);
        // number 1 flips only the last site
        let mut out = vec![0.0; 3];
        index.number_to_state_into(1, &mut out).unwrap();
        assert_eq!(out, vec![1.0, 1.0, -1.0]);
        index.number_to_state_into(4, &mut out).unwrap();
        assert_eq!(out, vec![-1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_numbering_is_a_bijection() {
        let index = HilbertIndex::new(vec![vec![0.0, 1.0, 2.0], vec![0.0, 1.0]], None).unwrap();
        let states = index.all_states();
        assert_eq!(states.nrows(), 6);
        for (n, row) in states.rows().into_iter().enumerate() {
            let row = row.to_vec();
            assert_eq!(index.state_to_number(&row).unwrap(), n);
        }
    }

    #[test]
    fn test_constrained_index() {
        let zero_magnetization = |x: &[f64]| x.iter().sum::<f64>() == 0.0;
        let index = HilbertIndex::new(spin_half(4), Some(&zero_magnetization)).unwrap();
        assert_eq!(index.n_states(), 6);
        assert!(index.is_constrained());
        let states = index.all_states();
        for (n, row) in states.rows().into_iter().enumerate() {
            let row = row.to_vec();
            assert_eq!(row.iter().sum::<f64>(), 0.0);
            assert_eq!(index.state_to_number(&row).unwrap(), n);
        }
        let err = index.state_to_number(&[1.0, 1.0, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, HilbertError::ConstraintViolated(_)));
    }

    #[test]
    fn test_unknown_local_state() {
        let index = HilbertIndex::new(spin_half(2), None).unwrap();
        let err = index.state_to_number(&[1.0, 0.5]).unwrap_err();
        assert_eq!(err, HilbertError::UnknownLocalState { site: 1, value: 0.5 });
    }

    #[test]
    fn test_size_mismatch_and_range() {
        let index = HilbertIndex::new(spin_half(2), None).unwrap();
        assert!(matches!(
            index.state_to_number(&[1.0]),
            Err(HilbertError::SizeMismatch { .. })
        ));
        let mut out = vec![0.0; 2];
        assert!(matches!(
            index.number_to_state_into(4, &mut out),
            Err(HilbertError::NumberOutOfRange { number: 4, n_states: 4 })
        ));
    }

    #[test]
    fn test_too_large() {
        let err = HilbertIndex::new(spin_half(40), None).unwrap_err();
        assert!(matches!(err, HilbertError::TooLarge { .. }));
    }

    #[test]
    fn test_empty_constraint_rejected() {
        let never = |_: &[f64]| false;
        assert!(HilbertIndex::new(spin_half(2), Some(&never)).is_err());
    }
}
