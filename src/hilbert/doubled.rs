// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Doubled Hilbert space of density matrices.
//!
//! A basis state of the doubled space is a pair `(σ, η)` labelling the
//! matrix element `ρ(σ, η)`. The configuration stores `σ` on sites `0..N`
//! and `η` on sites `N..2N`. Numbers are assigned column-major,
//!
//!   n(σ, η) = n(η) · D + n(σ),   D = physical n_states,
//!
//! so that a superoperator matrix acts on `vec(ρ)` stacked by columns and
//! `vec(A ρ B) = (Bᵀ ⊗ A) vec(ρ)`.

use crate::error::{HilbertError, Result};

use super::{AbstractHilbert, HilbertRef, MAX_STATES};

/// Row ⊗ column space built from a physical space.
#[derive(Debug, Clone)]
pub struct DoubledHilbert {
    physical: HilbertRef,
}

impl DoubledHilbert {
    pub fn new(physical: HilbertRef) -> Self {
        Self { physical }
    }

    /// The physical space the density matrix acts on.
    pub fn physical(&self) -> &HilbertRef {
        &self.physical
    }

    /// Number of physical sites.
    pub fn size_physical(&self) -> usize {
        self.physical.size()
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.size() {
            return Err(HilbertError::SizeMismatch {
                expected: self.size(),
                actual: len,
            }
            .into());
        }
        Ok(())
    }
}

impl AbstractHilbert for DoubledHilbert {
    fn size(&self) -> usize {
        2 * self.physical.size()
    }

    fn states_at(&self, site: usize) -> &[f64] {
        let n = self.physical.size();
        assert!(site < 2 * n, "site {} out of range for {} sites", site, 2 * n);
        self.physical.states_at(site % n)
    }

    fn n_states(&self) -> Result<usize> {
        let d = self.physical.n_states()? as u128;
        let total = d * d;
        if total > MAX_STATES as u128 {
            return Err(HilbertError::TooLarge {
                n_states: total,
                max_states: MAX_STATES,
            }
            .into());
        }
        Ok(total as usize)
    }

    fn state_to_number(&self, state: &[f64]) -> Result<usize> {
        self.check_len(state.len())?;
        let n = self.physical.size();
        let d = self.physical.n_states()?;
        let row = self.physical.state_to_number(&state[..n])?;
        let col = self.physical.state_to_number(&state[n..])?;
        Ok(col * d + row)
    }

    fn number_to_state_into(&self, number: usize, out: &mut [f64]) -> Result<()> {
        self.check_len(out.len())?;
        let n_states = self.n_states()?;
        if number >= n_states {
            return Err(HilbertError::NumberOutOfRange { number, n_states }.into());
        }
        let n = self.physical.size();
        let d = self.physical.n_states()?;
        let (row_part, col_part) = out.split_at_mut(n);
        self.physical.number_to_state_into(number % d, row_part)?;
        self.physical.number_to_state_into(number / d, col_part)?;
        Ok(())
    }

    fn is_constrained(&self) -> bool {
        self.physical.is_constrained()
    }

    fn constraint_ok(&self, state: &[f64]) -> bool {
        let n = self.physical.size();
        state.len() == 2 * n
            && self.physical.constraint_ok(&state[..n])
            && self.physical.constraint_ok(&state[n..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hilbert::Spin;
    use std::sync::Arc;

    fn doubled(n: usize) -> DoubledHilbert {
        DoubledHilbert::new(Arc::new(Spin::new(0.5, n).unwrap()))
    }

    #[test]
    fn test_doubled_size() {
        let hi = doubled(3);
        assert_eq!(hi.size(), 6);
        assert_eq!(hi.size_physical(), 3);
        assert_eq!(hi.n_states().unwrap(), 64);
        assert_eq!(hi.states_at(4), &[1.0, -1.0]);
    }

    #[test]
    fn test_column_major_numbering() {
        let hi = doubled(1);
        // (σ, η) = (down, up) -> row 1, column 0 -> 0 * 2 + 1
        assert_eq!(hi.state_to_number(&[-1.0, 1.0]).unwrap(), 1);
        // (σ, η) = (up, down) -> row 0, column 1 -> 1 * 2 + 0
        assert_eq!(hi.state_to_number(&[1.0, -1.0]).unwrap(), 2);
        assert_eq!(hi.number_to_state(3).unwrap().to_vec(), vec![-1.0, -1.0]);
    }

    #[test]
    fn test_doubled_roundtrip() {
        let hi = doubled(2);
        let states = hi.all_states().unwrap();
        for (n, row) in states.rows().into_iter().enumerate() {
            assert_eq!(hi.state_to_number(&row.to_vec()).unwrap(), n);
        }
    }

    #[test]
    fn test_doubled_constrained_physical() {
        let physical = Arc::new(Spin::with_total_sz(0.5, 2, 0.0).unwrap());
        let hi = DoubledHilbert::new(physical);
        assert!(hi.is_constrained());
        assert_eq!(hi.n_states().unwrap(), 4);
        assert!(hi.state_to_number(&[1.0, 1.0, 1.0, -1.0]).is_err());
        assert!(hi.constraint_ok(&[1.0, -1.0, -1.0, 1.0]));
    }

    #[test]
    fn test_doubled_wrong_length() {
        let hi = doubled(2);
        assert!(hi.state_to_number(&[1.0, 1.0]).is_err());
    }
}
