// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Spin-s lattice Hilbert space.

use super::{check_n_sites, AbstractHilbert, SiteBasis};
use crate::error::{HilbertError, Result};

/// Hilbert space of `n_sites` spins of size `s`.
///
/// Local values are `2m` for `m = s, s-1, ..., -s`, so local index 0 is the
/// fully polarized up state and spin-½ sites carry `[1, -1]`. An optional
/// total magnetization restricts the basis to `Σ_i x_i = 2 S_z`.
#[derive(Debug, Clone)]
pub struct Spin {
    s: f64,
    total_sz: Option<f64>,
    basis: SiteBasis,
}

impl Spin {
    /// Unconstrained spin-`s` chain.
    pub fn new(s: f64, n_sites: usize) -> Result<Self> {
        check_n_sites(n_sites)?;
        let two_s = two_s(s)?;
        let states = (0..=two_s).map(|k| (two_s - 2 * k as i64) as f64).collect();
        Ok(Self {
            s,
            total_sz: None,
            basis: SiteBasis::homogeneous(states, n_sites),
        })
    }

    /// Spin-`s` chain restricted to total magnetization `total_sz`.
    pub fn with_total_sz(s: f64, n_sites: usize, total_sz: f64) -> Result<Self> {
        let mut hilbert = Self::new(s, n_sites)?;
        let two_sz = 2.0 * total_sz;
        let max_two_sz = 2.0 * s * n_sites as f64;
        if (two_sz - two_sz.round()).abs() > 1e-10 {
            return Err(HilbertError::InvalidParameter(format!(
                "total_sz must be a multiple of 1/2, got {}",
                total_sz
            ))
            .into());
        }
        if two_sz.abs() > max_two_sz || ((max_two_sz - two_sz).round() as i64) % 2 != 0 {
            return Err(HilbertError::InvalidParameter(format!(
                "total_sz={} cannot be reached by {} spins of size {}",
                total_sz, n_sites, s
            ))
            .into());
        }
        hilbert.total_sz = Some(total_sz);
        Ok(hilbert)
    }

    /// Spin size `s`.
    pub fn spin(&self) -> f64 {
        self.s
    }

    /// Total magnetization constraint, if any.
    pub fn total_sz(&self) -> Option<f64> {
        self.total_sz
    }

    fn magnetization_ok(&self, state: &[f64]) -> bool {
        match self.total_sz {
            Some(sz) => (state.iter().sum::<f64>() - 2.0 * sz).abs() < 1e-8,
            None => true,
        }
    }

    fn constraint(&self) -> Option<Box<dyn Fn(&[f64]) -> bool + '_>> {
        self.total_sz.map(|_| {
            Box::new(move |x: &[f64]| self.magnetization_ok(x)) as Box<dyn Fn(&[f64]) -> bool + '_>
        })
    }
}

/// `2s` as an integer, rejecting values that are not positive half-integers.
fn two_s(s: f64) -> std::result::Result<i64, HilbertError> {
    let two_s = 2.0 * s;
    if s.is_nan() || s <= 0.0 || (two_s - two_s.round()).abs() > 1e-10 {
        return Err(HilbertError::InvalidParameter(format!(
            "spin must be a positive multiple of 1/2, got {}",
            s
        )));
    }
    Ok(two_s.round() as i64)
}

impl AbstractHilbert for Spin {
    fn size(&self) -> usize {
        self.basis.size()
    }

    fn states_at(&self, site: usize) -> &[f64] {
        self.basis.states_at(site)
    }

    fn n_states(&self) -> Result<usize> {
        Ok(self.basis.index(self.constraint().as_deref())?.n_states())
    }

    fn state_to_number(&self, state: &[f64]) -> Result<usize> {
        Ok(self
            .basis
            .index(self.constraint().as_deref())?
            .state_to_number(state)?)
    }

    fn number_to_state_into(&self, number: usize, out: &mut [f64]) -> Result<()> {
        Ok(self
            .basis
            .index(self.constraint().as_deref())?
            .number_to_state_into(number, out)?)
    }

    fn is_constrained(&self) -> bool {
        self.total_sz.is_some()
    }

    fn constraint_ok(&self, state: &[f64]) -> bool {
        self.magnetization_ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_half_local_states() {
        let hi = Spin::new(0.5, 5).unwrap();
        assert_eq!(hi.size(), 5);
        assert_eq!(hi.states_at(0), &[1.0, -1.0]);
        assert_eq!(hi.n_states().unwrap(), 32);
    }

    #[test]
    fn test_spin_one_local_states() {
        let hi = Spin::new(1.0, 2).unwrap();
        assert_eq!(hi.states_at(1), &[2.0, 0.0, -2.0]);
        assert_eq!(hi.n_states().unwrap(), 9);
    }

    #[test]
    fn test_invalid_spin() {
        assert!(Spin::new(0.3, 2).is_err());
        assert!(Spin::new(0.0, 2).is_err());
        assert!(Spin::new(-0.5, 2).is_err());
        assert!(Spin::new(0.5, 0).is_err());
    }

    #[test]
    fn test_total_sz_constraint() {
        let hi = Spin::with_total_sz(0.5, 4, 1.0).unwrap();
        // C(4, 3) states with three spins up
        assert_eq!(hi.n_states().unwrap(), 4);
        let states = hi.all_states().unwrap();
        for row in states.rows() {
            assert_eq!(row.sum(), 2.0);
        }
        assert!(hi.constraint_ok(&[1.0, 1.0, 1.0, -1.0]));
        assert!(!hi.constraint_ok(&[1.0, 1.0, -1.0, -1.0]));
    }

    #[test]
    fn test_unreachable_total_sz() {
        assert!(Spin::with_total_sz(0.5, 4, 0.5).is_err());
        assert!(Spin::with_total_sz(0.5, 4, 3.0).is_err());
        assert!(Spin::with_total_sz(0.5, 3, 0.5).is_ok());
    }
}
