// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Truncated bosonic modes.

use super::{check_n_sites, AbstractHilbert, SiteBasis};
use crate::error::{HilbertError, Result};

/// Hilbert space of `n_sites` bosonic modes with occupations `0..=n_max`.
///
/// An optional total particle number restricts the basis to
/// `Σ_i n_i = n_bosons`.
#[derive(Debug, Clone)]
pub struct Boson {
    n_max: usize,
    n_bosons: Option<usize>,
    basis: SiteBasis,
}

impl Boson {
    /// Unconstrained bosonic modes.
    pub fn new(n_max: usize, n_sites: usize) -> Result<Self> {
        check_n_sites(n_sites)?;
        if n_max == 0 {
            return Err(HilbertError::InvalidParameter("n_max must be > 0".into()).into());
        }
        let states = (0..=n_max).map(|n| n as f64).collect();
        Ok(Self {
            n_max,
            n_bosons: None,
            basis: SiteBasis::homogeneous(states, n_sites),
        })
    }

    /// Bosonic modes restricted to `n_bosons` particles in total.
    pub fn with_n_bosons(n_max: usize, n_sites: usize, n_bosons: usize) -> Result<Self> {
        let mut hilbert = Self::new(n_max, n_sites)?;
        if n_bosons > n_max * n_sites {
            return Err(HilbertError::InvalidParameter(format!(
                "{} bosons do not fit in {} modes with n_max={}",
                n_bosons, n_sites, n_max
            ))
            .into());
        }
        hilbert.n_bosons = Some(n_bosons);
        Ok(hilbert)
    }

    /// Occupation cutoff per mode.
    pub fn n_max(&self) -> usize {
        self.n_max
    }

    /// Total particle number constraint, if any.
    pub fn n_bosons(&self) -> Option<usize> {
        self.n_bosons
    }

    fn particle_number_ok(&self, state: &[f64]) -> bool {
        match self.n_bosons {
            Some(n) => (state.iter().sum::<f64>() - n as f64).abs() < 1e-8,
            None => true,
        }
    }

    fn constraint(&self) -> Option<Box<dyn Fn(&[f64]) -> bool + '_>> {
        self.n_bosons.map(|_| {
            Box::new(move |x: &[f64]| self.particle_number_ok(x)) as Box<dyn Fn(&[f64]) -> bool + '_>
        })
    }
}

impl AbstractHilbert for Boson {
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
        self.n_bosons.is_some()
    }

    fn constraint_ok(&self, state: &[f64]) -> bool {
        self.particle_number_ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boson_states() {
        let hi = Boson::new(3, 2).unwrap();
        assert_eq!(hi.states_at(0), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(hi.n_states().unwrap(), 16);
        assert_eq!(hi.n_max(), 3);
    }

    #[test]
    fn test_particle_number_constraint() {
        let hi = Boson::with_n_bosons(2, 3, 2).unwrap();
        // (2,0,0) x3 and (1,1,0) x3
        assert_eq!(hi.n_states().unwrap(), 6);
        for row in hi.all_states().unwrap().rows() {
            assert_eq!(row.sum(), 2.0);
        }
    }

    #[test]
    fn test_invalid_boson_parameters() {
        assert!(Boson::new(0, 2).is_err());
        assert!(Boson::with_n_bosons(1, 2, 3).is_err());
    }
}
