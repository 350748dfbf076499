// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Discrete Hilbert spaces of lattice systems.
//!
//! Every space is a set of `size()` sites, each carrying a finite list of
//! local quantum numbers. A basis state is a configuration `x` holding one
//! local value per site; states are enumerated by [`HilbertIndex`].
//!
//! # Spaces
//!
//! - [`Spin`]: spin-s sites, local values `2m`, optional total magnetization
//! - [`Boson`]: bosonic modes truncated at `n_max`, optional particle number
//! - [`Qubit`]: two-level sites with values `0` and `1`
//! - [`CustomHilbert`]: arbitrary local values and constraint
//! - [`DoubledHilbert`]: row ⊗ column space of density matrices
//! - [`JointHilbert`] / [`PurifiedHilbert`]: tensor products of spaces

use std::fmt;
use std::sync::{Arc, OnceLock};

use ndarray::{Array1, Array2};
use rand::{Rng, RngCore};

use crate::error::{HilbertError, Result};

pub mod boson;
pub mod custom;
pub mod doubled;
pub mod hilbert_index;
pub mod joint;
pub mod qubit;
pub mod spin;

pub use boson::Boson;
pub use custom::CustomHilbert;
pub use doubled::DoubledHilbert;
pub use hilbert_index::HilbertIndex;
pub use joint::{JointHilbert, PurifiedHilbert};
pub use qubit::Qubit;
pub use spin::Spin;

pub(crate) use hilbert_index::local_position;

/// Largest number of basis states that can be indexed.
pub const MAX_STATES: usize = i32::MAX as usize;

/// Largest number of indexable basis states.
pub fn max_states() -> usize {
    MAX_STATES
}

/// Shared, thread-safe handle to a Hilbert space.
pub type HilbertRef = Arc<dyn AbstractHilbert>;

/// A discrete Hilbert space over a set of sites.
pub trait AbstractHilbert: Send + Sync + fmt::Debug {
    /// Number of sites.
    fn size(&self) -> usize;

    /// Local quantum numbers of `site`, in local basis order.
    ///
    /// # Panics
    /// Panics if `site >= self.size()`.
    fn states_at(&self, site: usize) -> &[f64];

    /// Number of basis states, honouring the constraint.
    fn n_states(&self) -> Result<usize>;

    /// Basis number of a configuration.
    fn state_to_number(&self, state: &[f64]) -> Result<usize>;

    /// Write the configuration of basis state `number` into `out`.
    fn number_to_state_into(&self, number: usize, out: &mut [f64]) -> Result<()>;

    /// Whether a constraint restricts the basis.
    fn is_constrained(&self) -> bool {
        false
    }

    /// Whether `state` satisfies the constraint.
    fn constraint_ok(&self, _state: &[f64]) -> bool {
        true
    }

    /// Local dimension of `site`.
    fn local_size(&self, site: usize) -> usize {
        self.states_at(site).len()
    }

    /// Local dimension of every site.
    fn shape(&self) -> Vec<usize> {
        (0..self.size()).map(|site| self.local_size(site)).collect()
    }

    /// Shared local states when every site has the same local basis.
    fn local_states(&self) -> Option<&[f64]> {
        if self.size() == 0 {
            return None;
        }
        let first = self.states_at(0);
        (1..self.size())
            .all(|site| self.states_at(site) == first)
            .then_some(first)
    }

    /// Local basis index of `value` at `site`.
    fn local_index(&self, site: usize, value: f64) -> Result<usize> {
        local_position(self.states_at(site), value)
            .ok_or_else(|| HilbertError::UnknownLocalState { site, value }.into())
    }

    /// All spaces here have discrete local bases.
    fn is_discrete(&self) -> bool {
        true
    }

    /// All spaces here have a finite number of states.
    fn is_finite(&self) -> bool {
        true
    }

    /// Configuration of basis state `number`.
    fn number_to_state(&self, number: usize) -> Result<Array1<f64>> {
        let mut out = vec![0.0; self.size()];
        self.number_to_state_into(number, &mut out)?;
        Ok(Array1::from(out))
    }

    /// Configurations of several basis numbers, one per row.
    fn numbers_to_states(&self, numbers: &[usize]) -> Result<Array2<f64>> {
        let mut out = Array2::zeros((numbers.len(), self.size()));
        let mut buffer = vec![0.0; self.size()];
        for (mut row, &number) in out.rows_mut().into_iter().zip(numbers) {
            self.number_to_state_into(number, &mut buffer)?;
            row.assign(&ndarray::ArrayView1::from(&buffer[..]));
        }
        Ok(out)
    }

    /// Basis numbers of the rows of `states`.
    fn states_to_numbers(&self, states: &Array2<f64>) -> Result<Vec<usize>> {
        states
            .rows()
            .into_iter()
            .map(|row| self.state_to_number(&row.to_vec()))
            .collect()
    }

    /// All basis states, one per row, in numbering order.
    fn all_states(&self) -> Result<Array2<f64>> {
        let numbers: Vec<usize> = (0..self.n_states()?).collect();
        self.numbers_to_states(&numbers)
    }

    /// A uniformly random basis state.
    fn random_state(&self, rng: &mut dyn RngCore) -> Result<Array1<f64>> {
        if self.is_constrained() {
            let n = self.n_states()?;
            return self.number_to_state(rng.gen_range(0..n));
        }
        Ok((0..self.size())
            .map(|site| {
                let states = self.states_at(site);
                states[rng.gen_range(0..states.len())]
            })
            .collect())
    }

    /// Whether `other` has the same sites, local bases and basis size.
    fn is_compatible(&self, other: &dyn AbstractHilbert) -> bool {
        self.size() == other.size()
            && (0..self.size()).all(|site| self.states_at(site) == other.states_at(site))
            && self.n_states().ok() == other.n_states().ok()
    }
}

/// Per-site local bases with a lazily built index.
///
/// Shared by the single-lattice spaces; composite spaces derive their
/// numbering from their factors instead.
#[derive(Debug, Clone)]
pub(crate) struct SiteBasis {
    local_states: Vec<Vec<f64>>,
    index: OnceLock<std::result::Result<HilbertIndex, HilbertError>>,
}

impl SiteBasis {
    pub(crate) fn homogeneous(states: Vec<f64>, n_sites: usize) -> Self {
        Self {
            local_states: vec![states; n_sites],
            index: OnceLock::new(),
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.local_states.len()
    }

    pub(crate) fn states_at(&self, site: usize) -> &[f64] {
        &self.local_states[site]
    }

    pub(crate) fn index(
        &self,
        constraint: Option<&dyn Fn(&[f64]) -> bool>,
    ) -> Result<&HilbertIndex> {
        self.index
            .get_or_init(|| HilbertIndex::new(self.local_states.clone(), constraint))
            .as_ref()
            .map_err(|e| e.clone().into())
    }
}

/// Validate that a site count is usable.
pub(crate) fn check_n_sites(n_sites: usize) -> std::result::Result<(), HilbertError> {
    if n_sites == 0 {
        return Err(HilbertError::InvalidParameter(
            "a Hilbert space needs at least one site".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn test_max_states_matches_i32() {
        assert_eq!(max_states(), 2_147_483_647);
    }

    #[test]
    fn test_homogeneous_local_states() {
        let hi = Spin::new(0.5, 3).unwrap();
        assert_eq!(hi.local_states(), Some(&[1.0, -1.0][..]));
        assert_eq!(hi.shape(), vec![2, 2, 2]);

        let joint = JointHilbert::new(vec![
            Arc::new(Spin::new(0.5, 1).unwrap()) as HilbertRef,
            Arc::new(Boson::new(2, 1).unwrap()) as HilbertRef,
        ])
        .unwrap();
        assert_eq!(joint.local_states(), None);
        assert_eq!(joint.shape(), vec![2, 3]);
    }

    #[test]
    fn test_random_state_respects_constraint() {
        let hi = Spin::with_total_sz(0.5, 6, 0.0).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        for _ in 0..20 {
            let x = hi.random_state(&mut rng).unwrap();
            assert_eq!(x.sum(), 0.0);
            assert!(hi.state_to_number(x.as_slice().unwrap()).is_ok());
        }
    }

    #[test]
    fn test_random_state_unconstrained_values() {
        let hi = Boson::new(3, 4).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(11);
        let x = hi.random_state(&mut rng).unwrap();
        assert_eq!(x.len(), 4);
        assert!(x.iter().all(|&v| (0.0..=3.0).contains(&v)));
    }

    #[test]
    fn test_compatibility() {
        let a = Spin::new(0.5, 4).unwrap();
        let b = Spin::new(0.5, 4).unwrap();
        let c = Spin::new(0.5, 3).unwrap();
        let d = Spin::with_total_sz(0.5, 4, 0.0).unwrap();
        assert!(a.is_compatible(&b));
        assert!(!a.is_compatible(&c));
        assert!(!a.is_compatible(&d));
    }

    #[test]
    fn test_states_to_numbers_roundtrip() {
        let hi = Qubit::new(3).unwrap();
        let states = hi.all_states().unwrap();
        let numbers = hi.states_to_numbers(&states).unwrap();
        assert_eq!(numbers, (0..8).collect::<Vec<_>>());
        let again = hi.numbers_to_states(&numbers).unwrap();
        assert_eq!(again, states);
    }
}
