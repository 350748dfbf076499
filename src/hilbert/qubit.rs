// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Qubit register Hilbert space.

use super::{check_n_sites, AbstractHilbert, SiteBasis};
use crate::error::Result;

/// `n_sites` two-level systems with local values `0` and `1`.
#[derive(Debug, Clone)]
pub struct Qubit {
    basis: SiteBasis,
}

impl Qubit {
    pub fn new(n_sites: usize) -> Result<Self> {
        check_n_sites(n_sites)?;
        Ok(Self {
            basis: SiteBasis::homogeneous(vec![0.0, 1.0], n_sites),
        })
    }
}

impl AbstractHilbert for Qubit {
    fn size(&self) -> usize {
        self.basis.size()
    }

    fn states_at(&self, site: usize) -> &[f64] {
        self.basis.states_at(site)
    }

    fn n_states(&self) -> Result<usize> {
        Ok(self.basis.index(None)?.n_states())
    }

    fn state_to_number(&self, state: &[f64]) -> Result<usize> {
        Ok(self.basis.index(None)?.state_to_number(state)?)
    }

    fn number_to_state_into(&self, number: usize, out: &mut [f64]) -> Result<()> {
        Ok(self.basis.index(None)?.number_to_state_into(number, out)?)
    }
}
