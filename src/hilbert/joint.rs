// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tensor products of Hilbert spaces.

use crate::error::{HilbertError, Result};

use super::{AbstractHilbert, HilbertRef, MAX_STATES};

/// Tensor product `H_0 ⊗ H_1 ⊗ ...` of possibly different spaces.
///
/// Sites are concatenated in factor order and factor 0 is the most
/// significant digit of the basis number. Each factor keeps its own
/// constraint.
#[derive(Debug, Clone)]
pub struct JointHilbert {
    spaces: Vec<HilbertRef>,
    /// First site of each factor, plus the total size.
    offsets: Vec<usize>,
}

impl JointHilbert {
    pub fn new(spaces: Vec<HilbertRef>) -> Result<Self> {
        if spaces.is_empty() {
            return Err(HilbertError::InvalidParameter(
                "a joint space needs at least one factor".into(),
            )
            .into());
        }
        let mut offsets = Vec::with_capacity(spaces.len() + 1);
        let mut total = 0;
        for space in &spaces {
            offsets.push(total);
            total += space.size();
        }
        offsets.push(total);
        Ok(Self { spaces, offsets })
    }

    /// The factors of the product.
    pub fn spaces(&self) -> &[HilbertRef] {
        &self.spaces
    }

    /// Site range `[start, end)` of factor `k`.
    pub fn sites_of(&self, k: usize) -> std::ops::Range<usize> {
        self.offsets[k]..self.offsets[k + 1]
    }

    fn factor_of(&self, site: usize) -> usize {
        // last offset whose start is <= site
        self.offsets[..self.spaces.len()].partition_point(|&start| start <= site) - 1
    }

    fn factor_dims(&self) -> Result<Vec<usize>> {
        let dims = self
            .spaces
            .iter()
            .map(|s| s.n_states())
            .collect::<Result<Vec<_>>>()?;
        let total = dims.iter().fold(1u128, |acc, &d| acc.saturating_mul(d as u128));
        if total > MAX_STATES as u128 {
            return Err(HilbertError::TooLarge {
                n_states: total,
                max_states: MAX_STATES,
            }
            .into());
        }
        Ok(dims)
    }
}

impl AbstractHilbert for JointHilbert {
    fn size(&self) -> usize {
        self.offsets[self.spaces.len()]
    }

    fn states_at(&self, site: usize) -> &[f64] {
        assert!(site < self.size(), "site {} out of range for {} sites", site, self.size());
        let k = self.factor_of(site);
        self.spaces[k].states_at(site - self.offsets[k])
    }

    fn n_states(&self) -> Result<usize> {
        Ok(self.factor_dims()?.iter().product())
    }

    fn state_to_number(&self, state: &[f64]) -> Result<usize> {
        if state.len() != self.size() {
            return Err(HilbertError::SizeMismatch {
                expected: self.size(),
                actual: state.len(),
            }
            .into());
        }
        let dims = self.factor_dims()?;
        let mut number = 0usize;
        for (k, space) in self.spaces.iter().enumerate() {
            let part = space.state_to_number(&state[self.sites_of(k)])?;
            number = number * dims[k] + part;
        }
        Ok(number)
    }

    fn number_to_state_into(&self, number: usize, out: &mut [f64]) -> Result<()> {
        if out.len() != self.size() {
            return Err(HilbertError::SizeMismatch {
                expected: self.size(),
                actual: out.len(),
            }
            .into());
        }
        let dims = self.factor_dims()?;
        let n_states: usize = dims.iter().product();
        if number >= n_states {
            return Err(HilbertError::NumberOutOfRange { number, n_states }.into());
        }
        let mut rest = number;
        for k in (0..self.spaces.len()).rev() {
            let part = rest % dims[k];
            rest /= dims[k];
            self.spaces[k].number_to_state_into(part, &mut out[self.sites_of(k)])?;
        }
        Ok(())
    }

    fn is_constrained(&self) -> bool {
        self.spaces.iter().any(|s| s.is_constrained())
    }

    fn constraint_ok(&self, state: &[f64]) -> bool {
        state.len() == self.size()
            && self
                .spaces
                .iter()
                .enumerate()
                .all(|(k, s)| s.constraint_ok(&state[self.sites_of(k)]))
    }
}

/// Physical space joined with an ancilla that purifies its mixed states.
#[derive(Debug, Clone)]
pub struct PurifiedHilbert {
    joint: JointHilbert,
}

impl PurifiedHilbert {
    /// Purify `physical` with `ancilla`, or with a copy of `physical`.
    pub fn new(physical: HilbertRef, ancilla: Option<HilbertRef>) -> Result<Self> {
        let ancilla = ancilla.unwrap_or_else(|| physical.clone());
        Ok(Self {
            joint: JointHilbert::new(vec![physical, ancilla])?,
        })
    }

    pub fn physical(&self) -> &HilbertRef {
        &self.joint.spaces[0]
    }

    pub fn ancilla(&self) -> &HilbertRef {
        &self.joint.spaces[1]
    }
}

impl AbstractHilbert for PurifiedHilbert {
    fn size(&self) -> usize {
        self.joint.size()
    }

    fn states_at(&self, site: usize) -> &[f64] {
        self.joint.states_at(site)
    }

    fn n_states(&self) -> Result<usize> {
        self.joint.n_states()
    }

    fn state_to_number(&self, state: &[f64]) -> Result<usize> {
        self.joint.state_to_number(state)
    }

    fn number_to_state_into(&self, number: usize, out: &mut [f64]) -> Result<()> {
        self.joint.number_to_state_into(number, out)
    }

    fn is_constrained(&self) -> bool {
        self.joint.is_constrained()
    }

    fn constraint_ok(&self, state: &[f64]) -> bool {
        self.joint.constraint_ok(state)
    }
}
