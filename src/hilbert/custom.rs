// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hilbert space with user supplied local states and constraint.

use std::fmt;
use std::sync::Arc;

use super::{check_n_sites, AbstractHilbert, SiteBasis};
use crate::error::{HilbertError, Result};

/// Predicate selecting the allowed configurations.
pub type Constraint = Arc<dyn Fn(&[f64]) -> bool + Send + Sync>;

/// Homogeneous lattice with arbitrary local quantum numbers.
#[derive(Clone)]
pub struct CustomHilbert {
    basis: SiteBasis,
    constraint: Option<Constraint>,
}

impl CustomHilbert {
    /// Every site takes one of `local_states`, in the given order.
    pub fn new(local_states: Vec<f64>, n_sites: usize) -> Result<Self> {
        check_n_sites(n_sites)?;
        if local_states.is_empty() {
            return Err(HilbertError::InvalidParameter("local_states cannot be empty".into()).into());
        }
        if let Some(bad) = local_states.iter().find(|v| !v.is_finite()) {
            return Err(HilbertError::InvalidParameter(format!(
                "local state {} is not finite",
                bad
            ))
            .into());
        }
        for (i, a) in local_states.iter().enumerate() {
            if local_states[i + 1..].iter().any(|b| (a - b).abs() < 1e-8) {
                return Err(HilbertError::InvalidParameter(format!(
                    "local state {} appears more than once",
                    a
                ))
                .into());
            }
        }
        Ok(Self {
            basis: SiteBasis::homogeneous(local_states, n_sites),
            constraint: None,
        })
    }

    /// Restrict the basis to configurations accepted by `constraint`.
    pub fn with_constraint<F>(self, constraint: F) -> Self
    where
        F: Fn(&[f64]) -> bool + Send + Sync + 'static,
    {
        Self {
            // a fresh basis so the index is rebuilt under the constraint
            basis: SiteBasis::homogeneous(self.basis.states_at(0).to_vec(), self.basis.size()),
            constraint: Some(Arc::new(constraint)),
        }
    }

    fn constraint_fn(&self) -> Option<&dyn Fn(&[f64]) -> bool> {
        self.constraint
            .as_deref()
            .map(|c| c as &dyn Fn(&[f64]) -> bool)
    }
}

impl fmt::Debug for CustomHilbert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomHilbert")
            .field("size", &self.basis.size())
            .field("local_states", &self.basis.states_at(0))
            .field("constrained", &self.constraint.is_some())
            .finish()
    }
}

impl AbstractHilbert for CustomHilbert {
    fn size(&self) -> usize {
        self.basis.size()
    }

    fn states_at(&self, site: usize) -> &[f64] {
        self.basis.states_at(site)
    }

    fn n_states(&self) -> Result<usize> {
        Ok(self.basis.index(self.constraint_fn())?.n_states())
    }

    fn state_to_number(&self, state: &[f64]) -> Result<usize> {
        Ok(self.basis.index(self.constraint_fn())?.state_to_number(state)?)
    }

    fn number_to_state_into(&self, number: usize, out: &mut [f64]) -> Result<()> {
        Ok(self
            .basis
            .index(self.constraint_fn())?
            .number_to_state_into(number, out)?)
    }

    fn is_constrained(&self) -> bool {
        self.constraint.is_some()
    }

    fn constraint_ok(&self, state: &[f64]) -> bool {
        self.constraint.as_ref().map_or(true, |c| c(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_local_states() {
        let hi = CustomHilbert::new(vec![-1.0, 0.0, 1.0], 2).unwrap();
        assert_eq!(hi.n_states().unwrap(), 9);
        assert_eq!(hi.state_to_number(&[0.0, 1.0]).unwrap(), 5);
        assert!(!hi.is_constrained());
    }

    #[test]
    fn test_custom_constraint() {
        let hi = CustomHilbert::new(vec![0.0, 1.0], 4)
            .unwrap()
            .with_constraint(|x| x.iter().sum::<f64>() == 1.0);
        assert!(hi.is_constrained());
        assert_eq!(hi.n_states().unwrap(), 4);
        assert_eq!(hi.number_to_state(0).unwrap().to_vec(), vec![0.0, 0.0, 0.0, 1.0]);
        assert!(hi.state_to_number(&[1.0, 1.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_invalid_local_states() {
        assert!(CustomHilbert::new(vec![], 2).is_err());
        assert!(CustomHilbert::new(vec![0.0, 0.0], 2).is_err());
        assert!(CustomHilbert::new(vec![0.0, f64::NAN], 2).is_err());
    }
}
