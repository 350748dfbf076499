// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Ready-made open spin models.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dynamics::expectation;
use crate::error::{Result, ValidationError};
use crate::hilbert::HilbertRef;
use crate::operator::{spin, LocalOperator};

/// Parameters of the dissipative transverse-field Ising chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsingChainParams {
    /// Transverse field `h`
    #[serde(default = "default_one")]
    pub field: f64,

    /// Nearest-neighbour coupling `J`
    #[serde(default = "default_one")]
    pub coupling: f64,

    /// Decay rate `γ` of every site
    #[serde(default = "default_one")]
    pub gamma: f64,

    /// Close the chain into a ring
    #[serde(default = "default_pbc")]
    pub pbc: bool,
}

impl Default for IsingChainParams {
    fn default() -> Self {
        Self {
            field: default_one(),
            coupling: default_one(),
            gamma: default_one(),
            pbc: default_pbc(),
        }
    }
}

fn default_one() -> f64 {
    1.0
}

fn default_pbc() -> bool {
    true
}

impl IsingChainParams {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("field", self.field), ("coupling", self.coupling)] {
            if !value.is_finite() {
                return Err(ValidationError::Field {
                    field: field.into(),
                    message: format!("must be finite, got {}", value),
                }
                .into());
            }
        }
        if !(self.gamma.is_finite() && self.gamma >= 0.0) {
            return Err(ValidationError::Field {
                field: "gamma".into(),
                message: format!("must be >= 0, got {}", self.gamma),
            }
            .into());
        }
        Ok(())
    }
}

/// Hamiltonian and jump operators of an open system.
#[derive(Debug, Clone)]
pub struct DissipativeModel {
    pub hamiltonian: LocalOperator,
    pub jump_ops: Vec<LocalOperator>,
}

/// `H = h Σ σx_i + J Σ σz_i σz_{i+1}` with decay jumps `√γ σ⁻_i`.
///
/// With `pbc` the bonds are `(i, (i + 1) % L)` for every site.
pub fn dissipative_ising_chain(
    hilbert: HilbertRef,
    params: &IsingChainParams,
) -> Result<DissipativeModel> {
    params.validate()?;
    let length = hilbert.size();

    let mut hamiltonian = LocalOperator::new(hilbert.clone());
    if params.field != 0.0 {
        for i in 0..length {
            let sx = spin::sigmax(hilbert.clone(), i)?;
            hamiltonian.try_add_assign(&(sx * params.field))?;
        }
    }

    let n_bonds = match (length, params.pbc) {
        _ if params.coupling == 0.0 => 0,
        (0 | 1, _) => 0,
        (_, true) => length,
        (_, false) => length - 1,
    };
    for i in 0..n_bonds {
        let j = (i + 1) % length;
        let zz = spin::sigmaz(hilbert.clone(), i)?.matmul(&spin::sigmaz(hilbert.clone(), j)?)?;
        hamiltonian.try_add_assign(&(zz * params.coupling))?;
    }

    let mut jump_ops = Vec::with_capacity(length);
    if params.gamma > 0.0 {
        let amplitude = params.gamma.sqrt();
        for i in 0..length {
            jump_ops.push(spin::sigmam(hilbert.clone(), i)? * amplitude);
        }
    }

    debug!(
        length,
        n_bonds,
        n_jump_ops = jump_ops.len(),
        "Built dissipative Ising chain"
    );
    Ok(DissipativeModel {
        hamiltonian,
        jump_ops,
    })
}

/// Summed magnetizations `Σσx`, `Σσy`, `Σσz`.
#[derive(Debug, Clone)]
pub struct Magnetization {
    pub x: LocalOperator,
    pub y: LocalOperator,
    pub z: LocalOperator,
}

pub fn magnetization_observables(hilbert: HilbertRef) -> Result<Magnetization> {
    let mut x = LocalOperator::new(hilbert.clone());
    let mut y = LocalOperator::new(hilbert.clone());
    let mut z = LocalOperator::new(hilbert.clone());
    for i in 0..hilbert.size() {
        x.try_add_assign(&spin::sigmax(hilbert.clone(), i)?)?;
        y.try_add_assign(&spin::sigmay(hilbert.clone(), i)?)?;
        z.try_add_assign(&spin::sigmaz(hilbert.clone(), i)?)?;
    }
    Ok(Magnetization { x, y, z })
}

/// Expectation values of the Pauli operators on one site.
#[derive(Debug, Clone, Serialize)]
pub struct SiteObservables {
    pub site: usize,
    pub sx: f64,
    pub sy: f64,
    pub sz: f64,
}

/// `⟨σx_i⟩`, `⟨σy_i⟩`, `⟨σz_i⟩` for every site.
pub fn site_magnetizations(
    hilbert: HilbertRef,
    rho: &Array2<Complex64>,
) -> Result<Vec<SiteObservables>> {
    (0..hilbert.size())
        .map(|site| {
            Ok(SiteObservables {
                site,
                sx: expectation(&spin::sigmax(hilbert.clone(), site)?, rho)?.re,
                sy: expectation(&spin::sigmay(hilbert.clone(), site)?, rho)?.re,
                sz: expectation(&spin::sigmaz(hilbert.clone(), site)?, rho)?.re,
            })
        })
        .collect()
}
