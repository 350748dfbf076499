// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Stationary state of a Liouvillian by RK4 relaxation.
//!
//! Starting from the maximally mixed state, `vec(ρ)` is propagated under
//! `L` until the Rayleigh quotient `‖L vec(ρ)‖² / ‖vec(ρ)‖²` falls below the
//! tolerance. The quotient bounds the smallest eigenvalue of `L†L` from
//! above, so convergence certifies a (numerical) zero mode.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::{debug, info, warn};

use super::integrate::{trace_real, unvectorize, vectorize, Rk4Workspace};
use super::types::SteadyState;
use crate::config::{ResourceLimits, SolverConfig};
use crate::error::{Error, Result};
use crate::operator::{AbstractOperator, LocalLiouvillian};
use crate::sparse::{dagger, SparseMatrix};

/// Steady state with the default resource limits.
pub fn steady_state(liouvillian: &LocalLiouvillian, solver: &SolverConfig) -> Result<SteadyState> {
    steady_state_with(liouvillian, solver, &ResourceLimits::default())
}

/// Steady state, materializing `L` under `limits`.
pub fn steady_state_with(
    liouvillian: &LocalLiouvillian,
    solver: &SolverConfig,
    limits: &ResourceLimits,
) -> Result<SteadyState> {
    solver.validate()?;
    let dim = liouvillian.hilbert_physical().n_states()?;
    let l = liouvillian.to_sparse_with(limits)?;
    info!(
        dim,
        nnz = l.nnz(),
        dt = solver.dt,
        tolerance = solver.tolerance,
        "Searching steady state"
    );
    relax(&l, dim, solver)
}

fn relax(l: &SparseMatrix, dim: usize, solver: &SolverConfig) -> Result<SteadyState> {
    let mixed = Array2::from_diag_elem(dim, Complex64::new(1.0 / dim as f64, 0.0));
    let mut x = vectorize(&mixed).to_vec();
    let mut lx = vec![Complex64::new(0.0, 0.0); x.len()];
    let mut workspace = Rk4Workspace::new(x.len());

    let mut residual = f64::INFINITY;
    let mut steps = 0;
    loop {
        if steps % solver.check_every == 0 || steps == solver.max_steps {
            residual = rayleigh_quotient(l, &x, &mut lx);
            debug!(steps, residual, "Steady-state residual");
            if residual <= solver.tolerance {
                break;
            }
        }
        if steps == solver.max_steps {
            warn!(steps, residual, "Steady state not converged");
            return Err(Error::Solver(format!(
                "Steady state not converged after {} steps (residual {:.3e} > {:.3e})",
                steps, residual, solver.tolerance
            )));
        }
        workspace.step(l, &mut x, solver.dt);
        steps += 1;
    }

    let rho = unvectorize(x, dim)?;
    let rho = (&rho + &dagger(&rho)).mapv(|z| z * 0.5);
    let trace = trace_real(&rho);
    if !(trace.is_finite() && trace.abs() > f64::EPSILON) {
        return Err(Error::Solver(format!(
            "Steady state has vanishing trace {:.3e}",
            trace
        )));
    }
    let density_matrix = rho.mapv(|z| z / trace);

    info!(steps, residual, "Steady state converged");
    Ok(SteadyState {
        density_matrix,
        residual,
        steps,
    })
}

/// `‖L x‖² / ‖x‖²`, leaving `L x` in `lx`.
fn rayleigh_quotient(l: &SparseMatrix, x: &[Complex64], lx: &mut [Complex64]) -> f64 {
    l.spmv(x, lx);
    let num: f64 = lx.iter().map(|z| z.norm_sqr()).sum();
    let den: f64 = x.iter().map(|z| z.norm_sqr()).sum();
    num / den
}
