// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! RK4 integrator for the Lindblad master equation.
//!
//! Integrates d vec(ρ)/dt = L vec(ρ) with classical 4th-order Runge–Kutta,
//! `L` being the sparse matrix of a [`LocalLiouvillian`].
//!
//! Ref: Press et al., "Numerical Recipes" (2007), §17.1.

use ndarray::{Array1, Array2, ShapeBuilder};
use num_complex::Complex64;
use tracing::debug;

use super::dissipator::lindblad_rhs;
use super::types::{EvolutionConfig, EvolutionResult};
use crate::error::{Result, ValidationError};
use crate::operator::{AbstractOperator, LocalLiouvillian};
use crate::sparse::SparseMatrix;
use crate::spectral::eigvalsh;
use crate::validation::validate_density_matrix;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Column-major `vec(ρ)`: entry `j·n + i` holds `ρ[i, j]`.
pub fn vectorize(rho: &Array2<Complex64>) -> Array1<Complex64> {
    rho.t().iter().copied().collect()
}

/// Inverse of [`vectorize`].
pub fn unvectorize(v: Vec<Complex64>, n: usize) -> Result<Array2<Complex64>> {
    if v.len() != n * n {
        return Err(ValidationError::Field {
            field: "vec(rho)".into(),
            message: format!("length {} is not {}²", v.len(), n),
        }
        .into());
    }
    Ok(Array2::from_shape_vec((n, n).f(), v)?)
}

/// Scratch vectors of one RK4 step.
pub(crate) struct Rk4Workspace {
    k1: Vec<Complex64>,
    k2: Vec<Complex64>,
    k3: Vec<Complex64>,
    k4: Vec<Complex64>,
    tmp: Vec<Complex64>,
}

impl Rk4Workspace {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            k1: vec![ZERO; len],
            k2: vec![ZERO; len],
            k3: vec![ZERO; len],
            k4: vec![ZERO; len],
            tmp: vec![ZERO; len],
        }
    }

    /// Advance `x` by `dt` under `dx/dt = L x`.
    pub(crate) fn step(&mut self, l: &SparseMatrix, x: &mut [Complex64], dt: f64) {
        let half = 0.5 * dt;

        l.spmv(x, &mut self.k1);
        axpy_into(&mut self.tmp, x, half, &self.k1);
        l.spmv(&self.tmp, &mut self.k2);
        axpy_into(&mut self.tmp, x, half, &self.k2);
        l.spmv(&self.tmp, &mut self.k3);
        axpy_into(&mut self.tmp, x, dt, &self.k3);
        l.spmv(&self.tmp, &mut self.k4);

        let w = dt / 6.0;
        for i in 0..x.len() {
            x[i] += (self.k1[i] + 2.0 * self.k2[i] + 2.0 * self.k3[i] + self.k4[i]) * w;
        }
    }
}

/// out = x + a·y
fn axpy_into(out: &mut [Complex64], x: &[Complex64], a: f64, y: &[Complex64]) {
    for ((o, &xi), &yi) in out.iter_mut().zip(x).zip(y) {
        *o = xi + yi * a;
    }
}

/// Evolve `initial_rho` under a Liouvillian.
pub fn solve_lindblad(
    liouvillian: &LocalLiouvillian,
    initial_rho: &Array2<Complex64>,
    config: &EvolutionConfig,
) -> Result<EvolutionResult> {
    config.validate()?;
    let dim = liouvillian.hilbert_physical().n_states()?;
    validate_density_matrix(initial_rho, dim, 1e-8)?;

    let l = liouvillian.to_sparse()?;
    let dt = config.dt();
    let mut x = vectorize(initial_rho).to_vec();
    let mut workspace = Rk4Workspace::new(x.len());

    let mut trajectory = if config.store_trajectory {
        Some(vec![initial_rho.clone()])
    } else {
        None
    };

    for _ in 0..config.num_time_steps {
        workspace.step(&l, &mut x, dt);
        if let Some(ref mut traj) = trajectory {
            traj.push(unvectorize(x.clone(), dim)?);
        }
    }

    let rho = unvectorize(x, dim)?;
    let final_trace = trace_real(&rho);
    let final_purity = purity(&rho);
    debug!(
        steps = config.num_time_steps,
        dt, final_trace, final_purity, "Lindblad evolution finished"
    );

    Ok(EvolutionResult {
        final_density_matrix: rho,
        final_trace,
        final_purity,
        trajectory,
        steps: config.num_time_steps,
    })
}

/// Dense RK4 evolution from explicit matrices.
///
/// Reference integrator for small systems; jump operators carry their rates.
pub fn solve_lindblad_dense(
    hamiltonian: &Array2<Complex64>,
    jumps: &[Array2<Complex64>],
    initial_rho: &Array2<Complex64>,
    config: &EvolutionConfig,
) -> Result<EvolutionResult> {
    config.validate()?;
    let dim = hamiltonian.nrows();
    check_square(hamiltonian, dim)?;
    check_square(initial_rho, dim)?;
    for jump in jumps {
        check_square(jump, dim)?;
    }

    let dt_c = Complex64::new(config.dt(), 0.0);
    let half = Complex64::new(0.5, 0.0);
    let sixth = Complex64::new(1.0 / 6.0, 0.0);
    let two = Complex64::new(2.0, 0.0);

    let mut rho = initial_rho.clone();
    let mut trajectory = if config.store_trajectory {
        Some(vec![rho.clone()])
    } else {
        None
    };

    for _ in 0..config.num_time_steps {
        let k1 = lindblad_rhs(hamiltonian, jumps, &rho);
        let k2 = lindblad_rhs(hamiltonian, jumps, &(&rho + &(&k1 * (half * dt_c))));
        let k3 = lindblad_rhs(hamiltonian, jumps, &(&rho + &(&k2 * (half * dt_c))));
        let k4 = lindblad_rhs(hamiltonian, jumps, &(&rho + &(&k3 * dt_c)));
        rho = &rho + &((k1 + &k2 * two + &k3 * two + k4) * (sixth * dt_c));
        if let Some(ref mut traj) = trajectory {
            traj.push(rho.clone());
        }
    }

    let final_trace = trace_real(&rho);
    let final_purity = purity(&rho);
    Ok(EvolutionResult {
        final_density_matrix: rho,
        final_trace,
        final_purity,
        trajectory,
        steps: config.num_time_steps,
    })
}

fn check_square(m: &Array2<Complex64>, dim: usize) -> Result<()> {
    if m.dim() != (dim, dim) {
        return Err(ValidationError::Field {
            field: "matrix".into(),
            message: format!("expected {} × {}, got {:?}", dim, dim, m.dim()),
        }
        .into());
    }
    Ok(())
}

/// Trace of a density matrix (real part).
pub fn trace_real(rho: &Array2<Complex64>) -> f64 {
    rho.diag().iter().map(|z| z.re).sum()
}

/// Purity Tr(ρ²).
pub fn purity(rho: &Array2<Complex64>) -> f64 {
    // Tr(ρ²) = Σ_ij ρ_ij ρ_ji
    let mut total = ZERO;
    for ((i, j), &z) in rho.indexed_iter() {
        total += z * rho[[j, i]];
    }
    total.re
}

/// State fidelity `Tr(ρ_target · ρ)`, exact when the target is pure.
pub fn state_fidelity(rho: &Array2<Complex64>, target_rho: &Array2<Complex64>) -> f64 {
    trace_real(&target_rho.dot(rho))
}

/// Trace distance `D(ρ, σ) = ½ Σ |λ_k(ρ − σ)|`.
pub fn trace_distance(rho: &Array2<Complex64>, sigma: &Array2<Complex64>) -> Result<f64> {
    if rho.dim() != sigma.dim() {
        return Err(ValidationError::Field {
            field: "sigma".into(),
            message: format!("shape {:?} does not match {:?}", sigma.dim(), rho.dim()),
        }
        .into());
    }
    let evals = eigvalsh(&(rho - sigma))?;
    Ok(0.5 * evals.iter().map(|l| l.abs()).sum::<f64>())
}

/// `Tr(O ρ)` without materializing `O`.
pub fn expectation(op: &dyn AbstractOperator, rho: &Array2<Complex64>) -> Result<Complex64> {
    let hilbert = op.hilbert();
    let dim = hilbert.n_states()?;
    check_square(rho, dim)?;

    let size = hilbert.size();
    let mut x = vec![0.0; size];
    let mut x_primes = Vec::with_capacity(op.max_conn_size() * size);
    let mut mels = Vec::with_capacity(op.max_conn_size());
    let mut total = ZERO;
    for number in 0..dim {
        hilbert.number_to_state_into(number, &mut x)?;
        x_primes.clear();
        mels.clear();
        op.get_conn_flattened(&x, &mut x_primes, &mut mels)?;
        for (x_prime, &mel) in x_primes.chunks_exact(size).zip(&mels) {
            if mel == ZERO || !hilbert.constraint_ok(x_prime) {
                continue;
            }
            total += mel * rho[[hilbert.state_to_number(x_prime)?, number]];
        }
    }
    Ok(total)
}
