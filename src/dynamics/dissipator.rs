// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense form of the Lindblad master equation.
//!
//! Computes D[J](ρ) = J ρ J† − ½{J†J, ρ} with rates folded into the jump
//! operators. Used as the reference against which the sparse Liouvillian
//! is checked, and by the dense integrator for small systems.
//!
//! Ref: Breuer & Petruccione, "The Theory of Open Quantum Systems" (2002), Ch. 3.

use ndarray::Array2;
use num_complex::Complex64;

use crate::sparse::dagger;

/// Lindblad dissipator of a single jump operator.
///
/// D[J](ρ) = J ρ J† − ½ J†J ρ − ½ ρ J†J
pub fn dissipator(jump: &Array2<Complex64>, rho: &Array2<Complex64>) -> Array2<Complex64> {
    let j_dag = dagger(jump);
    let j_dag_j = j_dag.dot(jump);
    let half = Complex64::new(0.5, 0.0);

    let j_rho_jdag = jump.dot(rho).dot(&j_dag);
    let jdj_rho = j_dag_j.dot(rho);
    let rho_jdj = rho.dot(&j_dag_j);

    &j_rho_jdag - &(&jdj_rho * half) - &(&rho_jdj * half)
}

/// dρ/dt = -i[H, ρ] + Σ_k D[J_k](ρ).
pub fn lindblad_rhs(
    hamiltonian: &Array2<Complex64>,
    jumps: &[Array2<Complex64>],
    rho: &Array2<Complex64>,
) -> Array2<Complex64> {
    let i = Complex64::new(0.0, 1.0);

    // -i[H, ρ]
    let h_rho = hamiltonian.dot(rho);
    let rho_h = rho.dot(hamiltonian);
    let mut drho = (&h_rho - &rho_h).mapv(|z| -i * z);

    for jump in jumps {
        drho = drho + dissipator(jump, rho);
    }
    drho
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{c, sigma_minus, sigma_z};
    use approx::assert_relative_eq;

    // spin up is local index 0, σ⁻ moves population to index 1

    fn up_state() -> Array2<Complex64> {
        let mut m = Array2::zeros((2, 2));
        m[[0, 0]] = c(1.0, 0.0);
        m
    }

    fn down_state() -> Array2<Complex64> {
        let mut m = Array2::zeros((2, 2));
        m[[1, 1]] = c(1.0, 0.0);
        m
    }

    fn plus_state() -> Array2<Complex64> {
        Array2::from_elem((2, 2), c(0.5, 0.0))
    }

    #[test]
    fn test_down_state_is_fixed_point() {
        let d = dissipator(&sigma_minus(), &down_state());
        for elem in d.iter() {
            assert_relative_eq!(elem.norm(), 0.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_up_state_decays() {
        let gamma: f64 = 4.0;
        let jump = sigma_minus().mapv(|z| z * gamma.sqrt());
        let d = dissipator(&jump, &up_state());
        assert_relative_eq!(d[[0, 0]].re, -gamma, epsilon = 1e-12);
        assert_relative_eq!(d[[1, 1]].re, gamma, epsilon = 1e-12);
    }

    #[test]
    fn test_dissipator_preserves_trace() {
        let d = dissipator(&sigma_minus(), &plus_state());
        let trace = d[[0, 0]] + d[[1, 1]];
        assert_relative_eq!(trace.norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_dephasing_kills_coherences() {
        let d = dissipator(&sigma_z(), &plus_state());
        // populations unchanged, coherences decay at rate 2
        assert_relative_eq!(d[[0, 0]].norm(), 0.0, epsilon = 1e-14);
        assert_relative_eq!(d[[1, 1]].norm(), 0.0, epsilon = 1e-14);
        assert_relative_eq!(d[[0, 1]].re, -1.0, epsilon = 1e-14);
        assert_relative_eq!(d[[1, 0]].re, -1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_rhs_commuting_hamiltonian() {
        let drho = lindblad_rhs(&sigma_z(), &[], &up_state());
        for elem in drho.iter() {
            assert_relative_eq!(elem.norm(), 0.0, epsilon = 1e-15);
        }
    }
}
