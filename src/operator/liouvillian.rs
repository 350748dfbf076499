// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad generator as an operator on the doubled Hilbert space.
//!
//! For `dρ/dt = -i[H, ρ] + Σ_j (J_j ρ J_j† − ½{J_j†J_j, ρ})` the generator
//! is written with the non-Hermitian Hamiltonian
//!
//!   H_nh = H − (i/2) Σ_j J_j† J_j
//!
//! as `dρ/dt = -i H_nh ρ + i ρ H_nh† + Σ_j J_j ρ J_j†`. On the doubled
//! configuration `(σ, η)` of `ρ(σ, η)` its matrix elements are
//!
//!   L[(σ,η),(σ',η')] = −i H_nh(σ,σ') δ(η,η')
//!                      + i conj(H_nh(η,η')) δ(σ,σ')
//!                      + Σ_j J_j(σ,σ') conj(J_j(η,η'))
//!
//! With the column-major numbering of [`DoubledHilbert`] this is the matrix
//! `−i(I⊗H_nh) + i(H_nh*⊗I) + Σ_j J_j*⊗J_j` acting on `vec(ρ)`.

use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use tracing::{debug, info};

use super::local::check_compatible;
use super::{check_state_len, AbstractOperator, LocalOperator, ZERO};
use crate::dynamics::{unvectorize, vectorize};
use crate::error::{Result, ValidationError};
use crate::hilbert::{DoubledHilbert, HilbertRef};

const I: Complex64 = Complex64::new(0.0, 1.0);
const MINUS_I: Complex64 = Complex64::new(0.0, -1.0);

/// Lindblad superoperator built from local operators.
#[derive(Debug, Clone)]
pub struct LocalLiouvillian {
    hamiltonian: LocalOperator,
    hamiltonian_nh: LocalOperator,
    jump_ops: Vec<LocalOperator>,
    hilbert: HilbertRef,
}

impl LocalLiouvillian {
    /// Liouvillian of `hamiltonian` with dissipators `jump_ops`.
    ///
    /// Jump operators carry their rates: a channel of rate γ is `√γ J`.
    pub fn new(hamiltonian: LocalOperator, jump_ops: Vec<LocalOperator>) -> Result<Self> {
        for op in &jump_ops {
            check_compatible(hamiltonian.hilbert(), op.hilbert())?;
        }
        let physical = hamiltonian.hilbert().clone();
        let hilbert: HilbertRef = Arc::new(DoubledHilbert::new(physical.clone()));
        let hamiltonian_nh = non_hermitian_hamiltonian(&hamiltonian, &jump_ops)?;

        info!(
            n_sites = physical.size(),
            n_jump_ops = jump_ops.len(),
            n_terms_nh = hamiltonian_nh.n_operators(),
            "Built local Liouvillian"
        );

        Ok(Self {
            hamiltonian,
            hamiltonian_nh,
            jump_ops,
            hilbert,
        })
    }

    /// The Hermitian Hamiltonian `H`.
    pub fn hamiltonian(&self) -> &LocalOperator {
        &self.hamiltonian
    }

    /// The effective Hamiltonian `H − (i/2) Σ_j J_j† J_j`.
    pub fn hamiltonian_nh(&self) -> &LocalOperator {
        &self.hamiltonian_nh
    }

    pub fn jump_ops(&self) -> &[LocalOperator] {
        &self.jump_ops
    }

    /// Hilbert space of the density matrix rows and columns.
    pub fn hilbert_physical(&self) -> &HilbertRef {
        self.hamiltonian.hilbert()
    }

    /// Add a dissipation channel and refresh `H_nh`.
    pub fn add_jump_operator(&mut self, op: LocalOperator) -> Result<()> {
        check_compatible(self.hamiltonian.hilbert(), op.hilbert())?;
        self.jump_ops.push(op);
        self.hamiltonian_nh = non_hermitian_hamiltonian(&self.hamiltonian, &self.jump_ops)?;
        debug!(n_jump_ops = self.jump_ops.len(), "Added jump operator");
        Ok(())
    }

    /// `dρ/dt` for a density matrix on the physical space.
    pub fn apply_to_density(&self, rho: &Array2<Complex64>) -> Result<Array2<Complex64>> {
        let dim = self.hilbert_physical().n_states()?;
        if rho.dim() != (dim, dim) {
            return Err(ValidationError::Field {
                field: "rho".into(),
                message: format!("shape {:?} does not match dimension {}", rho.dim(), dim),
            }
            .into());
        }
        let drho = self.apply(&vectorize(rho))?;
        unvectorize(drho.to_vec(), dim)
    }
}

fn non_hermitian_hamiltonian(
    hamiltonian: &LocalOperator,
    jump_ops: &[LocalOperator],
) -> Result<LocalOperator> {
    let minus_half_i = Complex64::new(0.0, -0.5);
    let mut hnh = hamiltonian.clone();
    for op in jump_ops {
        hnh.try_add_assign(&(op.adjoint().matmul(op)? * minus_half_i))?;
    }
    Ok(hnh)
}

impl AbstractOperator for LocalLiouvillian {
    fn hilbert(&self) -> &HilbertRef {
        &self.hilbert
    }

    fn get_conn_flattened(
        &self,
        x: &[f64],
        x_primes: &mut Vec<f64>,
        mels: &mut Vec<Complex64>,
    ) -> Result<()> {
        check_state_len(self.hilbert.as_ref(), x)?;
        let n = self.hilbert_physical().size();
        let (sigma, eta) = x.split_at(n);

        let mut xs = Vec::new();
        let mut ms = Vec::new();

        // −i H_nh ρ
        self.hamiltonian_nh
            .get_conn_flattened(sigma, &mut xs, &mut ms)?;
        for (sigma_p, &mel) in xs.chunks_exact(n).zip(&ms) {
            x_primes.extend_from_slice(sigma_p);
            x_primes.extend_from_slice(eta);
            mels.push(MINUS_I * mel);
        }

        // +i ρ H_nh†
        xs.clear();
        ms.clear();
        self.hamiltonian_nh.get_conn_flattened(eta, &mut xs, &mut ms)?;
        for (eta_p, &mel) in xs.chunks_exact(n).zip(&ms) {
            x_primes.extend_from_slice(sigma);
            x_primes.extend_from_slice(eta_p);
            mels.push(I * mel.conj());
        }

        // Σ_j J_j ρ J_j†
        let mut xs_eta = Vec::new();
        let mut ms_eta = Vec::new();
        for op in &self.jump_ops {
            xs.clear();
            ms.clear();
            xs_eta.clear();
            ms_eta.clear();
            op.get_conn_flattened(sigma, &mut xs, &mut ms)?;
            op.get_conn_flattened(eta, &mut xs_eta, &mut ms_eta)?;
            for (sigma_p, &a) in xs.chunks_exact(n).zip(&ms) {
                if a == ZERO {
                    continue;
                }
                for (eta_p, &b) in xs_eta.chunks_exact(n).zip(&ms_eta) {
                    if b == ZERO {
                        continue;
                    }
                    x_primes.extend_from_slice(sigma_p);
                    x_primes.extend_from_slice(eta_p);
                    mels.push(a * b.conj());
                }
            }
        }
        Ok(())
    }

    fn max_conn_size(&self) -> usize {
        2 * self.hamiltonian_nh.max_conn_size()
            + self
                .jump_ops
                .iter()
                .map(|op| op.max_conn_size().pow(2))
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::lindblad_rhs;
    use crate::error::Error;
    use crate::hilbert::Spin;
    use crate::sparse::{dagger, kron_dense};
    use crate::test_utils::{
        assert_matrix_eq, c, identity, ising_chain, mixed_test_state, sigma_minus, sigma_plus,
        sigma_x, sigma_y, sigma_z,
    };

    /// `−i(I⊗H_nh) + i(H_nh*⊗I) + Σ_j J_j*⊗J_j` from dense matrices.
    fn liouvillian_by_hand(h: &LocalOperator, jumps: &[LocalOperator]) -> Array2<Complex64> {
        let mut hnh = h.to_dense().unwrap();
        let jump_mats: Vec<_> = jumps.iter().map(|j| j.to_dense().unwrap()).collect();
        for j in &jump_mats {
            hnh = hnh - dagger(j).dot(j).mapv(|z| c(0.0, 0.5) * z);
        }
        let id = identity(hnh.nrows());
        let mut lind = kron_dense(&id, &hnh).mapv(|z| MINUS_I * z)
            + kron_dense(&hnh.mapv(|z| z.conj()), &id).mapv(|z| I * z);
        for j in &jump_mats {
            lind = lind + kron_dense(&j.mapv(|z| z.conj()), j);
        }
        lind
    }

    #[test]
    fn test_lindblad_form_chain_of_five() {
        let (hamiltonian, jump_ops) = ising_chain(5);
        let lind = LocalLiouvillian::new(hamiltonian.clone(), jump_ops.clone()).unwrap();
        assert_eq!(lind.hilbert().size(), 10);
        assert_eq!(lind.hilbert().n_states().unwrap(), 1024);

        let expected = liouvillian_by_hand(&hamiltonian, &jump_ops);
        assert_matrix_eq(&lind.to_dense().unwrap(), &expected, 1e-12);
    }

    #[test]
    fn test_sparse_and_dense_agree() {
        let (hamiltonian, jump_ops) = ising_chain(3);
        let lind = LocalLiouvillian::new(hamiltonian, jump_ops).unwrap();
        let sparse = lind.to_sparse().unwrap();
        assert_matrix_eq(&sparse.to_dense(), &lind.to_dense().unwrap(), 0.0);
        assert!(sparse.nnz() < 64 * 64 / 2);
    }

    #[test]
    fn test_hamiltonian_nh() {
        let hi: HilbertRef = Arc::new(Spin::new(0.5, 1).unwrap());
        let h = LocalOperator::from_matrix(hi.clone(), sigma_x(), &[0]).unwrap();
        let j = LocalOperator::from_matrix(hi, sigma_minus(), &[0]).unwrap();
        let lind = LocalLiouvillian::new(h, vec![j]).unwrap();
        let hnh = lind.hamiltonian_nh().to_dense().unwrap();
        // σ⁺σ⁻ projects on spin up (index 0)
        assert_eq!(hnh[[0, 0]], c(0.0, -0.5));
        assert_eq!(hnh[[1, 1]], c(0.0, 0.0));
        assert_eq!(hnh[[0, 1]], c(1.0, 0.0));
    }

    #[test]
    fn test_apply_to_density_matches_master_equation() {
        let (hamiltonian, jump_ops) = ising_chain(2);
        let lind = LocalLiouvillian::new(hamiltonian.clone(), jump_ops.clone()).unwrap();
        let rho = mixed_test_state(4);

        let h = hamiltonian.to_dense().unwrap();
        let jumps: Vec<_> = jump_ops.iter().map(|j| j.to_dense().unwrap()).collect();
        let expected = lindblad_rhs(&h, &jumps, &rho);
        assert_matrix_eq(&lind.apply_to_density(&rho).unwrap(), &expected, 1e-12);
    }

    /// `L vec(ρ)` against the dense master equation of the same operators.
    fn assert_matches_master_equation(h: &LocalOperator, jumps: &[LocalOperator]) {
        let lind = LocalLiouvillian::new(h.clone(), jumps.to_vec()).unwrap();
        let dim = h.hilbert().n_states().unwrap();
        let rho = mixed_test_state(dim);

        let jump_mats: Vec<_> = jumps.iter().map(|j| j.to_dense().unwrap()).collect();
        let expected = lindblad_rhs(&h.to_dense().unwrap(), &jump_mats, &rho);
        assert_matrix_eq(&lind.apply_to_density(&rho).unwrap(), &expected, 1e-12);
        assert_matrix_eq(&lind.to_dense().unwrap(), &liouvillian_by_hand(h, jumps), 1e-12);
    }

    #[test]
    fn test_complex_non_symmetric_model() {
        // H* differs from H† and J* from J, so conjugation errors show up
        let hi: HilbertRef = Arc::new(Spin::new(0.5, 2).unwrap());
        let mut h = LocalOperator::from_matrix(hi.clone(), sigma_y(), &[0]).unwrap();
        h += LocalOperator::from_matrix(hi.clone(), kron_dense(&sigma_x(), &sigma_y()), &[1, 0])
            .unwrap();
        let jump = ndarray::arr2(&[[c(0.3, 0.2), c(1.0, -0.5)], [c(0.0, 0.4), c(-0.7, 0.0)]]);
        let j = LocalOperator::from_matrix(hi, jump, &[1]).unwrap();

        assert!(h.to_dense().unwrap() != h.to_dense().unwrap().t());
        assert_matches_master_equation(&h, &[j]);
    }

    #[test]
    fn test_constrained_space() {
        // two spins up out of three
        let hi: HilbertRef = Arc::new(Spin::with_total_sz(0.5, 3, 0.5).unwrap());
        assert_eq!(hi.n_states().unwrap(), 3);

        let g = c(0.7, 0.4);
        let flip_flop = kron_dense(&sigma_plus(), &sigma_minus()).mapv(|z| z * g)
            + kron_dense(&sigma_minus(), &sigma_plus()).mapv(|z| z * g.conj());
        let mut h = LocalOperator::from_matrix(hi.clone(), flip_flop, &[0, 1]).unwrap();
        h += LocalOperator::from_matrix(hi.clone(), sigma_z(), &[2]).unwrap();

        let hop = kron_dense(&sigma_plus(), &sigma_minus()).mapv(|z| z * c(0.0, 0.3));
        let jumps = vec![
            LocalOperator::from_matrix(hi.clone(), hop, &[0, 2]).unwrap(),
            LocalOperator::from_matrix(hi.clone(), sigma_z().mapv(|z| z * c(0.5, 0.5)), &[1])
                .unwrap(),
        ];

        let lind = LocalLiouvillian::new(h.clone(), jumps.clone()).unwrap();
        assert_eq!(lind.hilbert().n_states().unwrap(), 9);
        assert_eq!(lind.to_dense().unwrap().dim(), (9, 9));
        assert_matches_master_equation(&h, &jumps);
    }

    #[test]
    fn test_trace_preserving() {
        // Σ_σ L[(σ,σ), c] = 0 for every column
        let (hamiltonian, jump_ops) = ising_chain(2);
        let lind = LocalLiouvillian::new(hamiltonian, jump_ops).unwrap();
        let dense = lind.to_dense().unwrap();
        for col in 0..16 {
            let sum: Complex64 = (0..4).map(|s| dense[[s * 4 + s, col]]).sum();
            assert!(sum.norm() < 1e-12, "column {} sums to {}", col, sum);
        }
    }

    #[test]
    fn test_add_jump_operator() {
        let (hamiltonian, mut jump_ops) = ising_chain(3);
        let last = jump_ops.pop().unwrap();
        let mut lind = LocalLiouvillian::new(hamiltonian.clone(), jump_ops.clone()).unwrap();
        lind.add_jump_operator(last.clone()).unwrap();
        assert_eq!(lind.jump_ops().len(), 3);

        jump_ops.push(last);
        let full = LocalLiouvillian::new(hamiltonian, jump_ops).unwrap();
        assert_eq!(lind.to_sparse().unwrap(), full.to_sparse().unwrap());
    }

    #[test]
    fn test_incompatible_jump_rejected() {
        let (hamiltonian, _) = ising_chain(3);
        let other: HilbertRef = Arc::new(Spin::new(0.5, 2).unwrap());
        let j = LocalOperator::from_matrix(other, sigma_minus(), &[0]).unwrap();
        assert!(matches!(
            LocalLiouvillian::new(hamiltonian, vec![j]),
            Err(Error::Operator(_))
        ));
    }

    #[test]
    fn test_apply_to_density_shape_checked() {
        let (hamiltonian, jump_ops) = ising_chain(2);
        let lind = LocalLiouvillian::new(hamiltonian, jump_ops).unwrap();
        assert!(lind.apply_to_density(&identity(3)).is_err());
        assert!(lind.get_conn(&[1.0, 1.0]).is_err());
    }
}
