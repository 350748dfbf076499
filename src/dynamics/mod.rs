// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Open-system dynamics driven by a [`LocalLiouvillian`].
//!
//! # Modules
//!
//! - [`dissipator`]: dense master-equation right-hand side
//! - [`integrate`]: RK4 evolution on `vec(ρ)` and state metrics
//! - [`steady_state`]: relaxation to the stationary state
//!
//! [`LocalLiouvillian`]: crate::operator::LocalLiouvillian

pub mod dissipator;
pub mod integrate;
pub mod steady_state;
pub mod types;

pub use dissipator::{dissipator, lindblad_rhs};
pub use integrate::{
    expectation, purity, solve_lindblad, solve_lindblad_dense, state_fidelity, trace_distance,
    trace_real, unvectorize, vectorize,
};
pub use steady_state::{steady_state, steady_state_with};
pub use types::{EvolutionConfig, EvolutionResult, SteadyState};
