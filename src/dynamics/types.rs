// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Time evolution and steady-state types.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{Result, ValidationError};

/// Configuration of a fixed-step Lindblad evolution.
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    /// Number of RK4 steps.
    pub num_time_steps: usize,
    /// Total evolution time, in the inverse units of the operators.
    pub duration: f64,
    /// Whether to store intermediate density matrices.
    pub store_trajectory: bool,
}

impl EvolutionConfig {
    /// Time step.
    pub fn dt(&self) -> f64 {
        self.duration / self.num_time_steps as f64
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.num_time_steps == 0 {
            return Err(ValidationError::Field {
                field: "num_time_steps".into(),
                message: "must be > 0".into(),
            }
            .into());
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ValidationError::Field {
                field: "duration".into(),
                message: format!("must be > 0, got {}", self.duration),
            }
            .into());
        }
        Ok(())
    }
}

/// Result of a Lindblad evolution.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// Final density matrix.
    pub final_density_matrix: Array2<Complex64>,
    /// Trace of the final density matrix (should be ~1.0).
    pub final_trace: f64,
    /// Purity Tr(ρ²) of the final state.
    pub final_purity: f64,
    /// Intermediate density matrices (if `store_trajectory` was true).
    pub trajectory: Option<Vec<Array2<Complex64>>>,
    /// Number of integration steps taken.
    pub steps: usize,
}

/// Stationary state of a Liouvillian.
#[derive(Debug, Clone)]
pub struct SteadyState {
    /// Trace-one Hermitian density matrix.
    pub density_matrix: Array2<Complex64>,
    /// `‖L vec(ρ)‖² / ‖vec(ρ)‖²` at convergence.
    pub residual: f64,
    /// Number of RK4 steps taken.
    pub steps: usize,
}
