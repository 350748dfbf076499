// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for operator construction and materialization.

use ndarray::Array2;
use num_complex::Complex64;

use crate::config::ResourceLimits;
use crate::error::{OperatorError, Result, ValidationError};

/// Validate the sites a local term acts on.
pub fn validate_acting_on(acting_on: &[usize], n_sites: usize) -> Result<()> {
    if acting_on.is_empty() {
        return Err(ValidationError::Field {
            field: "acting_on".into(),
            message: "must name at least one site".into(),
        }
        .into());
    }

    for (i, &site) in acting_on.iter().enumerate() {
        if site >= n_sites {
            return Err(OperatorError::SiteOutOfRange {
                site,
                size: n_sites,
            }
            .into());
        }
        if acting_on[..i].contains(&site) {
            return Err(OperatorError::DuplicateSite(site).into());
        }
    }

    Ok(())
}

/// Validate a local matrix against the dimension of the sites it acts on.
pub fn validate_local_matrix(matrix: &Array2<Complex64>, expected_dim: usize) -> Result<()> {
    let (rows, cols) = matrix.dim();
    if rows != expected_dim || cols != expected_dim {
        return Err(OperatorError::ShapeMismatch {
            expected: expected_dim,
            rows,
            cols,
        }
        .into());
    }

    // Check for NaN or Inf
    for ((i, j), z) in matrix.indexed_iter() {
        if z.re.is_nan() || z.im.is_nan() {
            return Err(ValidationError::Field {
                field: "matrix".into(),
                message: format!("contains NaN at ({}, {})", i, j),
            }
            .into());
        }
        if z.re.is_infinite() || z.im.is_infinite() {
            return Err(ValidationError::Field {
                field: "matrix".into(),
                message: format!("contains Inf at ({}, {})", i, j),
            }
            .into());
        }
    }

    Ok(())
}

/// Validate that a basis of `n_states` may be materialized.
pub fn validate_n_states(n_states: usize, limits: &ResourceLimits) -> Result<()> {
    if n_states > limits.max_states {
        return Err(ValidationError::ResourceLimit {
            resource: "n_states".into(),
            limit: limits.max_states as u64,
            requested: n_states as u64,
        }
        .into());
    }
    Ok(())
}

/// Validate that a `dim × dim` dense matrix may be allocated.
pub fn validate_dense_dim(dim: usize, limits: &ResourceLimits) -> Result<()> {
    if dim > limits.max_dense_dim {
        return Err(ValidationError::ResourceLimit {
            resource: "dense_dim".into(),
            limit: limits.max_dense_dim as u64,
            requested: dim as u64,
        }
        .into());
    }
    Ok(())
}

/// Validate a density matrix: square of dimension `dim`, Hermitian and of
/// unit trace within `tol`.
pub fn validate_density_matrix(rho: &Array2<Complex64>, dim: usize, tol: f64) -> Result<()> {
    if rho.nrows() != rho.ncols() {
        return Err(ValidationError::Field {
            field: "rho".into(),
            message: format!("must be square, got {} × {}", rho.nrows(), rho.ncols()),
        }
        .into());
    }
    if rho.nrows() != dim {
        return Err(ValidationError::Field {
            field: "rho".into(),
            message: format!("dimension {} does not match Hilbert space {}", rho.nrows(), dim),
        }
        .into());
    }

    let trace: Complex64 = rho.diag().sum();
    if (trace.re - 1.0).abs() > tol || trace.im.abs() > tol {
        return Err(ValidationError::PhysicsConstraint(format!(
            "density matrix trace is {:.6}{:+.6}i, expected 1",
            trace.re, trace.im
        ))
        .into());
    }

    for i in 0..dim {
        for j in i..dim {
            if (rho[[i, j]] - rho[[j, i]].conj()).norm() > tol {
                return Err(ValidationError::PhysicsConstraint(format!(
                    "density matrix is not Hermitian at ({}, {})",
                    i, j
                ))
                .into());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_validate_acting_on() {
        assert!(validate_acting_on(&[0, 2], 3).is_ok());
        assert!(validate_acting_on(&[2, 0], 3).is_ok());

        // Empty
        assert!(validate_acting_on(&[], 3).is_err());

        // Out of range
        assert!(matches!(
            validate_acting_on(&[0, 3], 3),
            Err(Error::Operator(OperatorError::SiteOutOfRange { site: 3, size: 3 }))
        ));

        // Duplicated
        assert!(matches!(
            validate_acting_on(&[1, 1], 3),
            Err(Error::Operator(OperatorError::DuplicateSite(1)))
        ));
    }

    #[test]
    fn test_validate_local_matrix() {
        let m = Array2::<Complex64>::zeros((4, 4));
        assert!(validate_local_matrix(&m, 4).is_ok());
        assert!(validate_local_matrix(&m, 2).is_err());

        let mut bad = m.clone();
        bad[[1, 2]] = Complex64::new(f64::NAN, 0.0);
        let msg = validate_local_matrix(&bad, 4).unwrap_err().to_string();
        assert!(msg.contains("NaN"));

        let mut bad = m;
        bad[[0, 0]] = Complex64::new(0.0, f64::INFINITY);
        assert!(validate_local_matrix(&bad, 4).is_err());
    }

    #[test]
    fn test_validate_limits() {
        let limits = ResourceLimits::default();
        assert!(validate_n_states(1024, &limits).is_ok());
        assert!(validate_n_states(limits.max_states + 1, &limits).is_err());
        assert!(validate_dense_dim(1024, &limits).is_ok());
        assert!(matches!(
            validate_dense_dim(1 << 20, &limits),
            Err(Error::Validation(ValidationError::ResourceLimit { .. }))
        ));
    }

    #[test]
    fn test_validate_density_matrix() {
        let mut rho = Array2::<Complex64>::zeros((2, 2));
        rho[[0, 0]] = Complex64::new(1.0, 0.0);
        assert!(validate_density_matrix(&rho, 2, 1e-10).is_ok());
        assert!(validate_density_matrix(&rho, 4, 1e-10).is_err());

        let mut bad = rho.clone();
        bad[[0, 1]] = Complex64::new(0.3, 0.0);
        assert!(validate_density_matrix(&bad, 2, 1e-10).is_err());

        let mut bad = rho;
        bad[[1, 1]] = Complex64::new(1.0, 0.0);
        let msg = validate_density_matrix(&bad, 2, 1e-10).unwrap_err().to_string();
        assert!(msg.contains("trace"));
    }
}
