// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for operator construction and evaluation.

use std::fmt;

/// Result type alias for operator-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// Hilbert space error
    Hilbert(HilbertError),
    /// Operator construction or algebra error
    Operator(OperatorError),
    /// Validation error
    Validation(ValidationError),
    /// Time evolution / steady-state solver error
    Solver(String),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Hilbert(e) => write!(f, "Hilbert space error: {}", e),
            Error::Operator(e) => write!(f, "Operator error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Solver(msg) => write!(f, "Solver error: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Hilbert(e) => Some(e),
            Error::Operator(e) => Some(e),
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<HilbertError> for Error {
    fn from(e: HilbertError) -> Self {
        Error::Hilbert(e)
    }
}

impl From<OperatorError> for Error {
    fn from(e: OperatorError) -> Self {
        Error::Operator(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(e: ndarray::ShapeError) -> Self {
        Error::Validation(ValidationError::Field {
            field: "shape".into(),
            message: e.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Hilbert space errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HilbertError {
    /// Invalid construction parameter (spin value, local states, ...)
    InvalidParameter(String),
    /// A configuration contains a value that is not a local state of its site
    UnknownLocalState { site: usize, value: f64 },
    /// A configuration has the wrong number of sites
    SizeMismatch { expected: usize, actual: usize },
    /// A basis number is not below the number of states
    NumberOutOfRange { number: usize, n_states: usize },
    /// A configuration does not satisfy the space constraint
    ConstraintViolated(String),
    /// The space is too large to be indexed
    TooLarge { n_states: u128, max_states: usize },
}

impl fmt::Display for HilbertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HilbertError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            HilbertError::UnknownLocalState { site, value } => {
                write!(f, "Value {} is not a local state of site {}", value, site)
            }
            HilbertError::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Configuration has {} sites, expected {}",
                    actual, expected
                )
            }
            HilbertError::NumberOutOfRange { number, n_states } => {
                write!(
                    f,
                    "Basis number {} out of range (n_states={})",
                    number, n_states
                )
            }
            HilbertError::ConstraintViolated(msg) => write!(f, "Constraint violated: {}", msg),
            HilbertError::TooLarge {
                n_states,
                max_states,
            } => {
                write!(
                    f,
                    "Hilbert space with {} states exceeds the indexable maximum {}",
                    n_states, max_states
                )
            }
        }
    }
}

impl std::error::Error for HilbertError {}

/// Operator errors.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorError {
    /// Operands live on different Hilbert spaces
    IncompatibleHilbert(String),
    /// A site index is outside the Hilbert space
    SiteOutOfRange { site: usize, size: usize },
    /// A site appears twice in `acting_on`
    DuplicateSite(usize),
    /// Local matrix shape does not match the local dimension of its sites
    ShapeMismatch { expected: usize, rows: usize, cols: usize },
    /// Operation is not supported for this Hilbert space
    Unsupported(String),
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorError::IncompatibleHilbert(msg) => {
                write!(f, "Incompatible Hilbert spaces: {}", msg)
            }
            OperatorError::SiteOutOfRange { site, size } => {
                write!(f, "Site {} out of range for {} sites", site, size)
            }
            OperatorError::DuplicateSite(site) => {
                write!(f, "Site {} appears more than once in acting_on", site)
            }
            OperatorError::ShapeMismatch {
                expected,
                rows,
                cols,
            } => {
                write!(
                    f,
                    "Local matrix is {} × {}, expected {} × {}",
                    rows, cols, expected, expected
                )
            }
            OperatorError::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
        }
    }
}

impl std::error::Error for OperatorError {}

/// Validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Field validation failed
    Field { field: String, message: String },
    /// Physics constraint violated
    PhysicsConstraint(String),
    /// Resource limit exceeded
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::PhysicsConstraint(msg) => {
                write!(f, "Physics constraint violated: {}", msg)
            }
            ValidationError::ResourceLimit {
                resource,
                limit,
                requested,
            } => {
                write!(
                    f,
                    "Resource limit exceeded for {}: limit={}, requested={}",
                    resource, limit, requested
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
