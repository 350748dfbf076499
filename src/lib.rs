// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS local operators and Lindblad superoperators
//!
//! This crate builds many-body operators from few-site matrices on discrete
//! Hilbert spaces, materializes them as sparse or dense matrices, and forms
//! the Lindblad generator of open-system dynamics on the doubled space of
//! density matrices.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │   dynamics: evolution, steady state      │
//! ├──────────────────┬──────────────────────┤
//! │  LocalOperator   │  LocalLiouvillian    │
//! │  (get_conn)      │  (doubled space)     │
//! ├──────────────────┴──────────────────────┤
//! │  hilbert: Spin, Boson, Qubit, Doubled    │
//! ├────────────────┬────────────────────────┤
//! │  sparse (CSR)  │  spectral (eigvalsh)   │
//! └────────────────┴────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`hilbert`]: Hilbert spaces and basis enumeration
//! - [`operator`]: operator trait, local operators, Liouvillian
//! - [`dynamics`]: master-equation integration and steady states
//! - [`models`]: dissipative spin-chain builders
//! - [`sparse`]: compressed sparse row matrices
//! - [`spectral`]: Hermitian eigenvalues
//! - [`config`]: Configuration management
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types

pub mod config;
pub mod dynamics;
pub mod error;
pub mod hilbert;
pub mod models;
pub mod operator;
pub mod sparse;
pub mod spectral;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use hilbert::{AbstractHilbert, HilbertRef};
pub use operator::{AbstractOperator, LocalLiouvillian, LocalOperator};
pub use sparse::SparseMatrix;

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
