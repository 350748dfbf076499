// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the operator engine.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. config.yaml file
//! 3. Environment variables (QUBITOS_OP_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::hilbert::MAX_STATES;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Resource limits for matrix materialization
    #[serde(default)]
    pub limits: ResourceLimits,

    /// Time evolution and steady-state solver settings
    #[serde(default)]
    pub solver: SolverConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &["config.yaml", "config.yml", "/etc/qubitos/operator.yaml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("QUBITOS_OP_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QUBITOS_OP_LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("QUBITOS_OP_MAX_STATES") {
            if let Ok(n) = val.parse() {
                self.limits.max_states = n;
            }
        }
        if let Ok(val) = env::var("QUBITOS_OP_MAX_DENSE_DIM") {
            if let Ok(n) = val.parse() {
                self.limits.max_dense_dim = n;
            }
        }
        if let Ok(val) = env::var("QUBITOS_OP_PARALLEL_THRESHOLD") {
            if let Ok(n) = val.parse() {
                self.limits.parallel_threshold = n;
            }
        }
        if let Ok(val) = env::var("QUBITOS_OP_SOLVER_DT") {
            if let Ok(dt) = val.parse() {
                self.solver.dt = dt;
            }
        }
        if let Ok(val) = env::var("QUBITOS_OP_SOLVER_MAX_STEPS") {
            if let Ok(n) = val.parse() {
                self.solver.max_steps = n;
            }
        }
        if let Ok(val) = env::var("QUBITOS_OP_SOLVER_TOLERANCE") {
            if let Ok(tol) = val.parse() {
                self.solver.tolerance = tol;
            }
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_states == 0 {
            return Err(Error::Config("max_states cannot be 0".into()));
        }
        if self.limits.max_states > MAX_STATES {
            return Err(Error::Config(format!(
                "max_states {} exceeds the indexable maximum {}",
                self.limits.max_states, MAX_STATES
            )));
        }
        if self.limits.max_dense_dim == 0 {
            return Err(Error::Config("max_dense_dim cannot be 0".into()));
        }
        self.solver.validate()?;
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(Error::Config(format!(
                "Unknown log format '{}' (expected json or pretty)",
                self.logging.format
            )));
        }
        if self.limits.max_dense_dim > 8192 {
            tracing::warn!(
                max_dense_dim = self.limits.max_dense_dim,
                "Dense materialization above 8192 × 8192 needs more than 1 GiB per matrix"
            );
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Resource limits for matrix materialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum number of basis states an operator may be materialized over
    #[serde(default = "default_max_states")]
    pub max_states: usize,

    /// Maximum dimension of a dense matrix
    #[serde(default = "default_max_dense_dim")]
    pub max_dense_dim: usize,

    /// Number of rows above which sparse assembly runs on the rayon pool
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_states: default_max_states(),
            max_dense_dim: default_max_dense_dim(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

fn default_max_states() -> usize {
    1 << 24
}

fn default_max_dense_dim() -> usize {
    4096
}

fn default_parallel_threshold() -> usize {
    4096
}

/// Settings for RK4 relaxation towards the steady state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Integration time step
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Maximum number of RK4 steps
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Convergence threshold on ‖L vec(ρ)‖² / ‖vec(ρ)‖²
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Residual is evaluated every `check_every` steps
    #[serde(default = "default_check_every")]
    pub check_every: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            max_steps: default_max_steps(),
            tolerance: default_tolerance(),
            check_every: default_check_every(),
        }
    }
}

impl SolverConfig {
    /// Validate solver parameters.
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(Error::Config(format!("solver dt must be > 0, got {}", self.dt)));
        }
        if self.max_steps == 0 {
            return Err(Error::Config("solver max_steps must be > 0".into()));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::Config(format!(
                "solver tolerance must be > 0, got {}",
                self.tolerance
            )));
        }
        if self.check_every == 0 {
            return Err(Error::Config("solver check_every must be > 0".into()));
        }
        Ok(())
    }
}

fn default_dt() -> f64 {
    0.02
}

fn default_max_steps() -> usize {
    200_000
}

fn default_tolerance() -> f64 {
    1e-12
}

fn default_check_every() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.limits.max_dense_dim, 4096);
        assert_eq!(config.solver.check_every, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad = Config::default();
        bad.limits.max_states = 0;
        assert!(bad.validate().is_err());

        let mut bad = Config::default();
        bad.solver.dt = -1.0;
        let msg = bad.validate().unwrap_err().to_string();
        assert!(msg.contains("dt"));

        let mut bad = Config::default();
        bad.logging.format = "xml".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_max_states_above_index_limit_rejected() {
        let mut config = Config::default();
        config.limits.max_states = MAX_STATES + 1;
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("indexable maximum"));
    }

    #[test]
    fn test_config_load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
limits:
  max_dense_dim: 256
solver:
  dt: 0.01
  tolerance: 1.0e-10
"#
        )
        .unwrap();

        let config = Config::load(Some(f.path())).unwrap();
        assert_eq!(config.limits.max_dense_dim, 256);
        assert_eq!(config.limits.parallel_threshold, 4096);
        assert_eq!(config.solver.dt, 0.01);
        assert_eq!(config.solver.tolerance, 1.0e-10);
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let path = std::path::Path::new("/tmp/does_not_exist_qubitos_operator.yaml");
        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.limits.max_dense_dim, 4096);
    }

    #[test]
    fn test_config_load_invalid_yaml() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "{{{{not: valid: yaml::::").unwrap();

        let result = Config::load(Some(f.path()));
        assert!(result.is_err());
    }

    #[test]
    fn test_env_override_limits() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_OP_MAX_STATES", "1024");
        std::env::set_var("QUBITOS_OP_PARALLEL_THRESHOLD", "not-a-number");
        config.apply_env_overrides();
        assert_eq!(config.limits.max_states, 1024);
        assert_eq!(config.limits.parallel_threshold, 4096);
        std::env::remove_var("QUBITOS_OP_MAX_STATES");
        std::env::remove_var("QUBITOS_OP_PARALLEL_THRESHOLD");
    }

    #[test]
    fn test_env_override_solver() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_OP_SOLVER_MAX_STEPS", "10");
        config.apply_env_overrides();
        assert_eq!(config.solver.max_steps, 10);
        std::env::remove_var("QUBITOS_OP_SOLVER_MAX_STEPS");
    }

    #[test]
    fn test_env_override_log_level() {
        let mut config = Config::default();
        std::env::set_var("QUBITOS_OP_LOG_LEVEL", "debug");
        config.apply_env_overrides();
        assert_eq!(config.logging.level, "debug");
        std::env::remove_var("QUBITOS_OP_LOG_LEVEL");
    }
}
