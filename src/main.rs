// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS Liouvillian tool
//!
//! Builds the dissipative transverse-field Ising chain, materializes its
//! Lindblad generator and searches its steady state.
//!
//! # Usage
//!
//! ```bash
//! # Dimensions and sparsity of the Liouvillian of a 6-site ring
//! qubit-os-liouvillian liouvillian --sites 6
//!
//! # Steady-state magnetizations as JSON
//! qubit-os-liouvillian steady-state --sites 4 --gamma 0.5 --json
//!
//! # Show effective configuration
//! qubit-os-liouvillian --config /path/to/config.yaml config
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qubit_os_operator::{
    config::Config,
    dynamics::{expectation, purity, steady_state_with},
    hilbert::{HilbertRef, Spin},
    models::{
        dissipative_ising_chain, magnetization_observables, site_magnetizations,
        IsingChainParams, SiteObservables,
    },
    AbstractOperator, LocalLiouvillian, Result, VERSION,
};

/// QubitOS Liouvillian tool
#[derive(Parser)]
#[command(name = "qubit-os-liouvillian")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Lindblad superoperators of dissipative spin chains")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the chain Liouvillian and report its size
    Liouvillian {
        #[command(flatten)]
        chain: ChainArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Relax to the steady state and report magnetizations
    SteadyState {
        #[command(flatten)]
        chain: ChainArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

/// Dissipative transverse-field Ising chain.
#[derive(Args)]
struct ChainArgs {
    /// Number of spin-1/2 sites
    #[arg(short = 'L', long, default_value_t = 4)]
    sites: usize,

    /// Transverse field h
    #[arg(long, default_value_t = 1.0)]
    field: f64,

    /// Coupling J
    #[arg(long, default_value_t = 1.0)]
    coupling: f64,

    /// Decay rate γ
    #[arg(long, default_value_t = 1.0)]
    gamma: f64,

    /// Open boundary conditions
    #[arg(long)]
    open: bool,
}

impl ChainArgs {
    fn build(&self) -> Result<(HilbertRef, LocalLiouvillian)> {
        let hilbert: HilbertRef = Arc::new(Spin::new(0.5, self.sites)?);
        let params = IsingChainParams {
            field: self.field,
            coupling: self.coupling,
            gamma: self.gamma,
            pbc: !self.open,
        };
        let model = dissipative_ising_chain(hilbert.clone(), &params)?;
        let liouvillian = LocalLiouvillian::new(model.hamiltonian, model.jump_ops)?;
        Ok((hilbert, liouvillian))
    }
}

#[derive(Serialize)]
struct LiouvillianReport {
    sites: usize,
    hilbert_dim: usize,
    liouvillian_dim: usize,
    nnz: usize,
    n_jump_ops: usize,
    hamiltonian_terms: usize,
    hamiltonian_hermitian: bool,
}

#[derive(Serialize)]
struct SteadyStateReport {
    steps: usize,
    residual: f64,
    purity: f64,
    total_sx: f64,
    total_sy: f64,
    total_sz: f64,
    sites: Vec<SiteObservables>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    // Initialize logging
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    init_logging(level, &config.logging.format);

    match cli.command {
        Commands::Liouvillian { chain, json } => {
            config.validate()?;
            let (hilbert, liouvillian) = chain.build()?;
            let sparse = liouvillian.to_sparse_with(&config.limits)?;

            let report = LiouvillianReport {
                sites: hilbert.size(),
                hilbert_dim: hilbert.n_states()?,
                liouvillian_dim: sparse.nrows(),
                nnz: sparse.nnz(),
                n_jump_ops: liouvillian.jump_ops().len(),
                hamiltonian_terms: liouvillian.hamiltonian().n_operators(),
                hamiltonian_hermitian: liouvillian.hamiltonian().is_hermitian()?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Sites:              {}", report.sites);
                println!("Hilbert dimension:  {}", report.hilbert_dim);
                println!("Liouvillian:        {0} × {0}", report.liouvillian_dim);
                println!("Non-zeros:          {}", report.nnz);
                println!("Jump operators:     {}", report.n_jump_ops);
                println!(
                    "Hamiltonian terms:  {} (Hermitian: {})",
                    report.hamiltonian_terms, report.hamiltonian_hermitian
                );
            }
        }

        Commands::SteadyState { chain, json } => {
            config.validate()?;
            let (hilbert, liouvillian) = chain.build()?;
            let ss = steady_state_with(&liouvillian, &config.solver, &config.limits)?;
            let rho = &ss.density_matrix;

            let totals = magnetization_observables(hilbert.clone())?;
            let report = SteadyStateReport {
                steps: ss.steps,
                residual: ss.residual,
                purity: purity(rho),
                total_sx: expectation(&totals.x, rho)?.re,
                total_sy: expectation(&totals.y, rho)?.re,
                total_sz: expectation(&totals.z, rho)?.re,
                sites: site_magnetizations(hilbert, rho)?,
            };
            info!(steps = report.steps, residual = report.residual, "Steady state found");

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Converged in {} steps (residual {:.3e}), purity {:.6}",
                    report.steps, report.residual, report.purity
                );
                println!("{:>4}  {:>10}  {:>10}  {:>10}", "site", "<σx>", "<σy>", "<σz>");
                for obs in &report.sites {
                    println!(
                        "{:>4}  {:>10.6}  {:>10.6}  {:>10.6}",
                        obs.site, obs.sx, obs.sy, obs.sz
                    );
                }
                println!(
                    "{:>4}  {:>10.6}  {:>10.6}  {:>10.6}",
                    "Σ", report.total_sx, report.total_sy, report.total_sz
                );
            }
        }

        Commands::Config => {
            // Show effective configuration
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate => {
            // Validate configuration
            match config.validate() {
                Ok(()) => {
                    println!("Configuration is valid");
                }
                Err(e) => {
                    eprintln!("Configuration error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Initialize logging with tracing, on stderr so reports stay parseable.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
