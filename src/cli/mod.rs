//! Command-line parsing for the household solvency simulator.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the estimation/simulation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ModelChoice;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "solvency",
    version,
    about = "Household income volatility estimation and cash-balance risk simulation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate income-model parameters from a cleaned panel CSV.
    Estimate(EstimateArgs),
    /// Run a Monte Carlo cash-balance risk assessment.
    Assess(AssessArgs),
    /// Compare observed panel volatility against model-simulated trajectories.
    Validate(ValidateArgs),
}

/// Options shared by every command that reads or synthesizes a panel.
#[derive(Debug, Parser, Clone)]
pub struct PanelArgs {
    /// Cleaned panel CSV with household_id, period, income columns.
    /// When omitted, a synthetic panel is generated from reference parameters.
    #[arg(long, value_name = "CSV")]
    pub panel: Option<PathBuf>,

    /// Households in the synthetic panel (when no CSV is given).
    #[arg(long, default_value_t = 200)]
    pub synthetic_households: usize,

    /// Months per household in the synthetic panel.
    #[arg(long, default_value_t = 24)]
    pub synthetic_months: usize,
}

/// Options for the parameter estimator.
#[derive(Debug, Parser, Clone)]
pub struct EstimatorArgs {
    /// Which income model to estimate.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelChoice::CompoundJump)]
    pub model: ModelChoice,

    /// Minimum months of data for a household to enter estimation.
    #[arg(long, default_value_t = 6)]
    pub min_months: usize,

    /// Minimum qualifying households for an estimate.
    #[arg(long, default_value_t = 2)]
    pub min_households: usize,

    /// Materiality threshold on |relative change| for jump classification.
    #[arg(long, default_value_t = 0.01)]
    pub jump_threshold: f64,

    /// Clamp an out-of-domain persistence estimate into (0, 1) instead of
    /// failing (mean-reversion only).
    #[arg(long)]
    pub clamp: bool,
}

/// `solvency estimate` options.
#[derive(Debug, Parser)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub panel: PanelArgs,

    #[command(flatten)]
    pub estimator: EstimatorArgs,

    /// Random seed (synthetic panel generation).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Export fitted parameters to JSON.
    #[arg(long = "export-params", value_name = "JSON")]
    pub export_params: Option<PathBuf>,
}

/// `solvency assess` options.
#[derive(Debug, Parser)]
pub struct AssessArgs {
    /// Starting savings balance.
    #[arg(long, default_value_t = 10_000.0)]
    pub fund: f64,

    /// Fixed monthly expenses.
    #[arg(long, default_value_t = 3_000.0)]
    pub expenses: f64,

    /// Current monthly income.
    #[arg(long, default_value_t = 5_000.0)]
    pub income: f64,

    /// Available credit beyond a zero balance.
    #[arg(long, default_value_t = 5_000.0)]
    pub credit: f64,

    /// Annual interest rate on debt, as a decimal.
    #[arg(long, default_value_t = 0.24)]
    pub rate: f64,

    /// Simulation horizon in months.
    #[arg(long, default_value_t = 24)]
    pub horizon: usize,

    /// Number of Monte Carlo trials.
    #[arg(long, default_value_t = 10_000)]
    pub trials: usize,

    /// Full balance paths to retain in the result.
    #[arg(long, default_value_t = 100)]
    pub sample_paths: usize,

    /// Base random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Previously fitted parameters JSON. Takes precedence over --panel.
    #[arg(long, value_name = "JSON")]
    pub params: Option<PathBuf>,

    /// Cleaned panel CSV to estimate parameters from. When neither --params
    /// nor --panel is given, reference parameters for the chosen model are
    /// used.
    #[arg(long, value_name = "CSV")]
    pub panel: Option<PathBuf>,

    #[command(flatten)]
    pub estimator: EstimatorArgs,

    /// Export the full assessment result to JSON.
    #[arg(long = "export", value_name = "JSON")]
    pub export: Option<PathBuf>,
}

/// `solvency validate` options.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub panel: PanelArgs,

    #[command(flatten)]
    pub estimator: EstimatorArgs,

    /// Previously fitted parameters JSON. Takes precedence over estimation.
    #[arg(long, value_name = "JSON")]
    pub params: Option<PathBuf>,

    /// Simulated trajectories on the comparison side.
    #[arg(long, default_value_t = 200)]
    pub trajectories: usize,

    /// Months per simulated trajectory.
    #[arg(long, default_value_t = 24)]
    pub months: usize,

    /// Base random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Export the comparison report to JSON.
    #[arg(long = "export", value_name = "JSON")]
    pub export: Option<PathBuf>,
}
