//! Parameter estimation from longitudinal panel data.
//!
//! The estimation strategy is deliberately robust and within-household:
//!
//! - every household is fit on its own demeaned series, so cross-sectional
//!   level differences never masquerade as time-series volatility
//! - population estimates are medians of per-household estimates, so a single
//!   heavy-tailed household cannot dominate
//!
//! Estimation is a one-shot, synchronous computation over read-only
//! partitions of the panel; there is no shared mutable accumulator.

mod compound_jump;
mod mean_reversion;
mod panel;

pub use panel::group_observations;

use crate::domain::{EstimatorConfig, HouseholdSeries, ModelChoice, ModelParameters};
use crate::error::RiskError;

/// Counts describing what the estimator saw and kept.
///
/// Returned alongside the parameters so the front-end can report data
/// coverage; the core itself never prints.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimateDiagnostics {
    pub households_total: usize,
    pub households_used: usize,
    /// Below the minimum-months threshold, or no consecutive-month pairs.
    pub skipped_short: usize,
    /// Lagged variance too small to carry dynamics information.
    pub skipped_degenerate: usize,
    /// Jump observations pooled across households (compound-jump only).
    pub jumps_pooled: usize,
    /// Whether the explicit out-of-domain clamp fallback fired.
    pub clamped: bool,
}

/// Estimated parameters plus coverage diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Estimate {
    pub params: ModelParameters,
    pub diagnostics: EstimateDiagnostics,
}

/// Estimate income-model parameters from grouped household series.
///
/// Fails with `InsufficientData` when fewer than
/// `config.min_households` households qualify, or (compound-jump) when the
/// panel contains no jumps at all.
pub fn estimate_parameters(
    panel: &[HouseholdSeries],
    model: ModelChoice,
    config: &EstimatorConfig,
) -> Result<Estimate, RiskError> {
    match model {
        ModelChoice::MeanReversion => mean_reversion::estimate(panel, config),
        ModelChoice::CompoundJump => compound_jump::estimate(panel, config),
    }
}
