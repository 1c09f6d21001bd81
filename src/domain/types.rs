//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during estimation and simulation
//! - exported to JSON for the serving layer
//! - reloaded later for repeated assessments without re-estimating
//!
//! Result types serialize with camelCase field names because that is the wire
//! schema the serving layer exposes to its clients.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::RiskError;

/// Minimum simulated monthly income, in currency units.
///
/// Simulated incomes are floored here after each draw so a long run of
/// downward jumps cannot drive a trajectory to zero or below.
pub const DEFAULT_INCOME_FLOOR: f64 = 100.0;

/// One income observation from the cleaned panel.
///
/// Produced by the external panel preprocessor; read-only to the core. The
/// preprocessor guarantees at most one observation per (household, period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelObservation {
    pub household_id: String,
    /// Monotonic month index within the panel.
    pub period: u32,
    /// Monthly income, strictly positive.
    pub income: f64,
}

/// A single (period, income) point within one household's series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub period: u32,
    pub income: f64,
}

/// One household's chronological income series.
///
/// Derived from `PanelObservation`s by `estimate::group_observations`;
/// observations are sorted by period and strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdSeries {
    pub household_id: String,
    pub observations: Vec<Observation>,
}

impl HouseholdSeries {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Consecutive-month income pairs `(prev, next)`.
    ///
    /// A gap in the period index breaks the pair: only observations exactly
    /// one month apart are adjacent for dynamics estimation.
    pub fn consecutive_pairs(&self) -> Vec<(f64, f64)> {
        self.observations
            .windows(2)
            .filter(|w| w[1].period == w[0].period + 1)
            .map(|w| (w[0].income, w[1].income))
            .collect()
    }

    /// Month-over-month relative changes `(next - prev) / prev` over
    /// consecutive-month pairs.
    pub fn relative_changes(&self) -> Vec<f64> {
        self.consecutive_pairs()
            .iter()
            .map(|&(prev, next)| (next - prev) / prev)
            .collect()
    }
}

/// Which income model to estimate/simulate.
///
/// The two strategies are interchangeable behind `ModelParameters`; which one
/// is authoritative is a configuration decision, not a default baked into the
/// core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModelChoice {
    /// Mean-reverting AR(1) on log income, anchored to the household's own
    /// equilibrium level.
    MeanReversion,
    /// Compound jump process: income is sticky month to month and moves in
    /// occasional lognormally-sized jumps.
    CompoundJump,
}

/// Mean-reversion model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanReversionParams {
    /// Persistence of deviations from the household equilibrium, in (0, 1).
    pub rho: f64,
    /// Standard deviation of the monthly log-income shock, >= 0.
    pub sigma: f64,
}

/// Compound-jump model parameters.
///
/// The lognormal jump-size shape is carried in quartile form
/// (median / q25 / q75 of the relative jump magnitude); the simulator derives
/// `mu = ln(median)` and `sigma = ln(q75/q25) / 1.35` from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundJumpParams {
    /// Per-month probability that a jump occurs, in [0, 1].
    pub lambda: f64,
    /// Median relative jump magnitude, > 0.
    pub jump_median_pct: f64,
    /// 25th percentile of relative jump magnitudes.
    pub jump_q25: f64,
    /// 75th percentile of relative jump magnitudes.
    pub jump_q75: f64,
    /// Probability that a jump moves income upward, in [0, 1].
    pub up_probability: f64,
}

/// Immutable stochastic-process parameters for the income model.
///
/// Produced by the estimator or supplied by the caller; validated against
/// domain bounds before any simulation uses it. There is no module-level
/// parameter cache anywhere: this value is passed explicitly into every call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "camelCase")]
pub enum ModelParameters {
    #[serde(rename = "mean-reversion")]
    MeanReversion(MeanReversionParams),
    #[serde(rename = "compound-jump")]
    CompoundJump(CompoundJumpParams),
}

impl ModelParameters {
    pub fn choice(&self) -> ModelChoice {
        match self {
            ModelParameters::MeanReversion(_) => ModelChoice::MeanReversion,
            ModelParameters::CompoundJump(_) => ModelChoice::CompoundJump,
        }
    }

    /// Mean-reversion parameters estimated offline from the SIPP panel.
    pub fn reference_mean_reversion() -> Self {
        ModelParameters::MeanReversion(MeanReversionParams {
            rho: 0.892,
            sigma: 0.108,
        })
    }

    /// Compound-jump parameters estimated offline from the SIPP panel.
    pub fn reference_compound_jump() -> Self {
        ModelParameters::CompoundJump(CompoundJumpParams {
            lambda: 0.273,
            jump_median_pct: 0.232,
            jump_q25: 0.115,
            jump_q75: 0.545,
            up_probability: 0.5,
        })
    }

    /// Check all parameters are finite and within their domain bounds.
    pub fn validate(&self) -> Result<(), RiskError> {
        match self {
            ModelParameters::MeanReversion(p) => {
                if !p.rho.is_finite() || !(p.rho > 0.0 && p.rho < 1.0) {
                    return Err(RiskError::parameter_out_of_range(format!(
                        "Persistence rho={} outside (0, 1).",
                        p.rho
                    )));
                }
                if !p.sigma.is_finite() || p.sigma < 0.0 {
                    return Err(RiskError::parameter_out_of_range(format!(
                        "Shock std sigma={} must be finite and >= 0.",
                        p.sigma
                    )));
                }
            }
            ModelParameters::CompoundJump(p) => {
                let all_finite = p.lambda.is_finite()
                    && p.jump_median_pct.is_finite()
                    && p.jump_q25.is_finite()
                    && p.jump_q75.is_finite()
                    && p.up_probability.is_finite();
                if !all_finite {
                    return Err(RiskError::parameter_out_of_range(
                        "Compound-jump parameters must be finite.",
                    ));
                }
                if !(0.0..=1.0).contains(&p.lambda) {
                    return Err(RiskError::parameter_out_of_range(format!(
                        "Jump probability lambda={} outside [0, 1].",
                        p.lambda
                    )));
                }
                if !(0.0..=1.0).contains(&p.up_probability) {
                    return Err(RiskError::parameter_out_of_range(format!(
                        "Up probability {} outside [0, 1].",
                        p.up_probability
                    )));
                }
                if p.jump_median_pct <= 0.0 {
                    return Err(RiskError::parameter_out_of_range(format!(
                        "Median jump magnitude {} must be > 0.",
                        p.jump_median_pct
                    )));
                }
                if p.jump_q25 < 0.0 || p.jump_q75 < p.jump_q25 {
                    return Err(RiskError::parameter_out_of_range(format!(
                        "Jump quartiles (q25={}, q75={}) must satisfy 0 <= q25 <= q75.",
                        p.jump_q25, p.jump_q75
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Estimator settings.
#[derive(Debug, Clone, Copy)]
pub struct EstimatorConfig {
    /// Minimum observations for a household to enter estimation.
    pub min_months: usize,
    /// Minimum qualifying households for an estimate to be meaningful.
    pub min_households: usize,
    /// Minimum consecutive-month pairs for a per-household AR(1) fit.
    pub min_pairs: usize,
    /// Lagged-variance cutoff below which a household carries no dynamics
    /// information and is excluded from the rho pool.
    pub degenerate_variance: f64,
    /// Materiality threshold on |relative change| for jump classification.
    pub jump_threshold: f64,
    /// Upper winsorization percentile for pooled jump magnitudes.
    pub winsorize_pct: f64,
    /// Clamp an out-of-domain aggregate rho into (0, 1) instead of failing.
    /// Off by default; when it fires it is surfaced in the diagnostics.
    pub clamp_fallback: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_months: 6,
            min_households: 2,
            min_pairs: 3,
            degenerate_variance: 1e-6,
            jump_threshold: 0.01,
            winsorize_pct: 99.0,
            clamp_fallback: false,
        }
    }
}

/// Household financial inputs for a risk assessment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInputs {
    /// Starting savings balance.
    pub initial_fund: f64,
    /// Fixed monthly spending.
    pub monthly_expenses: f64,
    /// Current monthly income; also the household's equilibrium level under
    /// the mean-reversion model.
    pub initial_income: f64,
    /// Credit limit; exhaustion means the balance falls below its negative.
    pub available_credit: f64,
    /// Annual interest rate on debt, as a decimal (0.24 = 24% APR).
    pub interest_rate: f64,
    /// Simulation length in months.
    pub horizon: usize,
}

/// Monte Carlo engine settings.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Number of independent trials.
    pub trial_count: usize,
    /// How many full balance paths to retain for visualization. The retained
    /// set is the first N trials, so it is stable for a fixed seed.
    pub sample_paths: usize,
    /// Minimum simulated monthly income.
    pub income_floor: f64,
    /// Base seed; per-trial seeds are derived from (seed, trial index).
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trial_count: 10_000,
            sample_paths: 100,
            income_floor: DEFAULT_INCOME_FLOOR,
            seed: 42,
        }
    }
}

/// Per-period aggregate balance statistics across all trials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub months: Vec<usize>,
    pub mean: Vec<f64>,
    pub p5: Vec<f64>,
    pub p10: Vec<f64>,
    pub p25: Vec<f64>,
    pub p50: Vec<f64>,
    pub p75: Vec<f64>,
    pub p90: Vec<f64>,
    pub p95: Vec<f64>,
}

/// Distribution of terminal balances.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalStats {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// Cross-trial outcome statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeStatistics {
    pub terminal_stats: TerminalStats,
    /// Percentage of trials ending with a negative balance.
    pub negative_terminal_pct: f64,
    /// Percentage of trials whose balance was ever negative.
    pub ever_negative_pct: f64,
    /// Percentage of trials whose debt exceeded the available credit.
    pub credit_exhaustion_pct: f64,
    pub median_min_balance: f64,
    pub mean_min_balance: f64,
    pub median_interest_paid: f64,
    pub mean_interest_paid: f64,
    /// Median first month with a negative balance, over the trials that went
    /// negative. None when no trial did.
    pub median_months_to_negative: Option<f64>,
}

/// Time-indexed risk metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    /// Percentage of trials with balance >= 0 at each month.
    pub probability_positive_by_month: Vec<f64>,
    /// Percentage of trials with balance above the (negative) credit
    /// threshold at each month.
    pub probability_above_credit_by_month: Vec<f64>,
    /// Months of expenses covered by initial savings. None when monthly
    /// expenses are zero (the ratio would be infinite, and outputs must stay
    /// finite).
    pub emergency_fund_months: Option<f64>,
    pub monthly_net_income: f64,
}

/// Inputs echoed back with the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub n_simulations: usize,
    pub n_months: usize,
    pub n_sample_paths: usize,
    pub initial_fund: f64,
    pub monthly_expenses: f64,
    pub initial_income: f64,
    pub available_credit: f64,
    pub interest_rate: f64,
    pub seed: u64,
}

/// Full output of one risk-engine invocation.
///
/// Immutable after construction; owned by the caller for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// First-N full balance paths, one Vec per trial (horizon + 1 values).
    pub sample_paths: Vec<Vec<f64>>,
    /// Terminal balance of every trial, in trial order.
    pub terminal_values: Vec<f64>,
    pub aggregate_stats: AggregateStats,
    pub statistics: OutcomeStatistics,
    pub risk_metrics: RiskMetrics,
    pub metadata: RunMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn series(incomes_with_periods: &[(u32, f64)]) -> HouseholdSeries {
        HouseholdSeries {
            household_id: "H1".to_string(),
            observations: incomes_with_periods
                .iter()
                .map(|&(period, income)| Observation { period, income })
                .collect(),
        }
    }

    #[test]
    fn consecutive_pairs_break_on_period_gaps() {
        let s = series(&[(1, 100.0), (2, 110.0), (4, 120.0), (5, 130.0)]);
        let pairs = s.consecutive_pairs();
        assert_eq!(pairs, vec![(100.0, 110.0), (120.0, 130.0)]);
    }

    #[test]
    fn relative_changes_skip_gaps() {
        let s = series(&[(1, 100.0), (2, 150.0), (7, 200.0), (8, 100.0)]);
        let changes = s.relative_changes();
        assert_eq!(changes.len(), 2);
        assert!((changes[0] - 0.5).abs() < 1e-12);
        assert!((changes[1] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn mean_reversion_domain_bounds() {
        let ok = ModelParameters::MeanReversion(MeanReversionParams {
            rho: 0.892,
            sigma: 0.108,
        });
        assert!(ok.validate().is_ok());

        for rho in [0.0, 1.0, 1.2, -0.1, f64::NAN] {
            let bad = ModelParameters::MeanReversion(MeanReversionParams { rho, sigma: 0.1 });
            let err = bad.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ParameterOutOfRange, "rho={rho}");
        }

        let bad_sigma =
            ModelParameters::MeanReversion(MeanReversionParams { rho: 0.5, sigma: -0.1 });
        assert!(bad_sigma.validate().is_err());
    }

    #[test]
    fn compound_jump_domain_bounds() {
        assert!(ModelParameters::reference_compound_jump().validate().is_ok());

        let mut p = match ModelParameters::reference_compound_jump() {
            ModelParameters::CompoundJump(p) => p,
            _ => unreachable!(),
        };
        p.lambda = 1.5;
        assert!(ModelParameters::CompoundJump(p).validate().is_err());

        p.lambda = 0.2;
        p.jump_q75 = p.jump_q25 - 0.01;
        assert!(ModelParameters::CompoundJump(p).validate().is_err());
    }

    #[test]
    fn parameters_round_trip_through_json() {
        let params = ModelParameters::reference_compound_jump();
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"model\":\"compound-jump\""));
        let back: ModelParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);

        let params = ModelParameters::reference_mean_reversion();
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"model\":\"mean-reversion\""));
        let back: ModelParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
