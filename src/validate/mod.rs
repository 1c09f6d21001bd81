//! Observed-vs-simulated validation statistics.
//!
//! Diagnostic, not load-bearing: this module never fails an assessment. A
//! metric that cannot be computed on one side (too little data, no nonzero
//! changes) is simply absent from the report and rendered as unavailable.
//!
//! The comparison is median-vs-median over per-series statistics: compute
//! each statistic once per household (or per simulated trajectory), then
//! summarize the cross-section. Pooling all months first would let long
//! series dominate.

use serde::{Deserialize, Serialize};

use crate::domain::HouseholdSeries;
use crate::math;

/// Volatility statistics of a single income series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStats {
    /// Coefficient of variation: std / mean of income levels.
    pub cv: f64,
    /// Fraction of month-over-month changes exceeding the jump threshold.
    pub jump_frequency: f64,
    /// Fraction of changes that are exactly zero (sticky income).
    pub frac_zero_change: f64,
    /// Mean |relative change| over the nonzero changes, when any exist.
    pub mean_nonzero_pct_change: Option<f64>,
}

impl SeriesStats {
    /// Stats for one panel household. Period gaps break change pairs, the
    /// same convention estimation uses. None when the series is too short
    /// or has no usable change pairs.
    pub fn from_series(series: &HouseholdSeries, jump_threshold: f64) -> Option<Self> {
        let incomes: Vec<f64> = series.observations.iter().map(|o| o.income).collect();
        let changes = series.relative_changes();
        Self::build(&incomes, &changes, jump_threshold)
    }

    /// Stats for one simulated trajectory, where every value is one month
    /// apart by construction.
    pub fn from_trajectory(trajectory: &[f64], jump_threshold: f64) -> Option<Self> {
        let changes: Vec<f64> = trajectory
            .windows(2)
            .filter(|w| w[0] > 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();
        Self::build(trajectory, &changes, jump_threshold)
    }

    fn build(incomes: &[f64], changes: &[f64], jump_threshold: f64) -> Option<Self> {
        if incomes.len() < 2 || changes.is_empty() {
            return None;
        }
        let mean = math::mean(incomes)?;
        if mean <= 0.0 {
            return None;
        }
        let cv = math::std_dev(incomes)? / mean;

        let n = changes.len() as f64;
        let jumps = changes.iter().filter(|c| c.abs() > jump_threshold).count();
        let zeros = changes.iter().filter(|&&c| c == 0.0).count();
        let nonzero: Vec<f64> = changes
            .iter()
            .filter(|&&c| c != 0.0)
            .map(|c| c.abs())
            .collect();

        Some(SeriesStats {
            cv,
            jump_frequency: jumps as f64 / n,
            frac_zero_change: zeros as f64 / n,
            mean_nonzero_pct_change: math::mean(&nonzero),
        })
    }
}

/// Cross-sectional summary of one statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub median: f64,
    pub mean: f64,
    pub q25: f64,
    pub q75: f64,
    pub n: usize,
}

fn summarize(values: &[f64]) -> Option<MetricSummary> {
    Some(MetricSummary {
        median: math::median(values)?,
        mean: math::mean(values)?,
        q25: math::percentile(values, 25.0)?,
        q75: math::percentile(values, 75.0)?,
        n: values.len(),
    })
}

/// One side (observed panel or simulated trajectories) of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideSummary {
    /// Series that yielded usable statistics.
    pub n_series: usize,
    pub cv: Option<MetricSummary>,
    pub jump_frequency: Option<MetricSummary>,
    pub frac_zero_change: Option<MetricSummary>,
    pub mean_nonzero_pct_change: Option<MetricSummary>,
}

impl SideSummary {
    fn from_stats(stats: &[SeriesStats]) -> Option<Self> {
        if stats.is_empty() {
            return None;
        }
        let collect = |f: fn(&SeriesStats) -> Option<f64>| -> Vec<f64> {
            stats.iter().filter_map(f).collect()
        };
        Some(SideSummary {
            n_series: stats.len(),
            cv: summarize(&collect(|s| Some(s.cv))),
            jump_frequency: summarize(&collect(|s| Some(s.jump_frequency))),
            frac_zero_change: summarize(&collect(|s| Some(s.frac_zero_change))),
            mean_nonzero_pct_change: summarize(&collect(|s| s.mean_nonzero_pct_change)),
        })
    }
}

/// Side-by-side comparison of observed and simulated income volatility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub observed: Option<SideSummary>,
    pub simulated: Option<SideSummary>,
}

/// Build the comparison report. Either side may be empty; this never fails.
pub fn compare(
    panel: &[HouseholdSeries],
    trajectories: &[Vec<f64>],
    jump_threshold: f64,
) -> ValidationReport {
    let observed: Vec<SeriesStats> = panel
        .iter()
        .filter_map(|s| SeriesStats::from_series(s, jump_threshold))
        .collect();
    let simulated: Vec<SeriesStats> = trajectories
        .iter()
        .filter_map(|t| SeriesStats::from_trajectory(t, jump_threshold))
        .collect();
    ValidationReport {
        observed: SideSummary::from_stats(&observed),
        simulated: SideSummary::from_stats(&simulated),
    }
}
