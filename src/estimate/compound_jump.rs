//! Compound-jump estimation.
//!
//! Income under this model is sticky: most months it does not move, and when
//! it does it moves in a discrete jump. We classify a month-over-month
//! relative change as a jump when its magnitude clears a small materiality
//! threshold, estimate the jump rate per household, and pool jump magnitudes
//! across households for the size distribution.

use crate::domain::{CompoundJumpParams, EstimatorConfig, HouseholdSeries, ModelParameters};
use crate::error::RiskError;
use crate::estimate::{Estimate, EstimateDiagnostics};
use crate::math;

pub(crate) fn estimate(
    panel: &[HouseholdSeries],
    config: &EstimatorConfig,
) -> Result<Estimate, RiskError> {
    let mut diagnostics = EstimateDiagnostics {
        households_total: panel.len(),
        ..EstimateDiagnostics::default()
    };

    let mut lambdas: Vec<f64> = Vec::new();
    let mut magnitudes: Vec<f64> = Vec::new();
    let mut upward = 0usize;

    for series in panel {
        if series.len() < config.min_months {
            diagnostics.skipped_short += 1;
            continue;
        }
        let changes = series.relative_changes();
        if changes.is_empty() {
            // Enough months on paper, but period gaps left no adjacent pairs.
            diagnostics.skipped_short += 1;
            continue;
        }

        let mut jumps = 0usize;
        for &change in &changes {
            if change.abs() > config.jump_threshold {
                jumps += 1;
                magnitudes.push(change.abs());
                if change > 0.0 {
                    upward += 1;
                }
            }
        }
        lambdas.push(jumps as f64 / changes.len() as f64);
    }
    diagnostics.households_used = lambdas.len();

    if lambdas.len() < config.min_households {
        return Err(RiskError::insufficient_data(format!(
            "Only {} household(s) qualify for jump estimation (need {}).",
            lambdas.len(),
            config.min_households
        )));
    }

    // Zero observed jumps would mean lambda = 0: a degenerate, non-stochastic
    // simulator. Refuse rather than return it.
    if magnitudes.is_empty() {
        return Err(RiskError::insufficient_data(
            "No income jumps observed in the panel; cannot fit a jump-size distribution.",
        ));
    }
    diagnostics.jumps_pooled = magnitudes.len();

    let lambda = math::median(&lambdas).expect("non-empty lambda pool");

    // Cap the extreme tail rather than discarding it, then fit the lognormal
    // shape from robust quantiles.
    let capped = math::winsorize_upper(&magnitudes, config.winsorize_pct);
    let jump_median_pct = math::median(&capped).expect("non-empty jump pool");
    let jump_q25 = math::percentile(&capped, 25.0).expect("non-empty jump pool");
    let jump_q75 = math::percentile(&capped, 75.0).expect("non-empty jump pool");
    let up_probability = upward as f64 / magnitudes.len() as f64;

    let params = ModelParameters::CompoundJump(CompoundJumpParams {
        lambda,
        jump_median_pct,
        jump_q25,
        jump_q75,
        up_probability,
    });
    params.validate()?;

    Ok(Estimate {
        params,
        diagnostics,
    })
}
