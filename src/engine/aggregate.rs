//! Cross-trial aggregation of simulated financial paths.

use crate::domain::{
    AggregateResult, AggregateStats, EngineConfig, FinancialInputs, OutcomeStatistics,
    RiskMetrics, RunMetadata, TerminalStats,
};
use crate::engine::TrialOutcome;
use crate::error::RiskError;
use crate::math;

const BAND_QS: [f64; 7] = [5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0];

pub(crate) fn build(
    inputs: &FinancialInputs,
    config: &EngineConfig,
    outcomes: &[TrialOutcome],
) -> Result<AggregateResult, RiskError> {
    let n = outcomes.len();
    let n_f = n as f64;
    let periods = inputs.horizon + 1;

    let mut stats = AggregateStats {
        months: (0..periods).collect(),
        mean: Vec::with_capacity(periods),
        p5: Vec::with_capacity(periods),
        p10: Vec::with_capacity(periods),
        p25: Vec::with_capacity(periods),
        p50: Vec::with_capacity(periods),
        p75: Vec::with_capacity(periods),
        p90: Vec::with_capacity(periods),
        p95: Vec::with_capacity(periods),
    };
    let mut probability_positive = Vec::with_capacity(periods);
    let mut probability_above_credit = Vec::with_capacity(periods);

    // Sort each period's cross-section once, then read the whole band off it.
    let mut column = vec![0.0f64; n];
    for t in 0..periods {
        for (slot, outcome) in column.iter_mut().zip(outcomes) {
            *slot = outcome.balances[t];
        }
        let positive = column.iter().filter(|&&b| b >= 0.0).count();
        let above_credit = column
            .iter()
            .filter(|&&b| b >= -inputs.available_credit)
            .count();
        probability_positive.push(100.0 * positive as f64 / n_f);
        probability_above_credit.push(100.0 * above_credit as f64 / n_f);

        stats
            .mean
            .push(math::mean(&column).ok_or_else(empty_pool_fault)?);
        let sorted = math::sorted(&column);
        let band: Vec<f64> = BAND_QS
            .iter()
            .map(|&q| math::percentile_of_sorted(&sorted, q).ok_or_else(empty_pool_fault))
            .collect::<Result<_, _>>()?;
        stats.p5.push(band[0]);
        stats.p10.push(band[1]);
        stats.p25.push(band[2]);
        stats.p50.push(band[3]);
        stats.p75.push(band[4]);
        stats.p90.push(band[5]);
        stats.p95.push(band[6]);
    }

    let terminal_values: Vec<f64> = outcomes
        .iter()
        .map(|o| *o.balances.last().unwrap_or(&inputs.initial_fund))
        .collect();
    let terminal_stats = terminal_stats(&terminal_values)?;

    let negative_terminal = terminal_values.iter().filter(|&&v| v < 0.0).count();
    let ever_negative = outcomes.iter().filter(|o| o.first_negative.is_some()).count();
    let exhausted = outcomes.iter().filter(|o| o.credit_exhausted).count();

    let min_balances: Vec<f64> = outcomes.iter().map(|o| o.min_balance).collect();
    let interest: Vec<f64> = outcomes.iter().map(|o| o.interest_paid).collect();

    let months_to_negative: Vec<f64> = outcomes
        .iter()
        .filter_map(|o| o.first_negative.map(|t| t as f64))
        .collect();
    let median_months_to_negative = math::median(&months_to_negative);

    let statistics = OutcomeStatistics {
        terminal_stats,
        negative_terminal_pct: 100.0 * negative_terminal as f64 / n_f,
        ever_negative_pct: 100.0 * ever_negative as f64 / n_f,
        credit_exhaustion_pct: 100.0 * exhausted as f64 / n_f,
        median_min_balance: math::median(&min_balances).ok_or_else(empty_pool_fault)?,
        mean_min_balance: math::mean(&min_balances).ok_or_else(empty_pool_fault)?,
        median_interest_paid: math::median(&interest).ok_or_else(empty_pool_fault)?,
        mean_interest_paid: math::mean(&interest).ok_or_else(empty_pool_fault)?,
        median_months_to_negative,
    };

    let emergency_fund_months = if inputs.monthly_expenses > 0.0 {
        Some(inputs.initial_fund / inputs.monthly_expenses)
    } else {
        None
    };
    let risk_metrics = RiskMetrics {
        probability_positive_by_month: probability_positive,
        probability_above_credit_by_month: probability_above_credit,
        emergency_fund_months,
        monthly_net_income: inputs.initial_income - inputs.monthly_expenses,
    };

    let sample_paths: Vec<Vec<f64>> = outcomes
        .iter()
        .take(config.sample_paths)
        .map(|o| o.balances.clone())
        .collect();

    let result = AggregateResult {
        sample_paths,
        terminal_values,
        aggregate_stats: stats,
        statistics,
        risk_metrics,
        metadata: RunMetadata {
            n_simulations: n,
            n_months: inputs.horizon,
            n_sample_paths: config.sample_paths.min(n),
            initial_fund: inputs.initial_fund,
            monthly_expenses: inputs.monthly_expenses,
            initial_income: inputs.initial_income,
            available_credit: inputs.available_credit,
            interest_rate: inputs.interest_rate,
            seed: config.seed,
        },
    };
    check_finite(&result)?;
    Ok(result)
}

fn terminal_stats(terminal_values: &[f64]) -> Result<TerminalStats, RiskError> {
    let sorted = math::sorted(terminal_values);
    let pct = |q: f64| math::percentile_of_sorted(&sorted, q).ok_or_else(empty_pool_fault);
    Ok(TerminalStats {
        mean: math::mean(terminal_values).ok_or_else(empty_pool_fault)?,
        median: pct(50.0)?,
        std: math::std_dev(terminal_values).ok_or_else(empty_pool_fault)?,
        p5: pct(5.0)?,
        p10: pct(10.0)?,
        p25: pct(25.0)?,
        p50: pct(50.0)?,
        p75: pct(75.0)?,
        p90: pct(90.0)?,
        p95: pct(95.0)?,
    })
}

fn empty_pool_fault() -> RiskError {
    RiskError::numerical_fault("Aggregation over an empty trial pool.")
}

/// Every numeric output field must be finite; anything else is an internal
/// fault, never silently serialized as NaN.
fn check_finite(result: &AggregateResult) -> Result<(), RiskError> {
    let scalar_pool = scalar_outputs(result);
    let vecs: [&[f64]; 12] = [
        &result.terminal_values,
        &result.aggregate_stats.mean,
        &result.aggregate_stats.p5,
        &result.aggregate_stats.p10,
        &result.aggregate_stats.p25,
        &result.aggregate_stats.p50,
        &result.aggregate_stats.p75,
        &result.aggregate_stats.p90,
        &result.aggregate_stats.p95,
        &result.risk_metrics.probability_positive_by_month,
        &result.risk_metrics.probability_above_credit_by_month,
        &scalar_pool,
    ];
    for values in vecs {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(RiskError::numerical_fault(
                "Non-finite value in aggregated results.",
            ));
        }
    }
    for path in &result.sample_paths {
        if path.iter().any(|v| !v.is_finite()) {
            return Err(RiskError::numerical_fault(
                "Non-finite value in a retained sample path.",
            ));
        }
    }
    Ok(())
}

/// Every scalar numeric output, flattened for the finiteness scan.
fn scalar_outputs(result: &AggregateResult) -> Vec<f64> {
    let s = &result.statistics;
    let t = &s.terminal_stats;
    let mut out = vec![
        t.mean,
        t.median,
        t.std,
        t.p5,
        t.p10,
        t.p25,
        t.p50,
        t.p75,
        t.p90,
        t.p95,
        s.negative_terminal_pct,
        s.ever_negative_pct,
        s.credit_exhaustion_pct,
        s.median_min_balance,
        s.mean_min_balance,
        s.median_interest_paid,
        s.mean_interest_paid,
        result.risk_metrics.monthly_net_income,
    ];
    if let Some(m) = s.median_months_to_negative {
        out.push(m);
    }
    if let Some(m) = result.risk_metrics.emergency_fund_months {
        out.push(m);
    }
    out
}
