//! String formatters for estimates, assessments, and validation reports.

use crate::domain::{AggregateResult, ModelParameters};
use crate::estimate::Estimate;
use crate::validate::{MetricSummary, SideSummary, ValidationReport};

/// Format an estimation run: fitted parameters plus data coverage.
pub fn format_estimate_summary(estimate: &Estimate) -> String {
    let mut out = String::new();

    out.push_str("=== solvency - income model estimation ===\n");
    out.push_str(&format_params(&estimate.params));

    let d = &estimate.diagnostics;
    out.push_str("\nPanel coverage:\n");
    out.push_str(&format!(
        "- households: {} used / {} seen\n",
        d.households_used, d.households_total
    ));
    if d.skipped_short > 0 {
        out.push_str(&format!(
            "- skipped (too short / no usable pairs): {}\n",
            d.skipped_short
        ));
    }
    if d.skipped_degenerate > 0 {
        out.push_str(&format!(
            "- skipped (constant income): {}\n",
            d.skipped_degenerate
        ));
    }
    if d.jumps_pooled > 0 {
        out.push_str(&format!("- jumps pooled: {}\n", d.jumps_pooled));
    }
    if d.clamped {
        out.push_str("- note: aggregate persistence was clamped into (0, 1)\n");
    }

    out
}

/// Format the model parameters block.
pub fn format_params(params: &ModelParameters) -> String {
    let mut out = String::new();
    match params {
        ModelParameters::MeanReversion(p) => {
            out.push_str("Model: mean-reversion\n");
            out.push_str(&format!("- rho   : {:.4}\n", p.rho));
            out.push_str(&format!("- sigma : {:.4}\n", p.sigma));
        }
        ModelParameters::CompoundJump(p) => {
            out.push_str("Model: compound-jump\n");
            out.push_str(&format!("- lambda        : {:.4}\n", p.lambda));
            out.push_str(&format!(
                "- jump size     : median {:.1}% (q25 {:.1}%, q75 {:.1}%)\n",
                100.0 * p.jump_median_pct,
                100.0 * p.jump_q25,
                100.0 * p.jump_q75
            ));
            out.push_str(&format!("- up probability: {:.2}\n", p.up_probability));
        }
    }
    out
}

/// Format a full risk assessment.
pub fn format_assessment(result: &AggregateResult) -> String {
    let mut out = String::new();
    let m = &result.metadata;
    let s = &result.statistics;
    let r = &result.risk_metrics;

    out.push_str("=== solvency - household risk assessment ===\n");
    out.push_str(&format!(
        "Inputs: fund={} | income={}/mo | expenses={}/mo | credit={} | APR={:.1}%\n",
        fmt_money(m.initial_fund),
        fmt_money(m.initial_income),
        fmt_money(m.monthly_expenses),
        fmt_money(m.available_credit),
        100.0 * m.interest_rate
    ));
    out.push_str(&format!(
        "Run: {} trials x {} months | seed={}\n",
        m.n_simulations, m.n_months, m.seed
    ));
    out.push_str(&format!(
        "Net income: {}/mo",
        fmt_money(r.monthly_net_income)
    ));
    match r.emergency_fund_months {
        Some(months) => out.push_str(&format!(" | emergency fund: {months:.1} months\n")),
        None => out.push('\n'),
    }

    out.push_str("\nRisk summary:\n");
    out.push_str(&format!(
        "- ever negative      : {:>5.1}%\n",
        s.ever_negative_pct
    ));
    out.push_str(&format!(
        "- negative at end    : {:>5.1}%\n",
        s.negative_terminal_pct
    ));
    out.push_str(&format!(
        "- credit exhausted   : {:>5.1}%\n",
        s.credit_exhaustion_pct
    ));
    match s.median_months_to_negative {
        Some(months) => out.push_str(&format!("- median time to red : {months:.0} months\n")),
        None => out.push_str("- median time to red : never\n"),
    }
    out.push_str(&format!(
        "- median interest    : {}\n",
        fmt_money(s.median_interest_paid)
    ));
    out.push_str(&format!(
        "- median worst point : {}\n",
        fmt_money(s.median_min_balance)
    ));

    let t = &s.terminal_stats;
    out.push_str(&format!("\nTerminal balance after {} months:\n", m.n_months));
    out.push_str(&format!(
        "- median {} | mean {} | std {}\n",
        fmt_money(t.median),
        fmt_money(t.mean),
        fmt_money(t.std)
    ));
    out.push_str(&format!(
        "- p5  {} | p25 {} | p75 {} | p95 {}\n",
        fmt_money(t.p5),
        fmt_money(t.p25),
        fmt_money(t.p75),
        fmt_money(t.p95)
    ));

    out.push_str("\nBalance band by month (p5 / p50 / p95, pos%):\n");
    out.push_str(&format_band_table(result));

    out
}

fn format_band_table(result: &AggregateResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>6} {:>14} {:>14} {:>14} {:>7}\n",
        "month", "p5", "p50", "p95", "pos%"
    ));

    let stats = &result.aggregate_stats;
    let survival = &result.risk_metrics.probability_positive_by_month;
    let n = stats.months.len();
    // Quarterly rows keep long horizons readable; always include the end.
    let step = if n > 25 { 3 } else { 1 };
    let mut t = 0;
    while t < n {
        out.push_str(&format_band_row(stats, survival, t));
        t += step;
    }
    if (n - 1) % step != 0 {
        out.push_str(&format_band_row(stats, survival, n - 1));
    }
    out
}

fn format_band_row(
    stats: &crate::domain::AggregateStats,
    survival: &[f64],
    t: usize,
) -> String {
    format!(
        "{:>6} {:>14} {:>14} {:>14} {:>6.1}%\n",
        stats.months[t],
        fmt_money(stats.p5[t]),
        fmt_money(stats.p50[t]),
        fmt_money(stats.p95[t]),
        survival[t]
    )
}

/// Format the observed-vs-simulated comparison, median vs median.
pub fn format_validation(report: &ValidationReport) -> String {
    let mut out = String::new();

    out.push_str("=== solvency - income volatility validation ===\n");
    match (&report.observed, &report.simulated) {
        (Some(obs), Some(sim)) => {
            out.push_str(&format!(
                "Series: {} observed | {} simulated\n\n",
                obs.n_series, sim.n_series
            ));
            out.push_str(&format!(
                "{:<28} {:>12} {:>12}\n",
                "metric (median)", "observed", "simulated"
            ));
            out.push_str(&format_metric_row("cv", &obs.cv, &sim.cv));
            out.push_str(&format_metric_row(
                "jump frequency",
                &obs.jump_frequency,
                &sim.jump_frequency,
            ));
            out.push_str(&format_metric_row(
                "frac zero change",
                &obs.frac_zero_change,
                &sim.frac_zero_change,
            ));
            out.push_str(&format_metric_row(
                "mean nonzero |change|",
                &obs.mean_nonzero_pct_change,
                &sim.mean_nonzero_pct_change,
            ));
        }
        (observed, simulated) => {
            out.push_str(&format!(
                "observed : {}\n",
                side_label(observed)
            ));
            out.push_str(&format!(
                "simulated: {}\n",
                side_label(simulated)
            ));
        }
    }
    out
}

fn side_label(side: &Option<SideSummary>) -> String {
    match side {
        Some(s) => format!("{} series", s.n_series),
        None => "unavailable".to_string(),
    }
}

fn format_metric_row(
    name: &str,
    observed: &Option<MetricSummary>,
    simulated: &Option<MetricSummary>,
) -> String {
    let cell = |m: &Option<MetricSummary>| match m {
        Some(m) => format!("{:.4}", m.median),
        None => "unavailable".to_string(),
    };
    format!(
        "{:<28} {:>12} {:>12}\n",
        name,
        cell(observed),
        cell(simulated)
    )
}

fn fmt_money(v: f64) -> String {
    format!("{v:.0}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EngineConfig, FinancialInputs};
    use crate::engine::run_risk_assessment;
    use crate::estimate::EstimateDiagnostics;
    use crate::validate::compare;

    #[test]
    fn estimate_summary_mentions_params_and_coverage() {
        let estimate = Estimate {
            params: ModelParameters::reference_compound_jump(),
            diagnostics: EstimateDiagnostics {
                households_total: 120,
                households_used: 100,
                skipped_short: 20,
                jumps_pooled: 430,
                ..EstimateDiagnostics::default()
            },
        };
        let text = format_estimate_summary(&estimate);
        assert!(text.contains("compound-jump"));
        assert!(text.contains("lambda"));
        assert!(text.contains("100 used / 120 seen"));
        assert!(text.contains("jumps pooled: 430"));
        assert!(!text.contains("clamped"));
    }

    #[test]
    fn assessment_report_covers_headline_metrics() {
        let inputs = FinancialInputs {
            initial_fund: 10_000.0,
            monthly_expenses: 3_000.0,
            initial_income: 5_000.0,
            available_credit: 5_000.0,
            interest_rate: 0.24,
            horizon: 12,
        };
        let config = EngineConfig {
            trial_count: 200,
            ..EngineConfig::default()
        };
        let result = run_risk_assessment(
            &inputs,
            &ModelParameters::reference_compound_jump(),
            &config,
        )
        .unwrap();
        let text = format_assessment(&result);
        assert!(text.contains("200 trials x 12 months"));
        assert!(text.contains("ever negative"));
        assert!(text.contains("credit exhausted"));
        assert!(text.contains("emergency fund: 3.3 months"));
        assert!(text.contains("Terminal balance after 12 months"));
        // Band table has a row for every month at this horizon.
        assert!(text.contains("\n    12 "));
    }

    #[test]
    fn validation_report_marks_missing_side_unavailable() {
        let report = compare(&[], &[vec![1000.0, 1100.0, 1000.0]], 0.01);
        let text = format_validation(&report);
        assert!(text.contains("observed : unavailable"));
        assert!(text.contains("simulated: 1 series"));
    }
}
