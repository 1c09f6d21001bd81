//! Within-household AR(1) estimation on log income.
//!
//! Model: `log(Y_t) = mu_i + rho * (log(Y_{t-1}) - mu_i) + eps`, with
//! `mu_i` the household's private equilibrium. Demeaning each household by
//! its own mean log income before estimating dynamics is the bias-correction
//! step: pooled estimation would read cross-sectional level differences as
//! persistence.

use crate::domain::{EstimatorConfig, HouseholdSeries, MeanReversionParams, ModelParameters};
use crate::error::RiskError;
use crate::estimate::{Estimate, EstimateDiagnostics};
use crate::math;

/// Upper bound used by the explicit clamp fallback.
const RHO_CLAMP_MAX: f64 = 0.99;
/// Lower bound used by the explicit clamp fallback.
const RHO_CLAMP_MIN: f64 = 0.01;

struct HouseholdFit {
    rho: f64,
    sigma: f64,
}

pub(crate) fn estimate(
    panel: &[HouseholdSeries],
    config: &EstimatorConfig,
) -> Result<Estimate, RiskError> {
    let mut diagnostics = EstimateDiagnostics {
        households_total: panel.len(),
        ..EstimateDiagnostics::default()
    };

    let mut fits: Vec<HouseholdFit> = Vec::new();
    for series in panel {
        match fit_household(series, config) {
            HouseholdOutcome::Fit(fit) => fits.push(fit),
            HouseholdOutcome::TooShort => diagnostics.skipped_short += 1,
            HouseholdOutcome::Degenerate => diagnostics.skipped_degenerate += 1,
        }
    }
    diagnostics.households_used = fits.len();

    // The empty-pool check stands on its own: even with min_households
    // configured to 0 there is nothing to take a median of.
    if fits.is_empty() || fits.len() < config.min_households {
        return Err(RiskError::insufficient_data(format!(
            "Only {} household(s) qualify for AR(1) estimation (need {}).",
            fits.len(),
            config.min_households.max(1)
        )));
    }

    let rhos: Vec<f64> = fits.iter().map(|f| f.rho).collect();
    let sigmas: Vec<f64> = fits.iter().map(|f| f.sigma).collect();

    // Median, not mean: a single outlier household must not move the
    // population estimate.
    let mut rho = math::median(&rhos).expect("non-empty rho pool");
    let sigma = math::median(&sigmas).expect("non-empty sigma pool");

    if !rho.is_finite() || !sigma.is_finite() {
        return Err(RiskError::numerical_fault(
            "Non-finite aggregate AR(1) estimate.",
        ));
    }

    if !(rho > 0.0 && rho < 1.0) {
        if config.clamp_fallback {
            rho = rho.clamp(RHO_CLAMP_MIN, RHO_CLAMP_MAX);
            diagnostics.clamped = true;
        } else {
            return Err(RiskError::parameter_out_of_range(format!(
                "Aggregate persistence rho={rho:.4} outside (0, 1); the panel \
                 looks non-stationary or degenerate."
            )));
        }
    }

    let params = ModelParameters::MeanReversion(MeanReversionParams { rho, sigma });
    params.validate()?;

    Ok(Estimate {
        params,
        diagnostics,
    })
}

enum HouseholdOutcome {
    Fit(HouseholdFit),
    TooShort,
    Degenerate,
}

fn fit_household(series: &HouseholdSeries, config: &EstimatorConfig) -> HouseholdOutcome {
    if series.len() < config.min_months {
        return HouseholdOutcome::TooShort;
    }

    // Demean by the household's full-series mean log income, then pair
    // consecutive months. A period gap breaks the pair.
    let logs: Vec<f64> = series.observations.iter().map(|o| o.income.ln()).collect();
    let mu = match math::mean(&logs) {
        Some(m) => m,
        None => return HouseholdOutcome::TooShort,
    };

    let mut lagged = Vec::new();
    let mut current = Vec::new();
    for (w, l) in series.observations.windows(2).zip(logs.windows(2)) {
        if w[1].period == w[0].period + 1 {
            lagged.push(l[0] - mu);
            current.push(l[1] - mu);
        }
    }

    if current.len() < config.min_pairs {
        return HouseholdOutcome::TooShort;
    }

    // rho_i = Cov(y_t, y_{t-1}) / Var(y_{t-1}), with a single consistent
    // denominator so the ratio is the plain OLS slope.
    let lag_mean = math::mean(&lagged).unwrap_or(0.0);
    let cur_mean = math::mean(&current).unwrap_or(0.0);
    let mut cov = 0.0;
    let mut var = 0.0;
    for (&x, &y) in lagged.iter().zip(&current) {
        cov += (x - lag_mean) * (y - cur_mean);
        var += (x - lag_mean) * (x - lag_mean);
    }
    let n = lagged.len() as f64;
    if var / n <= config.degenerate_variance {
        // Constant (or near-constant) income: no dynamics information. Never
        // record this as a "perfect fit" of rho=1, sigma=0.
        return HouseholdOutcome::Degenerate;
    }
    let rho = cov / var;

    let residuals: Vec<f64> = lagged
        .iter()
        .zip(&current)
        .map(|(&x, &y)| y - rho * x)
        .collect();
    let sigma = math::std_dev(&residuals).unwrap_or(0.0);

    HouseholdOutcome::Fit(HouseholdFit { rho, sigma })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use crate::error::ErrorKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn series_from_incomes(id: &str, incomes: &[f64]) -> HouseholdSeries {
        HouseholdSeries {
            household_id: id.to_string(),
            observations: incomes
                .iter()
                .enumerate()
                .map(|(t, &income)| Observation {
                    period: t as u32,
                    income,
                })
                .collect(),
        }
    }

    fn ar1_series(id: &str, mu: f64, rho: f64, sigma: f64, months: usize, seed: u64) -> HouseholdSeries {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, sigma).unwrap();
        let mut log_income = mu;
        let mut incomes = Vec::with_capacity(months);
        for _ in 0..months {
            incomes.push(log_income.exp());
            log_income = mu + rho * (log_income - mu) + normal.sample(&mut rng);
        }
        series_from_incomes(id, &incomes)
    }

    #[test]
    fn recovers_parameters_from_synthetic_panel() {
        let true_rho = 0.7;
        let true_sigma = 0.1;
        let panel: Vec<HouseholdSeries> = (0..60)
            .map(|i| {
                // Different equilibrium levels across households; demeaning
                // must keep that heterogeneity out of the dynamics.
                let mu = (2000.0 + 150.0 * i as f64).ln();
                ar1_series(&format!("H{i}"), mu, true_rho, true_sigma, 48, 1000 + i as u64)
            })
            .collect();

        let estimate = estimate(&panel, &EstimatorConfig::default()).unwrap();
        let (rho, sigma) = match estimate.params {
            ModelParameters::MeanReversion(p) => (p.rho, p.sigma),
            _ => unreachable!(),
        };

        // Finite-sample AR(1) estimates are biased slightly downward; a wide
        // band is enough to show level heterogeneity is not leaking in.
        assert!((rho - true_rho).abs() < 0.15, "rho={rho}");
        assert!((sigma - true_sigma).abs() < 0.03, "sigma={sigma}");
        assert_eq!(estimate.diagnostics.households_used, 60);
        assert!(!estimate.diagnostics.clamped);
    }

    #[test]
    fn constant_income_households_are_excluded_not_perfect_fits() {
        let panel = vec![
            series_from_incomes("A", &[3000.0; 12]),
            series_from_incomes("B", &[4500.0; 12]),
            series_from_incomes("C", &[2800.0; 12]),
        ];
        let err = estimate(&panel, &EstimatorConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn zero_min_households_still_fails_on_empty_pool() {
        // min_households = 0 must not let an unqualified panel slip past the
        // coverage guard into the median reduce.
        let config = EstimatorConfig {
            min_households: 0,
            ..EstimatorConfig::default()
        };
        let panel = vec![series_from_incomes("A", &[3000.0; 12])];
        let err = estimate(&panel, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn short_households_are_skipped() {
        let mut panel = vec![series_from_incomes("A", &[1000.0, 1100.0, 900.0])];
        panel.push(ar1_series("B", 8.0, 0.6, 0.1, 24, 7));
        panel.push(ar1_series("C", 8.5, 0.6, 0.1, 24, 8));
        let estimate = estimate(&panel, &EstimatorConfig::default()).unwrap();
        assert_eq!(estimate.diagnostics.skipped_short, 1);
        assert_eq!(estimate.diagnostics.households_used, 2);
    }

    #[test]
    fn explosive_panel_fails_unless_clamp_fallback() {
        // Steady exponential growth is linear in logs, which fits rho = 1
        // exactly: out of domain.
        let growth = |n: usize| -> Vec<f64> {
            (0..n).map(|t| 1000.0 * 1.05_f64.powi(t as i32)).collect()
        };
        let panel = vec![
            series_from_incomes("A", &growth(24)),
            series_from_incomes("B", &growth(30)),
        ];

        let err = estimate(&panel, &EstimatorConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterOutOfRange);

        let config = EstimatorConfig {
            clamp_fallback: true,
            ..EstimatorConfig::default()
        };
        let estimate = estimate(&panel, &config).unwrap();
        assert!(estimate.diagnostics.clamped);
        match estimate.params {
            ModelParameters::MeanReversion(p) => {
                assert!((p.rho - RHO_CLAMP_MAX).abs() < 1e-12);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn period_gaps_reduce_usable_pairs() {
        // Every observation is three periods apart: zero consecutive pairs,
        // so the household is skipped despite having 10 months of data.
        let sparse = HouseholdSeries {
            household_id: "S".to_string(),
            observations: (0..10)
                .map(|i| Observation {
                    period: (i * 3) as u32,
                    income: 1000.0 + 50.0 * (i % 3) as f64,
                })
                .collect(),
        };
        assert_eq!(sparse.consecutive_pairs().len(), 0);

        let panel = vec![
            sparse,
            ar1_series("B", 8.0, 0.6, 0.1, 24, 21),
            ar1_series("C", 8.2, 0.6, 0.1, 24, 22),
        ];
        let estimate = estimate(&panel, &EstimatorConfig::default()).unwrap();
        assert_eq!(estimate.diagnostics.skipped_short, 1);
        assert_eq!(estimate.diagnostics.households_used, 2);
    }
}
