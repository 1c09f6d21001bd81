//! Shared pipeline logic used by the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! panel load/synthesis -> grouping -> estimation -> simulation
//!
//! The command handlers in `app` then focus on presentation and exports.

use crate::cli::{EstimatorArgs, PanelArgs};
use crate::data::{SampleConfig, generate_panel};
use crate::domain::{
    DEFAULT_INCOME_FLOOR, EstimatorConfig, HouseholdSeries, ModelParameters,
};
use crate::error::RiskError;
use crate::estimate::{Estimate, estimate_parameters, group_observations};
use crate::io::load_panel_csv;
use crate::math::derive_seed;
use crate::simulate::simulate_trajectory;
use crate::validate::{ValidationReport, compare};

/// A grouped panel plus where it came from.
#[derive(Debug, Clone)]
pub struct PanelLoad {
    pub series: Vec<HouseholdSeries>,
    /// Malformed CSV rows skipped during loading (always 0 for synthetic).
    pub skipped_rows: usize,
    pub synthetic: bool,
}

/// Load the panel CSV, or synthesize one from reference parameters when no
/// path was given.
pub fn load_or_generate_panel(args: &PanelArgs, seed: u64) -> Result<PanelLoad, RiskError> {
    match &args.panel {
        Some(path) => {
            let loaded = load_panel_csv(path)?;
            let series = group_observations(&loaded.observations)?;
            Ok(PanelLoad {
                series,
                skipped_rows: loaded.row_errors.len(),
                synthetic: false,
            })
        }
        None => {
            let config = SampleConfig {
                n_households: args.synthetic_households,
                months: args.synthetic_months,
                seed,
                ..SampleConfig::default()
            };
            let panel = generate_panel(&ModelParameters::reference_compound_jump(), &config)?;
            let series = group_observations(&panel)?;
            Ok(PanelLoad {
                series,
                skipped_rows: 0,
                synthetic: true,
            })
        }
    }
}

pub fn estimator_config(args: &EstimatorArgs) -> EstimatorConfig {
    EstimatorConfig {
        min_months: args.min_months,
        min_households: args.min_households,
        jump_threshold: args.jump_threshold,
        clamp_fallback: args.clamp,
        ..EstimatorConfig::default()
    }
}

/// Estimate parameters for the configured model.
pub fn run_estimation(
    series: &[HouseholdSeries],
    args: &EstimatorArgs,
) -> Result<Estimate, RiskError> {
    estimate_parameters(series, args.model, &estimator_config(args))
}

/// Build the observed-vs-simulated validation report.
///
/// Each simulated trajectory starts from an observed household's first
/// income, cycling through the panel when more trajectories than households
/// are requested.
pub fn run_validation(
    series: &[HouseholdSeries],
    params: &ModelParameters,
    months: usize,
    trajectories: usize,
    jump_threshold: f64,
    seed: u64,
) -> Result<ValidationReport, RiskError> {
    let initial_incomes: Vec<f64> = series
        .iter()
        .filter_map(|s| s.observations.first().map(|o| o.income))
        .collect();
    if initial_incomes.is_empty() {
        return Err(RiskError::insufficient_data(
            "No households available to anchor simulated trajectories.",
        ));
    }
    if trajectories == 0 || months == 0 {
        return Err(RiskError::invalid_configuration(
            "Validation needs at least 1 trajectory and 1 month.",
        ));
    }

    let mut simulated = Vec::with_capacity(trajectories);
    for i in 0..trajectories {
        let initial = initial_incomes[i % initial_incomes.len()];
        let trajectory = simulate_trajectory(
            params,
            initial,
            months,
            DEFAULT_INCOME_FLOOR,
            derive_seed(seed, i as u64),
        )?;
        simulated.push(trajectory);
    }

    Ok(compare(series, &simulated, jump_threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{EstimatorArgs, PanelArgs};
    use crate::domain::ModelChoice;
    use crate::error::ErrorKind;
    use clap::Parser;

    fn synthetic_panel_args(households: usize, months: usize) -> PanelArgs {
        PanelArgs {
            panel: None,
            synthetic_households: households,
            synthetic_months: months,
        }
    }

    fn estimator_args(model: ModelChoice) -> EstimatorArgs {
        // Parse defaults rather than spelling them out.
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            estimator: EstimatorArgs,
        }
        let mut args = Wrapper::parse_from(["test"]).estimator;
        args.model = model;
        args
    }

    #[test]
    fn synthetic_panel_estimates_end_to_end() {
        let panel = load_or_generate_panel(&synthetic_panel_args(100, 24), 42).unwrap();
        assert!(panel.synthetic);
        assert_eq!(panel.series.len(), 100);

        let estimate =
            run_estimation(&panel.series, &estimator_args(ModelChoice::CompoundJump)).unwrap();
        match estimate.params {
            ModelParameters::CompoundJump(p) => {
                assert!(p.lambda > 0.0 && p.lambda < 1.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn validation_produces_both_sides_for_synthetic_panel() {
        let panel = load_or_generate_panel(&synthetic_panel_args(50, 18), 7).unwrap();
        let params = ModelParameters::reference_compound_jump();
        let report = run_validation(&panel.series, &params, 18, 80, 0.01, 7).unwrap();
        assert!(report.observed.is_some());
        let simulated = report.simulated.unwrap();
        assert_eq!(simulated.n_series, 80);
    }

    #[test]
    fn validation_with_no_households_is_insufficient_data() {
        let params = ModelParameters::reference_compound_jump();
        let err = run_validation(&[], &params, 12, 10, 0.01, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }
}
