//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads or synthesizes the panel
//! - runs estimation / assessment / validation
//! - prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{AssessArgs, Command, EstimateArgs, ValidateArgs};
use crate::domain::{EngineConfig, FinancialInputs, ModelParameters};
use crate::error::RiskError;

pub mod pipeline;

/// Entry point for the `solvency` binary.
pub fn run() -> Result<(), RiskError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Estimate(args) => handle_estimate(args),
        Command::Assess(args) => handle_assess(args),
        Command::Validate(args) => handle_validate(args),
    }
}

fn handle_estimate(args: EstimateArgs) -> Result<(), RiskError> {
    let panel = pipeline::load_or_generate_panel(&args.panel, args.seed)?;
    announce_panel(&panel);

    let estimate = pipeline::run_estimation(&panel.series, &args.estimator)?;
    println!("{}", crate::report::format_estimate_summary(&estimate));

    if let Some(path) = &args.export_params {
        crate::io::write_params_json(path, &estimate.params)?;
        println!("Wrote parameters to {}", path.display());
    }
    Ok(())
}

fn handle_assess(args: AssessArgs) -> Result<(), RiskError> {
    let params = resolve_params(&args)?;

    let inputs = FinancialInputs {
        initial_fund: args.fund,
        monthly_expenses: args.expenses,
        initial_income: args.income,
        available_credit: args.credit,
        interest_rate: args.rate,
        horizon: args.horizon,
    };
    let config = EngineConfig {
        trial_count: args.trials,
        sample_paths: args.sample_paths,
        seed: args.seed,
        ..EngineConfig::default()
    };

    let result = crate::engine::run_risk_assessment(&inputs, &params, &config)?;

    println!("{}", crate::report::format_params(&params));
    println!("{}", crate::report::format_assessment(&result));

    if let Some(path) = &args.export {
        crate::io::write_result_json(path, &result)?;
        println!("Wrote result to {}", path.display());
    }
    Ok(())
}

fn handle_validate(args: ValidateArgs) -> Result<(), RiskError> {
    let panel = pipeline::load_or_generate_panel(&args.panel, args.seed)?;
    announce_panel(&panel);

    let params = match &args.params {
        Some(path) => crate::io::read_params_json(path)?,
        None => pipeline::run_estimation(&panel.series, &args.estimator)?.params,
    };
    println!("{}", crate::report::format_params(&params));

    let report = pipeline::run_validation(
        &panel.series,
        &params,
        args.months,
        args.trajectories,
        args.estimator.jump_threshold,
        args.seed,
    )?;
    println!("{}", crate::report::format_validation(&report));

    if let Some(path) = &args.export {
        crate::io::write_validation_json(path, &report)?;
        println!("Wrote report to {}", path.display());
    }
    Ok(())
}

/// Parameter precedence: explicit JSON file, then panel estimation, then the
/// reference parameters for the chosen model.
fn resolve_params(args: &AssessArgs) -> Result<ModelParameters, RiskError> {
    if let Some(path) = &args.params {
        return crate::io::read_params_json(path);
    }
    if let Some(path) = &args.panel {
        let loaded = crate::io::load_panel_csv(path)?;
        if !loaded.row_errors.is_empty() {
            println!(
                "Panel: skipped {} malformed row(s) of {}",
                loaded.row_errors.len(),
                loaded.rows_read
            );
        }
        let series = crate::estimate::group_observations(&loaded.observations)?;
        return Ok(pipeline::run_estimation(&series, &args.estimator)?.params);
    }
    Ok(match args.estimator.model {
        crate::domain::ModelChoice::MeanReversion => ModelParameters::reference_mean_reversion(),
        crate::domain::ModelChoice::CompoundJump => ModelParameters::reference_compound_jump(),
    })
}

fn announce_panel(panel: &pipeline::PanelLoad) {
    if panel.synthetic {
        println!("Panel: synthetic, {} households", panel.series.len());
    } else if panel.skipped_rows > 0 {
        println!(
            "Panel: {} households ({} malformed row(s) skipped)",
            panel.series.len(),
            panel.skipped_rows
        );
    } else {
        println!("Panel: {} households", panel.series.len());
    }
}
