//! Monte Carlo risk engine.
//!
//! Drives N independent trajectory simulations, walks each one through the
//! household's savings/debt rule, and aggregates the results. Trials are
//! embarrassingly parallel: each derives its own seed from
//! (base_seed, trial_index), so the seed-to-trial mapping is identical
//! whether trials run serially or across the rayon pool, and outputs are
//! reproducible for a fixed base seed regardless of parallelism.

mod aggregate;

use rayon::prelude::*;

use crate::domain::{AggregateResult, EngineConfig, FinancialInputs, ModelParameters};
use crate::error::RiskError;
use crate::math::derive_seed;
use crate::simulate::simulate_trajectory;

/// One trial's financial path and derived outcome flags.
#[derive(Debug, Clone)]
pub(crate) struct TrialOutcome {
    /// Balance per period, `horizon + 1` values; `[0]` is the initial fund.
    pub balances: Vec<f64>,
    pub min_balance: f64,
    pub interest_paid: f64,
    /// First period with a negative balance, if any.
    pub first_negative: Option<usize>,
    /// Whether debt ever exceeded the available credit.
    pub credit_exhausted: bool,
}

/// Run a full Monte Carlo risk assessment.
///
/// This is the single synchronous call contract the serving layer consumes:
/// a pure function of its inputs plus the configured seed, with no hidden
/// state and no file I/O.
pub fn run_risk_assessment(
    inputs: &FinancialInputs,
    params: &ModelParameters,
    config: &EngineConfig,
) -> Result<AggregateResult, RiskError> {
    if config.trial_count == 0 {
        return Err(RiskError::invalid_configuration(
            "Trial count must be >= 1.",
        ));
    }
    if inputs.horizon == 0 {
        return Err(RiskError::invalid_configuration(
            "Horizon must be >= 1 month.",
        ));
    }
    let finite = inputs.initial_fund.is_finite()
        && inputs.monthly_expenses.is_finite()
        && inputs.initial_income.is_finite()
        && inputs.available_credit.is_finite()
        && inputs.interest_rate.is_finite();
    if !finite {
        return Err(RiskError::invalid_configuration(
            "All financial inputs must be finite.",
        ));
    }
    params.validate()?;

    let outcomes: Vec<TrialOutcome> = (0..config.trial_count)
        .into_par_iter()
        .map(|trial| run_trial(inputs, params, config, trial))
        .collect::<Result<_, _>>()?;

    aggregate::build(inputs, config, &outcomes)
}

fn run_trial(
    inputs: &FinancialInputs,
    params: &ModelParameters,
    config: &EngineConfig,
    trial: usize,
) -> Result<TrialOutcome, RiskError> {
    let seed = derive_seed(config.seed, trial as u64);
    let trajectory = simulate_trajectory(
        params,
        inputs.initial_income,
        inputs.horizon,
        config.income_floor,
        seed,
    )?;

    let monthly_rate = inputs.interest_rate / 12.0;
    let mut balances = Vec::with_capacity(inputs.horizon + 1);
    let mut balance = inputs.initial_fund;
    balances.push(balance);

    let mut min_balance = balance;
    let mut interest_paid = 0.0;
    let mut first_negative = None;
    let mut credit_exhausted = false;

    for (t, &income) in trajectory.iter().enumerate().skip(1) {
        balance += income - inputs.monthly_expenses;
        if balance < 0.0 {
            // Interest accrues only while in debt, never while solvent.
            let interest = balance * monthly_rate;
            balance += interest;
            interest_paid -= interest;
            if first_negative.is_none() {
                first_negative = Some(t);
            }
            if balance < -inputs.available_credit {
                credit_exhausted = true;
            }
        }
        min_balance = min_balance.min(balance);
        balances.push(balance);
    }

    Ok(TrialOutcome {
        balances,
        min_balance,
        interest_paid,
        first_negative,
        credit_exhausted,
    })
}
