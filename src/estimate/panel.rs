//! Grouping of panel observations into per-household series.

use std::collections::BTreeMap;

use crate::domain::{HouseholdSeries, Observation, PanelObservation};
use crate::error::RiskError;

/// Group a cleaned panel into chronological per-household series.
///
/// The preprocessor owns deduplication, so a repeated (household, period)
/// pair here means the caller fed unclean data and is rejected. Non-positive
/// incomes carry no information for a log-income model and are dropped, as in
/// the offline SIPP analysis. Non-finite incomes are a data fault.
pub fn group_observations(
    observations: &[PanelObservation],
) -> Result<Vec<HouseholdSeries>, RiskError> {
    // BTreeMap keeps household order deterministic regardless of input order.
    let mut grouped: BTreeMap<&str, Vec<Observation>> = BTreeMap::new();

    for obs in observations {
        if !obs.income.is_finite() {
            return Err(RiskError::numerical_fault(format!(
                "Non-finite income for household '{}' at period {}.",
                obs.household_id, obs.period
            )));
        }
        if obs.income <= 0.0 {
            continue;
        }
        grouped
            .entry(obs.household_id.as_str())
            .or_default()
            .push(Observation {
                period: obs.period,
                income: obs.income,
            });
    }

    let mut series = Vec::with_capacity(grouped.len());
    for (household_id, mut observations) in grouped {
        observations.sort_by_key(|o| o.period);
        for w in observations.windows(2) {
            if w[0].period == w[1].period {
                return Err(RiskError::invalid_configuration(format!(
                    "Duplicate observation for household '{household_id}' at period {}.",
                    w[0].period
                )));
            }
        }
        series.push(HouseholdSeries {
            household_id: household_id.to_string(),
            observations,
        });
    }

    Ok(series)
}
