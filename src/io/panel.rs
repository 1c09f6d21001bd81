//! Cleaned-panel CSV loading.
//!
//! The expected input is the output of the panel preprocessor: one row per
//! (household, period) with a strictly positive income. This loader enforces
//! schema and value validity row by row; structural panel invariants
//! (deduplication, chronology) are enforced downstream by
//! `estimate::group_observations`.

use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::PanelObservation;
use crate::error::RiskError;

/// A row-level problem encountered while loading.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Load output: parsed observations plus skipped-row diagnostics.
#[derive(Debug, Clone)]
pub struct LoadedPanel {
    pub observations: Vec<PanelObservation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

const REQUIRED_COLUMNS: [&str; 3] = ["household_id", "period", "income"];

/// Load a cleaned panel CSV.
///
/// Malformed rows are skipped and reported in `row_errors` rather than
/// aborting the load; a missing file or missing schema column is fatal.
pub fn load_panel_csv(path: &Path) -> Result<LoadedPanel, RiskError> {
    let file = File::open(path).map_err(|e| {
        RiskError::io(format!("Failed to open panel CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| RiskError::io(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, record) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = idx + 2;
        rows_read += 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("Unreadable row: {e}"),
                });
                continue;
            }
        };
        match parse_row(&record, &columns) {
            Ok(obs) => observations.push(obs),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if observations.is_empty() {
        return Err(RiskError::insufficient_data(format!(
            "Panel CSV '{}' contains no usable rows ({} skipped).",
            path.display(),
            row_errors.len()
        )));
    }

    Ok(LoadedPanel {
        observations,
        row_errors,
        rows_read,
    })
}

struct Columns {
    household_id: usize,
    period: usize,
    income: usize,
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns, RiskError> {
    let find = |name: &str| -> Result<usize, RiskError> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                RiskError::invalid_configuration(format!(
                    "Panel CSV is missing required column '{name}' (need {}).",
                    REQUIRED_COLUMNS.join(", ")
                ))
            })
    };
    Ok(Columns {
        household_id: find("household_id")?,
        period: find("period")?,
        income: find("income")?,
    })
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<PanelObservation, String> {
    let field = |idx: usize, name: &str| -> Result<&str, String> {
        record
            .get(idx)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format!("Missing {name}"))
    };

    let household_id = field(columns.household_id, "household_id")?.to_string();
    let period: u32 = field(columns.period, "period")?
        .parse()
        .map_err(|e| format!("Bad period: {e}"))?;
    let income: f64 = field(columns.income, "income")?
        .parse()
        .map_err(|e| format!("Bad income: {e}"))?;
    if !income.is_finite() {
        return Err(format!("Non-finite income {income}"));
    }
    if income <= 0.0 {
        return Err(format!("Non-positive income {income}"));
    }

    Ok(PanelObservation {
        household_id,
        period,
        income,
    })
}
