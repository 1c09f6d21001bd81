//! Read/write parameter and result JSON files.
//!
//! Parameter JSON is the portable representation of a fitted income model:
//! the `model` tag plus its parameters, exactly the schema the serving layer
//! exchanges. Result JSON is the full `AggregateResult` in camelCase.

use std::fs::File;
use std::path::Path;

use crate::domain::{AggregateResult, ModelParameters};
use crate::error::RiskError;
use crate::validate::ValidationReport;

/// Write fitted parameters to a JSON file.
pub fn write_params_json(path: &Path, params: &ModelParameters) -> Result<(), RiskError> {
    let file = File::create(path).map_err(|e| {
        RiskError::io(format!(
            "Failed to create params JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, params)
        .map_err(|e| RiskError::io(format!("Failed to write params JSON: {e}")))?;
    Ok(())
}

/// Read parameters from a JSON file and re-validate the domain bounds.
pub fn read_params_json(path: &Path) -> Result<ModelParameters, RiskError> {
    let file = File::open(path).map_err(|e| {
        RiskError::io(format!(
            "Failed to open params JSON '{}': {e}",
            path.display()
        ))
    })?;
    let params: ModelParameters = serde_json::from_reader(file)
        .map_err(|e| RiskError::invalid_configuration(format!("Invalid params JSON: {e}")))?;
    params.validate()?;
    Ok(params)
}

/// Write a full assessment result to a JSON file.
pub fn write_result_json(path: &Path, result: &AggregateResult) -> Result<(), RiskError> {
    let file = File::create(path).map_err(|e| {
        RiskError::io(format!(
            "Failed to create result JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| RiskError::io(format!("Failed to write result JSON: {e}")))?;
    Ok(())
}

/// Write a validation comparison report to a JSON file.
pub fn write_validation_json(path: &Path, report: &ValidationReport) -> Result<(), RiskError> {
    let file = File::create(path).map_err(|e| {
        RiskError::io(format!(
            "Failed to create validation JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| RiskError::io(format!("Failed to write validation JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("solvency-export-{name}.json"))
    }

    #[test]
    fn params_round_trip_through_file() {
        for params in [
            ModelParameters::reference_mean_reversion(),
            ModelParameters::reference_compound_jump(),
        ] {
            let path = temp_path("params");
            write_params_json(&path, &params).unwrap();
            let back = read_params_json(&path).unwrap();
            assert_eq!(back, params);
        }
    }

    #[test]
    fn reading_out_of_domain_params_fails_validation() {
        let path = temp_path("bad-params");
        std::fs::write(
            &path,
            r#"{"model":"mean-reversion","rho":1.4,"sigma":0.1}"#,
        )
        .unwrap();
        let err = read_params_json(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterOutOfRange);
    }

    #[test]
    fn malformed_json_is_invalid_configuration() {
        let path = temp_path("garbage");
        std::fs::write(&path, "not json").unwrap();
        let err = read_params_json(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_params_json(Path::new("/nonexistent/params.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
