use std::io;

use thiserror::Error;

use crate::services::adjustments_yaml::AdjustmentsYamlError;
use crate::services::payroll_config::PayrollConfigError;
use crate::services::results_yaml::ResultsYamlError;
use crate::services::sheet_source::SheetSourceError;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to load payroll config: {0}")]
    Config(#[from] PayrollConfigError),
    #[error("Failed to find location {0} in payroll config")]
    UnknownLocation(String),
    #[error("Failed to create Sheets client: {0}")]
    Client(SheetSourceError),
    #[error("Failed to fetch sheet for location {location}: {source}")]
    Fetch {
        location: String,
        source: SheetSourceError,
    },
    #[error("Failed to load payroll results: {0}")]
    Results(#[from] ResultsYamlError),
    #[error("Failed to load bonus adjustments: {0}")]
    Adjustments(#[from] AdjustmentsYamlError),
    #[error("Failed to write output file {path}: {source}")]
    Write { path: String, source: io::Error },
}
