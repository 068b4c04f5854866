use std::collections::HashMap;

use crate::commands::command_error::CommandError;
use crate::services::adjustments_yaml::load_adjustments_from_yaml_file;
use crate::services::payroll_config::load_payroll_config;
use crate::services::results_yaml::load_results_from_yaml_file;
use crate::services::summary::build_summary;
use crate::services::summary_csv::write_summary_csv;

pub fn summary_command(
    config: &str,
    input: &str,
    output: &str,
    adjustments: Option<&str>,
) -> Result<(), CommandError> {
    let payroll_config = load_payroll_config(config)?;
    let results = load_results_from_yaml_file(input)?;
    let adjustments = match adjustments {
        Some(path) => load_adjustments_from_yaml_file(path)?,
        None => HashMap::new(),
    };

    let summary = build_summary(
        &payroll_config.locations,
        &payroll_config.employees,
        &results,
        &adjustments,
    );

    let write_error = |source: std::io::Error| CommandError::Write {
        path: output.to_string(),
        source,
    };
    let mut buffer = Vec::new();
    write_summary_csv(&mut buffer, &summary).map_err(write_error)?;
    std::fs::write(output, buffer).map_err(write_error)?;

    println!("Payroll summary for {} employees written to {output}", summary.rows.len());
    Ok(())
}
