use crate::commands::command_error::CommandError;
use crate::commands::fetch_cmd::{fetch_locations, location_results, select_locations, write_results};
use crate::commands::report_format::format_location_report;
use crate::services::local_sheet::LocalSheetSource;
use crate::services::payroll_config::load_payroll_config;

/// Aggregates one location from a JSON matrix on disk instead of the Sheets API.
pub fn aggregate_command(config: &str, location: &str, input: &str, output: &str) -> Result<(), CommandError> {
    let payroll_config = load_payroll_config(config)?;
    let locations = select_locations(&payroll_config, Some(location))?;

    let source = LocalSheetSource::new(input);
    let aggregations = fetch_locations(&source, &payroll_config, &locations)?;
    write_results(output, &location_results(&aggregations))?;

    for aggregation in &aggregations {
        println!("{}\n", format_location_report(aggregation));
    }
    println!("Payroll results written to {output}");
    Ok(())
}
