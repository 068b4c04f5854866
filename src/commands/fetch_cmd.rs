use tracing::info;

use crate::commands::command_error::CommandError;
use crate::commands::report_format::{format_location_report, format_revenue_report};
use crate::domain::location::LocationConfig;
use crate::domain::payroll::LocationResult;
use crate::services::credentials::CredentialStore;
use crate::services::payroll_aggregator::{Aggregation, aggregate};
use crate::services::payroll_config::{PayrollConfig, load_payroll_config};
use crate::services::results_yaml::serialize_results_to_yaml;
use crate::services::revenue_stats::revenue_stats;
use crate::services::sheet_source::{SheetRequest, SheetSource};
use crate::services::sheets_api::SheetsApiClient;

pub fn fetch_command(config: &str, output: &str, location: Option<&str>) -> Result<(), CommandError> {
    let payroll_config = load_payroll_config(config)?;
    let locations = select_locations(&payroll_config, location)?;

    let credentials = CredentialStore::from_env(payroll_config.credentials_path.as_deref());
    let client = SheetsApiClient::new(&payroll_config.sheets_base_url, credentials)
        .map_err(CommandError::Client)?;

    let aggregations = fetch_locations(&client, &payroll_config, &locations)?;
    let results = location_results(&aggregations);
    write_results(output, &results)?;

    for aggregation in &aggregations {
        println!("{}\n", format_location_report(aggregation));
    }
    println!("{}\n", format_revenue_report(&revenue_stats(&results)));
    println!("Payroll results written to {output}");
    Ok(())
}

/// All configured locations, or just the one named by `location`.
pub fn select_locations<'a>(
    config: &'a PayrollConfig,
    location: Option<&str>,
) -> Result<Vec<&'a LocationConfig>, CommandError> {
    match location {
        Some(id) => config
            .location(id)
            .map(|location| vec![location])
            .ok_or_else(|| CommandError::UnknownLocation(id.to_string())),
        None => Ok(config.locations.iter().collect()),
    }
}

/// Reads and aggregates the given locations one after another. The first
/// failing location aborts the run.
pub fn fetch_locations(
    source: &dyn SheetSource,
    config: &PayrollConfig,
    locations: &[&LocationConfig],
) -> Result<Vec<Aggregation>, CommandError> {
    let mut aggregations = Vec::with_capacity(locations.len());
    for location in locations {
        let request = SheetRequest {
            spreadsheet_url: config.spreadsheet_url.clone(),
            gid: location.sheet.gid,
            range: location.sheet.range.clone(),
        };
        let sheet = source.fetch(&request).map_err(|error| CommandError::Fetch {
            location: location.id.clone(),
            source: error,
        })?;
        info!(
            location = %location.id,
            sheet = %sheet.sheet_title,
            rows = sheet.values.row_count(),
            "sheet fetched"
        );

        aggregations.push(aggregate(
            location,
            &sheet.sheet_title,
            &sheet.range,
            &sheet.values,
            &config.employees,
        ));
    }
    Ok(aggregations)
}

pub fn location_results(aggregations: &[Aggregation]) -> Vec<LocationResult> {
    aggregations
        .iter()
        .map(|aggregation| aggregation.result.clone())
        .collect()
}

pub fn write_results(output: &str, results: &[LocationResult]) -> Result<(), CommandError> {
    let write_error = |source: std::io::Error| CommandError::Write {
        path: output.to_string(),
        source,
    };
    let mut buffer = Vec::new();
    serialize_results_to_yaml(&mut buffer, results).map_err(write_error)?;
    std::fs::write(output, buffer).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::domain::employee::EmployeeKey;
    use crate::domain::location::{LocationConfig, SheetTab};
    use crate::services::sheet_source::{FetchedSheet, SheetSourceError};
    use crate::test_support::{roster, single_location, single_matrix};

    struct FakeSource {
        requests: RefCell<Vec<SheetRequest>>,
        fail_gid: Option<i64>,
    }

    impl FakeSource {
        fn new(fail_gid: Option<i64>) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                fail_gid,
            }
        }
    }

    impl SheetSource for FakeSource {
        fn fetch(&self, request: &SheetRequest) -> Result<FetchedSheet, SheetSourceError> {
            self.requests.borrow_mut().push(request.clone());
            if self.fail_gid == Some(request.gid) {
                return Err(SheetSourceError::SheetNotFound(request.gid));
            }
            Ok(FetchedSheet {
                sheet_title: format!("Sheet {}", request.gid),
                range: format!("'Sheet {}'!{}", request.gid, request.range),
                values: single_matrix(
                    &[1000.0, 2000.0],
                    &[100.0, 50.0],
                    &["Анна Петрова", "Костя Сидоров"],
                    &[],
                ),
            })
        }
    }

    fn build_config() -> PayrollConfig {
        let mut ligovka = single_location();
        ligovka.sheet = SheetTab {
            gid: 11,
            range: "B:K".to_string(),
        };
        let mut second = LocationConfig::new("nevsky", "Nevsky 10");
        second.sheet = SheetTab {
            gid: 22,
            range: "C:F".to_string(),
        };
        PayrollConfig {
            spreadsheet_url: "https://docs.google.com/spreadsheets/d/abc/edit".to_string(),
            sheets_base_url: "http://localhost".to_string(),
            credentials_path: None,
            locations: vec![ligovka, second],
            employees: roster(),
        }
    }

    #[test]
    fn selects_all_locations_by_default() {
        let config = build_config();
        let locations = select_locations(&config, None).unwrap();
        assert_eq!(locations.len(), 2);
    }

    #[test]
    fn selects_single_location_by_id() {
        let config = build_config();
        let locations = select_locations(&config, Some("nevsky")).unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].id, "nevsky");
    }

    #[test]
    fn unknown_location_is_an_error() {
        let config = build_config();
        let err = select_locations(&config, Some("holland")).unwrap_err();
        assert!(matches!(err, CommandError::UnknownLocation(id) if id == "holland"));
    }

    #[test]
    fn fetches_each_location_with_its_tab_and_range() {
        let config = build_config();
        let source = FakeSource::new(None);
        let locations = select_locations(&config, None).unwrap();

        let aggregations = fetch_locations(&source, &config, &locations).unwrap();
        let results = location_results(&aggregations);

        let requests = source.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].gid, 11);
        assert_eq!(requests[1].range, "C:F");
        assert_eq!(requests[1].spreadsheet_url, config.spreadsheet_url);

        assert_eq!(results[0].location_id, "ligovka");
        assert_eq!(results[0].sheet_title, "Sheet 11");
        assert_eq!(results[1].range, "'Sheet 22'!C:F");
        let anna = &results[0].rows[0];
        assert_eq!(anna.employee_key, EmployeeKey::Roster("lig-anna".into()));
        assert_eq!(anna.total, 1100.0);
        assert!(aggregations[0].unmatched_names.is_empty());
        assert_eq!(results[0].totals.total, 3150.0);
    }

    #[test]
    fn stops_at_first_failing_location() {
        let config = build_config();
        let source = FakeSource::new(Some(11));
        let locations = select_locations(&config, None).unwrap();

        let err = fetch_locations(&source, &config, &locations).unwrap_err();

        assert!(matches!(err, CommandError::Fetch { ref location, .. } if location == "ligovka"));
        assert_eq!(source.requests.borrow().len(), 1);
    }
}
