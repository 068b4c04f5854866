use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::employee::{Employee, UNMATCHED_KEY_PREFIX};
use crate::domain::location::{LocationConfig, RowLayout, SheetTab};
use crate::services::sheets_api::DEFAULT_SHEETS_BASE_URL;

#[derive(Error, Debug)]
pub enum PayrollConfigError {
    #[error("failed to read payroll config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse payroll config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("payroll config defines no locations")]
    NoLocations,
    #[error("location id must not be empty")]
    EmptyLocationId,
    #[error("duplicate location id: {0}")]
    DuplicateLocation(String),
    #[error("duplicate employee id: {0}")]
    DuplicateEmployee(String),
    #[error("employee id {0} uses the reserved prefix \"custom:\"")]
    ReservedEmployeeId(String),
    #[error("percent_rate of location {location} must be between 0 and 100, got {rate}")]
    InvalidPercentRate { location: String, rate: f64 },
    #[error("location {0} has multiple participants but no second_name_row")]
    MissingSecondNameRow(String),
}

#[derive(Debug, Deserialize)]
struct PayrollConfigRecord {
    spreadsheet_url: String,
    sheets_base_url: Option<String>,
    credentials_path: Option<PathBuf>,
    locations: Vec<LocationRecord>,
    #[serde(default)]
    employees: Vec<EmployeeRecord>,
}

#[derive(Debug, Deserialize)]
struct LocationRecord {
    id: String,
    title: String,
    sheet: SheetRecord,
    #[serde(default)]
    multiple_participants: bool,
    percent_rate: Option<f64>,
    layout: Option<LayoutRecord>,
}

#[derive(Debug, Deserialize)]
struct SheetRecord {
    #[serde(default)]
    gid: i64,
    range: String,
}

#[derive(Debug, Deserialize)]
struct LayoutRecord {
    #[serde(default)]
    base_row: usize,
    #[serde(default = "default_percent_row")]
    percent_row: usize,
    #[serde(default = "default_name_row")]
    name_row: usize,
    second_name_row: Option<usize>,
    revenue_row: Option<usize>,
}

fn default_percent_row() -> usize {
    1
}

fn default_name_row() -> usize {
    7
}

#[derive(Debug, Deserialize)]
struct EmployeeRecord {
    id: String,
    name: String,
    #[serde(default)]
    bonus: f64,
}

/// Locations, roster and Sheets access settings for one payroll run.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    pub spreadsheet_url: String,
    pub sheets_base_url: String,
    pub credentials_path: Option<PathBuf>,
    pub locations: Vec<LocationConfig>,
    pub employees: Vec<Employee>,
}

impl PayrollConfig {
    pub fn location(&self, id: &str) -> Option<&LocationConfig> {
        self.locations.iter().find(|location| location.id == id)
    }
}

pub fn load_payroll_config<P: AsRef<Path>>(path: P) -> Result<PayrollConfig, PayrollConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| PayrollConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_payroll_config_from_yaml_str(&contents)
}

pub fn deserialize_payroll_config_from_yaml_str(
    input: &str,
) -> Result<PayrollConfig, PayrollConfigError> {
    let record: PayrollConfigRecord = serde_yaml::from_str(input)?;
    if record.locations.is_empty() {
        return Err(PayrollConfigError::NoLocations);
    }

    let mut location_ids = HashSet::new();
    let locations = record
        .locations
        .into_iter()
        .map(|location| {
            let location = location_from_record(location)?;
            if !location_ids.insert(location.id.clone()) {
                return Err(PayrollConfigError::DuplicateLocation(location.id));
            }
            Ok(location)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut employee_ids = HashSet::new();
    let employees = record
        .employees
        .into_iter()
        .map(|employee| {
            if employee.id.starts_with(UNMATCHED_KEY_PREFIX) {
                return Err(PayrollConfigError::ReservedEmployeeId(employee.id));
            }
            if !employee_ids.insert(employee.id.clone()) {
                return Err(PayrollConfigError::DuplicateEmployee(employee.id));
            }
            Ok(Employee::new(&employee.id, &employee.name, employee.bonus))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PayrollConfig {
        spreadsheet_url: record.spreadsheet_url,
        sheets_base_url: record
            .sheets_base_url
            .unwrap_or_else(|| DEFAULT_SHEETS_BASE_URL.to_string()),
        credentials_path: record.credentials_path,
        locations,
        employees,
    })
}

fn location_from_record(record: LocationRecord) -> Result<LocationConfig, PayrollConfigError> {
    let id = record.id.trim().to_string();
    if id.is_empty() {
        return Err(PayrollConfigError::EmptyLocationId);
    }

    if let Some(rate) = record.percent_rate {
        if !(0.0..=100.0).contains(&rate) {
            return Err(PayrollConfigError::InvalidPercentRate { location: id, rate });
        }
    }

    let layout = match record.layout {
        Some(layout) => RowLayout {
            base_row: layout.base_row,
            percent_row: layout.percent_row,
            name_row: layout.name_row,
            second_name_row: layout.second_name_row,
            revenue_row: layout.revenue_row,
        },
        None if record.multiple_participants => RowLayout::multi(),
        None => RowLayout::single(),
    };
    if record.multiple_participants && layout.second_name_row.is_none() {
        return Err(PayrollConfigError::MissingSecondNameRow(id));
    }

    Ok(LocationConfig {
        id,
        title: record.title,
        sheet: SheetTab {
            gid: record.sheet.gid,
            range: record.sheet.range,
        },
        layout,
        multiple_participants: record.multiple_participants,
        percent_rate: record.percent_rate,
    })
}
