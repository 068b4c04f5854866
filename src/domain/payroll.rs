use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::employee::EmployeeKey;

/// Earnings of one employee at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsBreakdown {
    pub employee_key: EmployeeKey,
    pub name: String,
    pub base: f64,
    pub percent: f64,
    pub total: f64,
}

impl EarningsBreakdown {
    pub fn new(employee_key: EmployeeKey, name: &str) -> Self {
        Self {
            employee_key,
            name: name.to_string(),
            base: 0.0,
            percent: 0.0,
            total: 0.0,
        }
    }

    pub fn add(&mut self, base: f64, percent: f64) {
        self.base += base;
        self.percent += percent;
        self.total += base + percent;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollTotals {
    pub base: f64,
    pub percent: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResult {
    pub location_id: String,
    pub location_title: String,
    pub sheet_title: String,
    pub range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    pub rows: Vec<EarningsBreakdown>,
    pub totals: PayrollTotals,
    pub revenue_total: f64,
    pub fetched_at: DateTime<Utc>,
}
