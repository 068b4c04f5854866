//! Cross-location payroll summary: one row per employee with their total at
//! every location, a bonus adjustment and the final amount.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::domain::employee::{Employee, EmployeeKey};
use crate::domain::location::LocationConfig;
use crate::domain::payroll::LocationResult;
use crate::services::amounts::round_currency;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BonusAdjustment {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryColumn {
    pub location_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub employee_key: EmployeeKey,
    pub name: String,
    pub totals: HashMap<String, f64>,
    pub overall: f64,
    pub adjustment: BonusAdjustment,
}

impl SummaryRow {
    pub fn location_total(&self, location_id: &str) -> f64 {
        self.totals.get(location_id).copied().unwrap_or(0.0)
    }

    pub fn total_with_bonus(&self) -> f64 {
        round_currency(self.overall + self.adjustment.amount)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTotals {
    pub by_location: HashMap<String, f64>,
    pub overall: f64,
    pub bonus: f64,
}

impl SummaryTotals {
    pub fn location_total(&self, location_id: &str) -> f64 {
        self.by_location.get(location_id).copied().unwrap_or(0.0)
    }

    pub fn with_bonus(&self) -> f64 {
        round_currency(self.overall + self.bonus)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayrollSummary {
    pub columns: Vec<SummaryColumn>,
    pub rows: Vec<SummaryRow>,
    pub totals: SummaryTotals,
}

/// Builds the summary. Roster employees come first (even without shifts),
/// followed by unmatched names in the order they appear in `results`.
/// An employee's adjustment defaults to their roster bonus unless
/// `adjustments` overrides it.
pub fn build_summary(
    locations: &[LocationConfig],
    roster: &[Employee],
    results: &[LocationResult],
    adjustments: &HashMap<EmployeeKey, BonusAdjustment>,
) -> PayrollSummary {
    let columns: Vec<SummaryColumn> = locations
        .iter()
        .map(|location| SummaryColumn {
            location_id: location.id.clone(),
            title: location.title.clone(),
        })
        .collect();

    let mut rows: Vec<SummaryRow> = Vec::new();
    let mut index: HashMap<EmployeeKey, usize> = HashMap::new();

    for employee in roster {
        let key = employee.key();
        let adjustment = adjustments.get(&key).cloned().unwrap_or(BonusAdjustment {
            amount: employee.bonus,
            note: String::new(),
        });
        index.insert(key.clone(), rows.len());
        rows.push(empty_row(key, &employee.name, adjustment));
    }

    for result in results {
        if !columns.iter().any(|column| column.location_id == result.location_id) {
            warn!(location = %result.location_id, "skipping result for unconfigured location");
            continue;
        }

        for breakdown in &result.rows {
            let position = match index.get(&breakdown.employee_key) {
                Some(position) => *position,
                None => {
                    let adjustment = adjustments
                        .get(&breakdown.employee_key)
                        .cloned()
                        .unwrap_or_default();
                    index.insert(breakdown.employee_key.clone(), rows.len());
                    rows.push(empty_row(breakdown.employee_key.clone(), &breakdown.name, adjustment));
                    rows.len() - 1
                }
            };
            if let Some(row) = rows.get_mut(position) {
                row.totals.insert(result.location_id.clone(), breakdown.total);
            }
        }
    }

    for row in &mut rows {
        let overall: f64 = columns
            .iter()
            .map(|column| row.location_total(&column.location_id))
            .sum();
        row.overall = round_currency(overall);
    }

    let totals = sum_summary(&columns, &rows);
    PayrollSummary {
        columns,
        rows,
        totals,
    }
}

fn empty_row(employee_key: EmployeeKey, name: &str, adjustment: BonusAdjustment) -> SummaryRow {
    SummaryRow {
        employee_key,
        name: name.to_string(),
        totals: HashMap::new(),
        overall: 0.0,
        adjustment,
    }
}

fn sum_summary(columns: &[SummaryColumn], rows: &[SummaryRow]) -> SummaryTotals {
    let mut totals = SummaryTotals::default();
    for column in columns {
        let sum: f64 = rows
            .iter()
            .map(|row| row.location_total(&column.location_id))
            .sum();
        totals
            .by_location
            .insert(column.location_id.clone(), round_currency(sum));
    }
    totals.overall = round_currency(rows.iter().map(|row| row.overall).sum());
    totals.bonus = round_currency(rows.iter().map(|row| row.adjustment.amount).sum());
    totals
}
