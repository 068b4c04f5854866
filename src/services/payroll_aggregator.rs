//! Turns one location's value matrix into per-employee earnings.
//!
//! Each matrix column is one shift. The configured rows give the base amount,
//! the percent amount and the participant name(s) of that shift. Columns
//! without a participant are skipped. In multi-participant mode every
//! participant receives the full base while the percent amount is split
//! evenly between them.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::employee::{Employee, EmployeeKey};
use crate::domain::location::LocationConfig;
use crate::domain::payroll::{EarningsBreakdown, LocationResult, PayrollTotals};
use crate::domain::value_matrix::{CellValue, ValueMatrix};
use crate::services::amounts::{parse_number, round_currency};
use crate::services::names::{format_name, normalize_name, normalize_text};

/// An aggregated location together with the sheet names that matched no
/// roster employee.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub result: LocationResult,
    pub unmatched_names: Vec<String>,
}

pub fn aggregate(
    config: &LocationConfig,
    sheet_title: &str,
    range: &str,
    matrix: &ValueMatrix,
    roster: &[Employee],
) -> Aggregation {
    let layout = &config.layout;
    let mut ledger = EarningsLedger::new(roster);
    let mut revenue_sum = 0.0;

    let column_count = matrix.column_count(layout.base_row);
    debug!(location = %config.id, column_count, "aggregating payroll columns");

    for column in 0..column_count {
        let participants = participants_in_column(config, matrix, column);
        if participants.is_empty() {
            continue;
        }

        let base = parse_number(matrix.cell(layout.base_row, column));
        let percent = parse_number(matrix.cell(layout.percent_row, column));
        let percent_share = percent / participants.len() as f64;

        if let Some(revenue_row) = layout.revenue_row {
            revenue_sum += parse_number(matrix.cell(revenue_row, column));
        }

        for raw_name in participants {
            ledger.add_earnings(raw_name, base, percent_share);
        }
    }

    if !ledger.unmatched_names.is_empty() {
        warn!(
            location = %config.title,
            names = %ledger.unmatched_names.join(", "),
            "employees not found in roster"
        );
    }

    let rows: Vec<EarningsBreakdown> = ledger.rows.into_iter().map(round_breakdown).collect();
    let totals = sum_rows(&rows);
    let revenue_total = if revenue_sum != 0.0 {
        revenue_sum
    } else {
        implied_revenue(config.percent_rate, totals.percent)
    };

    Aggregation {
        result: LocationResult {
            location_id: config.id.clone(),
            location_title: config.title.clone(),
            sheet_title: sheet_title.to_string(),
            range: range.to_string(),
            row_count: (!matrix.is_empty()).then(|| matrix.row_count()),
            rows,
            totals,
            revenue_total,
            fetched_at: Utc::now(),
        },
        unmatched_names: ledger.unmatched_names,
    }
}

/// Name cells of a column that hold a usable name.
fn participants_in_column<'m>(
    config: &LocationConfig,
    matrix: &'m ValueMatrix,
    column: usize,
) -> Vec<&'m CellValue> {
    let name_rows = if config.multiple_participants {
        config.layout.name_rows()
    } else {
        vec![config.layout.name_row]
    };

    name_rows
        .into_iter()
        .map(|row| matrix.cell(row, column))
        .filter(|cell| !normalize_name(cell).is_empty())
        .collect()
}

/// Revenue implied by the commission paid when the sheet has no revenue figures.
fn implied_revenue(percent_rate: Option<f64>, percent_amount: f64) -> f64 {
    match percent_rate {
        Some(rate) if rate != 0.0 => {
            let revenue = percent_amount / (rate / 100.0);
            if revenue.is_finite() {
                revenue
            } else {
                percent_amount
            }
        }
        _ => percent_amount,
    }
}

fn round_breakdown(row: EarningsBreakdown) -> EarningsBreakdown {
    EarningsBreakdown {
        base: round_currency(row.base),
        percent: round_currency(row.percent),
        total: round_currency(row.total),
        ..row
    }
}

/// Grand totals are summed from the already rounded rows.
fn sum_rows(rows: &[EarningsBreakdown]) -> PayrollTotals {
    let sum = rows.iter().fold(PayrollTotals::default(), |acc, row| PayrollTotals {
        base: acc.base + row.base,
        percent: acc.percent + row.percent,
        total: acc.total + row.total,
    });

    PayrollTotals {
        base: round_currency(sum.base),
        percent: round_currency(sum.percent),
        total: round_currency(sum.total),
    }
}

/// Running per-employee accumulators, kept in first-seen order.
struct EarningsLedger<'r> {
    roster_by_name: HashMap<String, &'r Employee>,
    rows: Vec<EarningsBreakdown>,
    index: HashMap<EmployeeKey, usize>,
    unmatched_names: Vec<String>,
}

impl<'r> EarningsLedger<'r> {
    fn new(roster: &'r [Employee]) -> Self {
        let roster_by_name = roster
            .iter()
            .map(|employee| (normalize_text(&employee.name), employee))
            .collect();

        Self {
            roster_by_name,
            rows: Vec::new(),
            index: HashMap::new(),
            unmatched_names: Vec::new(),
        }
    }

    fn add_earnings(&mut self, raw_name: &CellValue, base: f64, percent: f64) {
        let normalized = normalize_name(raw_name);
        if normalized.is_empty() {
            return;
        }

        let (key, name) = match self.roster_by_name.get(&normalized) {
            Some(employee) => (employee.key(), employee.name.clone()),
            None => {
                let formatted = format_name(raw_name);
                if !self.unmatched_names.contains(&formatted) {
                    self.unmatched_names.push(formatted.clone());
                }
                (EmployeeKey::Unmatched(normalized), formatted)
            }
        };

        let position = match self.index.get(&key) {
            Some(position) => *position,
            None => {
                self.rows.push(EarningsBreakdown::new(key.clone(), &name));
                self.index.insert(key, self.rows.len() - 1);
                self.rows.len() - 1
            }
        };

        if let Some(row) = self.rows.get_mut(position) {
            row.add(base, percent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::location::RowLayout;
    use crate::test_support::{
        assert_close, multi_location, multi_matrix, roster, single_location, single_matrix,
    };

    fn run(config: &LocationConfig, matrix: &ValueMatrix) -> LocationResult {
        aggregate(config, "Payroll", "'Payroll'!B:K", matrix, &roster()).result
    }

    fn row_for<'r>(result: &'r LocationResult, id: &str) -> &'r EarningsBreakdown {
        let key = EmployeeKey::Roster(id.to_string());
        result
            .rows
            .iter()
            .find(|row| row.employee_key == key)
            .unwrap()
    }

    #[test]
    fn single_mode_accumulates_per_roster_employee() {
        let matrix = single_matrix(
            &[1500.0, 1500.0, 1500.0, 1000.0],
            &[120.5, 80.25, 0.0, 45.25],
            &["Анна Петрова", "Костя Сидоров", "", "  анна   ПЕТРОВА "],
            &[],
        );

        let result = run(&single_location(), &matrix);

        assert_eq!(result.rows.len(), 2);
        let anna = row_for(&result, "lig-anna");
        assert_eq!(anna.name, "Анна Петрова");
        assert_eq!(anna.base, 2500.0);
        assert_eq!(anna.percent, 165.8);
        assert_eq!(anna.total, 2665.8);

        let kostya = row_for(&result, "lig-kostya");
        assert_eq!(kostya.base, 1500.0);
        assert_eq!(kostya.percent, 80.3);
        assert_eq!(kostya.total, 1580.3);
    }

    #[test]
    fn single_mode_totals_equal_base_plus_percent() {
        let matrix = single_matrix(
            &[1500.0, 1500.0, 1200.0, 1000.0],
            &[120.5, 80.25, 64.0, 45.25],
            &["Анна Петрова", "Костя Сидоров", "Лера Фомина", "Анна Петрова"],
            &[],
        );

        let result = run(&single_location(), &matrix);

        let base: f64 = result.rows.iter().map(|row| row.base).sum();
        let percent: f64 = result.rows.iter().map(|row| row.percent).sum();
        let total: f64 = result.rows.iter().map(|row| row.total).sum();
        assert_close(total, base + percent);
        assert_close(result.totals.base, 5200.0);
        assert_close(result.totals.percent, 165.8 + 80.3 + 64.0);
        assert_close(result.totals.total, result.totals.base + result.totals.percent);
    }

    #[test]
    fn multi_mode_splits_percent_and_replicates_base() {
        let matrix = multi_matrix(
            &[100.0],
            &[30.0],
            &["Анна Петрова"],
            &["Костя Сидоров"],
            &[300.0],
        );

        let result = run(&multi_location(), &matrix);

        assert_eq!(result.rows.len(), 2);
        for row in &result.rows {
            assert_eq!(row.base, 100.0);
            assert_eq!(row.percent, 15.0);
            assert_eq!(row.total, 115.0);
        }
        assert_eq!(result.totals.base, 200.0);
        assert_eq!(result.totals.percent, 30.0);
        assert_eq!(result.revenue_total, 300.0);
    }

    #[test]
    fn multi_mode_single_participant_keeps_whole_percent() {
        let matrix = multi_matrix(&[100.0], &[30.0], &[""], &["Лера Фомина"], &[]);

        let result = run(&multi_location(), &matrix);

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].employee_key, EmployeeKey::Roster("lig-lera".into()));
        assert_eq!(result.rows[0].percent, 30.0);
        assert_eq!(result.rows[0].total, 130.0);
    }

    #[test]
    fn idle_columns_contribute_nothing() {
        let single = single_matrix(
            &[1500.0, 1500.0],
            &[100.0, 100.0],
            &["Анна Петрова", ""],
            &[1000.0, 2000.0],
        );
        let result = run(&single_location(), &single);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.totals.total, 1600.0);
        assert_eq!(result.revenue_total, 1000.0);

        let multi = multi_matrix(
            &[100.0, 100.0],
            &[30.0, 30.0],
            &["", "Анна Петрова"],
            &["  ", ""],
            &[500.0, 700.0],
        );
        let result = run(&multi_location(), &multi);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.totals.total, 130.0);
        assert_eq!(result.revenue_total, 700.0);
    }

    #[test]
    fn non_text_name_cells_are_skipped() {
        let matrix = ValueMatrix::new(
            (0..9)
                .map(|row| match row {
                    0 => vec![1500.0.into()],
                    1 => vec![10.0.into()],
                    7 => vec![CellValue::Number(42.0)],
                    _ => Vec::new(),
                })
                .collect(),
        );

        let aggregation =
            aggregate(&single_location(), "Payroll", "B:K", &matrix, &roster());

        assert!(aggregation.result.rows.is_empty());
        assert!(aggregation.unmatched_names.is_empty());
    }

    #[test]
    fn unmatched_name_variants_share_one_synthetic_row() {
        let matrix = single_matrix(
            &[1000.0, 1000.0],
            &[10.0, 20.0],
            &["Иван Петров", "  иван   ПЕТРОВ "],
            &[],
        );

        let aggregation =
            aggregate(&single_location(), "Payroll", "B:K", &matrix, &roster());
        let result = aggregation.result;

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.employee_key, EmployeeKey::Unmatched("иван петров".into()));
        assert_eq!(row.employee_key.to_string(), "custom:иван петров");
        assert_eq!(row.name, "Иван Петров");
        assert_eq!(row.base, 2000.0);
        assert_eq!(row.percent, 30.0);
        assert_eq!(row.total, 2030.0);
        assert!(aggregation.unmatched_names.contains(&"Иван Петров".to_string()));
    }

    #[test]
    fn rows_are_rounded_before_totals_are_summed() {
        let matrix = single_matrix(
            &[0.0, 0.0],
            &[0.04, 0.04],
            &["Анна Петрова", "Костя Сидоров"],
            &[],
        );

        let result = run(&single_location(), &matrix);

        assert_eq!(result.rows[0].percent, 0.0);
        assert_eq!(result.rows[1].percent, 0.0);
        assert_eq!(result.totals.percent, 0.0);
        assert_eq!(result.totals.total, 0.0);
    }

    #[test]
    fn accumulated_amounts_round_to_one_decimal() {
        let matrix = single_matrix(&[0.0], &[12.345], &["Анна Петрова"], &[]);

        let result = run(&single_location(), &matrix);

        assert_eq!(result.rows[0].percent, 12.3);
        assert_eq!(result.rows[0].total, 12.3);
    }

    #[test]
    fn empty_matrix_yields_zero_result() {
        let result = run(&single_location(), &ValueMatrix::default());

        assert!(result.rows.is_empty());
        assert_eq!(result.totals, PayrollTotals::default());
        assert_eq!(result.revenue_total, 0.0);
        assert_eq!(result.row_count, None);
    }

    #[test]
    fn aggregation_is_idempotent_apart_from_timestamp() {
        let matrix = single_matrix(
            &[1500.0, 1500.0],
            &[99.9, 12.34],
            &["Анна Петрова", "Незнакомец"],
            &[800.0, 400.0],
        );

        let first = run(&single_location(), &matrix);
        let mut second = run(&single_location(), &matrix);
        second.fetched_at = first.fetched_at;

        assert_eq!(first, second);
    }

    #[test]
    fn rows_keep_first_seen_order() {
        let matrix = single_matrix(
            &[1.0, 1.0, 1.0],
            &[0.0, 0.0, 0.0],
            &["Костя Сидоров", "Анна Петрова", "Костя Сидоров"],
            &[],
        );

        let result = run(&single_location(), &matrix);

        let keys: Vec<String> = result.rows.iter().map(|row| row.employee_key.to_string()).collect();
        assert_eq!(keys, vec!["lig-kostya", "lig-anna"]);
    }

    #[test]
    fn text_amounts_and_short_rows_degrade_gracefully() {
        let matrix = ValueMatrix::new(
            (0..9)
                .map(|row| match row {
                    0 => vec!["1500,5".into(), "oops".into(), 700.0.into()],
                    1 => vec!["10,25".into()],
                    7 => vec!["Анна Петрова".into(), "Анна Петрова".into(), "Анна Петрова".into()],
                    _ => Vec::new(),
                })
                .collect(),
        );

        let result = run(&single_location(), &matrix);

        assert_eq!(result.rows[0].base, 2200.5);
        assert_eq!(result.rows[0].percent, 10.3);
        assert_eq!(result.row_count, Some(9));
    }

    #[test]
    fn revenue_falls_back_to_percent_rate() {
        let mut location = single_location();
        location.layout = RowLayout {
            revenue_row: None,
            ..RowLayout::single()
        };
        let matrix = single_matrix(
            &[0.0, 0.0],
            &[100.0, 50.0],
            &["Анна Петрова", "Костя Сидоров"],
            &[],
        );

        location.percent_rate = Some(10.0);
        assert_close(run(&location, &matrix).revenue_total, 1500.0);

        location.percent_rate = Some(0.0);
        assert_eq!(run(&location, &matrix).revenue_total, 150.0);

        location.percent_rate = None;
        assert_eq!(run(&location, &matrix).revenue_total, 150.0);
    }

    #[test]
    fn revenue_row_takes_precedence_over_rate() {
        let mut location = single_location();
        location.percent_rate = Some(10.0);
        let matrix = single_matrix(
            &[0.0, 0.0],
            &[100.0, 50.0],
            &["Анна Петрова", "Костя Сидоров"],
            &[4000.0, 2500.0],
        );

        assert_eq!(run(&location, &matrix).revenue_total, 6500.0);
    }

    #[test]
    fn implied_revenue_guards_non_finite_results() {
        assert_eq!(implied_revenue(Some(f64::MIN_POSITIVE), f64::MAX), f64::MAX);
        assert_close(implied_revenue(Some(20.0), 40.0), 200.0);
    }
}
