use crate::domain::employee::Employee;
use crate::domain::location::{LocationConfig, RowLayout};
use crate::domain::value_matrix::{CellValue, ValueMatrix};

pub fn roster() -> Vec<Employee> {
    vec![
        Employee::new("lig-anna", "Анна Петрова", 5000.0),
        Employee::new("lig-kostya", "Костя Сидоров", 0.0),
        Employee::new("lig-lera", "Лера Фомина", 0.0),
    ]
}

pub fn single_location() -> LocationConfig {
    LocationConfig::new("ligovka", "Лиговский пр., 45")
}

pub fn multi_location() -> LocationConfig {
    let mut location = LocationConfig::new("holland", "Новая Голландия");
    location.multiple_participants = true;
    location.layout = RowLayout::multi();
    location
}

pub fn name_cell(name: &str) -> CellValue {
    if name.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(name.to_string())
    }
}

/// Builds a matrix in the default single-participant layout: base in row 0,
/// percent in row 1, names in row 7 and revenue in row 8.
pub fn single_matrix(base: &[f64], percent: &[f64], names: &[&str], revenue: &[f64]) -> ValueMatrix {
    let mut rows = vec![Vec::new(); 9];
    rows[0] = base.iter().map(|value| CellValue::Number(*value)).collect();
    rows[1] = percent.iter().map(|value| CellValue::Number(*value)).collect();
    rows[7] = names.iter().map(|name| name_cell(name)).collect();
    rows[8] = revenue.iter().map(|value| CellValue::Number(*value)).collect();
    ValueMatrix::new(rows)
}

/// Same as [`single_matrix`] for the multi-participant layout: names in rows
/// 7 and 8, revenue in row 9.
pub fn multi_matrix(
    base: &[f64],
    percent: &[f64],
    first_names: &[&str],
    second_names: &[&str],
    revenue: &[f64],
) -> ValueMatrix {
    let mut rows = vec![Vec::new(); 10];
    rows[0] = base.iter().map(|value| CellValue::Number(*value)).collect();
    rows[1] = percent.iter().map(|value| CellValue::Number(*value)).collect();
    rows[7] = first_names.iter().map(|name| name_cell(name)).collect();
    rows[8] = second_names.iter().map(|name| name_cell(name)).collect();
    rows[9] = revenue.iter().map(|value| CellValue::Number(*value)).collect();
    ValueMatrix::new(rows)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
