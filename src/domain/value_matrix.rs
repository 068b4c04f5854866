use serde::Deserialize;
use serde_json::Value;

/// Raw cell content exactly as the spreadsheet returned it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(number) => number.as_f64().map_or(CellValue::Empty, CellValue::Number),
            Value::String(text) => CellValue::Text(text),
            Value::Bool(flag) => CellValue::Boolean(flag),
            Value::Null | Value::Array(_) | Value::Object(_) => CellValue::Empty,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// Cells indexed `[row][column]`. Rows may be ragged; anything outside the
/// stored cells reads as [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ValueMatrix {
    rows: Vec<Vec<CellValue>>,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl ValueMatrix {
    #[cfg(test)]
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Number of columns, taken from the length of `row`; 0 if that row is missing.
    pub fn column_count(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cells_read_as_empty() {
        let matrix = ValueMatrix::new(vec![vec![1.0.into(), 2.0.into()], vec!["a".into()]]);
        assert_eq!(matrix.cell(1, 1), &CellValue::Empty);
        assert_eq!(matrix.cell(5, 0), &CellValue::Empty);
        assert_eq!(matrix.cell(0, 1), &CellValue::Number(2.0));
    }

    #[test]
    fn column_count_follows_requested_row() {
        let matrix = ValueMatrix::new(vec![vec![1.0.into(), 2.0.into(), 3.0.into()], vec![]]);
        assert_eq!(matrix.column_count(0), 3);
        assert_eq!(matrix.column_count(1), 0);
        assert_eq!(matrix.column_count(9), 0);
    }

    #[test]
    fn deserializes_mixed_json_cells() {
        let matrix: ValueMatrix =
            serde_json::from_str(r#"[[1500, "2,5", null, true, {"x": 1}]]"#).unwrap();
        assert_eq!(matrix.cell(0, 0), &CellValue::Number(1500.0));
        assert_eq!(matrix.cell(0, 1), &CellValue::Text("2,5".into()));
        assert_eq!(matrix.cell(0, 2), &CellValue::Empty);
        assert_eq!(matrix.cell(0, 3), &CellValue::Boolean(true));
        assert_eq!(matrix.cell(0, 4), &CellValue::Empty);
    }
}
