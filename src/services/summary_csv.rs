//! Semicolon separated export of a [`PayrollSummary`] for spreadsheet apps
//! that expect a decimal comma.

use std::io::{self, Write};

use crate::services::summary::PayrollSummary;

const SEPARATOR: &str = ";";

enum CsvCell {
    Text(String),
    Number(f64),
}

pub fn write_summary_csv<W: Write>(writer: &mut W, summary: &PayrollSummary) -> io::Result<()> {
    writer.write_all(format_summary_csv(summary).as_bytes())
}

pub fn format_summary_csv(summary: &PayrollSummary) -> String {
    let mut records: Vec<Vec<CsvCell>> = Vec::with_capacity(summary.rows.len() + 2);

    let mut header = vec![CsvCell::Text("Employee".to_string())];
    header.extend(
        summary
            .columns
            .iter()
            .map(|column| CsvCell::Text(column.title.clone())),
    );
    header.extend([
        CsvCell::Text("Bonus".to_string()),
        CsvCell::Text("Total".to_string()),
        CsvCell::Text("Note".to_string()),
    ]);
    records.push(header);

    for row in &summary.rows {
        let mut record = vec![CsvCell::Text(row.name.clone())];
        record.extend(
            summary
                .columns
                .iter()
                .map(|column| CsvCell::Number(row.location_total(&column.location_id))),
        );
        record.extend([
            CsvCell::Number(row.adjustment.amount),
            CsvCell::Number(row.total_with_bonus()),
            CsvCell::Text(row.adjustment.note.clone()),
        ]);
        records.push(record);
    }

    let mut footer = vec![CsvCell::Text("Total".to_string())];
    footer.extend(
        summary
            .columns
            .iter()
            .map(|column| CsvCell::Number(summary.totals.location_total(&column.location_id))),
    );
    footer.extend([
        CsvCell::Number(summary.totals.bonus),
        CsvCell::Number(summary.totals.with_bonus()),
        CsvCell::Text(String::new()),
    ]);
    records.push(footer);

    records
        .iter()
        .map(|record| {
            record
                .iter()
                .map(format_cell)
                .collect::<Vec<_>>()
                .join(SEPARATOR)
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

fn format_cell(cell: &CsvCell) -> String {
    match cell {
        CsvCell::Number(value) => value.to_string().replace('.', ","),
        CsvCell::Text(text) => {
            let needs_quotes = text.contains(['"', ',', ';', '\n']);
            let escaped = text.replace('"', "\"\"");
            if needs_quotes {
                format!("\"{escaped}\"")
            } else {
                escaped
            }
        }
    }
}
