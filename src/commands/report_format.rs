use crate::domain::payroll::EarningsBreakdown;
use crate::services::amounts::format_currency;
use crate::services::payroll_aggregator::Aggregation;
use crate::services::revenue_stats::{RevenueStats, format_share};

pub fn format_location_report(aggregation: &Aggregation) -> String {
    let result = &aggregation.result;
    let row_count = match result.row_count {
        Some(value) => value.to_string(),
        None => "n/a".to_string(),
    };

    let mut lines = Vec::new();
    lines.push(format!("Location: {} ({})", result.location_title, result.location_id));
    lines.push(format!("Sheet: {} {}", result.sheet_title, result.range));
    lines.push(format!("Rows read: {row_count}"));
    lines.push(format!("Fetched at: {}", result.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")));
    lines.push(String::new());
    lines.push("Employee | Base | Percent | Total".to_string());
    lines.push("---------|------|---------|------".to_string());
    for row in &result.rows {
        lines.push(format_earnings_row(row));
    }
    lines.push(format!(
        "Total | {} | {} | {}",
        format_currency(result.totals.base),
        format_currency(result.totals.percent),
        format_currency(result.totals.total)
    ));
    lines.push(format!("Revenue: {}", format_currency(result.revenue_total)));

    if !aggregation.unmatched_names.is_empty() {
        lines.push(format!("Not in roster: {}", aggregation.unmatched_names.join(", ")));
    }

    lines.join("\n")
}

fn format_earnings_row(row: &EarningsBreakdown) -> String {
    format!(
        "{name} | {base} | {percent} | {total}",
        name = row.name,
        base = format_currency(row.base),
        percent = format_currency(row.percent),
        total = format_currency(row.total)
    )
}

pub fn format_revenue_report(stats: &RevenueStats) -> String {
    let mut lines = Vec::new();
    lines.push("Revenue Report".to_string());
    lines.push("Location | Revenue | Percent share | Wage share".to_string());
    lines.push("---------|---------|---------------|-----------".to_string());
    for location in &stats.locations {
        lines.push(format!(
            "{} | {} | {} | {}",
            location.title,
            format_currency(location.revenue),
            format_share(location.percent_share),
            format_share(location.wage_share)
        ));
    }
    lines.push(format!(
        "All locations | {} | {} | {}",
        format_currency(stats.revenue),
        format_share(stats.percent_share),
        format_share(stats.wage_share)
    ));

    lines.join("\n")
}
