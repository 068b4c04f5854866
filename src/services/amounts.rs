use crate::domain::value_matrix::CellValue;

const GROUP_SEPARATOR: char = '\u{a0}';
const DECIMAL_SEPARATOR: char = ',';

/// Reads a money amount from a cell. Text accepts a decimal comma; anything
/// that does not parse to a finite number counts as 0.
pub fn parse_number(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(number) => *number,
        CellValue::Text(text) => {
            let normalized = text.replacen(',', ".", 1);
            let trimmed = normalized.trim();
            if trimmed.is_empty() {
                return 0.0;
            }
            match trimmed.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => parsed,
                _ => 0.0,
            }
        }
        CellValue::Empty | CellValue::Boolean(_) => 0.0,
    }
}

/// Rounds half-up to one decimal place. The epsilon keeps values such as
/// `0.15` (stored as `0.1499...`) on the expected side.
pub fn round_currency(value: f64) -> f64 {
    ((value + f64::EPSILON) * 10.0 + 0.5).floor() / 10.0
}

/// Formats an amount for display: no decimals for whole amounts, one decimal
/// otherwise, digits grouped by thousands.
pub fn format_currency(value: f64) -> String {
    let rounded = round_currency(value);
    // -0.0 would print with a sign
    let value = if rounded == 0.0 { 0.0 } else { rounded };
    let formatted = if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    };

    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut output = String::from(sign);
    output.push_str(&group_thousands(integer));
    if let Some(fraction) = fraction {
        output.push(DECIMAL_SEPARATOR);
        output.push_str(fraction);
    }
    output
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(digit);
    }
    grouped
}
