use crate::domain::value_matrix::CellValue;

/// Shown for names that are blank or not text at all.
pub const UNNAMED_PLACEHOLDER: &str = "No name";

/// Canonical form used to compare names: trimmed, lowercased, inner
/// whitespace runs collapsed to one space. Non-text cells give `""`.
pub fn normalize_name(value: &CellValue) -> String {
    match value.as_text() {
        Some(text) => normalize_text(text),
        None => String::new(),
    }
}

pub fn normalize_text(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Presentable name for a sheet value that has no roster match.
pub fn format_name(value: &CellValue) -> String {
    let Some(text) = value.as_text() else {
        return UNNAMED_PLACEHOLDER.to_string();
    };

    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return UNNAMED_PLACEHOLDER.to_string();
    }

    lower
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
