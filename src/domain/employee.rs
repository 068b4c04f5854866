use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix used when an unmatched name is written out as a plain string key.
pub const UNMATCHED_KEY_PREFIX: &str = "custom:";

#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub bonus: f64,
}

impl Employee {
    pub fn new(id: &str, name: &str, bonus: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            bonus,
        }
    }

    pub fn key(&self) -> EmployeeKey {
        EmployeeKey::Roster(self.id.clone())
    }
}

/// Identity of a payroll row: either a roster employee or a name that was
/// found in the sheet but not in the roster (stored in normalized form).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EmployeeKey {
    Roster(String),
    Unmatched(String),
}

impl fmt::Display for EmployeeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeKey::Roster(id) => write!(f, "{id}"),
            EmployeeKey::Unmatched(normalized) => write!(f, "{UNMATCHED_KEY_PREFIX}{normalized}"),
        }
    }
}

impl From<EmployeeKey> for String {
    fn from(key: EmployeeKey) -> Self {
        key.to_string()
    }
}

impl From<String> for EmployeeKey {
    fn from(value: String) -> Self {
        match value.strip_prefix(UNMATCHED_KEY_PREFIX) {
            Some(normalized) => EmployeeKey::Unmatched(normalized.to_string()),
            None => EmployeeKey::Roster(value),
        }
    }
}
