use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::employee::EmployeeKey;
use crate::services::summary::BonusAdjustment;

#[derive(Error, Debug)]
pub enum AdjustmentsYamlError {
    #[error("failed to read adjustments file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse adjustments yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Loads per-employee bonus adjustments keyed by employee key, e.g.
///
/// ```yaml
/// lig-anna: { amount: 2500, note: covered night shifts }
/// "custom:ivan petrov": { amount: 0, note: trial week }
/// ```
pub fn load_adjustments_from_yaml_file<P: AsRef<Path>>(
    path: P,
) -> Result<HashMap<EmployeeKey, BonusAdjustment>, AdjustmentsYamlError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| AdjustmentsYamlError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_adjustments_from_yaml_str(&contents)
}

pub fn deserialize_adjustments_from_yaml_str(
    input: &str,
) -> Result<HashMap<EmployeeKey, BonusAdjustment>, AdjustmentsYamlError> {
    if input.trim().is_empty() {
        return Ok(HashMap::new());
    }
    Ok(serde_yaml::from_str(input)?)
}
