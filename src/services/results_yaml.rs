use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::payroll::LocationResult;

#[derive(Error, Debug)]
pub enum ResultsYamlError {
    #[error("failed to read results file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse results yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub fn serialize_results_to_yaml<W: Write>(writer: &mut W, results: &[LocationResult]) -> io::Result<()> {
    let yaml = serde_yaml::to_string(results).map_err(io::Error::other)?;
    writer.write_all(yaml.as_bytes())
}

pub fn load_results_from_yaml_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<LocationResult>, ResultsYamlError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ResultsYamlError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_results_from_yaml_str(&contents)
}

pub fn deserialize_results_from_yaml_str(input: &str) -> Result<Vec<LocationResult>, ResultsYamlError> {
    Ok(serde_yaml::from_str(input)?)
}
