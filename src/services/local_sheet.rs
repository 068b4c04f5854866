use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::value_matrix::ValueMatrix;
use crate::services::sheet_source::{FetchedSheet, SheetRequest, SheetSource, SheetSourceError};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocalSheetRecord {
    Matrix(ValueMatrix),
    Document(LocalSheetDocument),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalSheetDocument {
    sheet_title: Option<String>,
    range: Option<String>,
    values: ValueMatrix,
}

/// Serves a value matrix saved as JSON, either a bare 2-D array or an object
/// shaped like a Sheets export (`sheetTitle`, `range`, `values`).
pub struct LocalSheetSource {
    path: PathBuf,
}

impl LocalSheetSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn default_title(&self) -> String {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string()
    }
}

impl SheetSource for LocalSheetSource {
    fn fetch(&self, request: &SheetRequest) -> Result<FetchedSheet, SheetSourceError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| SheetSourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let record: LocalSheetRecord =
            serde_json::from_str(&contents).map_err(|_| SheetSourceError::Parse)?;

        let fetched = match record {
            LocalSheetRecord::Matrix(values) => FetchedSheet {
                sheet_title: self.default_title(),
                range: request.range.clone(),
                values,
            },
            LocalSheetRecord::Document(document) => FetchedSheet {
                sheet_title: document.sheet_title.unwrap_or_else(|| self.default_title()),
                range: document.range.unwrap_or_else(|| request.range.clone()),
                values: document.values,
            },
        };
        Ok(fetched)
    }
}
