use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::value_matrix::ValueMatrix;
use crate::services::credentials::CredentialsError;

#[derive(Error, Debug)]
pub enum SheetSourceError {
    #[error("resource not found")]
    NotFound,
    #[error("connection error: {0}")]
    Connection(#[from] reqwest::Error),
    #[error("parse error")]
    Parse,
    #[error("unauthorized")]
    Unauthorized,
    #[error("could not extract spreadsheet id from {0}")]
    InvalidUrl(String),
    #[error("sheet with gid={0} not found")]
    SheetNotFound(i64),
    #[error("sheets api responded with {status}: {message}")]
    Api { status: u16, message: String },
    #[error("credentials error: {0}")]
    Credentials(#[from] CredentialsError),
    #[error("failed to read sheet file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Identifies one tab and column range of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRequest {
    pub spreadsheet_url: String,
    pub gid: i64,
    pub range: String,
}

/// Raw values of one sheet range plus where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSheet {
    pub sheet_title: String,
    pub range: String,
    pub values: ValueMatrix,
}

/// Describes an interface for reading a block of cell values from a spreadsheet.
pub trait SheetSource {
    fn fetch(&self, request: &SheetRequest) -> Result<FetchedSheet, SheetSourceError>;
}
