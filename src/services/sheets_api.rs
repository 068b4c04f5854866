use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::domain::value_matrix::ValueMatrix;
use crate::services::credentials::CredentialStore;
use crate::services::sheet_source::{FetchedSheet, SheetRequest, SheetSource, SheetSourceError};

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";

static SPREADSHEET_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").unwrap());

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetRecord>,
}

#[derive(Debug, Deserialize)]
struct SheetRecord {
    properties: Option<SheetProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: Option<i64>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: ValueMatrix,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Reads sheet ranges through the Google Sheets v4 REST API.
pub struct SheetsApiClient {
    base_url: Url,
    credentials: CredentialStore,
    client: Client,
}

impl SheetsApiClient {
    pub fn new(base_url: &str, credentials: CredentialStore) -> Result<Self, SheetSourceError> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url =
            Url::parse(trimmed).map_err(|_| SheetSourceError::InvalidUrl(base_url.to_string()))?;

        Ok(Self {
            base_url,
            credentials,
            client: Client::new(),
        })
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str, tail: &[&str]) -> Result<Url, SheetSourceError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SheetSourceError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("spreadsheets").push(spreadsheet_id);
            segments.extend(tail);
        }
        Ok(url)
    }

    fn send_get(&self, url: Url, params: &[(&str, &str)]) -> Result<Response, SheetSourceError> {
        let token = self.credentials.access_token(&self.client)?;
        debug!(%url, "requesting sheets api");
        Ok(self
            .client
            .get(url)
            .query(params)
            .bearer_auth(token)
            .send()?)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, &str)],
    ) -> Result<T, SheetSourceError> {
        let mut response = self.send_get(url.clone(), params)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            // stale token: reload credentials and try once more
            warn!(%url, "sheets api rejected access token, retrying");
            self.credentials.invalidate();
            response = self.send_get(url, params)?;
        }

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SheetSourceError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(SheetSourceError::NotFound);
        }
        if !status.is_success() {
            return Err(api_error(status, response));
        }

        response.json::<T>().map_err(|_| SheetSourceError::Parse)
    }

    fn find_sheet_title(&self, spreadsheet_id: &str, gid: i64) -> Result<String, SheetSourceError> {
        let url = self.spreadsheet_url(spreadsheet_id, &[])?;
        let metadata: SpreadsheetMetadata =
            self.get_json(url, &[("fields", "sheets.properties(sheetId,title)")])?;

        metadata
            .sheets
            .into_iter()
            .filter_map(|sheet| sheet.properties)
            .find(|properties| properties.sheet_id == Some(gid))
            .and_then(|properties| properties.title)
            .filter(|title| !title.is_empty())
            .ok_or(SheetSourceError::SheetNotFound(gid))
    }

    fn read_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueMatrix, SheetSourceError> {
        let url = self.spreadsheet_url(spreadsheet_id, &["values", range])?;
        let response: ValuesResponse = self.get_json(
            url,
            &[
                ("valueRenderOption", "UNFORMATTED_VALUE"),
                ("dateTimeRenderOption", "FORMATTED_STRING"),
            ],
        )?;
        Ok(response.values)
    }
}

impl SheetSource for SheetsApiClient {
    fn fetch(&self, request: &SheetRequest) -> Result<FetchedSheet, SheetSourceError> {
        let spreadsheet_id = extract_spreadsheet_id(&request.spreadsheet_url)
            .ok_or_else(|| SheetSourceError::InvalidUrl(request.spreadsheet_url.clone()))?;

        let sheet_title = self.find_sheet_title(spreadsheet_id, request.gid)?;
        let range = qualified_range(&sheet_title, &request.range);
        let values = self.read_values(spreadsheet_id, &range)?;
        info!(
            sheet = %sheet_title,
            range = %range,
            rows = values.row_count(),
            "fetched sheet values"
        );

        Ok(FetchedSheet {
            sheet_title,
            range,
            values,
        })
    }
}

/// Pulls the spreadsheet id out of a `.../spreadsheets/d/<id>/...` link.
pub fn extract_spreadsheet_id(url: &str) -> Option<&str> {
    SPREADSHEET_ID
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

/// A1 range scoped to a tab, e.g. `'Ligovka'!B:K`.
pub fn qualified_range(sheet_title: &str, range: &str) -> String {
    format!("'{}'!{range}", sheet_title.replace('\'', "''"))
}

fn api_error(status: StatusCode, response: Response) -> SheetSourceError {
    let message = response
        .json::<ApiErrorBody>()
        .ok()
        .and_then(|body| body.error)
        .and_then(|detail| detail.message)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "unknown error".to_string());

    SheetSourceError::Api {
        status: status.as_u16(),
        message,
    }
}
