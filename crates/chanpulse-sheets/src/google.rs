//! Google Sheets v4 REST backend.
//!
//! Thin wrapper over `reqwest` with bearer-token auth and typed error
//! mapping. Only the handful of operations the pipeline needs are exposed;
//! everything goes through [`SheetStore`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;

use crate::{SheetStore, SheetsError};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Sheets v4 client.
///
/// Use [`GoogleSheets::new`] in production or [`GoogleSheets::with_base_url`]
/// to point at a mock server in tests.
pub struct GoogleSheets {
    client: Client,
    base_url: Url,
    token: String,
}

#[derive(Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId")]
    sheet_id: i64,
    title: String,
    #[serde(rename = "gridProperties", default)]
    grid: GridProperties,
}

#[derive(Deserialize, Default)]
struct GridProperties {
    #[serde(rename = "columnCount", default)]
    column_count: usize,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl GoogleSheets {
    /// Creates a client pointed at the production Sheets API.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, timeout_secs: u64) -> Result<Self, SheetsError> {
        Self::with_base_url(token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the client cannot be constructed, or
    /// [`SheetsError::Api`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("chanpulse/0.1 (content-intelligence)")
            .build()?;

        let base_url =
            Url::parse(base_url.trim_end_matches('/')).map_err(|e| SheetsError::Api {
                status: 0,
                message: format!("invalid base URL '{base_url}': {e}"),
            })?;

        Ok(Self {
            client,
            base_url,
            token: token.to_owned(),
        })
    }

    /// Builds `{base}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            // The base URL is always a valid non-cannot-be-a-base URL.
            let mut path = url.path_segments_mut().expect("base URL has a path");
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<T, SheetsError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SheetsError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    async fn post_json(&self, url: Url, body: &serde_json::Value) -> Result<(), SheetsError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Maps non-2xx responses to the closed error kinds the orchestrator
    /// dispatches on.
    async fn check_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&raw)
            .map(|e| e.error.message)
            .unwrap_or(raw);
        Err(match status.as_u16() {
            401 => SheetsError::AuthFailed(message),
            403 => SheetsError::PermissionDenied(message),
            429 => SheetsError::RateLimited(message),
            // A range referencing an absent worksheet comes back as a 400.
            400 if message.contains("Unable to parse range") => {
                SheetsError::MissingSheet(message)
            }
            s => SheetsError::Api { status: s, message },
        })
    }

    /// Looks up the numeric sheet id and current column count for a title.
    async fn sheet_properties(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
    ) -> Result<(i64, usize), SheetsError> {
        let mut url = self.endpoint(&[spreadsheet_id]);
        url.query_pairs_mut().append_pair("fields", "sheets.properties");
        let meta: SpreadsheetMeta = self.get_json(url).await?;
        meta.sheets
            .into_iter()
            .find(|s| s.properties.title == sheet)
            .map(|s| (s.properties.sheet_id, s.properties.grid.column_count))
            .ok_or_else(|| SheetsError::MissingSheet(sheet.to_string()))
    }
}

/// A1 range for a whole worksheet, with the title quoted.
fn sheet_range(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// A1 range anchored at a row, e.g. `'Лист'!A3`.
fn row_range(sheet: &str, row: usize) -> String {
    format!("{}!A{row}", sheet_range(sheet))
}

/// A1 range for a single cell.
fn cell_range(sheet: &str, row: usize, col: usize) -> String {
    format!("{}!{}{row}", sheet_range(sheet), col_letter(col))
}

/// 1-indexed column number to A1 letters: 1 → A, 27 → AA.
fn col_letter(mut col: usize) -> String {
    debug_assert!(col >= 1);
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + u8::try_from(rem).unwrap_or(0));
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn stringify_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl SheetStore for GoogleSheets {
    async fn read_all(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.endpoint(&[spreadsheet_id, "values", &sheet_range(sheet)]);
        let response: ValuesResponse = self.get_json(url).await?;
        Ok(response
            .values
            .iter()
            .map(|row| row.iter().map(stringify_cell).collect())
            .collect())
    }

    async fn update_rows(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        start_row: usize,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut url = self.endpoint(&[spreadsheet_id, "values", &row_range(sheet, start_row)]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW");
        let body = json!({ "values": rows });
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn update_cell(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), SheetsError> {
        let mut url =
            self.endpoint(&[spreadsheet_id, "values", &cell_range(sheet, row, col)]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW");
        let body = json!({ "values": [[value]] });
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn insert_rows_at(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        at_row: usize,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        if rows.is_empty() {
            return Ok(());
        }
        let (sheet_id, _) = self.sheet_properties(spreadsheet_id, sheet).await?;
        let url = self.endpoint(&[&format!("{spreadsheet_id}:batchUpdate")]);
        let body = json!({
            "requests": [{
                "insertDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": at_row - 1,
                        "endIndex": at_row - 1 + rows.len(),
                    },
                    "inheritFromBefore": false,
                }
            }]
        });
        self.post_json(url, &body).await?;
        self.update_rows(spreadsheet_id, sheet, at_row, rows).await
    }

    async fn clear(&self, spreadsheet_id: &str, sheet: &str) -> Result<(), SheetsError> {
        let url = self.endpoint(&[
            spreadsheet_id,
            "values",
            &format!("{}:clear", sheet_range(sheet)),
        ]);
        self.post_json(url, &json!({})).await
    }

    async fn ensure_columns(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        min_cols: usize,
    ) -> Result<(), SheetsError> {
        let (sheet_id, current) = self.sheet_properties(spreadsheet_id, sheet).await?;
        if current >= min_cols {
            return Ok(());
        }
        let url = self.endpoint(&[&format!("{spreadsheet_id}:batchUpdate")]);
        let body = json!({
            "requests": [{
                "appendDimension": {
                    "sheetId": sheet_id,
                    "dimension": "COLUMNS",
                    "length": min_cols - current,
                }
            }]
        });
        self.post_json(url, &body).await
    }
}
