//! Spreadsheet access for the chanpulse pipeline.
//!
//! The pipeline talks to worksheets through the [`SheetStore`] trait. Two
//! implementations exist: [`GoogleSheets`] backed by the Sheets v4 REST API,
//! and [`MemorySheets`], an in-process test double.

mod error;
mod google;
mod memory;
mod store;

pub use error::SheetsError;
pub use google::GoogleSheets;
pub use memory::MemorySheets;
pub use store::SheetStore;

/// Extract the spreadsheet id from a full spreadsheet URL.
///
/// Accepts the canonical `https://docs.google.com/spreadsheets/d/<id>/...`
/// shape. Anything else is rejected — tenant rows carry full URLs, and a
/// malformed one is a tenant configuration error.
///
/// # Errors
///
/// Returns [`SheetsError::InvalidSpreadsheetUrl`] if the URL does not parse
/// or does not contain a `/spreadsheets/d/<id>` path.
pub fn spreadsheet_id_from_url(url: &str) -> Result<String, SheetsError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|_| SheetsError::InvalidSpreadsheetUrl(url.to_string()))?;
    let mut segments = parsed
        .path_segments()
        .ok_or_else(|| SheetsError::InvalidSpreadsheetUrl(url.to_string()))?;
    while let Some(segment) = segments.next() {
        if segment == "d" {
            return match segments.next() {
                Some(id) if !id.is_empty() => Ok(id.to_string()),
                _ => Err(SheetsError::InvalidSpreadsheetUrl(url.to_string())),
            };
        }
    }
    Err(SheetsError::InvalidSpreadsheetUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreadsheet_id_from_canonical_url() {
        let id = spreadsheet_id_from_url(
            "https://docs.google.com/spreadsheets/d/1AbC_dEf-123/edit#gid=0",
        )
        .unwrap();
        assert_eq!(id, "1AbC_dEf-123");
    }

    #[test]
    fn spreadsheet_id_without_trailing_path() {
        let id =
            spreadsheet_id_from_url("https://docs.google.com/spreadsheets/d/xyz").unwrap();
        assert_eq!(id, "xyz");
    }

    #[test]
    fn spreadsheet_id_rejects_plain_string() {
        let result = spreadsheet_id_from_url("not a url");
        assert!(matches!(result, Err(SheetsError::InvalidSpreadsheetUrl(_))));
    }

    #[test]
    fn spreadsheet_id_rejects_url_without_d_segment() {
        let result = spreadsheet_id_from_url("https://docs.google.com/spreadsheets/x/abc");
        assert!(matches!(result, Err(SheetsError::InvalidSpreadsheetUrl(_))));
    }
}
