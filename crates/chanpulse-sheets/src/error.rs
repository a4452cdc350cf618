use thiserror::Error;

/// Errors returned by spreadsheet backends.
///
/// Access-level failures (`PermissionDenied`, `AuthFailed`, `RateLimited`)
/// are kept as distinct variants so the orchestrator can classify them once
/// at the tenant boundary.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Sheets API rejected the request (non-2xx outside the mapped kinds).
    #[error("Sheets API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP 403 — the service account cannot access the spreadsheet.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// HTTP 401 — the bearer token is missing, expired, or invalid.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// HTTP 429 — the per-minute API quota is exhausted.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A worksheet named in the request does not exist in the spreadsheet.
    #[error("worksheet not found: {0}")]
    MissingSheet(String),

    /// A tenant row carries a URL that is not a spreadsheet URL.
    #[error("invalid spreadsheet URL: {0}")]
    InvalidSpreadsheetUrl(String),
}
