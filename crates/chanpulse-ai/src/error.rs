use thiserror::Error;

/// Errors returned by the generative-AI clients.
///
/// Quota, permission, and authentication failures are distinct variants —
/// the orchestrator classifies them into tenant-fatal categories.
#[derive(Debug, Error)]
pub enum AiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429 — provider quota or rate limit exhausted.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// HTTP 401 — API key missing, expired, or invalid.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// HTTP 403 — the key is valid but not allowed to use this resource.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Any other non-2xx response.
    #[error("AI API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The completion came back without any content.
    #[error("completion contained no choices")]
    EmptyCompletion,

    /// The structured-analysis reply held no parsable JSON object.
    #[error("analysis reply is not valid JSON: {0}")]
    AnalysisParse(String),

    /// The indexing task reached the `failed` terminal state.
    #[error("video indexing failed with status: {0}")]
    IndexingFailed(String),

    /// The indexing task did not reach a terminal state within the allotted polls.
    #[error("video indexing still pending after {attempts} polls")]
    PollTimeout { attempts: u32 },
}
