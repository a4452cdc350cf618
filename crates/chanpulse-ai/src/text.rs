//! Chat-completions client for the text-generation provider.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::AiError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for the text-generation REST API (chat-completions shape).
pub struct TextClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl TextClient {
    /// Creates a client pointed at the production text API.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, AiError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the client cannot be constructed, or
    /// [`AiError::ApiError`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("chanpulse/0.1 (content-intelligence)")
            .build()?;

        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            AiError::ApiError {
                status: 0,
                message: format!("invalid base URL '{base_url}': {e}"),
            }
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_owned(),
        })
    }

    /// Runs one completion: a system role plus a single user prompt.
    ///
    /// Returns the first choice's content.
    ///
    /// # Errors
    ///
    /// - [`AiError::QuotaExceeded`] / [`AiError::AuthFailed`] /
    ///   [`AiError::PermissionDenied`] for the mapped HTTP statuses.
    /// - [`AiError::ApiError`] for any other non-2xx response.
    /// - [`AiError::EmptyCompletion`] when the reply holds no choices.
    /// - [`AiError::Http`] / [`AiError::Deserialize`] for transport and
    ///   shape failures.
    pub async fn complete(
        &self,
        model: &str,
        system_role: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, AiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .expect("base URL has a path")
            .push("chat")
            .push("completions");

        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_role,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature,
        };

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AiError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(AiError::EmptyCompletion)?;

        Ok(content)
    }
}

/// Maps non-2xx responses to the closed error kinds the orchestrator
/// dispatches on. Shared by both AI clients.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, AiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let raw = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&raw)
        .map(|e| e.error.message)
        .unwrap_or(raw);
    Err(match status.as_u16() {
        401 => AiError::AuthFailed(message),
        403 => AiError::PermissionDenied(message),
        429 => AiError::QuotaExceeded(message),
        s => AiError::ApiError { status: s, message },
    })
}
