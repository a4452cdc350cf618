//! HTTP client for the analytics REST API.
//!
//! Wraps `reqwest` with provider-specific error handling, token management,
//! and typed response deserialization. All endpoints check the `"status"`
//! field in the JSON envelope and surface API-level errors as
//! [`AnalyticsError::ApiError`].

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Url};

use crate::error::AnalyticsError;
use crate::types::{ChannelInfo, Envelope, PostStats, PostsPage, RawPost};

const DEFAULT_BASE_URL: &str = "https://api.tgstat.ru/";

/// Client for the channel analytics REST API.
///
/// Use [`AnalyticsClient::new`] for production or
/// [`AnalyticsClient::with_base_url`] to point at a mock server in tests.
pub struct AnalyticsClient {
    client: Client,
    token: String,
    base_url: Url,
}

impl AnalyticsClient {
    /// Creates a new client pointed at the production analytics API.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, timeout_secs: u64) -> Result<Self, AnalyticsError> {
        Self::with_base_url(token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AnalyticsError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AnalyticsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("chanpulse/0.1 (content-intelligence)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            AnalyticsError::ApiError(format!("invalid base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url,
        })
    }

    /// Resolves channel metadata for a raw link or id string.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::ApiError`] if the API returns an error status.
    /// - [`AnalyticsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`AnalyticsError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn channel_info(&self, channel: &str) -> Result<ChannelInfo, AnalyticsError> {
        let url = self.build_url("channels/get", &[("channelId", channel)]);
        let body = self.request_json(&url).await?;
        Self::check_api_error(&body)?;

        let envelope: Envelope<ChannelInfo> =
            serde_json::from_value(body).map_err(|e| AnalyticsError::Deserialize {
                context: format!("channels/get(channelId={channel})"),
                source: e,
            })?;

        Ok(envelope.response)
    }

    /// Fetches a channel's posts published within `[date_from, date_to]`.
    ///
    /// The extended payload includes media attachments, which the enrichment
    /// stage needs for video detection.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::ApiError`] if the API returns an error status.
    /// - [`AnalyticsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`AnalyticsError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn channel_posts(
        &self,
        channel_id: i64,
        date_from: NaiveDate,
        date_to: NaiveDate,
        limit: u32,
    ) -> Result<Vec<RawPost>, AnalyticsError> {
        let url = self.build_url(
            "channels/posts",
            &[
                ("channelId", &channel_id.to_string()),
                ("limit", &limit.to_string()),
                ("startDate", &date_from.format("%Y-%m-%d").to_string()),
                ("endDate", &date_to.format("%Y-%m-%d").to_string()),
                ("extended", "1"),
            ],
        );
        let body = self.request_json(&url).await?;
        Self::check_api_error(&body)?;

        let envelope: Envelope<PostsPage> =
            serde_json::from_value(body).map_err(|e| AnalyticsError::Deserialize {
                context: format!("channels/posts(channelId={channel_id})"),
                source: e,
            })?;

        Ok(envelope.response.items)
    }

    /// Fetches engagement counters for one post by its permalink.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::ApiError`] if the API returns an error status
    ///   (callers treat this as "stats unavailable" at post granularity).
    /// - [`AnalyticsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`AnalyticsError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn post_stats(&self, post_link: &str) -> Result<PostStats, AnalyticsError> {
        let url = self.build_url("posts/stat", &[("postId", post_link)]);
        let body = self.request_json(&url).await?;
        Self::check_api_error(&body)?;

        let envelope: Envelope<PostStats> =
            serde_json::from_value(body).map_err(|e| AnalyticsError::Deserialize {
                context: format!("posts/stat(postId={post_link})"),
                source: e,
            })?;

        Ok(envelope.response)
    }

    /// Builds the full request URL with properly percent-encoded query parameters.
    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Url {
        // The base URL is validated at construction; joining a static path
        // cannot fail.
        let mut url = self
            .base_url
            .join(endpoint)
            .expect("endpoint path is valid");
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("token", &self.token);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the response
    /// body as JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, AnalyticsError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AnalyticsError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Checks the top-level `"status"` field and returns an error if it
    /// indicates failure.
    fn check_api_error(body: &serde_json::Value) -> Result<(), AnalyticsError> {
        if body.get("status").and_then(serde_json::Value::as_str) == Some("error") {
            let msg = body
                .get("error")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(AnalyticsError::ApiError(msg));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> AnalyticsClient {
        AnalyticsClient::with_base_url("test-token", 15, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_constructs_correct_query_string() {
        let client = test_client("https://api.tgstat.ru");
        let url = client.build_url("channels/get", &[("channelId", "@farm")]);
        assert_eq!(
            url.as_str(),
            "https://api.tgstat.ru/channels/get?token=test-token&channelId=%40farm"
        );
    }

    #[test]
    fn build_url_strips_trailing_slash() {
        let client = test_client("https://api.tgstat.ru/");
        let url = client.build_url("posts/stat", &[("postId", "https://t.me/farm/1")]);
        assert!(url.as_str().starts_with("https://api.tgstat.ru/posts/stat?"));
        assert!(url.as_str().contains("postId=https%3A%2F%2Ft.me%2Ffarm%2F1"));
    }

    #[test]
    fn check_api_error_passes_ok_envelope() {
        let body = serde_json::json!({"status": "ok", "response": {}});
        assert!(AnalyticsClient::check_api_error(&body).is_ok());
    }

    #[test]
    fn check_api_error_surfaces_error_message() {
        let body = serde_json::json!({"status": "error", "error": "channel not found"});
        let result = AnalyticsClient::check_api_error(&body);
        assert!(
            matches!(result, Err(AnalyticsError::ApiError(ref m)) if m == "channel not found"),
            "expected ApiError, got: {result:?}"
        );
    }
}
