//! Analytics API response types.
//!
//! All types model the JSON structures returned by the provider's REST API.
//! The API wraps every response in a `{"status": "ok", "response": ...}`
//! envelope; [`Envelope`] captures that pattern generically.

use serde::Deserialize;

/// Top-level envelope for all analytics API responses.
///
/// `status` is `"ok"` on success or `"error"` on failure, in which case
/// `error` carries the message instead of `response`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[allow(dead_code)]
    pub status: String,
    pub response: T,
}

/// Metadata for a resolved channel (`channels/get`).
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelInfo {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub participants_count: i64,
}

impl ChannelInfo {
    /// Public channel URL, falling back to the raw entry the operator typed
    /// when the channel has no username.
    #[must_use]
    pub fn canonical_link(&self, fallback: &str) -> String {
        match self.username.as_deref() {
            Some(username) if !username.is_empty() => format!("https://t.me/{username}"),
            _ => fallback.to_string(),
        }
    }
}

/// Wrapper for the `channels/posts` response: `{ "items": [...] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct PostsPage {
    #[serde(default)]
    pub items: Vec<RawPost>,
}

/// A single post as returned by `channels/posts`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
    /// Unix publish timestamp.
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub media: Option<RawMedia>,
}

impl RawPost {
    /// The attached video URL, when the post carries an `.mp4` file.
    #[must_use]
    pub fn video_link(&self) -> Option<&str> {
        self.media
            .as_ref()
            .and_then(|m| m.file_url.as_deref())
            .filter(|url| url.ends_with(".mp4"))
    }
}

/// Media attachment metadata inside a [`RawPost`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawMedia {
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Engagement counters for a post (`posts/stat`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PostStats {
    #[serde(rename = "viewsCount", default)]
    pub views: i64,
    #[serde(rename = "reactionsCount", default)]
    pub reactions: i64,
    #[serde(rename = "commentsCount", default)]
    pub comments: i64,
    #[serde(rename = "forwardsCount", default)]
    pub forwards: i64,
}
