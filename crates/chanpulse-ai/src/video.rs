//! Video-intelligence client: index management, task polling, summaries.
//!
//! Indexing is asynchronous on the provider side. A task moves through
//! `queued → processing → ready|failed`; [`VideoClient::wait_for_ready`]
//! drives that as an explicit state machine under an injected [`PollPolicy`]
//! so tests never touch a real clock.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::error::AiError;
use crate::text::check_status;

const DEFAULT_BASE_URL: &str = "https://api.twelvelabs.io/v1.3";

/// Terminal and intermediate states of an indexing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Queued,
    Processing,
    Ready,
    Failed,
    /// Provider statuses outside the documented set; treated as still pending.
    Other(String),
}

impl TaskState {
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        match status {
            "queued" | "pending" => Self::Queued,
            "processing" | "indexing" | "validating" => Self::Processing,
            "ready" => Self::Ready,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

/// How often and how long to poll an indexing task.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    #[must_use]
    pub fn new(interval_secs: u64, max_attempts: u32) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            max_attempts,
        }
    }
}

/// Deterministic index name for a video URL.
///
/// Combines the URL's basename with a stable 6-hex-char content hash so
/// repeated runs on the same video reuse the existing index instead of
/// recreating it.
#[must_use]
pub fn index_name_for(video_url: &str) -> String {
    let basename = Url::parse(video_url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut s| s.next_back().map(str::to_string))
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "video".to_string());
    let digest = Sha256::digest(video_url.as_bytes());
    let hash: String = digest.iter().take(3).map(|b| format!("{b:02x}")).collect();
    format!("video-index-{basename}-{hash}")
}

/// Client for the video-intelligence REST API.
pub struct VideoClient {
    client: Client,
    base_url: Url,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct IndexList {
    #[serde(default)]
    data: Vec<IndexEntry>,
}

#[derive(Deserialize)]
struct IndexEntry {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    index_name: String,
}

#[derive(Deserialize)]
struct CreatedIndex {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Deserialize)]
struct CreatedTask {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Deserialize)]
struct TaskStatus {
    #[serde(default)]
    status: String,
    #[serde(default)]
    video_id: String,
}

#[derive(Deserialize)]
struct Summary {
    #[serde(default)]
    summary: String,
}

impl VideoClient {
    /// Creates a client pointed at the production video API.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, AiError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the client cannot be constructed, or
    /// [`AiError::ApiError`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
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
            model: model.to_owned(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().expect("base URL has a path");
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, AiError> {
        let response = self
            .client
            .get(url.clone())
            .header("x-api-key", &self.api_key)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AiError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<T, AiError> {
        let response = self
            .client
            .post(url.clone())
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| AiError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Returns the id of the index named `name`, creating it when absent.
    ///
    /// # Errors
    ///
    /// Propagates any [`AiError`] from the list or create calls.
    pub async fn get_or_create_index(&self, name: &str) -> Result<String, AiError> {
        let list: IndexList = self.get_json(self.endpoint(&["indexes"])).await?;
        if let Some(existing) = list.data.into_iter().find(|i| i.index_name == name) {
            tracing::debug!(index = %name, id = %existing.id, "reusing existing video index");
            return Ok(existing.id);
        }

        let body = json!({
            "index_name": name,
            "models": [{"model_name": self.model, "model_options": ["visual", "audio"]}],
        });
        let created: CreatedIndex = self.post_json(self.endpoint(&["indexes"]), &body).await?;
        tracing::debug!(index = %name, id = %created.id, "created video index");
        Ok(created.id)
    }

    /// Submits a video URL for indexing; returns the task id.
    ///
    /// # Errors
    ///
    /// Propagates any [`AiError`] from the create call.
    pub async fn create_task(&self, index_id: &str, video_url: &str) -> Result<String, AiError> {
        let body = json!({ "index_id": index_id, "video_url": video_url });
        let created: CreatedTask = self.post_json(self.endpoint(&["tasks"]), &body).await?;
        Ok(created.id)
    }

    /// Reads a task's current state and (once indexed) its video id.
    ///
    /// # Errors
    ///
    /// Propagates any [`AiError`] from the status call.
    pub async fn task_state(&self, task_id: &str) -> Result<(TaskState, String), AiError> {
        let status: TaskStatus = self.get_json(self.endpoint(&["tasks", task_id])).await?;
        Ok((TaskState::from_status(&status.status), status.video_id))
    }

    /// Polls a task until it reaches a terminal state.
    ///
    /// Returns the indexed video id on `ready`.
    ///
    /// # Errors
    ///
    /// - [`AiError::IndexingFailed`] when the task ends `failed`.
    /// - [`AiError::PollTimeout`] when `policy.max_attempts` polls pass
    ///   without a terminal state.
    /// - Any transport error from the status calls.
    pub async fn wait_for_ready(
        &self,
        task_id: &str,
        policy: PollPolicy,
    ) -> Result<String, AiError> {
        for attempt in 1..=policy.max_attempts {
            let (state, video_id) = self.task_state(task_id).await?;
            tracing::debug!(task = %task_id, attempt, state = ?state, "video indexing poll");
            match state {
                TaskState::Ready => return Ok(video_id),
                TaskState::Failed => {
                    return Err(AiError::IndexingFailed("failed".to_string()));
                }
                TaskState::Queued | TaskState::Processing | TaskState::Other(_) => {
                    if attempt < policy.max_attempts {
                        tokio::time::sleep(policy.interval).await;
                    }
                }
            }
        }
        Err(AiError::PollTimeout {
            attempts: policy.max_attempts,
        })
    }

    /// Requests a prompt-guided summary for an indexed video.
    ///
    /// # Errors
    ///
    /// Propagates any [`AiError`] from the summarize call.
    pub async fn summarize(&self, video_id: &str, prompt: &str) -> Result<String, AiError> {
        let body = json!({ "video_id": video_id, "type": "summary", "prompt": prompt });
        let summary: Summary = self.post_json(self.endpoint(&["summarize"]), &body).await?;
        Ok(summary.summary)
    }

    /// Full indexing-and-summary flow for one video URL.
    ///
    /// Resolves the deterministic index, submits the task, polls to a
    /// terminal state, and returns the prompt-guided summary.
    ///
    /// # Errors
    ///
    /// Propagates any [`AiError`] from the underlying steps.
    pub async fn summarize_url(
        &self,
        video_url: &str,
        prompt: &str,
        policy: PollPolicy,
    ) -> Result<String, AiError> {
        let index_id = self.get_or_create_index(&index_name_for(video_url)).await?;
        let task_id = self.create_task(&index_id, video_url).await?;
        let video_id = self.wait_for_ready(&task_id, policy).await?;
        self.summarize(&video_id, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_state_maps_documented_statuses() {
        assert_eq!(TaskState::from_status("queued"), TaskState::Queued);
        assert_eq!(TaskState::from_status("processing"), TaskState::Processing);
        assert_eq!(TaskState::from_status("ready"), TaskState::Ready);
        assert_eq!(TaskState::from_status("failed"), TaskState::Failed);
        assert_eq!(
            TaskState::from_status("migrating"),
            TaskState::Other("migrating".to_string())
        );
    }

    #[test]
    fn only_ready_and_failed_are_terminal() {
        assert!(TaskState::Ready.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(!TaskState::Queued.is_terminal());
        assert!(!TaskState::Processing.is_terminal());
        assert!(!TaskState::Other("migrating".to_string()).is_terminal());
    }

    #[test]
    fn index_name_is_deterministic() {
        let a = index_name_for("https://cdn.example/path/clip.mp4");
        let b = index_name_for("https://cdn.example/path/clip.mp4");
        assert_eq!(a, b);
    }

    #[test]
    fn index_name_combines_basename_and_hash() {
        let name = index_name_for("https://cdn.example/path/clip.mp4");
        assert!(name.starts_with("video-index-clip.mp4-"));
        let hash = name.rsplit('-').next().unwrap();
        assert_eq!(hash.len(), 6);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn index_name_differs_for_different_urls() {
        let a = index_name_for("https://cdn.example/a/clip.mp4");
        let b = index_name_for("https://cdn.example/b/clip.mp4");
        assert_ne!(a, b, "same basename, different URL must differ by hash");
    }

    #[test]
    fn index_name_handles_unparsable_url() {
        let name = index_name_for("not a url");
        assert!(name.starts_with("video-index-video-"));
    }
}
