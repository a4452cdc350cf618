//! Per-invocation run context.
//!
//! Every component receives this explicitly — there are no module-level
//! singleton clients, which keeps the whole pipeline drivable with test
//! doubles (an in-memory sheet store and mock HTTP servers).

use chrono::NaiveDate;

use chanpulse_ai::{TextClient, VideoClient};
use chanpulse_analytics::AnalyticsClient;
use chanpulse_core::{AppConfig, Prompts};
use chanpulse_sheets::SheetStore;

use crate::error::PipelineError;

/// Everything one batch invocation needs, constructed once and passed down.
pub struct RunContext<'a, S: SheetStore> {
    pub config: &'a AppConfig,
    pub prompts: &'a Prompts,
    pub store: &'a S,
    pub analytics: &'a AnalyticsClient,
    pub text_ai: &'a TextClient,
    pub video_ai: &'a VideoClient,
    /// Injected so date-window math is testable without a real clock.
    pub today: NaiveDate,
}

/// Build the three HTTP clients from configuration.
///
/// # Errors
///
/// Returns [`PipelineError`] when a client cannot be constructed.
pub fn build_clients(
    config: &AppConfig,
) -> Result<(AnalyticsClient, TextClient, VideoClient), PipelineError> {
    let analytics = AnalyticsClient::with_base_url(
        &config.analytics_token,
        config.request_timeout_secs,
        &config.analytics_base_url,
    )?;
    let text_ai = TextClient::with_base_url(
        &config.text_api_key,
        config.ai_request_timeout_secs,
        &config.text_api_base_url,
    )?;
    let video_ai = VideoClient::with_base_url(
        &config.video_api_key,
        &config.video_model,
        config.ai_request_timeout_secs,
        &config.video_api_base_url,
    )?;
    Ok((analytics, text_ai, video_ai))
}
