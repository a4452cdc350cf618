use std::path::PathBuf;

/// Application configuration for a batch run.
///
/// Built once per invocation from environment variables (see
/// [`crate::load_app_config`]) and passed by reference into every component —
/// there is no global configuration state.
#[derive(Clone)]
pub struct AppConfig {
    /// Spreadsheet id of the control table (tenant registry + audit log).
    pub control_spreadsheet_id: String,
    /// Worksheet holding the tenant registry rows.
    pub control_sheet: String,
    /// Worksheet receiving audit log entries.
    pub log_sheet: String,
    /// Worksheet name for channel links inside each tenant spreadsheet.
    pub channels_sheet: String,
    /// Worksheet name for ranked/enriched rows inside each tenant spreadsheet.
    pub suggestions_sheet: String,
    /// Worksheet whose cell (1,1) holds the tenant's brand context.
    pub profile_sheet: String,

    pub sheets_base_url: String,
    pub sheets_token: String,

    pub analytics_base_url: String,
    pub analytics_token: String,

    pub text_api_base_url: String,
    pub text_api_key: String,
    /// Model used for analysis, rewriting and video briefs.
    pub text_model: String,
    /// Cheaper model used for plain translation.
    pub translate_model: String,

    pub video_api_base_url: String,
    pub video_api_key: String,
    pub video_model: String,

    /// Path to the text-generation system role prompt.
    pub text_system_role_path: PathBuf,
    /// Path to the prompt guiding video summarization.
    pub video_prompt_path: PathBuf,

    pub request_timeout_secs: u64,
    /// Generative calls run long; they get their own timeout.
    pub ai_request_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("control_spreadsheet_id", &self.control_spreadsheet_id)
            .field("control_sheet", &self.control_sheet)
            .field("log_sheet", &self.log_sheet)
            .field("channels_sheet", &self.channels_sheet)
            .field("suggestions_sheet", &self.suggestions_sheet)
            .field("profile_sheet", &self.profile_sheet)
            .field("sheets_base_url", &self.sheets_base_url)
            .field("sheets_token", &"[redacted]")
            .field("analytics_base_url", &self.analytics_base_url)
            .field("analytics_token", &"[redacted]")
            .field("text_api_base_url", &self.text_api_base_url)
            .field("text_api_key", &"[redacted]")
            .field("text_model", &self.text_model)
            .field("translate_model", &self.translate_model)
            .field("video_api_base_url", &self.video_api_base_url)
            .field("video_api_key", &"[redacted]")
            .field("video_model", &self.video_model)
            .field("text_system_role_path", &self.text_system_role_path)
            .field("video_prompt_path", &self.video_prompt_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("ai_request_timeout_secs", &self.ai_request_timeout_secs)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .finish()
    }
}
