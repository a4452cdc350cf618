use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let control_spreadsheet_id = require("CHANPULSE_CONTROL_SPREADSHEET_ID")?;
    let sheets_token = require("CHANPULSE_SHEETS_TOKEN")?;
    let analytics_token = require("CHANPULSE_ANALYTICS_TOKEN")?;
    let text_api_key = require("CHANPULSE_TEXT_API_KEY")?;
    let video_api_key = require("CHANPULSE_VIDEO_API_KEY")?;

    Ok(AppConfig {
        control_spreadsheet_id,
        control_sheet: or_default("CHANPULSE_CONTROL_SHEET", "Main"),
        log_sheet: or_default("CHANPULSE_LOG_SHEET", "Log"),
        channels_sheet: or_default("CHANPULSE_CHANNELS_SHEET", "Каналы"),
        suggestions_sheet: or_default("CHANPULSE_SUGGESTIONS_SHEET", "Рекомендации"),
        profile_sheet: or_default("CHANPULSE_PROFILE_SHEET", "Профиль"),
        sheets_base_url: or_default(
            "CHANPULSE_SHEETS_BASE_URL",
            "https://sheets.googleapis.com/v4/spreadsheets",
        ),
        sheets_token,
        analytics_base_url: or_default("CHANPULSE_ANALYTICS_BASE_URL", "https://api.tgstat.ru"),
        analytics_token,
        text_api_base_url: or_default("CHANPULSE_TEXT_API_BASE_URL", "https://api.openai.com/v1"),
        text_api_key,
        text_model: or_default("CHANPULSE_TEXT_MODEL", "gpt-4o"),
        translate_model: or_default("CHANPULSE_TRANSLATE_MODEL", "gpt-4o-mini"),
        video_api_base_url: or_default(
            "CHANPULSE_VIDEO_API_BASE_URL",
            "https://api.twelvelabs.io/v1.3",
        ),
        video_api_key,
        video_model: or_default("CHANPULSE_VIDEO_MODEL", "pegasus1.2"),
        text_system_role_path: PathBuf::from(or_default(
            "CHANPULSE_TEXT_SYSTEM_ROLE_PATH",
            "prompts/text_system_role.txt",
        )),
        video_prompt_path: PathBuf::from(or_default(
            "CHANPULSE_VIDEO_PROMPT_PATH",
            "prompts/video_summary.txt",
        )),
        request_timeout_secs: parse_u64("CHANPULSE_REQUEST_TIMEOUT_SECS", "15")?,
        ai_request_timeout_secs: parse_u64("CHANPULSE_AI_REQUEST_TIMEOUT_SECS", "60")?,
        poll_interval_secs: parse_u64("CHANPULSE_POLL_INTERVAL_SECS", "5")?,
        poll_max_attempts: parse_u32("CHANPULSE_POLL_MAX_ATTEMPTS", "120")?,
    })
}
