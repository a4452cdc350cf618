//! Shared configuration and error types for the chanpulse workspace.

mod app_config;
mod config;
mod prompts;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use prompts::Prompts;

use thiserror::Error;

/// Errors produced while loading application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    /// An environment variable is set but cannot be parsed.
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    /// A prompt file named in the configuration could not be read.
    #[error("failed to read prompt file {path}: {source}")]
    PromptFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A prompt file exists but contains only whitespace.
    #[error("prompt file {0} is empty")]
    EmptyPrompt(String),
}
