use std::path::Path;

use crate::{AppConfig, ConfigError};

/// Operator-maintained prompt texts loaded once per run.
///
/// The texts themselves live outside this system (plain files on disk);
/// only their paths come from configuration.
#[derive(Debug, Clone)]
pub struct Prompts {
    /// System role sent with every text-generation request.
    pub text_system_role: String,
    /// Prompt guiding the video-intelligence summary.
    pub video_summary: String,
}

impl Prompts {
    /// Read both prompt files named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PromptFile`] when a file cannot be read and
    /// [`ConfigError::EmptyPrompt`] when a file holds only whitespace.
    pub fn load(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            text_system_role: read_prompt(&config.text_system_role_path)?,
            video_summary: read_prompt(&config.video_prompt_path)?,
        })
    }
}

fn read_prompt(path: &Path) -> Result<String, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::PromptFile {
        path: path.display().to_string(),
        source,
    })?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyPrompt(path.display().to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_prompt_trims_surrounding_whitespace() {
        let dir = std::env::temp_dir();
        let path = dir.join("chanpulse_prompt_trim_test.txt");
        std::fs::write(&path, "  роль ассистента\n\n").unwrap();
        let text = read_prompt(&path).unwrap();
        assert_eq!(text, "роль ассистента");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn read_prompt_rejects_blank_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("chanpulse_prompt_blank_test.txt");
        std::fs::write(&path, "   \n").unwrap();
        let result = read_prompt(&path);
        assert!(matches!(result, Err(ConfigError::EmptyPrompt(_))));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn read_prompt_reports_missing_file() {
        let result = read_prompt(Path::new("/nonexistent/chanpulse/prompt.txt"));
        assert!(matches!(result, Err(ConfigError::PromptFile { .. })));
    }
}
