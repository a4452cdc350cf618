use thiserror::Error;

use chanpulse_ai::AiError;
use chanpulse_analytics::AnalyticsError;
use chanpulse_sheets::SheetsError;

/// Errors that abort one tenant's run.
///
/// Channel- and post-level failures never surface here — they are contained
/// inside the resolver and ranker. Whatever does reach the orchestrator is
/// classified once into a [`FailureKind`] for the audit log.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("spreadsheet error: {0}")]
    Sheets(#[from] SheetsError),

    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    /// A required column is missing from a worksheet header.
    #[error("required column '{column}' not found in sheet '{sheet}'")]
    MissingColumn {
        sheet: String,
        column: &'static str,
    },

    /// The profile sheet's context cell is empty or absent.
    #[error("tenant profile holds no brand context")]
    EmptyContext,

    /// No channel entry could be resolved for the tenant.
    #[error("no channels found for tenant")]
    NoChannels,

    /// No post survived ranking across all of the tenant's channels.
    #[error("no posts found for tenant")]
    NoPosts,
}

/// Closed classification of tenant-fatal failures.
///
/// Derived from [`PipelineError`] exactly once, at the orchestrator boundary,
/// and rendered as the Russian audit-log message the operator sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    RateLimited,
    AuthFailed,
    NoChannels,
    NoPosts,
    Config,
    Generic,
}

impl FailureKind {
    #[must_use]
    pub fn classify(error: &PipelineError) -> Self {
        match error {
            PipelineError::Sheets(SheetsError::PermissionDenied(_))
            | PipelineError::Ai(AiError::PermissionDenied(_)) => Self::PermissionDenied,
            PipelineError::Sheets(SheetsError::RateLimited(_))
            | PipelineError::Ai(AiError::QuotaExceeded(_)) => Self::RateLimited,
            PipelineError::Sheets(SheetsError::AuthFailed(_))
            | PipelineError::Ai(AiError::AuthFailed(_)) => Self::AuthFailed,
            PipelineError::NoChannels => Self::NoChannels,
            PipelineError::NoPosts => Self::NoPosts,
            PipelineError::MissingColumn { .. }
            | PipelineError::EmptyContext
            | PipelineError::Sheets(
                SheetsError::InvalidSpreadsheetUrl(_) | SheetsError::MissingSheet(_),
            ) => Self::Config,
            PipelineError::Sheets(_) | PipelineError::Analytics(_) | PipelineError::Ai(_) => {
                Self::Generic
            }
        }
    }

    /// Operator-facing audit message for this failure category.
    #[must_use]
    pub fn audit_message(self) -> &'static str {
        match self {
            Self::PermissionDenied => "Ошибка доступа: нет прав на ресурс",
            Self::RateLimited => "Ошибка: превышен лимит запросов к сервису",
            Self::AuthFailed => "Ошибка аутентификации во внешнем сервисе",
            Self::NoChannels => "Ошибка: каналы не найдены",
            Self::NoPosts => "Ошибка: посты не найдены",
            Self::Config => "Ошибка конфигурации клиента",
            Self::Generic => "Ошибка обработки клиента",
        }
    }
}

/// Provider failures that must abort the whole tenant rather than be
/// contained at row granularity.
#[must_use]
pub fn ai_error_is_tenant_fatal(error: &AiError) -> bool {
    matches!(
        error,
        AiError::QuotaExceeded(_) | AiError::AuthFailed(_) | AiError::PermissionDenied(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_errors_classify_as_rate_limited() {
        let err = PipelineError::Ai(AiError::QuotaExceeded("limit".to_string()));
        assert_eq!(FailureKind::classify(&err), FailureKind::RateLimited);
    }

    #[test]
    fn sheet_permission_errors_classify_as_permission_denied() {
        let err = PipelineError::Sheets(SheetsError::PermissionDenied("nope".to_string()));
        assert_eq!(FailureKind::classify(&err), FailureKind::PermissionDenied);
    }

    #[test]
    fn emptiness_errors_keep_their_distinct_kinds() {
        assert_eq!(
            FailureKind::classify(&PipelineError::NoChannels),
            FailureKind::NoChannels
        );
        assert_eq!(
            FailureKind::classify(&PipelineError::NoPosts),
            FailureKind::NoPosts
        );
    }

    #[test]
    fn schema_and_profile_errors_classify_as_config() {
        let missing = PipelineError::MissingColumn {
            sheet: "Каналы".to_string(),
            column: "link",
        };
        assert_eq!(FailureKind::classify(&missing), FailureKind::Config);
        assert_eq!(
            FailureKind::classify(&PipelineError::EmptyContext),
            FailureKind::Config
        );
    }

    #[test]
    fn analytics_api_errors_classify_as_generic() {
        let err = PipelineError::Analytics(AnalyticsError::ApiError("down".to_string()));
        assert_eq!(FailureKind::classify(&err), FailureKind::Generic);
    }

    #[test]
    fn only_quota_auth_permission_are_tenant_fatal_ai_errors() {
        assert!(ai_error_is_tenant_fatal(&AiError::QuotaExceeded(String::new())));
        assert!(ai_error_is_tenant_fatal(&AiError::AuthFailed(String::new())));
        assert!(ai_error_is_tenant_fatal(&AiError::PermissionDenied(String::new())));
        assert!(!ai_error_is_tenant_fatal(&AiError::EmptyCompletion));
        assert!(!ai_error_is_tenant_fatal(&AiError::AnalysisParse(
            "bad".to_string()
        )));
        assert!(!ai_error_is_tenant_fatal(&AiError::IndexingFailed(
            "failed".to_string()
        )));
    }
}
