use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No console credential found (tried: {})", .tried.join(", "))]
    MissingCredential { tried: Vec<String> },

    #[error("Listing page {page} failed: {reason}")]
    ListPageFailed { page: u32, reason: String },

    #[error("Export of app '{item_id}' failed with HTTP status {status}")]
    ExportFailed { item_id: String, status: u16 },

    #[error("Export of app '{item_id}' returned no document in `data`")]
    MalformedExport { item_id: String },

    #[error("Archive write failed: {reason}")]
    ArchiveWriteFailed {
        reason: String,
        exported: Vec<String>,
    },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Network,
    Storage,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ExportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredential { .. } => ErrorCategory::Authentication,
            Self::ListPageFailed { .. } | Self::ExportFailed { .. } | Self::ApiError(_) => {
                ErrorCategory::Network
            }
            Self::ArchiveWriteFailed { .. } | Self::ZipError(_) | Self::IoError(_) => {
                ErrorCategory::Storage
            }
            Self::MalformedExport { .. } | Self::SerializationError(_) => ErrorCategory::Data,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 單一 app 的失敗屬於 Low，只有整體流程無法繼續時才會升級
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ExportFailed { .. } | Self::MalformedExport { .. } => ErrorSeverity::Low,
            Self::ListPageFailed { .. } | Self::ApiError(_) => ErrorSeverity::Medium,
            Self::ArchiveWriteFailed { .. }
            | Self::ZipError(_)
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorSeverity::High,
            Self::MissingCredential { .. }
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MissingCredential { .. } => {
                "Log in to the Dify console and pass the console token via --token, DIFY_CONSOLE_TOKEN or --token-file"
            }
            Self::ListPageFailed { .. } | Self::ApiError(_) => {
                "Check --base-url and network connectivity, then re-run"
            }
            Self::ExportFailed { status: 401 | 403, .. } => {
                "The token was rejected; refresh it from the console and check --auth"
            }
            Self::ExportFailed { .. } | Self::MalformedExport { .. } => {
                "Re-run later or export the failing app manually from the console"
            }
            Self::ArchiveWriteFailed { .. } | Self::ZipError(_) | Self::IoError(_) => {
                "Check that --output-path is writable and has free space, or use --mode files"
            }
            Self::SerializationError(_) => "The server response was not valid JSON; check --base-url",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => "Fix the configuration file or command line flags",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingCredential { .. } => {
                "No console token was found, nothing was exported".to_string()
            }
            Self::ArchiveWriteFailed { reason, exported } => format!(
                "Could not write the archive ({}); {} app(s) had been exported before the failure",
                reason,
                exported.len()
            ),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_failures_are_low_severity() {
        let err = ExportError::ExportFailed {
            item_id: "a2".to_string(),
            status: 500,
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.to_string().contains("a2"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_missing_credential_lists_sources() {
        let err = ExportError::MissingCredential {
            tried: vec!["--token".to_string(), "DIFY_CONSOLE_TOKEN".to_string()],
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(
            err.to_string(),
            "No console credential found (tried: --token, DIFY_CONSOLE_TOKEN)"
        );
    }

    #[test]
    fn test_archive_failure_mentions_exported_count() {
        let err = ExportError::ArchiveWriteFailed {
            reason: "disk full".to_string(),
            exported: vec!["Bot One".to_string(), "Bot Two".to_string()],
        };
        assert!(err.user_friendly_message().contains("2 app(s)"));
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
