//! Error types module
//!
//! This module provides the core error types used throughout the Clipvault application.
//! All errors are unified under the `AppError` enum, which covers database, storage
//! provider, validation, and submission-lifecycle failures.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like single-provider outages
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "OFFLINE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    /// No network detected before any provider call was attempted.
    #[error("Offline: {0}")]
    Offline(String),

    /// A single provider call failed at the network/transport layer. Retryable in isolation.
    #[error("Transport error from {provider}: {message}")]
    Transport { provider: String, message: String },

    /// Provider rejected the payload (size, type, quota). Not retryable without user action.
    #[error("Quota or validation rejection from {provider}: {message}")]
    QuotaExceeded { provider: String, message: String },

    /// Both binary storage providers failed; no submission row may be written.
    #[error("All storage providers failed")]
    TotalStorageFailure,

    /// Binaries landed but the submission row could not be written. The locators
    /// are carried so support can reconcile the orphaned objects by hand.
    #[error("Submission row write failed after upload")]
    RecordWriteFailed {
        media_locator: Option<String>,
        backup_path: Option<String>,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

// Error conversion implementations following Rust best practices
#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Offline(_) => (
            503,
            "OFFLINE",
            true,
            Some("Reconnect to the network and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::Transport { .. } => (
            502,
            "TRANSPORT_ERROR",
            true,
            Some("Retry the failed provider"),
            false,
            LogLevel::Warn,
        ),
        AppError::QuotaExceeded { .. } => (
            422,
            "QUOTA_OR_VALIDATION_REJECTED",
            false,
            Some("Adjust the file and submit again"),
            false,
            LogLevel::Warn,
        ),
        AppError::TotalStorageFailure => (
            502,
            "ALL_PROVIDERS_FAILED",
            true,
            Some("Retry the whole submission"),
            false,
            LogLevel::Error,
        ),
        AppError::RecordWriteFailed { .. } => (
            500,
            "RECORD_WRITE_FAILED",
            false,
            Some("Contact support with the reference in this message"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Offline(_) => "Offline",
            AppError::Transport { .. } => "Transport",
            AppError::QuotaExceeded { .. } => "QuotaExceeded",
            AppError::TotalStorageFailure => "TotalStorageFailure",
            AppError::RecordWriteFailed { .. } => "RecordWriteFailed",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Whether a retry of the same call without user action can succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_recoverable()
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        // Add source error chain
        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access the submission database".to_string(),
            AppError::Offline(_) => {
                "No network connection detected. Reconnect and try again.".to_string()
            }
            AppError::Transport { provider, .. } => {
                format!("Could not reach the {} service", provider)
            }
            AppError::QuotaExceeded { provider, message } => {
                format!("The {} service rejected the file: {}", provider, message)
            }
            AppError::TotalStorageFailure => {
                "None of the storage services accepted the upload. Please retry the whole submission."
                    .to_string()
            }
            AppError::RecordWriteFailed {
                media_locator,
                backup_path,
                ..
            } => {
                let reference = media_locator
                    .as_deref()
                    .or(backup_path.as_deref())
                    .unwrap_or("none");
                format!(
                    "Your file is safely stored, but we couldn't save your details. \
                     Contact support with reference {}",
                    reference
                )
            }
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_offline() {
        let err = AppError::Offline("no route to host".to_string());
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.error_code(), "OFFLINE");
        assert!(err.is_recoverable());
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_transport_is_retryable() {
        let err = AppError::Transport {
            provider: "media host".to_string(),
            message: "connection reset".to_string(),
        };
        assert_eq!(err.http_status_code(), 502);
        assert!(err.is_retryable());
        assert_eq!(err.client_message(), "Could not reach the media host service");
    }

    #[test]
    fn test_error_metadata_quota_is_not_retryable() {
        let err = AppError::QuotaExceeded {
            provider: "backup vault".to_string(),
            message: "file exceeds plan limit".to_string(),
        };
        assert_eq!(err.http_status_code(), 422);
        assert!(!err.is_retryable());
        assert!(err.client_message().contains("file exceeds plan limit"));
    }

    #[test]
    fn test_record_write_failed_carries_reference() {
        let err = AppError::RecordWriteFailed {
            media_locator: Some("vid_abc123".to_string()),
            backup_path: None,
            source: anyhow::anyhow!("insert failed"),
        };
        assert_eq!(err.error_code(), "RECORD_WRITE_FAILED");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("vid_abc123"));
    }

    #[test]
    fn test_total_storage_failure_distinct_from_partial() {
        let err = AppError::TotalStorageFailure;
        assert_eq!(err.error_code(), "ALL_PROVIDERS_FAILED");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Submission not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Submission not found");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }
}
