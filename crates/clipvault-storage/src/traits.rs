//! Storage abstraction traits
//!
//! This module defines the capability traits the upload orchestrator works
//! against. Each provider implements only the capabilities it has: the media
//! host uploads and deletes; the backup vault additionally provisions folders
//! and relocates objects. Implementations are selected by configuration.

use async_trait::async_trait;
use thiserror::Error;

use crate::progress::ProgressSink;
use clipvault_core::AppError;

/// Storage operation errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("No network connection: {0}")]
    Offline(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Provider rejected the payload: {0}")]
    Validation(String),

    #[error("Provider quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Credential rejected: {0}")]
    Auth(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether retrying the same call without user action can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageError::Offline(_)
                | StorageError::Transport(_)
                | StorageError::Timeout(_)
                | StorageError::Auth(_)
        )
    }

    /// Translate into the application taxonomy at the orchestrator boundary,
    /// tagging which provider produced the failure.
    pub fn into_app_error(self, provider: &str) -> AppError {
        match self {
            StorageError::Offline(msg) => AppError::Offline(msg),
            StorageError::Transport(msg) | StorageError::Timeout(msg) | StorageError::Auth(msg) => {
                AppError::Transport {
                    provider: provider.to_string(),
                    message: msg,
                }
            }
            StorageError::Validation(msg) | StorageError::QuotaExceeded(msg) => {
                AppError::QuotaExceeded {
                    provider: provider.to_string(),
                    message: msg,
                }
            }
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidPath(msg) => AppError::InvalidInput(msg),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Uploaded clip reference on the media host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub locator: String,
    pub public_url: String,
}

/// Uploaded object reference in the backup vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupObject {
    pub locator: String,
    pub path: String,
}

/// Primary media host: accepts a binary upload, returns a stable public URL.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a file and return its locator + public playback URL.
    ///
    /// `progress` receives byte-level transfer progress derived from the actual
    /// transport when it is length-computable.
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
        progress: ProgressSink,
    ) -> StorageResult<MediaAsset>;

    /// Delete an uploaded asset by its locator.
    async fn delete(&self, locator: &str) -> StorageResult<()>;
}

/// Path-addressed backup vault with folder semantics and move support.
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Create a folder. Returns `true` when the folder was created and `false`
    /// when it already existed; an existing folder is not an error.
    async fn create_folder(&self, path: &str) -> StorageResult<bool>;

    /// Upload a file to the given absolute path. Implementations choose the
    /// small or chunked-session variant by payload size; chunked progress
    /// events are flagged simulated.
    async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        progress: ProgressSink,
    ) -> StorageResult<BackupObject>;

    /// Relocate an object. Returns `true` on success.
    async fn move_object(&self, from_path: &str, to_path: &str) -> StorageResult<bool>;

    /// Delete an object by path.
    async fn delete(&self, path: &str) -> StorageResult<()>;

    /// Check whether an object exists at the given path.
    async fn exists(&self, path: &str) -> StorageResult<bool>;
}

/// Reject paths that could escape the namespace root.
pub(crate) fn validate_path(path: &str) -> StorageResult<()> {
    if !path.starts_with('/') {
        return Err(StorageError::InvalidPath(format!(
            "Path must be absolute: {}",
            path
        )));
    }
    if path.contains("..") {
        return Err(StorageError::InvalidPath(
            "Path contains traversal sequence".to_string(),
        ));
    }
    Ok(())
}
