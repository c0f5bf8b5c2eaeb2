//! Input and output types for the upload pipeline.

use clipvault_core::models::{SubmissionRecord, UploadStatus};
use clipvault_core::validation::DecodedDataUri;
use clipvault_storage::{noop_progress, ProgressSink};

/// A validated video file as received from the form layer.
#[derive(Debug, Clone)]
pub struct VideoFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl VideoFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Everything the orchestrator needs for one submission attempt. The form
/// layer has already validated field-level constraints; `metadata` still
/// carries the cross-field checks.
#[derive(Debug, Clone)]
pub struct SubmissionInput {
    pub metadata: clipvault_core::models::NewSubmission,
    pub video: VideoFile,
    pub signature: DecodedDataUri,
}

/// Per-provider progress callbacks for the binary uploads.
#[derive(Clone)]
pub struct UploadProgressSinks {
    pub media: ProgressSink,
    pub backup: ProgressSink,
}

impl Default for UploadProgressSinks {
    fn default() -> Self {
        UploadProgressSinks {
            media: noop_progress(),
            backup: noop_progress(),
        }
    }
}

/// Result of a completed (possibly partially successful) submission attempt.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub record: SubmissionRecord,
    pub status: UploadStatus,
    /// Per-submitter namespace segment used in the object stores.
    pub namespace: String,
}

impl SubmissionOutcome {
    /// Exactly one of the two binary providers failed.
    pub fn is_partial(&self) -> bool {
        self.status.is_partial()
    }
}
