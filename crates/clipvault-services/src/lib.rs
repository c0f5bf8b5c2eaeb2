//! Clipvault Services Library
//!
//! Domain services for the submission portal: the upload orchestrator and its
//! status tracker, the moderation service with its optimistic-edit admin
//! workspace, the admin query/filter/export layer, and the confirmation mailer.

pub mod admin;
pub mod email;
pub mod moderation;
pub mod test_helpers;
pub mod upload;

pub use admin::{AdminQueryService, ExportFile, ExportFormat};
pub use email::ConfirmationMailer;
pub use moderation::{
    AdminWorkspace, ApprovalOutcome, DeleteConfirmation, ModerationService, RelocationOutcome,
};
pub use upload::{
    StatusTracker, SubmissionInput, SubmissionOutcome, SubmissionUploadService,
    UploadProgressSinks, VideoFile,
};
