//! Moderation: the submission state machine and the admin workspace.

pub mod command;
pub mod service;
pub mod workspace;

pub use command::OptimisticEdit;
pub use service::{ApprovalOutcome, DeleteConfirmation, ModerationService, RelocationOutcome};
pub use workspace::AdminWorkspace;
