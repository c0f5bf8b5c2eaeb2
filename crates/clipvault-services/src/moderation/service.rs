//! Moderation service: approve/reject/delete/annotate against persisted
//! submissions, plus the approved-storage relocation side effect.

use std::sync::Arc;
use uuid::Uuid;

use clipvault_core::constants::APPROVED_NAMESPACE;
use clipvault_core::models::{SubmissionRecord, SubmissionStatus};
use clipvault_core::AppError;
use clipvault_db::RecordStore;
use clipvault_storage::{BackupStore, MediaStore};

/// What happened to the backup object when a submission was approved.
///
/// A record can be `approved` in the database while its relocation failed;
/// that is a partial success the moderator must see, not an error that undoes
/// the approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
    Relocated { to: String },
    /// Nothing to move: no backup copy exists, or the record was already approved.
    NotNeeded,
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub record: SubmissionRecord,
    pub relocation: RelocationOutcome,
}

impl ApprovalOutcome {
    pub fn is_fully_applied(&self) -> bool {
        !matches!(self.relocation, RelocationOutcome::Failed { .. })
    }
}

/// Capability token for the irreversible delete. Only obtainable through
/// `ModerationService::confirm_delete`, which keeps the two-step confirm at
/// the type level.
#[derive(Debug)]
pub struct DeleteConfirmation {
    id: Uuid,
}

impl DeleteConfirmation {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

pub struct ModerationService {
    records: Arc<dyn RecordStore>,
    backup: Arc<dyn BackupStore>,
    media: Arc<dyn MediaStore>,
    pending_base: String,
    approved_base: String,
}

impl ModerationService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        backup: Arc<dyn BackupStore>,
        media: Arc<dyn MediaStore>,
        vault_base_path: String,
    ) -> Self {
        ModerationService {
            records,
            backup,
            media,
            pending_base: vault_base_path.trim_end_matches('/').to_string(),
            approved_base: format!("/{}", APPROVED_NAMESPACE),
        }
    }

    async fn load(&self, id: Uuid) -> Result<SubmissionRecord, AppError> {
        self.records
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", id)))
    }

    /// Destination path in the approved area, preserving the namespace segment.
    fn approved_destination(&self, from_path: &str) -> String {
        let suffix = from_path.strip_prefix(&self.pending_base).unwrap_or(from_path);
        format!("{}{}", self.approved_base, suffix)
    }

    /// Approve a submission and relocate its backup copy into the approved area.
    ///
    /// Idempotent once approved: re-approving neither errors nor re-triggers
    /// the relocation. Approving a rejected submission is refused; terminal
    /// states only re-assert themselves.
    pub async fn approve(&self, id: Uuid) -> Result<ApprovalOutcome, AppError> {
        let record = self.load(id).await?;

        if record.status == SubmissionStatus::Approved {
            tracing::debug!(submission_id = %id, "Submission already approved");
            return Ok(ApprovalOutcome {
                record,
                relocation: RelocationOutcome::NotNeeded,
            });
        }
        if !record.status.can_transition_to(SubmissionStatus::Approved) {
            return Err(AppError::BadRequest(format!(
                "Submission {} is already {} and cannot be approved",
                id, record.status
            )));
        }

        if !self
            .records
            .update_status(id, SubmissionStatus::Approved)
            .await?
        {
            return Err(AppError::NotFound(format!("Submission {} not found", id)));
        }
        tracing::info!(submission_id = %id, "Submission approved");

        let mut record = record;
        record.status = SubmissionStatus::Approved;

        let relocation = match record.backup_path.clone() {
            Some(from_path) => {
                let to_path = self.approved_destination(&from_path);
                match self.backup.move_object(&from_path, &to_path).await {
                    Ok(_) => {
                        record.backup_path = Some(to_path.clone());
                        if let Err(e) = self.records.update_backup_path(id, &to_path).await {
                            tracing::warn!(
                                submission_id = %id,
                                error = %e,
                                "Relocated but failed to record the new backup path"
                            );
                        }
                        tracing::info!(submission_id = %id, to = %to_path, "Backup copy relocated");
                        RelocationOutcome::Relocated { to: to_path }
                    }
                    Err(e) => {
                        tracing::error!(
                            submission_id = %id,
                            from = %from_path,
                            error = %e,
                            "Approved in the database but relocation failed"
                        );
                        RelocationOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            }
            None => RelocationOutcome::NotNeeded,
        };

        Ok(ApprovalOutcome { record, relocation })
    }

    /// Reject a submission, optionally recording the reason in the admin note.
    /// Idempotent once rejected; refuses to reject an approved submission.
    pub async fn reject(
        &self,
        id: Uuid,
        note: Option<&str>,
    ) -> Result<SubmissionRecord, AppError> {
        let mut record = self.load(id).await?;

        if record.status != SubmissionStatus::Rejected {
            if !record.status.can_transition_to(SubmissionStatus::Rejected) {
                return Err(AppError::BadRequest(format!(
                    "Submission {} is already {} and cannot be rejected",
                    id, record.status
                )));
            }
            if !self
                .records
                .update_status(id, SubmissionStatus::Rejected)
                .await?
            {
                return Err(AppError::NotFound(format!("Submission {} not found", id)));
            }
            record.status = SubmissionStatus::Rejected;
            tracing::info!(submission_id = %id, "Submission rejected");
        }

        if let Some(note) = note {
            self.records.update_admin_note(id, Some(note)).await?;
            record.admin_note = Some(note.to_string());
        }
        Ok(record)
    }

    /// Free-text admin note update; allowed at any status.
    pub async fn annotate(&self, id: Uuid, note: &str) -> Result<SubmissionRecord, AppError> {
        let mut record = self.load(id).await?;
        if !self.records.update_admin_note(id, Some(note)).await? {
            return Err(AppError::NotFound(format!("Submission {} not found", id)));
        }
        record.admin_note = Some(note.to_string());
        Ok(record)
    }

    /// First step of the two-step delete. The returned confirmation is the
    /// only way to invoke `delete`.
    pub fn confirm_delete(&self, id: Uuid) -> DeleteConfirmation {
        DeleteConfirmation { id }
    }

    /// Permanently remove a submission row and, best-effort, its backing media.
    pub async fn delete(
        &self,
        confirmation: DeleteConfirmation,
    ) -> Result<SubmissionRecord, AppError> {
        let id = confirmation.id;
        let record = self.load(id).await?;

        if !self.records.delete(id).await? {
            return Err(AppError::NotFound(format!("Submission {} not found", id)));
        }
        tracing::info!(submission_id = %id, "Submission deleted");

        if let Some(ref path) = record.backup_path {
            if let Err(e) = self.backup.delete(path).await {
                tracing::warn!(submission_id = %id, path = %path, error = %e, "Backing vault object not removed");
            }
        }
        if let Some(locator) = record.media_locator() {
            if let Err(e) = self.media.delete(locator).await {
                tracing::warn!(submission_id = %id, locator = %locator, error = %e, "Media asset not removed");
            }
        }
        Ok(record)
    }
}
