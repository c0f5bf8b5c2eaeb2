//! Admin workspace: the moderator's in-memory view of the submission set.
//!
//! Every mutation follows the optimistic-edit discipline: the cached record is
//! updated first, the record store is awaited, and the cached value is
//! reverted when the write fails. The cache is a projection, never the system
//! of record.

use uuid::Uuid;

use clipvault_core::models::{SubmissionRecord, SubmissionStatus};
use clipvault_core::AppError;

use crate::moderation::command::OptimisticEdit;
use crate::moderation::service::{ApprovalOutcome, ModerationService};

pub struct AdminWorkspace {
    service: ModerationService,
    cache: Vec<SubmissionRecord>,
}

impl AdminWorkspace {
    pub fn new(service: ModerationService, records: Vec<SubmissionRecord>) -> Self {
        AdminWorkspace {
            service,
            cache: records,
        }
    }

    pub fn records(&self) -> &[SubmissionRecord] {
        &self.cache
    }

    fn index_of(&self, id: Uuid) -> Result<usize, AppError> {
        self.cache
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Submission {} not in workspace", id)))
    }

    pub async fn approve(&mut self, id: Uuid) -> Result<ApprovalOutcome, AppError> {
        let idx = self.index_of(id)?;
        let mut optimistic = self.cache[idx].clone();
        optimistic.status = SubmissionStatus::Approved;
        let edit = OptimisticEdit::apply(&mut self.cache[idx], optimistic);

        match self.service.approve(id).await {
            Ok(outcome) => {
                edit.commit();
                self.cache[idx] = outcome.record.clone();
                Ok(outcome)
            }
            Err(e) => {
                edit.revert(&mut self.cache[idx]);
                Err(e)
            }
        }
    }

    pub async fn reject(&mut self, id: Uuid, note: Option<&str>) -> Result<(), AppError> {
        let idx = self.index_of(id)?;
        let mut optimistic = self.cache[idx].clone();
        optimistic.status = SubmissionStatus::Rejected;
        if let Some(note) = note {
            optimistic.admin_note = Some(note.to_string());
        }
        let edit = OptimisticEdit::apply(&mut self.cache[idx], optimistic);

        match self.service.reject(id, note).await {
            Ok(record) => {
                edit.commit();
                self.cache[idx] = record;
                Ok(())
            }
            Err(e) => {
                edit.revert(&mut self.cache[idx]);
                Err(e)
            }
        }
    }

    pub async fn annotate(&mut self, id: Uuid, note: &str) -> Result<(), AppError> {
        let idx = self.index_of(id)?;
        let mut optimistic = self.cache[idx].clone();
        optimistic.admin_note = Some(note.to_string());
        let edit = OptimisticEdit::apply(&mut self.cache[idx], optimistic);

        match self.service.annotate(id, note).await {
            Ok(record) => {
                edit.commit();
                self.cache[idx] = record;
                Ok(())
            }
            Err(e) => {
                edit.revert(&mut self.cache[idx]);
                Err(e)
            }
        }
    }

    /// Delete goes through the service's two-step confirmation; the cached
    /// entry is only dropped once the row is gone.
    pub async fn delete(&mut self, id: Uuid) -> Result<(), AppError> {
        let idx = self.index_of(id)?;
        let confirmation = self.service.confirm_delete(id);
        self.service.delete(confirmation).await?;
        self.cache.remove(idx);
        Ok(())
    }
}
