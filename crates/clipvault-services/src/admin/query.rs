//! Admin query layer: filtered snapshots, statistics, and exports.
//!
//! Pure read side. Filtering happens over an in-memory snapshot with
//! `SubmissionFilter`, so results recompute consistently whenever the
//! underlying set or the filter changes.

use std::sync::Arc;

use clipvault_core::models::{SubmissionFilter, SubmissionRecord, SubmissionStats};
use clipvault_core::AppError;
use clipvault_db::RecordStore;
use uuid::Uuid;

use crate::admin::export::{export, ExportFile, ExportFormat};

pub struct AdminQueryService {
    records: Arc<dyn RecordStore>,
}

impl AdminQueryService {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        AdminQueryService { records }
    }

    pub async fn get(&self, id: Uuid) -> Result<SubmissionRecord, AppError> {
        self.records
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", id)))
    }

    pub async fn list(
        &self,
        filter: &SubmissionFilter,
    ) -> Result<Vec<SubmissionRecord>, AppError> {
        let all = self.records.list_all().await?;
        Ok(filter.apply(&all).into_iter().cloned().collect())
    }

    pub async fn stats(&self) -> Result<SubmissionStats, AppError> {
        let all = self.records.list_all().await?;
        Ok(SubmissionStats::collect(&all))
    }

    /// Public URL for the record's stored signature image, if one was captured.
    pub fn signature_url(&self, record: &SubmissionRecord) -> Option<String> {
        record
            .signature_path
            .as_deref()
            .map(|path| self.records.artifact_url(path))
    }

    /// Export the filtered subset in the requested projection.
    pub async fn export(
        &self,
        filter: &SubmissionFilter,
        format: ExportFormat,
    ) -> Result<ExportFile, AppError> {
        let subset = self.list(filter).await?;
        export(&subset, format)
    }
}
