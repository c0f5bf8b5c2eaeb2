//! Submission upload orchestrator.
//!
//! Drives one validated form through the provider fan-out. The media host and
//! backup vault uploads run concurrently and never short-circuit each other;
//! the submission row write is the join point and only happens after both
//! have settled. A single-provider failure leaves a recorded, partially
//! complete submission; only the loss of both binary copies blocks the row.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use clipvault_core::constants::{ARTIFACT_PREFIX, METADATA_ARTIFACT_FILENAME};
use clipvault_core::models::{MediaAssetRef, Provider, SubmissionRecord};
use clipvault_core::validation::{namespace_slug, sanitize_filename};
use clipvault_core::{AppError, ErrorMetadata};
use clipvault_db::RecordStore;
use clipvault_storage::{
    AlwaysOnline, BackupStore, ConnectivityProbe, MediaStore, ProgressSink, StorageError,
    StorageResult,
};
use validator::Validate;

use crate::email::ConfirmationMailer;
use crate::upload::artifact::render_audit_text;
use crate::upload::status::StatusTracker;
use crate::upload::types::{SubmissionInput, SubmissionOutcome, UploadProgressSinks, VideoFile};

pub struct SubmissionUploadService {
    media: Arc<dyn MediaStore>,
    backup: Arc<dyn BackupStore>,
    records: Arc<dyn RecordStore>,
    probe: Arc<dyn ConnectivityProbe>,
    mailer: Option<ConfirmationMailer>,
    vault_base_path: String,
    upload_timeout: Duration,
}

/// Wrap a provider call with the attempt's cancellation token and an explicit
/// generous deadline.
async fn guarded<T, F>(
    cancel: &CancellationToken,
    deadline: Duration,
    call: F,
) -> StorageResult<T>
where
    F: Future<Output = StorageResult<T>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(StorageError::Transport("upload cancelled".to_string())),
        result = tokio::time::timeout(deadline, call) => match result {
            Ok(inner) => inner,
            Err(_) => Err(StorageError::Timeout(format!(
                "no response within {}s",
                deadline.as_secs()
            ))),
        },
    }
}

impl SubmissionUploadService {
    pub fn new(
        media: Arc<dyn MediaStore>,
        backup: Arc<dyn BackupStore>,
        records: Arc<dyn RecordStore>,
        vault_base_path: String,
        upload_timeout: Duration,
    ) -> Self {
        SubmissionUploadService {
            media,
            backup,
            records,
            probe: Arc::new(AlwaysOnline),
            mailer: None,
            vault_base_path: vault_base_path.trim_end_matches('/').to_string(),
            upload_timeout,
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_mailer(mut self, mailer: Option<ConfirmationMailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Run one submission attempt end to end.
    ///
    /// Guarantee: when this returns `Ok`, the submission row exists, even if
    /// one of the binary uploads failed. The two hard failures are
    /// `TotalStorageFailure` (no binary copy landed, no row written) and
    /// `RecordWriteFailed` (binaries landed, row write failed; locators are
    /// logged for manual reconciliation).
    pub async fn submit(
        &self,
        input: SubmissionInput,
        tracker: &StatusTracker,
        sinks: UploadProgressSinks,
        cancel: CancellationToken,
    ) -> Result<SubmissionOutcome, AppError> {
        input.metadata.validate().map_err(AppError::from)?;
        input.metadata.check_conditions()?;

        if !self.probe.is_online().await {
            return Err(AppError::Offline(
                "no network connection detected".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let submitted_at = Utc::now();
        let namespace = namespace_slug(
            &input.metadata.first_name,
            &input.metadata.last_name,
            submitted_at,
        );
        let folder_path = format!("{}/{}", self.vault_base_path, namespace);
        let filename = sanitize_filename(&input.video.filename)?;

        tracing::info!(
            submission_id = %id,
            namespace = %namespace,
            file_size = input.video.size(),
            "Starting submission upload"
        );

        // Namespace provisioning is collision-tolerant and not retried on
        // failure; uploads target the intended path regardless.
        match self.backup.create_folder(&folder_path).await {
            Ok(created) => {
                tracing::debug!(path = %folder_path, created, "Vault namespace ready")
            }
            Err(e) => tracing::warn!(
                error = %e,
                path = %folder_path,
                "Vault namespace provisioning failed; uploads will still target the intended path"
            ),
        }

        tracker.begin(Provider::Media);
        tracker.begin(Provider::Backup);

        let backup_target = format!("{}/{}", folder_path, filename);
        let media_call = guarded(
            &cancel,
            self.upload_timeout,
            self.media.upload(
                &filename,
                &input.video.content_type,
                input.video.data.clone(),
                sinks.media.clone(),
            ),
        );
        let backup_call = guarded(
            &cancel,
            self.upload_timeout,
            self.backup
                .upload(&backup_target, input.video.data.clone(), sinks.backup.clone()),
        );
        // Both uploads are attempted even if one fails; their failure domains
        // are unrelated and each durable copy counts.
        let (media_result, backup_result) = tokio::join!(media_call, backup_call);

        let media_asset = match media_result {
            Ok(asset) => {
                tracker.succeed(Provider::Media, &asset.locator);
                Some(asset)
            }
            Err(e) => {
                let app = e.into_app_error("media host");
                tracing::warn!(submission_id = %id, error = %app, "Media host upload failed");
                tracker.fail(Provider::Media, app.client_message());
                None
            }
        };
        let backup_object = match backup_result {
            Ok(object) => {
                tracker.succeed(Provider::Backup, &object.path);
                Some(object)
            }
            Err(e) => {
                let app = e.into_app_error("backup vault");
                tracing::warn!(submission_id = %id, error = %app, "Backup vault upload failed");
                tracker.fail(Provider::Backup, app.client_message());
                None
            }
        };

        if media_asset.is_none() && backup_object.is_none() {
            tracing::error!(submission_id = %id, "All storage providers failed; submission not recorded");
            return Err(AppError::TotalStorageFailure);
        }

        // Signature and audit artifacts are logically independent of the video
        // uploads; their failure never blocks recording the submission.
        let signature_path = format!(
            "{}/{}/signature.{}",
            ARTIFACT_PREFIX,
            namespace,
            input.signature.extension()
        );
        let signature_path = match self
            .records
            .put_artifact(
                &signature_path,
                &input.signature.content_type,
                input.signature.data.clone(),
            )
            .await
        {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(submission_id = %id, error = %e, "Signature artifact write failed");
                None
            }
        };

        let audit_path = format!(
            "{}/{}/{}",
            ARTIFACT_PREFIX, namespace, METADATA_ARTIFACT_FILENAME
        );
        let audit_text = render_audit_text(&input.metadata, &namespace, submitted_at);
        let record_storage_path = match self
            .records
            .put_artifact(&audit_path, "text/plain; charset=utf-8", audit_text.into_bytes())
            .await
        {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(submission_id = %id, error = %e, "Audit artifact write failed");
                None
            }
        };

        let mut record = input.metadata.into_record(id, submitted_at);
        record.media = media_asset.map(|a| MediaAssetRef {
            locator: a.locator,
            public_url: a.public_url,
        });
        record.backup_path = backup_object.map(|o| o.path);
        record.signature_path = signature_path;
        record.record_storage_path = record_storage_path;

        // The row write is the synchronization point: it only happens after
        // both binary uploads have settled, with whichever locators succeeded.
        tracker.begin(Provider::Record);
        if let Err(e) = self.records.insert(&record).await {
            tracker.fail(Provider::Record, "could not save your details");
            tracing::error!(
                submission_id = %id,
                media_locator = ?record.media_locator(),
                backup_path = ?record.backup_path,
                signature_path = ?record.signature_path,
                error = %e,
                "Submission row write failed after upload; locators logged for manual reconciliation"
            );
            return Err(AppError::RecordWriteFailed {
                media_locator: record.media_locator().map(String::from),
                backup_path: record.backup_path.clone(),
                source: anyhow::Error::new(e),
            });
        }
        tracker.succeed(Provider::Record, record.id.to_string());

        // Confirmation email is fire-and-forget; its failure never rolls back
        // the submission.
        if let Some(mailer) = self.mailer.clone() {
            let (email, first_name, last_name) = (
                record.email.clone(),
                record.first_name.clone(),
                record.last_name.clone(),
            );
            tokio::spawn(async move {
                if let Err(e) = mailer.notify(&email, &first_name, &last_name).await {
                    tracing::warn!(error = %e, "Failed to send confirmation email");
                }
            });
        }

        let status = tracker.snapshot();
        if status.is_partial() {
            tracing::warn!(
                submission_id = %id,
                media_ok = status.succeeded(Provider::Media),
                backup_ok = status.succeeded(Provider::Backup),
                "Submission recorded with partial storage"
            );
        } else {
            tracing::info!(submission_id = %id, "Submission recorded");
        }

        Ok(SubmissionOutcome {
            record,
            status,
            namespace,
        })
    }

    /// Retry a single failed provider for an already-recorded submission.
    ///
    /// The retry targets the attempt's original namespace (derived from the
    /// immutable row fields) and leaves the sibling slots alone. Retrying a
    /// provider that already succeeded is a no-op.
    pub async fn retry_provider(
        &self,
        record_id: Uuid,
        provider: Provider,
        video: Option<VideoFile>,
        tracker: &StatusTracker,
        progress: ProgressSink,
    ) -> Result<SubmissionRecord, AppError> {
        let record = self
            .records
            .get(record_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {} not found", record_id)))?;

        match provider {
            Provider::Media => {
                if record.media.is_some() {
                    return Ok(record);
                }
                let video = video.ok_or_else(|| {
                    AppError::BadRequest(
                        "video file is required to retry the media upload".to_string(),
                    )
                })?;
                if !tracker.reset(Provider::Media) {
                    tracker.begin(Provider::Media);
                }
                let filename = sanitize_filename(&video.filename)?;
                let asset = match self
                    .media
                    .upload(&filename, &video.content_type, video.data, progress)
                    .await
                {
                    Ok(asset) => asset,
                    Err(e) => {
                        let app = e.into_app_error("media host");
                        tracker.fail(Provider::Media, app.client_message());
                        return Err(app);
                    }
                };
                tracker.succeed(Provider::Media, &asset.locator);
                self.records
                    .update_media_asset(record_id, &asset.locator, &asset.public_url)
                    .await?;
                let mut updated = record;
                updated.media = Some(MediaAssetRef {
                    locator: asset.locator,
                    public_url: asset.public_url,
                });
                Ok(updated)
            }
            Provider::Backup => {
                if record.backup_path.is_some() {
                    return Ok(record);
                }
                let video = video.ok_or_else(|| {
                    AppError::BadRequest(
                        "video file is required to retry the backup upload".to_string(),
                    )
                })?;
                // Same namespace as the original attempt: derived from the
                // immutable row fields, so the retried call targets the
                // original path and never provisions a second folder.
                let namespace = namespace_slug(
                    &record.first_name,
                    &record.last_name,
                    record.submitted_at,
                );
                let folder_path = format!("{}/{}", self.vault_base_path, namespace);
                if let Err(e) = self.backup.create_folder(&folder_path).await {
                    tracing::warn!(error = %e, path = %folder_path, "Vault namespace check failed during retry");
                }
                let target = format!("{}/{}", folder_path, sanitize_filename(&video.filename)?);
                if !tracker.reset(Provider::Backup) {
                    tracker.begin(Provider::Backup);
                }
                let object = match self.backup.upload(&target, video.data, progress).await {
                    Ok(object) => object,
                    Err(e) => {
                        let app = e.into_app_error("backup vault");
                        tracker.fail(Provider::Backup, app.client_message());
                        return Err(app);
                    }
                };
                tracker.succeed(Provider::Backup, &object.path);
                self.records
                    .update_backup_path(record_id, &object.path)
                    .await?;
                let mut updated = record;
                updated.backup_path = Some(object.path);
                Ok(updated)
            }
            Provider::Record => Err(AppError::BadRequest(
                "the submission row is retried by resubmitting the form".to_string(),
            )),
        }
    }
}
