//! End-to-end pipeline tests over in-memory providers: the partial-failure
//! matrix, isolated retry, moderation lifecycle, and optimistic rollback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use clipvault_core::models::{NewSubmission, Provider, SlotStatus, SubmissionStatus};
use clipvault_core::validation::decode_data_uri;
use clipvault_core::AppError;
use clipvault_db::RecordStore;
use clipvault_services::test_helpers::InMemoryRecordStore;
use clipvault_services::{
    AdminWorkspace, ModerationService, RelocationOutcome, StatusTracker, SubmissionInput,
    SubmissionUploadService, UploadProgressSinks, VideoFile,
};
use clipvault_storage::{
    noop_progress, ConnectivityProbe, InMemoryBackupStore, InMemoryMediaStore, StorageError,
};

const VAULT_BASE: &str = "/submissions";

struct Harness {
    media: Arc<InMemoryMediaStore>,
    backup: Arc<InMemoryBackupStore>,
    records: Arc<InMemoryRecordStore>,
    service: SubmissionUploadService,
}

fn harness() -> Harness {
    let media = Arc::new(InMemoryMediaStore::new());
    let backup = Arc::new(InMemoryBackupStore::new());
    let records = Arc::new(InMemoryRecordStore::new());
    let service = SubmissionUploadService::new(
        media.clone(),
        backup.clone(),
        records.clone(),
        VAULT_BASE.to_string(),
        Duration::from_secs(300),
    );
    Harness {
        media,
        backup,
        records,
        service,
    }
}

fn moderation(h: &Harness) -> ModerationService {
    ModerationService::new(
        h.records.clone(),
        h.backup.clone(),
        h.media.clone(),
        VAULT_BASE.to_string(),
    )
}

fn form(first: &str, last: &str, email: &str) -> NewSubmission {
    NewSubmission {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        location: None,
        description: None,
        own_recording: true,
        recorder_name: None,
        want_credit: false,
        credit_platform: None,
        credit_username: None,
        payout_email: None,
        agreed_terms: true,
        agreed_distribution: true,
    }
}

fn input(first: &str, last: &str, email: &str, size: usize) -> SubmissionInput {
    SubmissionInput {
        metadata: form(first, last, email),
        video: VideoFile {
            filename: "clip.mp4".to_string(),
            content_type: "video/mp4".to_string(),
            data: vec![0u8; size],
        },
        // "signature" as a png data URI
        signature: decode_data_uri("data:image/png;base64,c2lnbmF0dXJl").unwrap(),
    }
}

async fn submit(
    h: &Harness,
    input: SubmissionInput,
    tracker: &StatusTracker,
) -> Result<clipvault_services::SubmissionOutcome, AppError> {
    h.service
        .submit(
            input,
            tracker,
            UploadProgressSinks::default(),
            CancellationToken::new(),
        )
        .await
}

#[tokio::test]
async fn scenario_a_both_providers_healthy() {
    let h = harness();
    let tracker = StatusTracker::new();

    let outcome = submit(&h, input("Jane", "Doe", "j@x.com", 50 * 1024), &tracker)
        .await
        .unwrap();

    assert_eq!(outcome.record.status, SubmissionStatus::Pending);
    assert!(outcome.record.media.is_some());
    assert!(outcome.record.backup_path.is_some());
    assert!(!outcome.is_partial());
    assert!(outcome.record.is_storage_complete());

    // All three slots settled successfully
    assert_eq!(outcome.status.media.status, SlotStatus::Success);
    assert_eq!(outcome.status.backup.status, SlotStatus::Success);
    assert_eq!(outcome.status.record.status, SlotStatus::Success);

    // One durable copy per provider, row present
    assert_eq!(h.media.asset_count(), 1);
    assert_eq!(h.backup.object_count(), 1);
    assert_eq!(h.records.row_count(), 1);

    // Backup path is namespace-scoped under the base path
    let backup_path = outcome.record.backup_path.as_deref().unwrap();
    assert!(backup_path.starts_with("/submissions/"));
    assert!(backup_path.ends_with("/clip.mp4"));
    assert!(backup_path.contains("_Jane_Doe/"));

    // Signature and audit artifacts landed in the record store
    assert_eq!(h.records.artifact_count(), 2);
    assert!(outcome.record.signature_path.is_some());
    assert!(outcome.record.record_storage_path.is_some());
}

#[tokio::test]
async fn scenario_b_backup_provider_down_still_records() {
    let h = harness();
    h.backup
        .fail_uploads_with(StorageError::Transport("connection refused".into()));
    let tracker = StatusTracker::new();

    let outcome = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap();

    assert_eq!(outcome.record.status, SubmissionStatus::Pending);
    assert!(outcome.record.media.is_some());
    assert!(outcome.record.backup_path.is_none());
    assert!(outcome.is_partial());

    assert_eq!(outcome.status.media.status, SlotStatus::Success);
    assert_eq!(outcome.status.backup.status, SlotStatus::Error);
    assert!(outcome.status.backup.error.is_some());
    assert_eq!(outcome.status.record.status, SlotStatus::Success);

    assert_eq!(h.records.row_count(), 1);
}

#[tokio::test]
async fn media_failure_alone_still_records() {
    let h = harness();
    h.media
        .fail_with(StorageError::QuotaExceeded("file exceeds plan limit".into()));
    let tracker = StatusTracker::new();

    let outcome = submit(&h, input("Ana", "Reis", "a@x.com", 1024), &tracker)
        .await
        .unwrap();

    assert!(outcome.record.media.is_none());
    assert!(outcome.record.backup_path.is_some());
    assert!(outcome.is_partial());
    assert_eq!(outcome.status.media.status, SlotStatus::Error);
    assert_eq!(h.records.row_count(), 1);
}

#[tokio::test]
async fn total_storage_failure_writes_no_row() {
    let h = harness();
    h.media
        .fail_with(StorageError::Transport("down".into()));
    h.backup
        .fail_uploads_with(StorageError::Transport("down".into()));
    let tracker = StatusTracker::new();

    let err = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::TotalStorageFailure));
    assert_eq!(h.records.row_count(), 0);
    assert_eq!(h.records.artifact_count(), 0);

    let status = tracker.snapshot();
    assert_eq!(status.media.status, SlotStatus::Error);
    assert_eq!(status.backup.status, SlotStatus::Error);
    // The row write is never attempted
    assert_eq!(status.record.status, SlotStatus::Idle);
}

#[tokio::test]
async fn record_write_failure_carries_locators_for_reconciliation() {
    let h = harness();
    h.records.fail_inserts(true);
    let tracker = StatusTracker::new();

    let err = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap_err();

    match err {
        AppError::RecordWriteFailed {
            media_locator,
            backup_path,
            ..
        } => {
            // Binaries landed; their locators are surfaced for manual cleanup.
            assert!(media_locator.is_some());
            assert!(backup_path.is_some());
        }
        other => panic!("expected RecordWriteFailed, got {:?}", other),
    }
    assert_eq!(h.media.asset_count(), 1);
    assert_eq!(h.backup.object_count(), 1);
    assert_eq!(h.records.row_count(), 0);
    assert_eq!(tracker.snapshot().record.status, SlotStatus::Error);
}

#[tokio::test]
async fn offline_preflight_fails_fast_without_partial_state() {
    struct OfflineProbe;

    #[async_trait]
    impl ConnectivityProbe for OfflineProbe {
        async fn is_online(&self) -> bool {
            false
        }
    }

    let media = Arc::new(InMemoryMediaStore::new());
    let backup = Arc::new(InMemoryBackupStore::new());
    let records = Arc::new(InMemoryRecordStore::new());
    let service = SubmissionUploadService::new(
        media.clone(),
        backup.clone(),
        records.clone(),
        VAULT_BASE.to_string(),
        Duration::from_secs(300),
    )
    .with_probe(Arc::new(OfflineProbe));

    let tracker = StatusTracker::new();
    let err = service
        .submit(
            input("Jane", "Doe", "j@x.com", 1024),
            &tracker,
            UploadProgressSinks::default(),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Offline(_)));
    // Nothing was attempted anywhere
    assert_eq!(media.asset_count(), 0);
    assert_eq!(backup.object_count(), 0);
    assert_eq!(backup.folder_count(), 0);
    assert_eq!(records.row_count(), 0);
    assert_eq!(tracker.snapshot().media.status, SlotStatus::Idle);
}

#[tokio::test]
async fn cancelled_attempt_produces_no_row() {
    let h = harness();
    let tracker = StatusTracker::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = h
        .service
        .submit(
            input("Jane", "Doe", "j@x.com", 1024),
            &tracker,
            UploadProgressSinks::default(),
            cancel,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::TotalStorageFailure));
    assert_eq!(h.records.row_count(), 0);
}

#[tokio::test]
async fn retry_backup_targets_the_original_namespace() {
    let h = harness();
    h.backup
        .fail_uploads_with(StorageError::Transport("flaky".into()));
    let tracker = StatusTracker::new();

    let outcome = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap();
    assert!(outcome.record.backup_path.is_none());
    let folders_after_submit = h.backup.folder_count();
    assert_eq!(folders_after_submit, 1);

    h.backup.clear_failures();
    let retried = h
        .service
        .retry_provider(
            outcome.record.id,
            Provider::Backup,
            Some(VideoFile {
                filename: "clip.mp4".to_string(),
                content_type: "video/mp4".to_string(),
                data: vec![0u8; 1024],
            }),
            &tracker,
            noop_progress(),
        )
        .await
        .unwrap();

    // Same namespace, no second folder
    assert_eq!(h.backup.folder_count(), folders_after_submit);
    let path = retried.backup_path.as_deref().unwrap();
    assert!(path.starts_with(&format!("{}/{}", VAULT_BASE, outcome.namespace)));
    assert_eq!(tracker.slot(Provider::Backup).status, SlotStatus::Success);
    // Sibling slots untouched by the retry
    assert_eq!(tracker.slot(Provider::Media).status, SlotStatus::Success);

    // Retrying a provider that already succeeded is a no-op
    let objects_before = h.backup.object_count();
    let again = h
        .service
        .retry_provider(retried.id, Provider::Backup, None, &tracker, noop_progress())
        .await
        .unwrap();
    assert_eq!(again.backup_path.as_deref(), Some(path));
    assert_eq!(h.backup.object_count(), objects_before);
}

#[tokio::test]
async fn retry_media_updates_the_row() {
    let h = harness();
    h.media.fail_with(StorageError::Transport("flaky".into()));
    let tracker = StatusTracker::new();

    let outcome = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap();
    assert!(outcome.record.media.is_none());

    h.media.clear_failure();
    let retried = h
        .service
        .retry_provider(
            outcome.record.id,
            Provider::Media,
            Some(VideoFile {
                filename: "clip.mp4".to_string(),
                content_type: "video/mp4".to_string(),
                data: vec![0u8; 1024],
            }),
            &tracker,
            noop_progress(),
        )
        .await
        .unwrap();

    assert!(retried.media.is_some());
    let stored = h.records.get(retried.id).await.unwrap().unwrap();
    assert_eq!(stored.media, retried.media);
}

#[tokio::test]
async fn retry_record_slot_is_refused() {
    let h = harness();
    let tracker = StatusTracker::new();
    let outcome = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap();

    let err = h
        .service
        .retry_provider(outcome.record.id, Provider::Record, None, &tracker, noop_progress())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn scenario_c_approve_relocates_and_is_idempotent() {
    let h = harness();
    let tracker = StatusTracker::new();
    let outcome = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap();
    let id = outcome.record.id;
    let original_path = outcome.record.backup_path.clone().unwrap();

    let service = moderation(&h);
    let approval = service.approve(id).await.unwrap();

    assert_eq!(approval.record.status, SubmissionStatus::Approved);
    match &approval.relocation {
        RelocationOutcome::Relocated { to } => {
            assert!(to.starts_with("/approved/"));
            assert!(h.backup.has_object(to));
            assert!(!h.backup.has_object(&original_path));
        }
        other => panic!("expected relocation, got {:?}", other),
    }
    let stored = h.records.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, SubmissionStatus::Approved);
    assert!(stored.backup_path.as_deref().unwrap().starts_with("/approved/"));

    // Approve again: no error, no second relocation attempt
    let again = service.approve(id).await.unwrap();
    assert_eq!(again.relocation, RelocationOutcome::NotNeeded);
    assert_eq!(h.backup.object_count(), 1);
}

#[tokio::test]
async fn approve_survives_relocation_failure_as_partial_success() {
    let h = harness();
    let tracker = StatusTracker::new();
    let outcome = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap();
    let id = outcome.record.id;

    h.backup
        .fail_moves_with(StorageError::Transport("vault offline".into()));
    let service = moderation(&h);
    let approval = service.approve(id).await.unwrap();

    // Approved in the database even though the move failed; the failure is
    // surfaced distinctly, not swallowed.
    assert_eq!(approval.record.status, SubmissionStatus::Approved);
    assert!(matches!(
        approval.relocation,
        RelocationOutcome::Failed { .. }
    ));
    assert!(!approval.is_fully_applied());
    let stored = h.records.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn terminal_states_refuse_crossing_transitions() {
    let h = harness();
    let tracker = StatusTracker::new();
    let outcome = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap();
    let id = outcome.record.id;

    let service = moderation(&h);
    service.reject(id, Some("blurry footage")).await.unwrap();

    let err = service.approve(id).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Rejecting again is an idempotent no-op
    let rejected = service.reject(id, None).await.unwrap();
    assert_eq!(rejected.status, SubmissionStatus::Rejected);
    assert_eq!(rejected.admin_note.as_deref(), Some("blurry footage"));
}

#[tokio::test]
async fn annotate_works_at_any_status() {
    let h = harness();
    let tracker = StatusTracker::new();
    let outcome = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap();
    let id = outcome.record.id;

    let service = moderation(&h);
    service.approve(id).await.unwrap();
    let annotated = service.annotate(id, "great clip").await.unwrap();
    assert_eq!(annotated.admin_note.as_deref(), Some("great clip"));
    assert_eq!(annotated.status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn scenario_d_unconfirmed_delete_leaves_the_record() {
    let h = harness();
    let tracker = StatusTracker::new();
    let outcome = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap();
    let id = outcome.record.id;

    let service = moderation(&h);
    // The moderator dismissed the confirmation dialog: the confirmation value
    // is dropped without invoking delete, and nothing changes.
    let _dismissed = service.confirm_delete(id);
    assert!(h.records.get(id).await.unwrap().is_some());

    let confirmation = service.confirm_delete(id);
    service.delete(confirmation).await.unwrap();
    assert!(h.records.get(id).await.unwrap().is_none());
    // Backing media removed best-effort
    assert_eq!(h.backup.object_count(), 0);
    assert_eq!(h.media.asset_count(), 0);
}

#[tokio::test]
async fn workspace_rolls_back_optimistic_state_on_write_failure() {
    let h = harness();
    let tracker = StatusTracker::new();
    let outcome = submit(&h, input("Jane", "Doe", "j@x.com", 1024), &tracker)
        .await
        .unwrap();
    let id = outcome.record.id;

    let all = h.records.list_all().await.unwrap();
    let mut workspace = AdminWorkspace::new(moderation(&h), all);

    h.records.fail_updates(true);
    let err = workspace.approve(id).await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    // The displayed state reverted to its prior value
    let cached = workspace
        .records()
        .iter()
        .find(|r| r.id == id)
        .unwrap();
    assert_eq!(cached.status, SubmissionStatus::Pending);

    h.records.fail_updates(false);
    workspace.approve(id).await.unwrap();
    let cached = workspace
        .records()
        .iter()
        .find(|r| r.id == id)
        .unwrap();
    assert_eq!(cached.status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn workspace_distinguishes_missing_records() {
    let h = harness();
    let mut workspace = AdminWorkspace::new(moderation(&h), Vec::new());
    let err = workspace.approve(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
