//! Record store capability trait.
//!
//! The upload orchestrator and moderation service work against this narrow
//! interface rather than the concrete repositories, so tests can substitute
//! an in-memory implementation.

use async_trait::async_trait;
use clipvault_core::models::{SubmissionRecord, SubmissionStatus};
use clipvault_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{ArtifactRepository, SubmissionRepository};

/// One row per submission plus companion binary artifacts.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &SubmissionRecord) -> Result<Uuid, AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<SubmissionRecord>, AppError>;
    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, AppError>;
    async fn update_status(&self, id: Uuid, status: SubmissionStatus) -> Result<bool, AppError>;
    async fn update_admin_note(&self, id: Uuid, note: Option<&str>) -> Result<bool, AppError>;
    async fn update_backup_path(&self, id: Uuid, path: &str) -> Result<bool, AppError>;
    async fn update_media_asset(
        &self,
        id: Uuid,
        locator: &str,
        public_url: &str,
    ) -> Result<bool, AppError>;
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Store a companion object (signature backup, audit text) by path.
    async fn put_artifact(
        &self,
        path: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, AppError>;

    /// Public URL for a stored artifact path.
    fn artifact_url(&self, path: &str) -> String;
}

/// Postgres-backed record store combining the submission and artifact repositories.
#[derive(Clone)]
pub struct PgRecordStore {
    submissions: SubmissionRepository,
    artifacts: ArtifactRepository,
}

impl PgRecordStore {
    pub fn new(pool: PgPool, artifact_public_base_url: String) -> Self {
        Self {
            submissions: SubmissionRepository::new(pool.clone()),
            artifacts: ArtifactRepository::new(pool, artifact_public_base_url),
        }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, record: &SubmissionRecord) -> Result<Uuid, AppError> {
        self.submissions.insert(record).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<SubmissionRecord>, AppError> {
        self.submissions.get(id).await
    }

    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, AppError> {
        self.submissions.list_all().await
    }

    async fn update_status(&self, id: Uuid, status: SubmissionStatus) -> Result<bool, AppError> {
        self.submissions.update_status(id, status).await
    }

    async fn update_admin_note(&self, id: Uuid, note: Option<&str>) -> Result<bool, AppError> {
        self.submissions.update_admin_note(id, note).await
    }

    async fn update_backup_path(&self, id: Uuid, path: &str) -> Result<bool, AppError> {
        self.submissions.update_backup_path(id, path).await
    }

    async fn update_media_asset(
        &self,
        id: Uuid,
        locator: &str,
        public_url: &str,
    ) -> Result<bool, AppError> {
        self.submissions.update_media_asset(id, locator, public_url).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.submissions.delete(id).await
    }

    async fn put_artifact(
        &self,
        path: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, AppError> {
        self.artifacts.put(path, content_type, data).await
    }

    fn artifact_url(&self, path: &str) -> String {
        self.artifacts.public_url(path)
    }
}
