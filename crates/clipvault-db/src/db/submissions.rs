use chrono::{DateTime, Utc};
use clipvault_core::models::{MediaAssetRef, SubmissionRecord, SubmissionStatus};
use clipvault_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Row type for the submissions table (for FromRow). Media references are
/// flattened into nullable column pairs and reassembled on the way out.
#[derive(Debug, sqlx::FromRow)]
pub struct SubmissionRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub media_locator: Option<String>,
    pub media_public_url: Option<String>,
    pub backup_path: Option<String>,
    pub record_storage_path: Option<String>,
    pub own_recording: bool,
    pub recorder_name: Option<String>,
    pub want_credit: bool,
    pub credit_platform: Option<String>,
    pub credit_username: Option<String>,
    pub payout_email: Option<String>,
    pub signature_path: Option<String>,
    pub agreed_terms: bool,
    pub agreed_distribution: bool,
    pub status: SubmissionStatus,
    pub admin_note: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRow {
    pub fn into_record(self) -> SubmissionRecord {
        let media = match (self.media_locator, self.media_public_url) {
            (Some(locator), Some(public_url)) => Some(MediaAssetRef {
                locator,
                public_url,
            }),
            _ => None,
        };
        SubmissionRecord {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            location: self.location,
            description: self.description,
            media,
            backup_path: self.backup_path,
            record_storage_path: self.record_storage_path,
            own_recording: self.own_recording,
            recorder_name: self.recorder_name,
            want_credit: self.want_credit,
            credit_platform: self.credit_platform,
            credit_username: self.credit_username,
            payout_email: self.payout_email,
            signature_path: self.signature_path,
            agreed_terms: self.agreed_terms,
            agreed_distribution: self.agreed_distribution,
            status: self.status,
            admin_note: self.admin_note,
            submitted_at: self.submitted_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    id, first_name, last_name, email, location, description,
    media_locator, media_public_url, backup_path, record_storage_path,
    own_recording, recorder_name, want_credit, credit_platform, credit_username,
    payout_email, signature_path, agreed_terms, agreed_distribution,
    status, admin_note, submitted_at
"#;

/// Repository for the submissions table.
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fully assembled submission row.
    #[tracing::instrument(skip(self, record), fields(db.table = "submissions", db.operation = "insert", submission_id = %record.id))]
    pub async fn insert(&self, record: &SubmissionRecord) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar::<Postgres, Uuid>(
            r#"
            INSERT INTO submissions (
                id, first_name, last_name, email, location, description,
                media_locator, media_public_url, backup_path, record_storage_path,
                own_recording, recorder_name, want_credit, credit_platform, credit_username,
                payout_email, signature_path, agreed_terms, agreed_distribution,
                status, admin_note, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22)
            RETURNING id
            "#,
        )
        .bind(record.id)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.location)
        .bind(&record.description)
        .bind(record.media.as_ref().map(|m| m.locator.clone()))
        .bind(record.media.as_ref().map(|m| m.public_url.clone()))
        .bind(&record.backup_path)
        .bind(&record.record_storage_path)
        .bind(record.own_recording)
        .bind(&record.recorder_name)
        .bind(record.want_credit)
        .bind(&record.credit_platform)
        .bind(&record.credit_username)
        .bind(&record.payout_email)
        .bind(&record.signature_path)
        .bind(record.agreed_terms)
        .bind(record.agreed_distribution)
        .bind(record.status)
        .bind(&record.admin_note)
        .bind(record.submitted_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "select"))]
    pub async fn get(&self, id: Uuid) -> Result<Option<SubmissionRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, SubmissionRow>(&format!(
            "SELECT {} FROM submissions WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SubmissionRow::into_record))
    }

    /// Full snapshot for the admin surface, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "select"))]
    pub async fn list_all(&self) -> Result<Vec<SubmissionRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, SubmissionRow>(&format!(
            "SELECT {} FROM submissions ORDER BY submitted_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SubmissionRow::into_record).collect())
    }

    /// Update moderation status. Returns false when the row does not exist.
    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "update"))]
    pub async fn update_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE submissions SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, note), fields(db.table = "submissions", db.operation = "update"))]
    pub async fn update_admin_note(
        &self,
        id: Uuid,
        note: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE submissions SET admin_note = $2 WHERE id = $1")
            .bind(id)
            .bind(note)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the backup object's new path after relocation.
    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "update"))]
    pub async fn update_backup_path(&self, id: Uuid, path: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE submissions SET backup_path = $2 WHERE id = $1")
            .bind(id)
            .bind(path)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a provider locator filled in by a successful isolated retry.
    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "update"))]
    pub async fn update_media_asset(
        &self,
        id: Uuid,
        locator: &str,
        public_url: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE submissions SET media_locator = $2, media_public_url = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(locator)
        .bind(public_url)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently remove a submission row. Returns false when it did not exist.
    #[tracing::instrument(skip(self), fields(db.table = "submissions", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
