use clipvault_core::models::{MailingListEntry, NewMailingListEntry};
use clipvault_core::AppError;
use sqlx::{PgPool, Postgres};

/// Repository for the mailing list. Append-only from the caller's point of
/// view; a duplicate email refreshes name/opt-in instead of erroring.
#[derive(Clone)]
pub struct MailingListRepository {
    pool: PgPool,
}

impl MailingListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert keyed by case-insensitive email. Returns the stored entry.
    #[tracing::instrument(skip(self, entry), fields(db.table = "mailing_list", db.operation = "upsert"))]
    pub async fn subscribe(
        &self,
        entry: &NewMailingListEntry,
    ) -> Result<MailingListEntry, AppError> {
        let source = entry.source.as_deref().unwrap_or("submission_portal");
        let stored = sqlx::query_as::<Postgres, MailingListEntry>(
            r#"
            INSERT INTO mailing_list (id, email, name, source, opted_in, created_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, NOW())
            ON CONFLICT (email) DO UPDATE
                SET name = COALESCE(EXCLUDED.name, mailing_list.name),
                    opted_in = EXCLUDED.opted_in
            RETURNING id, email, name, source, opted_in, created_at
            "#,
        )
        .bind(entry.normalized_email())
        .bind(&entry.name)
        .bind(source)
        .bind(entry.opted_in)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    #[tracing::instrument(skip(self), fields(db.table = "mailing_list", db.operation = "select"))]
    pub async fn list_all(&self) -> Result<Vec<MailingListEntry>, AppError> {
        let entries = sqlx::query_as::<Postgres, MailingListEntry>(
            "SELECT id, email, name, source, opted_in, created_at FROM mailing_list ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
