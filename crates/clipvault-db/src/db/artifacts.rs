use chrono::{DateTime, Utc};
use clipvault_core::AppError;
use sqlx::{PgPool, Postgres};

/// Companion objects the record store holds next to each submission row:
/// the signature image backup and the human-readable audit text. Addressed
/// by the same namespace-scoped paths as the object vault.
#[derive(Debug, sqlx::FromRow)]
pub struct ArtifactRow {
    pub path: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Repository for the artifacts table.
#[derive(Clone)]
pub struct ArtifactRepository {
    pool: PgPool,
    public_base_url: String,
}

impl ArtifactRepository {
    pub fn new(pool: PgPool, public_base_url: String) -> Self {
        Self {
            pool,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Store an artifact, replacing any previous object at the same path.
    #[tracing::instrument(skip(self, data), fields(db.table = "artifacts", db.operation = "upsert", size = data.len()))]
    pub async fn put(
        &self,
        path: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, AppError> {
        if path.contains("..") {
            return Err(AppError::InvalidInput(
                "Artifact path contains traversal sequence".to_string(),
            ));
        }
        sqlx::query(
            r#"
            INSERT INTO artifacts (path, content_type, data, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (path) DO UPDATE
                SET content_type = EXCLUDED.content_type,
                    data = EXCLUDED.data,
                    created_at = NOW()
            "#,
        )
        .bind(path)
        .bind(content_type)
        .bind(&data)
        .execute(&self.pool)
        .await?;
        Ok(path.to_string())
    }

    #[tracing::instrument(skip(self), fields(db.table = "artifacts", db.operation = "select"))]
    pub async fn get(&self, path: &str) -> Result<Option<ArtifactRow>, AppError> {
        let row = sqlx::query_as::<Postgres, ArtifactRow>(
            "SELECT path, content_type, data, created_at FROM artifacts WHERE path = $1",
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "artifacts", db.operation = "delete"))]
    pub async fn delete(&self, path: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM artifacts WHERE path = $1")
            .bind(path)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Public URL for an artifact path.
    pub fn public_url(&self, path: &str) -> String {
        let trimmed = path.trim_start_matches('/');
        format!("{}/{}", self.public_base_url, trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(base_url: &str) -> ArtifactRepository {
        // connect_lazy builds a pool without touching the network; only the
        // URL join is under test here.
        let pool = PgPool::connect_lazy("postgres://localhost/clipvault_test").unwrap();
        ArtifactRepository::new(pool, base_url.to_string())
    }

    #[tokio::test]
    async fn test_public_url_joins_cleanly() {
        let repo = repo("http://localhost:3000/artifacts/");
        assert_eq!(
            repo.public_url("/submissions/a/sig.png"),
            "http://localhost:3000/artifacts/submissions/a/sig.png"
        );
        assert_eq!(
            repo.public_url("submissions/a/sig.png"),
            "http://localhost:3000/artifacts/submissions/a/sig.png"
        );
    }
}
