use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Append-only mailing list entry, unique by case-insensitive email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MailingListEntry {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub source: String,
    pub opted_in: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewMailingListEntry {
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 200))]
    pub name: Option<String>,
    pub source: Option<String>,
    #[serde(default = "default_opt_in")]
    pub opted_in: bool,
}

fn default_opt_in() -> bool {
    true
}

impl NewMailingListEntry {
    /// Uniqueness key: trimmed, lowercased email.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}
