use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Moderation state of a submission. `Approved` and `Rejected` are terminal:
/// once a record leaves `Pending` it can only re-assert the same state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "submission_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Approved | SubmissionStatus::Rejected)
    }

    /// Whether moving from `self` to `next` is allowed. Re-asserting the current
    /// state is always permitted so that moderation calls stay idempotent.
    pub fn can_transition_to(&self, next: SubmissionStatus) -> bool {
        *self == next || !self.is_terminal()
    }
}

impl Display for SubmissionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SubmissionStatus::Pending => write!(f, "pending"),
            SubmissionStatus::Approved => write!(f, "approved"),
            SubmissionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Reference to the uploaded clip on the primary media host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MediaAssetRef {
    pub locator: String,
    pub public_url: String,
}

/// One row per submission: submitter identity, attribution and legal fields,
/// whichever storage locators succeeded, and the moderation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub location: Option<String>,
    pub description: Option<String>,
    // Storage references; any subset may be populated
    pub media: Option<MediaAssetRef>,
    pub backup_path: Option<String>,
    pub record_storage_path: Option<String>,
    // Attribution
    pub own_recording: bool,
    pub recorder_name: Option<String>,
    pub want_credit: bool,
    pub credit_platform: Option<String>,
    pub credit_username: Option<String>,
    pub payout_email: Option<String>,
    // Legal
    pub signature_path: Option<String>,
    pub agreed_terms: bool,
    pub agreed_distribution: bool,
    // Moderation
    pub status: SubmissionStatus,
    pub admin_note: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// A record is storage-complete when at least one storage reference is populated.
    pub fn is_storage_complete(&self) -> bool {
        self.media.is_some() || self.backup_path.is_some() || self.record_storage_path.is_some()
    }

    pub fn media_locator(&self) -> Option<&str> {
        self.media.as_ref().map(|m| m.locator.as_str())
    }

    pub fn submitter_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Validated form metadata for a new submission. Field-level constraints are
/// checked by the form layer; `check_conditions` covers the cross-field rules.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewSubmission {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub own_recording: bool,
    pub recorder_name: Option<String>,
    pub want_credit: bool,
    pub credit_platform: Option<String>,
    pub credit_username: Option<String>,
    #[validate(email)]
    pub payout_email: Option<String>,
    pub agreed_terms: bool,
    pub agreed_distribution: bool,
}

impl NewSubmission {
    /// Cross-field requirements that `validator` field attributes can't express.
    pub fn check_conditions(&self) -> Result<(), AppError> {
        if !self.own_recording
            && self
                .recorder_name
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .is_empty()
        {
            return Err(AppError::InvalidInput(
                "recorder_name is required when the clip is not your own recording".to_string(),
            ));
        }
        if self.want_credit {
            let platform_missing = self
                .credit_platform
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .is_empty();
            let username_missing = self
                .credit_username
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .is_empty();
            if platform_missing || username_missing {
                return Err(AppError::InvalidInput(
                    "credit_platform and credit_username are required when requesting credit"
                        .to_string(),
                ));
            }
        }
        if !self.agreed_terms || !self.agreed_distribution {
            return Err(AppError::InvalidInput(
                "Both legal agreements must be accepted".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the initial record for this form, before storage locators are known.
    pub fn into_record(self, id: Uuid, submitted_at: DateTime<Utc>) -> SubmissionRecord {
        SubmissionRecord {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            location: self.location,
            description: self.description,
            media: None,
            backup_path: None,
            record_storage_path: None,
            own_recording: self.own_recording,
            recorder_name: self.recorder_name,
            want_credit: self.want_credit,
            credit_platform: self.credit_platform,
            credit_username: self.credit_username,
            payout_email: self.payout_email,
            signature_path: None,
            agreed_terms: self.agreed_terms,
            agreed_distribution: self.agreed_distribution,
            status: SubmissionStatus::Pending,
            admin_note: None,
            submitted_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    pub own_recording: bool,
    pub want_credit: bool,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl From<SubmissionRecord> for SubmissionResponse {
    fn from(record: SubmissionRecord) -> Self {
        SubmissionResponse {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            location: record.location,
            description: record.description,
            media_url: record.media.map(|m| m.public_url),
            backup_path: record.backup_path,
            own_recording: record.own_recording,
            want_credit: record.want_credit,
            status: record.status,
            admin_note: record.admin_note,
            submitted_at: record.submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_form() -> NewSubmission {
        NewSubmission {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "j@x.com".to_string(),
            location: Some("Lisbon".to_string()),
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

    #[test]
    fn test_status_transitions_from_pending() {
        let pending = SubmissionStatus::Pending;
        assert!(pending.can_transition_to(SubmissionStatus::Approved));
        assert!(pending.can_transition_to(SubmissionStatus::Rejected));
        assert!(pending.can_transition_to(SubmissionStatus::Pending));
    }

    #[test]
    fn test_terminal_statuses_only_reassert() {
        let approved = SubmissionStatus::Approved;
        assert!(approved.is_terminal());
        assert!(approved.can_transition_to(SubmissionStatus::Approved));
        assert!(!approved.can_transition_to(SubmissionStatus::Rejected));
        assert!(!approved.can_transition_to(SubmissionStatus::Pending));

        let rejected = SubmissionStatus::Rejected;
        assert!(!rejected.can_transition_to(SubmissionStatus::Approved));
        assert!(rejected.can_transition_to(SubmissionStatus::Rejected));
    }

    #[test]
    fn test_recorder_name_required_when_not_own_recording() {
        let mut form = base_form();
        form.own_recording = false;
        assert!(form.check_conditions().is_err());

        form.recorder_name = Some("Alex Smith".to_string());
        assert!(form.check_conditions().is_ok());
    }

    #[test]
    fn test_credit_fields_required_when_want_credit() {
        let mut form = base_form();
        form.want_credit = true;
        assert!(form.check_conditions().is_err());

        form.credit_platform = Some("instagram".to_string());
        assert!(form.check_conditions().is_err());

        form.credit_username = Some("@jane".to_string());
        assert!(form.check_conditions().is_ok());
    }

    #[test]
    fn test_agreements_must_both_be_accepted() {
        let mut form = base_form();
        form.agreed_distribution = false;
        assert!(form.check_conditions().is_err());
    }

    #[test]
    fn test_into_record_starts_pending_without_locators() {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let record = base_form().into_record(id, now);
        assert_eq!(record.id, id);
        assert_eq!(record.status, SubmissionStatus::Pending);
        assert!(!record.is_storage_complete());
        assert_eq!(record.submitted_at, now);
    }

    #[test]
    fn test_storage_complete_with_any_reference() {
        let mut record = base_form().into_record(Uuid::new_v4(), Utc::now());
        record.backup_path = Some("/submissions/x/clip.mp4".to_string());
        assert!(record.is_storage_complete());

        let mut record = base_form().into_record(Uuid::new_v4(), Utc::now());
        record.media = Some(MediaAssetRef {
            locator: "vid_1".to_string(),
            public_url: "https://cdn.example/vid_1".to_string(),
        });
        assert!(record.is_storage_complete());
    }

    #[test]
    fn test_response_projects_media_url() {
        let mut record = base_form().into_record(Uuid::new_v4(), Utc::now());
        record.media = Some(MediaAssetRef {
            locator: "vid_9".to_string(),
            public_url: "https://cdn.example/vid_9".to_string(),
        });
        let response = SubmissionResponse::from(record);
        assert_eq!(
            response.media_url.as_deref(),
            Some("https://cdn.example/vid_9")
        );
        assert_eq!(response.status, SubmissionStatus::Pending);
    }
}
