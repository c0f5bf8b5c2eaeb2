//! Human-readable metadata artifact.
//!
//! A plain-text rendering of the form fields is written next to each upload
//! for audit/backup. The structured row stays authoritative; this artifact is
//! best-effort.

use clipvault_core::models::NewSubmission;
use chrono::{DateTime, Utc};

pub fn render_audit_text(
    metadata: &NewSubmission,
    namespace: &str,
    submitted_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    out.push_str("CLIP SUBMISSION\n");
    out.push_str("===============\n\n");
    out.push_str(&format!("Submitted: {}\n", submitted_at.to_rfc3339()));
    out.push_str(&format!("Namespace: {}\n\n", namespace));
    out.push_str(&format!(
        "Name: {} {}\n",
        metadata.first_name, metadata.last_name
    ));
    out.push_str(&format!("Email: {}\n", metadata.email));
    if let Some(ref location) = metadata.location {
        out.push_str(&format!("Location: {}\n", location));
    }
    if let Some(ref description) = metadata.description {
        out.push_str(&format!("Description: {}\n", description));
    }
    out.push('\n');
    out.push_str(&format!("Own recording: {}\n", metadata.own_recording));
    if let Some(ref recorder) = metadata.recorder_name {
        out.push_str(&format!("Recorded by: {}\n", recorder));
    }
    out.push_str(&format!("Wants credit: {}\n", metadata.want_credit));
    if let (Some(platform), Some(username)) = (
        metadata.credit_platform.as_deref(),
        metadata.credit_username.as_deref(),
    ) {
        out.push_str(&format!("Credit: {} / {}\n", platform, username));
    }
    if let Some(ref payout) = metadata.payout_email {
        out.push_str(&format!("Payout email: {}\n", payout));
    }
    out.push('\n');
    out.push_str(&format!(
        "Agreed to terms: {}\nAgreed to distribution: {}\n",
        metadata.agreed_terms, metadata.agreed_distribution
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_text_carries_key_fields() {
        let metadata = NewSubmission {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "j@x.com".to_string(),
            location: Some("Lisbon".to_string()),
            description: None,
            own_recording: false,
            recorder_name: Some("Alex".to_string()),
            want_credit: true,
            credit_platform: Some("instagram".to_string()),
            credit_username: Some("@jane".to_string()),
            payout_email: None,
            agreed_terms: true,
            agreed_distribution: true,
        };
        let text = render_audit_text(&metadata, "20240305T143000_Jane_Doe", Utc::now());
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("j@x.com"));
        assert!(text.contains("Recorded by: Alex"));
        assert!(text.contains("Credit: instagram / @jane"));
        assert!(text.contains("20240305T143000_Jane_Doe"));
    }
}
