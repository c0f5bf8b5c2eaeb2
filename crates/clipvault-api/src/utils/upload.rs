//! Multipart extraction for the submission form.
//!
//! The browser posts one multipart request: the metadata fields as text
//! parts, the signature as a data-URI text part, and the video as the single
//! binary part named `file`. File constraints (size, content type, extension)
//! are enforced here, before the orchestrator is invoked.

use axum::extract::Multipart;
use std::collections::HashMap;

use clipvault_core::models::NewSubmission;
use clipvault_core::validation::{
    decode_data_uri, validate_content_type, validate_file_extension, validate_file_size,
};
use clipvault_core::{AppError, Config};
use clipvault_services::{SubmissionInput, VideoFile};

/// Pull apart the multipart form into text fields plus the video file.
async fn extract_parts(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, Option<VideoFile>), AppError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut video: Option<VideoFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            if video.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one field named 'file'"
                        .to_string(),
                ));
            }
            let filename = field
                .file_name()
                .map(|s: &str| s.to_string())
                .unwrap_or_else(|| "clip".to_string());
            let content_type = field
                .content_type()
                .map(|s: &str| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?
                .to_vec();
            video = Some(VideoFile {
                filename,
                content_type,
                data,
            });
        } else {
            let value = field.text().await.map_err(|e| {
                AppError::InvalidInput(format!("Failed to read field '{}': {}", field_name, e))
            })?;
            fields.insert(field_name, value);
        }
    }

    Ok((fields, video))
}

fn required<'a>(fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str, AppError> {
    fields
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing required field '{}'", name)))
}

fn optional(fields: &HashMap<String, String>, name: &str) -> Option<String> {
    fields
        .get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag(fields: &HashMap<String, String>, name: &str) -> bool {
    fields
        .get(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1" || v.eq_ignore_ascii_case("on"))
        .unwrap_or(false)
}

/// Build a validated `SubmissionInput` from the multipart form.
pub async fn extract_submission_input(
    multipart: Multipart,
    config: &Config,
) -> Result<SubmissionInput, AppError> {
    let (fields, video) = extract_parts(multipart).await?;

    let video = video.ok_or_else(|| AppError::InvalidInput("No video file provided".to_string()))?;
    validate_file_size(video.data.len(), config.max_video_size_bytes())?;
    validate_content_type(&video.content_type, config.video_allowed_content_types())?;
    validate_file_extension(&video.filename, config.video_allowed_extensions())?;

    let signature_uri = required(&fields, "signature")?;
    let signature = decode_data_uri(signature_uri)?;
    validate_file_size(signature.data.len(), config.max_signature_size_bytes())?;

    let metadata = NewSubmission {
        first_name: required(&fields, "first_name")?.to_string(),
        last_name: required(&fields, "last_name")?.to_string(),
        email: required(&fields, "email")?.to_string(),
        location: optional(&fields, "location"),
        description: optional(&fields, "description"),
        own_recording: flag(&fields, "own_recording"),
        recorder_name: optional(&fields, "recorder_name"),
        want_credit: flag(&fields, "want_credit"),
        credit_platform: optional(&fields, "credit_platform"),
        credit_username: optional(&fields, "credit_username"),
        payout_email: optional(&fields, "payout_email"),
        agreed_terms: flag(&fields, "agreed_terms"),
        agreed_distribution: flag(&fields, "agreed_distribution"),
    };

    Ok(SubmissionInput {
        metadata,
        video,
        signature,
    })
}

/// Extract just the optional video file for the per-provider retry endpoint.
pub async fn extract_retry_video(
    multipart: Multipart,
    config: &Config,
) -> Result<Option<VideoFile>, AppError> {
    let (_, video) = extract_parts(multipart).await?;
    if let Some(ref video) = video {
        validate_file_size(video.data.len(), config.max_video_size_bytes())?;
        validate_content_type(&video.content_type, config.video_allowed_content_types())?;
        validate_file_extension(&video.filename, config.video_allowed_extensions())?;
    }
    Ok(video)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_parsing() {
        let mut fields = HashMap::new();
        fields.insert("a".to_string(), "true".to_string());
        fields.insert("b".to_string(), "1".to_string());
        fields.insert("c".to_string(), "false".to_string());
        assert!(flag(&fields, "a"));
        assert!(flag(&fields, "b"));
        assert!(!flag(&fields, "c"));
        assert!(!flag(&fields, "missing"));
    }

    #[test]
    fn test_optional_trims_and_drops_empty() {
        let mut fields = HashMap::new();
        fields.insert("x".to_string(), "  hi  ".to_string());
        fields.insert("y".to_string(), "   ".to_string());
        assert_eq!(optional(&fields, "x").as_deref(), Some("hi"));
        assert_eq!(optional(&fields, "y"), None);
    }

    #[test]
    fn test_required_rejects_blank() {
        let mut fields = HashMap::new();
        fields.insert("email".to_string(), " ".to_string());
        assert!(required(&fields, "email").is_err());
        fields.insert("email".to_string(), "j@x.com".to_string());
        assert_eq!(required(&fields, "email").unwrap(), "j@x.com");
    }
}
