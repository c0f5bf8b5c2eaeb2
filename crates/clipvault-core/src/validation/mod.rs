//! Validation and sanitization helpers shared by the upload boundary.

use base64::Engine;
use chrono::{DateTime, Utc};

use crate::error::AppError;

const MAX_FILENAME_LENGTH: usize = 255;

/// Strip any path components and reduce to a safe character set.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    let path = std::path::Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

/// Per-submitter namespace segment: `{timestamp}_{firstName}_{lastName}` with
/// names reduced to a path-safe character set. Providers may auto-rename on
/// collision; a fresh attempt always derives a fresh timestamp.
pub fn namespace_slug(first_name: &str, last_name: &str, at: DateTime<Utc>) -> String {
    fn clean(name: &str) -> String {
        let cleaned: String = name
            .trim()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        if cleaned.is_empty() {
            "anonymous".to_string()
        } else {
            cleaned
        }
    }
    format!(
        "{}_{}_{}",
        at.format("%Y%m%dT%H%M%S"),
        clean(first_name),
        clean(last_name)
    )
}

/// Decoded signature image from its data-URI form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUri {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl DecodedDataUri {
    pub fn extension(&self) -> &str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            _ => "bin",
        }
    }
}

/// Parse a `data:<mime>;base64,<payload>` URI into binary content.
pub fn decode_data_uri(uri: &str) -> Result<DecodedDataUri, AppError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| AppError::InvalidInput("Signature is not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::InvalidInput("Malformed data URI".to_string()))?;
    let (content_type, is_base64) = match header.strip_suffix(";base64") {
        Some(ct) => (ct, true),
        None => (header, false),
    };
    if !is_base64 {
        return Err(AppError::InvalidInput(
            "Only base64-encoded data URIs are supported".to_string(),
        ));
    }
    let content_type = if content_type.is_empty() {
        "application/octet-stream".to_string()
    } else {
        content_type.to_string()
    };
    let data = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::InvalidInput(format!("Invalid base64 payload: {}", e)))?;
    if data.is_empty() {
        return Err(AppError::InvalidInput(
            "Signature image is empty".to_string(),
        ));
    }
    Ok(DecodedDataUri { content_type, data })
}

/// Validate file size against the configured maximum.
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Validate content type against the allowlist.
pub fn validate_content_type(content_type: &str, allowed: &[String]) -> Result<(), AppError> {
    let normalized = content_type.to_lowercase();
    if !allowed.iter().any(|a| a == &normalized) {
        return Err(AppError::InvalidInput(format!(
            "Content type '{}' is not allowed",
            content_type
        )));
    }
    Ok(())
}

/// Validate the filename extension against the allowlist; returns the extension.
pub fn validate_file_extension(filename: &str, allowed: &[String]) -> Result<String, AppError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .ok_or_else(|| AppError::InvalidInput("Filename has no extension".to_string()))?;
    if !allowed.iter().any(|a| a == &extension) {
        return Err(AppError::InvalidInput(format!(
            "File extension '.{}' is not allowed",
            extension
        )));
    }
    Ok(extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(
            sanitize_filename("/tmp/evil/clip.mp4").unwrap(),
            "clip.mp4"
        );
        assert_eq!(sanitize_filename("my clip (1).mp4").unwrap(), "my_clip__1_.mp4");
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert!(sanitize_filename("..mp4").is_err());
    }

    #[test]
    fn test_namespace_slug_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        assert_eq!(
            namespace_slug("Jane", "Doe", at),
            "20240305T143000_Jane_Doe"
        );
        assert_eq!(
            namespace_slug("Mary Ann", "O'Neil", at),
            "20240305T143000_Mary_Ann_O_Neil"
        );
        assert_eq!(namespace_slug("", "", at), "20240305T143000_anonymous_anonymous");
    }

    #[test]
    fn test_decode_data_uri_roundtrip() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"signature bytes");
        let uri = format!("data:image/png;base64,{}", encoded);
        let decoded = decode_data_uri(&uri).unwrap();
        assert_eq!(decoded.content_type, "image/png");
        assert_eq!(decoded.extension(), "png");
        assert_eq!(decoded.data, b"signature bytes");
    }

    #[test]
    fn test_decode_data_uri_rejects_plain_text() {
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("not-a-uri").is_err());
        let empty = format!("data:image/png;base64,{}", "");
        assert!(decode_data_uri(&empty).is_err());
    }

    #[test]
    fn test_file_constraints() {
        assert!(validate_file_size(10, 100).is_ok());
        assert!(validate_file_size(101, 100).is_err());

        let types = vec!["video/mp4".to_string()];
        assert!(validate_content_type("VIDEO/MP4", &types).is_ok());
        assert!(validate_content_type("image/png", &types).is_err());

        let exts = vec!["mp4".to_string(), "mov".to_string()];
        assert_eq!(validate_file_extension("clip.MP4", &exts).unwrap(), "mp4");
        assert!(validate_file_extension("clip.exe", &exts).is_err());
        assert!(validate_file_extension("clip", &exts).is_err());
    }
}
