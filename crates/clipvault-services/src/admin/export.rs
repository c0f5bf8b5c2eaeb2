//! Export projections of the filtered submission set.
//!
//! Two formats: flat delimited (CSV, with embedded delimiters/quotes/newlines
//! escaped) and structured (JSON, every field recoverable byte-for-byte via
//! the record's serde representation).

use clipvault_core::models::SubmissionRecord;
use clipvault_core::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(AppError::BadRequest(format!(
                "unknown export format '{}'",
                other
            ))),
        }
    }
}

/// A rendered export, ready to hand to the download response.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

pub fn export(records: &[SubmissionRecord], format: ExportFormat) -> Result<ExportFile, AppError> {
    match format {
        ExportFormat::Csv => Ok(ExportFile {
            filename: "submissions_export.csv".to_string(),
            content_type: "text/csv; charset=utf-8",
            body: to_csv(records),
        }),
        ExportFormat::Json => Ok(ExportFile {
            filename: "submissions_export.json".to_string(),
            content_type: "application/json",
            body: serde_json::to_string_pretty(records)?,
        }),
    }
}

const CSV_HEADER: &str = "id,first_name,last_name,email,location,description,media_url,\
backup_path,own_recording,recorder_name,want_credit,credit_platform,credit_username,\
payout_email,status,admin_note,submitted_at";

fn to_csv(records: &[SubmissionRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for record in records {
        let fields = [
            record.id.to_string(),
            record.first_name.clone(),
            record.last_name.clone(),
            record.email.clone(),
            record.location.clone().unwrap_or_default(),
            record.description.clone().unwrap_or_default(),
            record
                .media
                .as_ref()
                .map(|m| m.public_url.clone())
                .unwrap_or_default(),
            record.backup_path.clone().unwrap_or_default(),
            record.own_recording.to_string(),
            record.recorder_name.clone().unwrap_or_default(),
            record.want_credit.to_string(),
            record.credit_platform.clone().unwrap_or_default(),
            record.credit_username.clone().unwrap_or_default(),
            record.payout_email.clone().unwrap_or_default(),
            record.status.to_string(),
            record.admin_note.clone().unwrap_or_default(),
            record.submitted_at.to_rfc3339(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Quote a field when it carries the delimiter, a quote, or a line break;
/// embedded quotes are doubled.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
