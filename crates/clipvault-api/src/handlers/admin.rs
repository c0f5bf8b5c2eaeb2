//! Admin endpoints: list/get with filtering, moderation operations, exports,
//! and dashboard statistics.
//!
//! No authentication is applied to this surface yet; see DESIGN.md.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use clipvault_core::models::{
    SubmissionFilter, SubmissionResponse, SubmissionStats, SubmissionStatus,
};
use clipvault_core::AppError;
use clipvault_services::{ExportFormat, RelocationOutcome};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Filter parameters for the admin list and export endpoints. `status` is a
/// comma-separated set (e.g. `status=pending,approved`).
#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    pub search: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub own_recording: Option<bool>,
    pub want_credit: Option<bool>,
    #[serde(default)]
    pub missing_payout_email: bool,
    pub status: Option<String>,
}

impl AdminListQuery {
    fn into_filter(self) -> Result<SubmissionFilter, AppError> {
        let statuses = match self.status.as_deref() {
            None | Some("") => None,
            Some(list) => {
                let mut parsed = Vec::new();
                for part in list.split(',') {
                    let status = match part.trim().to_ascii_lowercase().as_str() {
                        "pending" => SubmissionStatus::Pending,
                        "approved" => SubmissionStatus::Approved,
                        "rejected" => SubmissionStatus::Rejected,
                        other => {
                            return Err(AppError::BadRequest(format!(
                                "unknown status '{}'",
                                other
                            )))
                        }
                    };
                    parsed.push(status);
                }
                Some(parsed)
            }
        };
        Ok(SubmissionFilter {
            search: self.search,
            date_from: self.date_from,
            date_to: self.date_to,
            own_recording: self.own_recording,
            want_credit: self.want_credit,
            missing_payout_email: self.missing_payout_email,
            statuses,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v0/admin/submissions",
    tag = "admin",
    responses(
        (status = 200, description = "Filtered submissions", body = [SubmissionResponse]),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Vec<SubmissionResponse>>, HttpAppError> {
    let filter = query.into_filter()?;
    let records = state.admin.list(&filter).await?;
    Ok(Json(
        records.into_iter().map(SubmissionResponse::from).collect(),
    ))
}

/// Full detail view including the signature image URL resolved from the
/// record store.
#[derive(Serialize, ToSchema)]
pub struct SubmissionDetailResponse {
    pub submission: SubmissionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_url: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v0/admin/submissions/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission detail", body = SubmissionDetailResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionDetailResponse>, HttpAppError> {
    let record = state.admin.get(id).await?;
    let signature_url = state.admin.signature_url(&record);
    Ok(Json(SubmissionDetailResponse {
        submission: SubmissionResponse::from(record),
        signature_url,
    }))
}

/// How the approval's relocation side effect ended, rendered for the moderator.
#[derive(Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RelocationResponse {
    Relocated { to: String },
    NotNeeded,
    /// Approved in the database, but the file move failed and is still owed.
    Failed { error: String },
}

impl From<RelocationOutcome> for RelocationResponse {
    fn from(outcome: RelocationOutcome) -> Self {
        match outcome {
            RelocationOutcome::Relocated { to } => RelocationResponse::Relocated { to },
            RelocationOutcome::NotNeeded => RelocationResponse::NotNeeded,
            RelocationOutcome::Failed { error } => RelocationResponse::Failed { error },
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ApprovalResponse {
    pub submission: SubmissionResponse,
    pub relocation: RelocationResponse,
}

#[utoipa::path(
    post,
    path = "/api/v0/admin/submissions/{id}/approve",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Approved; relocation outcome included", body = ApprovalResponse),
        (status = 400, description = "Submission is in a terminal state", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn approve_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApprovalResponse>, HttpAppError> {
    let outcome = state.moderation.approve(id).await?;
    Ok(Json(ApprovalResponse {
        submission: SubmissionResponse::from(outcome.record),
        relocation: RelocationResponse::from(outcome.relocation),
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectBody {
    pub note: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v0/admin/submissions/{id}/reject",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = RejectBody,
    responses(
        (status = 200, description = "Rejected", body = SubmissionResponse),
        (status = 400, description = "Submission is in a terminal state", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn reject_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectBody>,
) -> Result<Json<SubmissionResponse>, HttpAppError> {
    let record = state.moderation.reject(id, body.note.as_deref()).await?;
    Ok(Json(SubmissionResponse::from(record)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NoteBody {
    pub note: String,
}

#[utoipa::path(
    patch,
    path = "/api/v0/admin/submissions/{id}/note",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = NoteBody,
    responses(
        (status = 200, description = "Note updated", body = SubmissionResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn annotate_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<NoteBody>,
) -> Result<Json<SubmissionResponse>, HttpAppError> {
    let record = state.moderation.annotate(id, &body.note).await?;
    Ok(Json(SubmissionResponse::from(record)))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[utoipa::path(
    delete,
    path = "/api/v0/admin/submissions/{id}",
    tag = "admin",
    params(
        ("id" = Uuid, Path, description = "Submission ID"),
        ("confirm" = bool, Query, description = "Must be true; deletes are irreversible")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Missing confirmation", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> Result<Response, HttpAppError> {
    // Two-step confirm: without the explicit flag the record is untouched.
    if !query.confirm {
        return Err(AppError::BadRequest(
            "Deletion is irreversible; repeat the request with confirm=true".to_string(),
        )
        .into());
    }
    let confirmation = state.moderation.confirm_delete(id);
    state.moderation.delete(confirmation).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

#[utoipa::path(
    get,
    path = "/api/v0/admin/submissions/export",
    tag = "admin",
    responses(
        (status = 200, description = "Export of the filtered subset"),
        (status = 400, description = "Invalid format or filter", body = ErrorResponse)
    )
)]
pub async fn export_submissions(
    State(state): State<Arc<AppState>>,
    Query(export_query): Query<ExportQuery>,
    Query(filter_query): Query<AdminListQuery>,
) -> Result<Response, HttpAppError> {
    let format: ExportFormat = export_query.format.parse()?;
    let filter = filter_query.into_filter()?;
    let file = state.admin.export(&filter, format).await?;

    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/v0/admin/submissions/stats",
    tag = "admin",
    responses((status = 200, description = "Dashboard counters", body = SubmissionStats))
)]
pub async fn submission_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SubmissionStats>, HttpAppError> {
    Ok(Json(state.admin.stats().await?))
}
