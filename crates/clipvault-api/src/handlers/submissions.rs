//! Submission endpoints: the upload pipeline entry point and the isolated
//! per-provider retry.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;
use uuid::Uuid;

use clipvault_core::models::{Provider, SubmissionResponse, UploadStatus};
use clipvault_core::AppError;
use clipvault_services::{StatusTracker, UploadProgressSinks};
use clipvault_storage::noop_progress;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{extract_retry_video, extract_submission_input};

/// Submission result plus the per-provider status summary the confirmation
/// screen renders.
#[derive(Serialize, ToSchema)]
pub struct SubmitResponse {
    pub submission: SubmissionResponse,
    pub status: UploadStatus,
    /// One of the two binary providers failed; the submission is still recorded.
    pub partial: bool,
}

#[utoipa::path(
    post,
    path = "/api/v0/submissions",
    tag = "submissions",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Submission recorded (possibly partially stored)", body = SubmitResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "All storage providers failed", body = ErrorResponse),
        (status = 503, description = "Offline", body = ErrorResponse)
    )
)]
pub async fn submit(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let input = extract_submission_input(multipart, &state.config).await?;

    let tracker = StatusTracker::new();
    let outcome = state
        .upload
        .submit(
            input,
            &tracker,
            UploadProgressSinks::default(),
            CancellationToken::new(),
        )
        .await?;

    let partial = outcome.is_partial();
    let body = SubmitResponse {
        submission: SubmissionResponse::from(outcome.record),
        status: outcome.status,
        partial,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/v0/submissions/{id}/retry/{provider}",
    tag = "submissions",
    params(
        ("id" = Uuid, Path, description = "Submission ID"),
        ("provider" = String, Path, description = "Provider slot to retry: 'media' or 'backup'")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Provider retried", body = SubmissionResponse),
        (status = 400, description = "Invalid provider or missing file", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    )
)]
pub async fn retry_provider(
    State(state): State<Arc<AppState>>,
    Path((id, provider)): Path<(Uuid, String)>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let provider: Provider = provider
        .parse()
        .map_err(|e: String| AppError::BadRequest(e))?;
    let video = extract_retry_video(multipart, &state.config).await?;

    let tracker = StatusTracker::new();
    let record = state
        .upload
        .retry_provider(id, provider, video, &tracker, noop_progress())
        .await?;

    Ok(Json(SubmissionResponse::from(record)).into_response())
}
