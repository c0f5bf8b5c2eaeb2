//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use clipvault_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clipvault API",
        version = "0.1.0",
        description = "Video submission portal API: multipart clip submission with \
multi-provider storage fan-out, per-provider retry, moderation \
(approve/reject/delete/annotate), and admin filtering/export. All endpoints \
are versioned under /api/v0/."
    ),
    paths(
        // Submissions
        handlers::submissions::submit,
        handlers::submissions::retry_provider,
        // Admin
        handlers::admin::list_submissions,
        handlers::admin::get_submission,
        handlers::admin::approve_submission,
        handlers::admin::reject_submission,
        handlers::admin::annotate_submission,
        handlers::admin::delete_submission,
        handlers::admin::export_submissions,
        handlers::admin::submission_stats,
        // Mailing list
        handlers::mailing_list::subscribe,
        // Health
        handlers::health::health,
    ),
    components(schemas(
        models::SubmissionResponse,
        models::SubmissionStatus,
        models::UploadStatus,
        models::SlotState,
        models::SlotStatus,
        models::Provider,
        models::SubmissionStats,
        models::NewMailingListEntry,
        handlers::submissions::SubmitResponse,
        handlers::admin::SubmissionDetailResponse,
        handlers::admin::ApprovalResponse,
        handlers::admin::RelocationResponse,
        handlers::admin::RejectBody,
        handlers::admin::NoteBody,
        handlers::mailing_list::SubscribeResponse,
        handlers::health::HealthResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "submissions", description = "Clip submission and per-provider retry"),
        (name = "admin", description = "Moderation and admin queries"),
        (name = "mailing-list", description = "Mailing list signup"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Returns the OpenAPI spec.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
