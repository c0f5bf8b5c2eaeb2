use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use clipvault_core::models::NewMailingListEntry;
use clipvault_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct SubscribeResponse {
    pub email: String,
    pub opted_in: bool,
}

#[utoipa::path(
    post,
    path = "/api/v0/mailing-list",
    tag = "mailing-list",
    request_body = NewMailingListEntry,
    responses(
        (status = 201, description = "Subscribed (idempotent per email)", body = SubscribeResponse),
        (status = 400, description = "Invalid email", body = ErrorResponse)
    )
)]
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Json(entry): Json<NewMailingListEntry>,
) -> Result<impl IntoResponse, HttpAppError> {
    entry.validate().map_err(AppError::from)?;
    let stored = state.mailing_list.subscribe(&entry).await?;
    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse {
            email: stored.email,
            opted_in: stored.opted_in,
        }),
    ))
}
