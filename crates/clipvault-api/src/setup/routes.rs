//! Route configuration and setup

use crate::constants::{API_PREFIX, BODY_LIMIT_SLACK_BYTES};
use crate::handlers;
use crate::middleware::request_id_middleware;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use clipvault_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = config.max_video_size_bytes() + BODY_LIMIT_SLACK_BYTES;

    let api = Router::new()
        .route("/submissions", post(handlers::submissions::submit))
        .route(
            "/submissions/{id}/retry/{provider}",
            post(handlers::submissions::retry_provider),
        )
        .route("/mailing-list", post(handlers::mailing_list::subscribe))
        // Admin surface. No authentication yet; see DESIGN.md.
        .route(
            "/admin/submissions",
            get(handlers::admin::list_submissions),
        )
        .route(
            "/admin/submissions/export",
            get(handlers::admin::export_submissions),
        )
        .route(
            "/admin/submissions/stats",
            get(handlers::admin::submission_stats),
        )
        .route(
            "/admin/submissions/{id}",
            get(handlers::admin::get_submission).delete(handlers::admin::delete_submission),
        )
        .route(
            "/admin/submissions/{id}/approve",
            post(handlers::admin::approve_submission),
        )
        .route(
            "/admin/submissions/{id}/reject",
            post(handlers::admin::reject_submission),
        )
        .route(
            "/admin/submissions/{id}/note",
            patch(handlers::admin::annotate_submission),
        );

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(crate::api_doc::get_openapi_spec()) }),
        )
        .nest(API_PREFIX, api)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let origins = config.cors_origins();
    let layer = if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers(Any)
    } else {
        let parsed: Result<Vec<HeaderValue>, _> =
            origins.iter().map(|o| o.parse::<HeaderValue>()).collect();
        CorsLayer::new()
            .allow_origin(parsed?)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers(Any)
    };
    Ok(layer)
}
