//! Application initialization: database, storage providers, services, routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;

use clipvault_core::Config;
use clipvault_db::{MailingListRepository, PgRecordStore, RecordStore};
use clipvault_services::{
    AdminQueryService, ConfirmationMailer, ModerationService, SubmissionUploadService,
};
use clipvault_storage::HttpConnectivityProbe;

use crate::state::AppState;

/// Wire the full application: pool + migrations, provider clients, domain
/// services, and the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let pool = database::setup_database(&config).await?;
    let (media, backup) = storage::setup_storage(&config)?;

    let records: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(
        pool.clone(),
        config.artifact_public_base_url().to_string(),
    ));
    let mailing_list = MailingListRepository::new(pool.clone());
    let mailer = ConfirmationMailer::from_config(&config);

    let upload = SubmissionUploadService::new(
        media.clone(),
        backup.clone(),
        records.clone(),
        config.vault_base_path().to_string(),
        Duration::from_secs(config.upload_timeout_secs()),
    )
    .with_probe(Arc::new(HttpConnectivityProbe::new(
        config.media_api_url().to_string(),
    )))
    .with_mailer(mailer);

    let moderation = ModerationService::new(
        records.clone(),
        backup.clone(),
        media.clone(),
        config.vault_base_path().to_string(),
    );
    let admin = AdminQueryService::new(records.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        mailing_list,
        upload,
        moderation,
        admin,
    });

    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router))
}
