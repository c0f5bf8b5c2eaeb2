//! Storage provider setup

use anyhow::{Context, Result};
use std::sync::Arc;

use clipvault_core::Config;
use clipvault_storage::{create_backup_store, create_media_store, BackupStore, MediaStore};

/// Construct the media host and backup vault clients from configuration.
pub fn setup_storage(config: &Config) -> Result<(Arc<dyn MediaStore>, Arc<dyn BackupStore>)> {
    let media = create_media_store(config).context("Failed to initialize the media host client")?;
    tracing::info!(api_url = %config.media_api_url(), "Media host client ready");

    let backup =
        create_backup_store(config).context("Failed to initialize the backup vault client")?;
    tracing::info!(
        api_url = %config.vault_api_url(),
        base_path = %config.vault_base_path(),
        "Backup vault client ready"
    );

    Ok((media, backup))
}
