//! Config-driven construction of the storage providers.

use std::sync::Arc;
use std::time::Duration;

use clipvault_core::Config;

use crate::backup::{VaultBackupStore, VaultTokenSource};
use crate::media_host::HostedMediaStore;
use crate::token::BearerTokenCache;
use crate::traits::{BackupStore, MediaStore, StorageError, StorageResult};

/// Create the primary media host client from configuration.
pub fn create_media_store(config: &Config) -> StorageResult<Arc<dyn MediaStore>> {
    let store = HostedMediaStore::new(
        config.media_api_url().to_string(),
        config.media_api_key().map(String::from),
        Duration::from_secs(config.upload_timeout_secs()),
    )?;
    Ok(Arc::new(store))
}

/// Create the backup vault client, wiring its bearer-token cache.
pub fn create_backup_store(config: &Config) -> StorageResult<Arc<dyn BackupStore>> {
    let app_key = config
        .vault_app_key()
        .ok_or_else(|| StorageError::ConfigError("VAULT_APP_KEY not configured".to_string()))?;
    let app_secret = config
        .vault_app_secret()
        .ok_or_else(|| StorageError::ConfigError("VAULT_APP_SECRET not configured".to_string()))?;
    let refresh_token = config.vault_refresh_token().ok_or_else(|| {
        StorageError::ConfigError("VAULT_REFRESH_TOKEN not configured".to_string())
    })?;

    let source = VaultTokenSource::new(
        config.vault_api_url(),
        app_key.to_string(),
        app_secret.to_string(),
        refresh_token.to_string(),
    )?;
    let tokens = Arc::new(BearerTokenCache::new(
        Arc::new(source),
        config.token_refresh_margin_secs(),
    ));

    let store = VaultBackupStore::new(
        config.vault_api_url().to_string(),
        config.vault_content_url().to_string(),
        tokens,
        Duration::from_secs(config.upload_timeout_secs()),
        config.chunked_upload_threshold_bytes(),
        config.chunk_size_bytes(),
    )?;
    Ok(Arc::new(store))
}
