//! Configuration module
//!
//! This module provides configuration structures for the portal API and services,
//! including database, storage provider, upload limit, and SMTP settings.

use std::env;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Base configuration shared by the HTTP surface
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Full portal configuration
#[derive(Clone, Debug)]
pub struct PortalConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Media host (primary playback provider)
    pub media_api_url: String,
    pub media_api_key: Option<String>,
    // Backup object vault (path-addressed, bearer credential)
    pub vault_api_url: String,
    pub vault_content_url: String,
    pub vault_app_key: Option<String>,
    pub vault_app_secret: Option<String>,
    pub vault_refresh_token: Option<String>,
    pub vault_base_path: String,
    // Record-store artifact addressing
    pub artifact_public_base_url: String,
    // Upload limits and behavior
    pub max_video_size_bytes: usize,
    pub video_allowed_extensions: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
    pub max_signature_size_bytes: usize,
    pub upload_timeout_secs: u64,
    pub chunked_upload_threshold_bytes: usize,
    pub chunk_size_bytes: usize,
    // Bearer token cache
    pub token_refresh_margin_secs: i64,
    // Confirmation email
    pub confirmations_enabled: bool,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub smtp_tls: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<PortalConfig>);

impl Config {
    fn as_portal(&self) -> &PortalConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_portal().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = PortalConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_portal().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_portal().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_portal().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_portal().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_portal().base.db_timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.as_portal().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.as_portal().database_url
    }

    pub fn media_api_url(&self) -> &str {
        &self.as_portal().media_api_url
    }

    pub fn media_api_key(&self) -> Option<&str> {
        self.as_portal().media_api_key.as_deref()
    }

    pub fn vault_api_url(&self) -> &str {
        &self.as_portal().vault_api_url
    }

    pub fn vault_content_url(&self) -> &str {
        &self.as_portal().vault_content_url
    }

    pub fn vault_app_key(&self) -> Option<&str> {
        self.as_portal().vault_app_key.as_deref()
    }

    pub fn vault_app_secret(&self) -> Option<&str> {
        self.as_portal().vault_app_secret.as_deref()
    }

    pub fn vault_refresh_token(&self) -> Option<&str> {
        self.as_portal().vault_refresh_token.as_deref()
    }

    pub fn vault_base_path(&self) -> &str {
        &self.as_portal().vault_base_path
    }

    pub fn artifact_public_base_url(&self) -> &str {
        &self.as_portal().artifact_public_base_url
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.as_portal().max_video_size_bytes
    }

    pub fn video_allowed_extensions(&self) -> &[String] {
        &self.as_portal().video_allowed_extensions
    }

    pub fn video_allowed_content_types(&self) -> &[String] {
        &self.as_portal().video_allowed_content_types
    }

    pub fn max_signature_size_bytes(&self) -> usize {
        self.as_portal().max_signature_size_bytes
    }

    pub fn upload_timeout_secs(&self) -> u64 {
        self.as_portal().upload_timeout_secs
    }

    pub fn chunked_upload_threshold_bytes(&self) -> usize {
        self.as_portal().chunked_upload_threshold_bytes
    }

    pub fn chunk_size_bytes(&self) -> usize {
        self.as_portal().chunk_size_bytes
    }

    pub fn token_refresh_margin_secs(&self) -> i64 {
        self.as_portal().token_refresh_margin_secs
    }

    pub fn confirmations_enabled(&self) -> bool {
        self.as_portal().confirmations_enabled
    }

    pub fn smtp_host(&self) -> Option<&str> {
        self.as_portal().smtp_host.as_deref()
    }

    pub fn smtp_port(&self) -> Option<u16> {
        self.as_portal().smtp_port
    }

    pub fn smtp_user(&self) -> Option<&str> {
        self.as_portal().smtp_user.as_deref()
    }

    pub fn smtp_password(&self) -> Option<&str> {
        self.as_portal().smtp_password.as_deref()
    }

    pub fn smtp_from(&self) -> Option<&str> {
        self.as_portal().smtp_from.as_deref()
    }

    pub fn smtp_tls(&self) -> bool {
        self.as_portal().smtp_tls
    }
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MAX_VIDEO_SIZE_MB: usize = 500;
        const MAX_SIGNATURE_SIZE_KB: usize = 512;
        const UPLOAD_TIMEOUT_SECS: u64 = 600;
        const CHUNKED_THRESHOLD_MB: usize = 150;
        const CHUNK_SIZE_MB: usize = 8;
        const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let video_allowed_extensions = env::var("VIDEO_ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "mp4,mov,webm,avi,mkv".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let video_allowed_content_types = env::var("VIDEO_ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| {
                "video/mp4,video/quicktime,video/webm,video/x-msvideo,video/x-matroska".to_string()
            })
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cors_origins: cors_origins_str
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        Ok(PortalConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            media_api_url: env::var("MEDIA_API_URL")
                .unwrap_or_else(|_| "https://ws.api.video".to_string()),
            media_api_key: env::var("MEDIA_API_KEY").ok(),
            vault_api_url: env::var("VAULT_API_URL")
                .unwrap_or_else(|_| "https://api.dropboxapi.com/2".to_string()),
            vault_content_url: env::var("VAULT_CONTENT_URL")
                .unwrap_or_else(|_| "https://content.dropboxapi.com/2".to_string()),
            vault_app_key: env::var("VAULT_APP_KEY").ok(),
            vault_app_secret: env::var("VAULT_APP_SECRET").ok(),
            vault_refresh_token: env::var("VAULT_REFRESH_TOKEN").ok(),
            vault_base_path: env::var("VAULT_BASE_PATH")
                .unwrap_or_else(|_| format!("/{}", crate::constants::PENDING_NAMESPACE)),
            artifact_public_base_url: env::var("ARTIFACT_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/artifacts".to_string()),
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            video_allowed_extensions,
            video_allowed_content_types,
            max_signature_size_bytes: env::var("MAX_SIGNATURE_SIZE_KB")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(MAX_SIGNATURE_SIZE_KB)
                * 1024,
            upload_timeout_secs: env::var("UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(UPLOAD_TIMEOUT_SECS),
            chunked_upload_threshold_bytes: env::var("CHUNKED_THRESHOLD_MB")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(CHUNKED_THRESHOLD_MB)
                * 1024
                * 1024,
            chunk_size_bytes: env::var("CHUNK_SIZE_MB")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(CHUNK_SIZE_MB)
                * 1024
                * 1024,
            token_refresh_margin_secs: env::var("TOKEN_REFRESH_MARGIN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(TOKEN_REFRESH_MARGIN_SECS),
            confirmations_enabled: env::var("CONFIRMATIONS_ENABLED")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: env::var("SMTP_PORT").ok().and_then(|v| v.parse().ok()),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            smtp_from: env::var("SMTP_FROM").ok(),
            smtp_tls: env::var("SMTP_TLS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(true),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.database_url.trim().is_empty() {
            return Err(anyhow::anyhow!("DATABASE_URL must not be empty"));
        }
        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be positive"));
        }
        if self.chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!("CHUNK_SIZE_MB must be positive"));
        }
        if !self.vault_base_path.starts_with('/') {
            return Err(anyhow::anyhow!("VAULT_BASE_PATH must start with '/'"));
        }
        let is_production = {
            let env = self.base.environment.to_lowercase();
            env == "production" || env == "prod"
        };
        if is_production && self.media_api_key.is_none() {
            return Err(anyhow::anyhow!("MEDIA_API_KEY must be set in production"));
        }
        if is_production
            && (self.vault_app_key.is_none()
                || self.vault_app_secret.is_none()
                || self.vault_refresh_token.is_none())
        {
            return Err(anyhow::anyhow!(
                "VAULT_APP_KEY, VAULT_APP_SECRET and VAULT_REFRESH_TOKEN must be set in production"
            ));
        }
        Ok(())
    }
}
