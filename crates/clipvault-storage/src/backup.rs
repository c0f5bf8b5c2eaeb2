//! Backup object vault client.
//!
//! The vault is a path-addressed object store with folder semantics, a
//! move/relocate call, and a refreshable bearer credential. Small payloads go
//! up in one content POST; payloads above the configured threshold use the
//! session (start/append/finish) variant, whose per-chunk progress events are
//! flagged simulated.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::progress::{ProgressSink, TransferProgress};
use crate::token::{BearerTokenCache, IssuedToken, TokenSource};
use crate::traits::{validate_path, BackupObject, BackupStore, StorageError, StorageResult};

/// Refreshes the vault bearer token from the OAuth-style token endpoint.
pub struct VaultTokenSource {
    client: Client,
    token_url: String,
    app_key: String,
    app_secret: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

impl VaultTokenSource {
    pub fn new(
        api_url: &str,
        app_key: String,
        app_secret: String,
        refresh_token: String,
    ) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        Ok(VaultTokenSource {
            client,
            token_url: format!("{}/oauth2/token", api_url.trim_end_matches('/')),
            app_key,
            app_secret,
            refresh_token,
        })
    }
}

#[async_trait]
impl TokenSource for VaultTokenSource {
    async fn refresh(&self) -> StorageResult<IssuedToken> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.app_key, Some(&self.app_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(StorageError::Auth(
                "vault refused the refresh credential".to_string(),
            ));
        }
        if !response.status().is_success() {
            return Err(StorageError::Transport(format!(
                "token refresh failed: {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Transport(format!("malformed token response: {}", e)))?;
        Ok(IssuedToken {
            access_token: body.access_token,
            expires_at: Utc::now() + ChronoDuration::seconds(body.expires_in),
        })
    }
}

/// Backup vault implementation over its JSON + content HTTP API.
pub struct VaultBackupStore {
    client: Client,
    api_url: String,
    content_url: String,
    tokens: Arc<BearerTokenCache>,
    chunk_threshold: usize,
    chunk_size: usize,
}

#[derive(Debug, Deserialize)]
struct ObjectResponse {
    id: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct VaultErrorBody {
    #[serde(default)]
    error_summary: Option<String>,
}

impl VaultBackupStore {
    pub fn new(
        api_url: String,
        content_url: String,
        tokens: Arc<BearerTokenCache>,
        timeout: Duration,
        chunk_threshold: usize,
        chunk_size: usize,
    ) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        Ok(VaultBackupStore {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            content_url: content_url.trim_end_matches('/').to_string(),
            tokens,
            chunk_threshold,
            chunk_size: chunk_size.max(1),
        })
    }

    fn classify_transport(err: reqwest::Error) -> StorageError {
        if err.is_timeout() {
            StorageError::Timeout(err.to_string())
        } else if err.is_connect() {
            StorageError::Transport(format!("connection failed: {}", err))
        } else {
            StorageError::Transport(err.to_string())
        }
    }

    async fn classify_status(response: reqwest::Response) -> StorageError {
        let status = response.status();
        let summary = response
            .json::<VaultErrorBody>()
            .await
            .ok()
            .and_then(|e| e.error_summary)
            .unwrap_or_else(|| status.to_string());
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::Auth(summary),
            StatusCode::NOT_FOUND => StorageError::NotFound(summary),
            StatusCode::PAYLOAD_TOO_LARGE | StatusCode::INSUFFICIENT_STORAGE => {
                StorageError::QuotaExceeded(summary)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                StorageError::Validation(summary)
            }
            _ => StorageError::Transport(format!("{}: {}", status, summary)),
        }
    }

    async fn bearer(&self) -> StorageResult<String> {
        self.tokens.token().await
    }

    async fn upload_small(
        &self,
        path: &str,
        data: Vec<u8>,
        progress: ProgressSink,
    ) -> StorageResult<BackupObject> {
        let token = self.bearer().await?;
        let total = data.len() as u64;
        let response = self
            .client
            .post(format!(
                "{}/files/upload?path={}",
                self.content_url,
                urlencoding::encode(path)
            ))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }
        let body: ObjectResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Transport(format!("malformed upload response: {}", e)))?;

        progress(TransferProgress {
            bytes_sent: total,
            total_bytes: Some(total),
            simulated: false,
        });
        Ok(BackupObject {
            locator: body.id,
            path: body.path,
        })
    }

    /// Session upload for large payloads. True resumable transfer is not
    /// implemented; progress here is synthesized per appended chunk and
    /// flagged as simulated.
    async fn upload_chunked(
        &self,
        path: &str,
        data: Vec<u8>,
        progress: ProgressSink,
    ) -> StorageResult<BackupObject> {
        let token = self.bearer().await?;
        let total = data.len() as u64;

        let response = self
            .client
            .post(format!("{}/files/upload_session/start", self.content_url))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(Self::classify_transport)?;
        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }
        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Transport(format!("malformed session response: {}", e)))?;

        let mut offset: u64 = 0;
        for chunk in data.chunks(self.chunk_size) {
            let response = self
                .client
                .post(format!(
                    "{}/files/upload_session/append?session_id={}&offset={}",
                    self.content_url,
                    urlencoding::encode(&session.session_id),
                    offset
                ))
                .bearer_auth(&token)
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(chunk.to_vec())
                .send()
                .await
                .map_err(Self::classify_transport)?;
            if !response.status().is_success() {
                return Err(Self::classify_status(response).await);
            }
            offset += chunk.len() as u64;
            tracing::debug!(
                session_id = %session.session_id,
                offset,
                total,
                simulated = true,
                "Vault session chunk appended"
            );
            progress(TransferProgress {
                bytes_sent: offset,
                total_bytes: Some(total),
                simulated: true,
            });
        }

        let response = self
            .client
            .post(format!(
                "{}/files/upload_session/finish?session_id={}&path={}",
                self.content_url,
                urlencoding::encode(&session.session_id),
                urlencoding::encode(path)
            ))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(Self::classify_transport)?;
        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }
        let body: ObjectResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Transport(format!("malformed finish response: {}", e)))?;
        Ok(BackupObject {
            locator: body.id,
            path: body.path,
        })
    }
}

#[async_trait]
impl BackupStore for VaultBackupStore {
    async fn create_folder(&self, path: &str) -> StorageResult<bool> {
        validate_path(path)?;
        let token = self.bearer().await?;
        let response = self
            .client
            .post(format!("{}/files/create_folder", self.api_url))
            .bearer_auth(token)
            .json(&json!({ "path": path, "autorename": false }))
            .send()
            .await
            .map_err(Self::classify_transport)?;

        // An existing folder is a conflict on the wire but not for us.
        if response.status() == StatusCode::CONFLICT {
            tracing::debug!(path, "Vault folder already exists");
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }
        Ok(true)
    }

    async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        progress: ProgressSink,
    ) -> StorageResult<BackupObject> {
        validate_path(path)?;
        if data.len() > self.chunk_threshold {
            self.upload_chunked(path, data, progress).await
        } else {
            self.upload_small(path, data, progress).await
        }
    }

    async fn move_object(&self, from_path: &str, to_path: &str) -> StorageResult<bool> {
        validate_path(from_path)?;
        validate_path(to_path)?;
        let token = self.bearer().await?;
        let response = self
            .client
            .post(format!("{}/files/move", self.api_url))
            .bearer_auth(token)
            .json(&json!({ "from_path": from_path, "to_path": to_path }))
            .send()
            .await
            .map_err(Self::classify_transport)?;

        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }
        Ok(true)
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        validate_path(path)?;
        let token = self.bearer().await?;
        let response = self
            .client
            .post(format!("{}/files/delete", self.api_url))
            .bearer_auth(token)
            .json(&json!({ "path": path }))
            .send()
            .await
            .map_err(Self::classify_transport)?;
        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        validate_path(path)?;
        let token = self.bearer().await?;
        let response = self
            .client
            .post(format!("{}/files/get_metadata", self.api_url))
            .bearer_auth(token)
            .json(&json!({ "path": path }))
            .send()
            .await
            .map_err(Self::classify_transport)?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(Self::classify_status(response).await),
        }
    }
}
