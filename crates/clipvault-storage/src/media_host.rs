//! Primary media host client.
//!
//! The media host is an opaque HTTP service: one multipart POST per clip,
//! returning a stable locator and public playback URL. Progress is derived
//! from the bytes the transport actually consumes from the request stream.

use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::progress::{observed_byte_stream, ProgressSink};
use crate::traits::{MediaAsset, MediaStore, StorageError, StorageResult};
use async_trait::async_trait;

const STREAM_CHUNK_BYTES: usize = 64 * 1024;

/// Media host implementation backed by the hosted video API.
#[derive(Clone)]
pub struct HostedMediaStore {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: Option<String>,
}

impl HostedMediaStore {
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        Ok(HostedMediaStore {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
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
        let provider_message = response
            .json::<ProviderError>()
            .await
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| status.to_string());
        match status {
            StatusCode::PAYLOAD_TOO_LARGE => StorageError::QuotaExceeded(provider_message),
            StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::BAD_REQUEST => {
                StorageError::Validation(provider_message)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                StorageError::Auth(provider_message)
            }
            StatusCode::NOT_FOUND => StorageError::NotFound(provider_message),
            StatusCode::TOO_MANY_REQUESTS => StorageError::QuotaExceeded(provider_message),
            _ => StorageError::Transport(format!("{}: {}", status, provider_message)),
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key.as_deref() {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl MediaStore for HostedMediaStore {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
        progress: ProgressSink,
    ) -> StorageResult<MediaAsset> {
        let total = data.len() as u64;
        let stream = observed_byte_stream(data, STREAM_CHUNK_BYTES, progress);
        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| StorageError::Validation(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .authorized(self.client.post(format!("{}/videos", self.api_url)))
            .multipart(form)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Transport(format!("malformed upload response: {}", e)))?;

        tracing::info!(locator = %body.id, "Media host upload complete");
        Ok(MediaAsset {
            locator: body.id,
            public_url: body.url,
        })
    }

    async fn delete(&self, locator: &str) -> StorageResult<()> {
        let response = self
            .authorized(self.client.delete(format!(
                "{}/videos/{}",
                self.api_url,
                urlencoding::encode(locator)
            )))
            .send()
            .await
            .map_err(Self::classify_transport)?;

        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }
        Ok(())
    }
}
