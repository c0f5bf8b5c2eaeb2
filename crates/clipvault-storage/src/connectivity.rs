//! Pre-flight connectivity probe.
//!
//! The orchestrator fails fast with an offline error before attempting any
//! provider call when no network is detected, so a dead connection never
//! produces partial state.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Answers "is the network reachable right now?".
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Probe that always reports online; used where no probe is configured and in tests.
pub struct AlwaysOnline;

#[async_trait]
impl ConnectivityProbe for AlwaysOnline {
    async fn is_online(&self) -> bool {
        true
    }
}

/// Cheap HEAD request against a well-known endpoint with a short deadline.
pub struct HttpConnectivityProbe {
    client: Client,
    url: String,
}

impl HttpConnectivityProbe {
    pub fn new(url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        HttpConnectivityProbe { client, url }
    }
}

#[async_trait]
impl ConnectivityProbe for HttpConnectivityProbe {
    async fn is_online(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Connectivity probe failed");
                !(err.is_connect() || err.is_timeout())
            }
        }
    }
}
