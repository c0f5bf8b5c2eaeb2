//! Bearer credential cache for the backup vault.
//!
//! The vault credential is a refreshable bearer token with a bounded validity
//! window. The cache owns the current value and refreshes it proactively a
//! margin before expiry. The mutex is held across the refresh await, so
//! concurrent callers that arrive during a refresh wait for the one in flight
//! instead of issuing their own.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::traits::StorageResult;

/// A freshly issued bearer token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Source of fresh tokens (an OAuth-style refresh endpoint in production,
/// a scripted double in tests).
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn refresh(&self) -> StorageResult<IssuedToken>;
}

pub struct BearerTokenCache {
    source: Arc<dyn TokenSource>,
    margin: Duration,
    state: Mutex<Option<IssuedToken>>,
}

impl BearerTokenCache {
    pub fn new(source: Arc<dyn TokenSource>, margin_secs: i64) -> Self {
        BearerTokenCache {
            source,
            margin: Duration::seconds(margin_secs.max(0)),
            state: Mutex::new(None),
        }
    }

    /// Current token, refreshed if absent or within the expiry margin.
    pub async fn token(&self) -> StorageResult<String> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.as_ref() {
            if Utc::now() + self.margin < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }
        tracing::debug!("Refreshing vault bearer token");
        let fresh = self.source.refresh().await?;
        let access_token = fresh.access_token.clone();
        *state = Some(fresh);
        Ok(access_token)
    }

    /// Drop the cached value so the next caller refreshes (e.g. after a 401).
    pub async fn invalidate(&self) {
        self.state.lock().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        refreshes: AtomicUsize,
        ttl_secs: i64,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn refresh(&self) -> StorageResult<IssuedToken> {
            let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            // Yield so concurrent callers pile up on the cache lock mid-refresh.
            tokio::task::yield_now().await;
            Ok(IssuedToken {
                access_token: format!("token-{}", n),
                expires_at: Utc::now() + Duration::seconds(self.ttl_secs),
            })
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let source = Arc::new(CountingSource {
            refreshes: AtomicUsize::new(0),
            ttl_secs: 3600,
        });
        let cache = Arc::new(BearerTokenCache::new(source.clone(), 60));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.token().await.unwrap() }));
        }
        let mut tokens = Vec::new();
        for handle in handles {
            tokens.push(handle.await.unwrap());
        }

        assert_eq!(source.refreshes.load(Ordering::SeqCst), 1);
        assert!(tokens.iter().all(|t| t == "token-1"));
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let source = Arc::new(CountingSource {
            refreshes: AtomicUsize::new(0),
            ttl_secs: 0,
        });
        let cache = BearerTokenCache::new(source.clone(), 60);

        cache.token().await.unwrap();
        cache.token().await.unwrap();
        // TTL of zero is always inside the refresh margin, so each call refreshes.
        assert_eq!(source.refreshes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let source = Arc::new(CountingSource {
            refreshes: AtomicUsize::new(0),
            ttl_secs: 3600,
        });
        let cache = BearerTokenCache::new(source.clone(), 60);

        let first = cache.token().await.unwrap();
        cache.invalidate().await;
        let second = cache.token().await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-2");
        assert_eq!(source.refreshes.load(Ordering::SeqCst), 2);
    }
}
