//! Shared handle over the three-slot upload status projection.
//!
//! The orchestrator's concurrent provider tasks update their own slot through
//! this handle; the confirmation surface reads a snapshot. Transition rules
//! (monotonic within an attempt, single-slot reset on retry) live on
//! `UploadStatus` itself.

use clipvault_core::models::{Provider, SlotState, UploadStatus};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct StatusTracker {
    inner: Arc<Mutex<UploadStatus>>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, provider: Provider) -> bool {
        self.inner.lock().unwrap().begin(provider)
    }

    pub fn succeed(&self, provider: Provider, locator: impl Into<String>) -> bool {
        self.inner.lock().unwrap().succeed(provider, locator)
    }

    pub fn fail(&self, provider: Provider, error: impl Into<String>) -> bool {
        self.inner.lock().unwrap().fail(provider, error)
    }

    pub fn reset(&self, provider: Provider) -> bool {
        self.inner.lock().unwrap().reset(provider)
    }

    pub fn slot(&self, provider: Provider) -> SlotState {
        self.inner.lock().unwrap().slot(provider).clone()
    }

    pub fn snapshot(&self) -> UploadStatus {
        self.inner.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipvault_core::models::SlotStatus;

    #[tokio::test]
    async fn test_concurrent_slot_updates_do_not_interfere() {
        let tracker = StatusTracker::new();
        tracker.begin(Provider::Media);
        tracker.begin(Provider::Backup);

        let media = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.succeed(Provider::Media, "vid_1") })
        };
        let backup = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.fail(Provider::Backup, "down") })
        };
        assert!(media.await.unwrap());
        assert!(backup.await.unwrap());

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.media.status, SlotStatus::Success);
        assert_eq!(snapshot.backup.status, SlotStatus::Error);
        assert_eq!(snapshot.record.status, SlotStatus::Idle);
    }
}
