use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// The three independent storage providers a submission attempt touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Media,
    Backup,
    Record,
}

impl Display for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Provider::Media => write!(f, "media"),
            Provider::Backup => write!(f, "backup"),
            Provider::Record => write!(f, "record"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "media" => Ok(Provider::Media),
            "backup" => Ok(Provider::Backup),
            "record" => Ok(Provider::Record),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Per-provider progress/result slot for one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SlotState {
    pub status: SlotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for SlotState {
    fn default() -> Self {
        SlotState {
            status: SlotStatus::Idle,
            locator: None,
            error: None,
        }
    }
}

/// Three-slot status projection for a single submission attempt.
///
/// Transitions are monotonic within one attempt (idle → pending → success|error);
/// a retry resets exactly one errored slot back to pending. This projection is
/// never the system of record; whether a submission happened is determined
/// solely by the existence of its row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadStatus {
    pub media: SlotState,
    pub backup: SlotState,
    pub record: SlotState,
}

impl UploadStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, provider: Provider) -> &SlotState {
        match provider {
            Provider::Media => &self.media,
            Provider::Backup => &self.backup,
            Provider::Record => &self.record,
        }
    }

    fn slot_mut(&mut self, provider: Provider) -> &mut SlotState {
        match provider {
            Provider::Media => &mut self.media,
            Provider::Backup => &mut self.backup,
            Provider::Record => &mut self.record,
        }
    }

    /// idle → pending. Returns false (and leaves the slot alone) for any other state.
    pub fn begin(&mut self, provider: Provider) -> bool {
        let slot = self.slot_mut(provider);
        if slot.status != SlotStatus::Idle {
            return false;
        }
        slot.status = SlotStatus::Pending;
        true
    }

    /// pending → success, recording the provider locator.
    pub fn succeed(&mut self, provider: Provider, locator: impl Into<String>) -> bool {
        let slot = self.slot_mut(provider);
        if slot.status != SlotStatus::Pending {
            return false;
        }
        slot.status = SlotStatus::Success;
        slot.locator = Some(locator.into());
        slot.error = None;
        true
    }

    /// pending → error, recording a presentable message.
    pub fn fail(&mut self, provider: Provider, error: impl Into<String>) -> bool {
        let slot = self.slot_mut(provider);
        if slot.status != SlotStatus::Pending {
            return false;
        }
        slot.status = SlotStatus::Error;
        slot.error = Some(error.into());
        true
    }

    /// Retry entry point: error → pending for this slot only; siblings untouched.
    pub fn reset(&mut self, provider: Provider) -> bool {
        let slot = self.slot_mut(provider);
        if slot.status != SlotStatus::Error {
            return false;
        }
        slot.status = SlotStatus::Pending;
        slot.error = None;
        true
    }

    pub fn succeeded(&self, provider: Provider) -> bool {
        self.slot(provider).status == SlotStatus::Success
    }

    pub fn failed(&self, provider: Provider) -> bool {
        self.slot(provider).status == SlotStatus::Error
    }

    /// One of the binary providers failed while the other succeeded.
    pub fn is_partial(&self) -> bool {
        self.succeeded(Provider::Media) != self.succeeded(Provider::Backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_start_idle() {
        let status = UploadStatus::new();
        assert_eq!(status.media.status, SlotStatus::Idle);
        assert_eq!(status.backup.status, SlotStatus::Idle);
        assert_eq!(status.record.status, SlotStatus::Idle);
    }

    #[test]
    fn test_transitions_are_monotonic() {
        let mut status = UploadStatus::new();
        assert!(status.begin(Provider::Media));
        assert!(!status.begin(Provider::Media), "pending slot cannot re-begin");
        assert!(status.succeed(Provider::Media, "vid_1"));
        assert!(
            !status.fail(Provider::Media, "too late"),
            "success is final within an attempt"
        );
        assert_eq!(status.media.locator.as_deref(), Some("vid_1"));
    }

    #[test]
    fn test_fail_requires_pending() {
        let mut status = UploadStatus::new();
        assert!(!status.fail(Provider::Backup, "never started"));
        status.begin(Provider::Backup);
        assert!(status.fail(Provider::Backup, "timeout"));
        assert_eq!(status.backup.status, SlotStatus::Error);
        assert_eq!(status.backup.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_reset_touches_only_the_errored_slot() {
        let mut status = UploadStatus::new();
        status.begin(Provider::Media);
        status.succeed(Provider::Media, "vid_2");
        status.begin(Provider::Backup);
        status.fail(Provider::Backup, "connection reset");

        assert!(status.reset(Provider::Backup));
        assert_eq!(status.backup.status, SlotStatus::Pending);
        assert!(status.backup.error.is_none());
        // Sibling slots untouched
        assert_eq!(status.media.status, SlotStatus::Success);
        assert_eq!(status.record.status, SlotStatus::Idle);
    }

    #[test]
    fn test_reset_refuses_non_errored_slots() {
        let mut status = UploadStatus::new();
        assert!(!status.reset(Provider::Media));
        status.begin(Provider::Media);
        assert!(!status.reset(Provider::Media));
        status.succeed(Provider::Media, "vid_3");
        assert!(!status.reset(Provider::Media));
    }

    #[test]
    fn test_partial_detection() {
        let mut status = UploadStatus::new();
        status.begin(Provider::Media);
        status.succeed(Provider::Media, "vid_4");
        status.begin(Provider::Backup);
        status.fail(Provider::Backup, "offline");
        assert!(status.is_partial());

        let mut both = UploadStatus::new();
        both.begin(Provider::Media);
        both.succeed(Provider::Media, "vid_5");
        both.begin(Provider::Backup);
        both.succeed(Provider::Backup, "/submissions/x");
        assert!(!both.is_partial());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("media".parse::<Provider>().unwrap(), Provider::Media);
        assert_eq!("Backup".parse::<Provider>().unwrap(), Provider::Backup);
        assert!("tape".parse::<Provider>().is_err());
    }
}
