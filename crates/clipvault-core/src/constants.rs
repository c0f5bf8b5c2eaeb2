//! Shared constants for namespace layout in the object stores.

/// Top-level folder for freshly submitted clips in the backup vault.
pub const PENDING_NAMESPACE: &str = "submissions";

/// Top-level folder approved clips are relocated into.
pub const APPROVED_NAMESPACE: &str = "approved";

/// Bucket-style prefix for companion artifacts held by the record store.
pub const ARTIFACT_PREFIX: &str = "artifacts";

/// Filename for the human-readable metadata artifact written next to each upload.
pub const METADATA_ARTIFACT_FILENAME: &str = "submission.txt";
