//! Clipvault Storage Library
//!
//! This crate provides the storage-provider abstraction and implementations for
//! Clipvault: the primary media host (playback URLs), the backup object vault
//! (path-addressed, folder semantics, move support, bearer credential), and
//! in-memory doubles for tests.
//!
//! # Path format
//!
//! Backup vault paths are absolute and namespace-scoped:
//! `{base_path}/{timestamp}_{firstName}_{lastName}/{filename}`. Paths must not
//! contain `..`. Namespace derivation is centralized in
//! `clipvault_core::validation::namespace_slug` so every caller stays consistent.

pub mod backup;
pub mod connectivity;
pub mod factory;
pub mod media_host;
pub mod memory;
pub mod progress;
pub mod token;
pub mod traits;

// Re-export commonly used types
pub use backup::{VaultBackupStore, VaultTokenSource};
pub use connectivity::{AlwaysOnline, ConnectivityProbe, HttpConnectivityProbe};
pub use factory::{create_backup_store, create_media_store};
pub use media_host::HostedMediaStore;
pub use memory::{InMemoryBackupStore, InMemoryMediaStore};
pub use progress::{noop_progress, ProgressSink, TransferProgress};
pub use token::{BearerTokenCache, IssuedToken, TokenSource};
pub use traits::{BackupObject, BackupStore, MediaAsset, MediaStore, StorageError, StorageResult};
