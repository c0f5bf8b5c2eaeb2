//! In-memory provider doubles for tests.
//!
//! Both stores record what they were given and can be scripted to fail a
//! given operation class, so orchestrator tests can exercise every
//! partial-failure combination without a network.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::progress::{ProgressSink, TransferProgress};
use crate::traits::{
    validate_path, BackupObject, BackupStore, MediaAsset, MediaStore, StorageError, StorageResult,
};

#[derive(Default)]
struct MediaState {
    assets: HashMap<String, (String, Vec<u8>)>,
    next_id: u64,
}

/// In-memory media host double.
#[derive(Default)]
pub struct InMemoryMediaStore {
    state: Mutex<MediaState>,
    failure: Mutex<Option<StorageError>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with the given error until cleared.
    pub fn fail_with(&self, err: StorageError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn asset_count(&self) -> usize {
        self.state.lock().unwrap().assets.len()
    }

    pub fn contains(&self, locator: &str) -> bool {
        self.state.lock().unwrap().assets.contains_key(locator)
    }

    fn check_failure(&self) -> StorageResult<()> {
        match self.failure.lock().unwrap().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
        progress: ProgressSink,
    ) -> StorageResult<MediaAsset> {
        self.check_failure()?;
        let total = data.len() as u64;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let locator = format!("vid_{:06}", state.next_id);
        let public_url = format!("https://media.test/{}/{}", locator, filename);
        state
            .assets
            .insert(locator.clone(), (content_type.to_string(), data));
        drop(state);
        progress(TransferProgress {
            bytes_sent: total,
            total_bytes: Some(total),
            simulated: false,
        });
        Ok(MediaAsset {
            locator,
            public_url,
        })
    }

    async fn delete(&self, locator: &str) -> StorageResult<()> {
        self.check_failure()?;
        let mut state = self.state.lock().unwrap();
        state
            .assets
            .remove(locator)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(locator.to_string()))
    }
}

#[derive(Default)]
struct BackupState {
    folders: HashSet<String>,
    objects: HashMap<String, Vec<u8>>,
    next_id: u64,
}

/// In-memory backup vault double.
#[derive(Default)]
pub struct InMemoryBackupStore {
    state: Mutex<BackupState>,
    upload_failure: Mutex<Option<StorageError>>,
    move_failure: Mutex<Option<StorageError>>,
    folder_failure: Mutex<Option<StorageError>>,
}

impl InMemoryBackupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads_with(&self, err: StorageError) {
        *self.upload_failure.lock().unwrap() = Some(err);
    }

    pub fn fail_moves_with(&self, err: StorageError) {
        *self.move_failure.lock().unwrap() = Some(err);
    }

    pub fn fail_folders_with(&self, err: StorageError) {
        *self.folder_failure.lock().unwrap() = Some(err);
    }

    pub fn clear_failures(&self) {
        self.upload_failure.lock().unwrap().take();
        self.move_failure.lock().unwrap().take();
        self.folder_failure.lock().unwrap().take();
    }

    pub fn folder_count(&self) -> usize {
        self.state.lock().unwrap().folders.len()
    }

    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }

    pub fn has_object(&self, path: &str) -> bool {
        self.state.lock().unwrap().objects.contains_key(path)
    }

    pub fn object_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.state.lock().unwrap().objects.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn check(failure: &Mutex<Option<StorageError>>) -> StorageResult<()> {
        match failure.lock().unwrap().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BackupStore for InMemoryBackupStore {
    async fn create_folder(&self, path: &str) -> StorageResult<bool> {
        validate_path(path)?;
        Self::check(&self.folder_failure)?;
        Ok(self.state.lock().unwrap().folders.insert(path.to_string()))
    }

    async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        progress: ProgressSink,
    ) -> StorageResult<BackupObject> {
        validate_path(path)?;
        Self::check(&self.upload_failure)?;
        let total = data.len() as u64;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let locator = format!("obj_{:06}", state.next_id);
        state.objects.insert(path.to_string(), data);
        drop(state);
        progress(TransferProgress {
            bytes_sent: total,
            total_bytes: Some(total),
            simulated: false,
        });
        Ok(BackupObject {
            locator,
            path: path.to_string(),
        })
    }

    async fn move_object(&self, from_path: &str, to_path: &str) -> StorageResult<bool> {
        validate_path(from_path)?;
        validate_path(to_path)?;
        Self::check(&self.move_failure)?;
        let mut state = self.state.lock().unwrap();
        match state.objects.remove(from_path) {
            Some(data) => {
                state.objects.insert(to_path.to_string(), data);
                Ok(true)
            }
            None => Err(StorageError::NotFound(from_path.to_string())),
        }
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        validate_path(path)?;
        let mut state = self.state.lock().unwrap();
        state
            .objects
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        validate_path(path)?;
        Ok(self.state.lock().unwrap().objects.contains_key(path))
    }
}
