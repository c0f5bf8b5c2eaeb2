use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use clipvault_core::models::{SubmissionRecord, SubmissionStatus};
use clipvault_core::AppError;
use clipvault_db::RecordStore;

/// In-memory record store for testing without a database. Insert and update
/// failures can be scripted to exercise the row-write failure paths.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    rows: Arc<Mutex<HashMap<Uuid, SubmissionRecord>>>,
    artifacts: Arc<Mutex<HashMap<String, (String, Vec<u8>)>>>,
    fail_inserts: Arc<Mutex<bool>>,
    fail_updates: Arc<Mutex<bool>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_inserts(&self, fail: bool) {
        *self.fail_inserts.lock().unwrap() = fail;
    }

    pub fn fail_updates(&self, fail: bool) {
        *self.fail_updates.lock().unwrap() = fail;
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.lock().unwrap().len()
    }

    pub fn has_artifact(&self, path: &str) -> bool {
        self.artifacts.lock().unwrap().contains_key(path)
    }

    pub fn add_record(&self, record: SubmissionRecord) {
        self.rows.lock().unwrap().insert(record.id, record);
    }

    fn simulated_db_error(context: &str) -> AppError {
        AppError::Internal(format!("simulated database failure: {}", context))
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: &SubmissionRecord) -> Result<Uuid, AppError> {
        if *self.fail_inserts.lock().unwrap() {
            return Err(Self::simulated_db_error("insert"));
        }
        self.rows
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(record.id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<SubmissionRecord>, AppError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, AppError> {
        let mut all: Vec<SubmissionRecord> = self.rows.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(all)
    }

    async fn update_status(&self, id: Uuid, status: SubmissionStatus) -> Result<bool, AppError> {
        if *self.fail_updates.lock().unwrap() {
            return Err(Self::simulated_db_error("update_status"));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get_mut(&id)
            .map(|r| r.status = status)
            .is_some())
    }

    async fn update_admin_note(&self, id: Uuid, note: Option<&str>) -> Result<bool, AppError> {
        if *self.fail_updates.lock().unwrap() {
            return Err(Self::simulated_db_error("update_admin_note"));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get_mut(&id)
            .map(|r| r.admin_note = note.map(String::from))
            .is_some())
    }

    async fn update_backup_path(&self, id: Uuid, path: &str) -> Result<bool, AppError> {
        if *self.fail_updates.lock().unwrap() {
            return Err(Self::simulated_db_error("update_backup_path"));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get_mut(&id)
            .map(|r| r.backup_path = Some(path.to_string()))
            .is_some())
    }

    async fn update_media_asset(
        &self,
        id: Uuid,
        locator: &str,
        public_url: &str,
    ) -> Result<bool, AppError> {
        if *self.fail_updates.lock().unwrap() {
            return Err(Self::simulated_db_error("update_media_asset"));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get_mut(&id)
            .map(|r| {
                r.media = Some(clipvault_core::models::MediaAssetRef {
                    locator: locator.to_string(),
                    public_url: public_url.to_string(),
                })
            })
            .is_some())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        if *self.fail_updates.lock().unwrap() {
            return Err(Self::simulated_db_error("delete"));
        }
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }

    async fn put_artifact(
        &self,
        path: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, AppError> {
        self.artifacts
            .lock()
            .unwrap()
            .insert(path.to_string(), (content_type.to_string(), data));
        Ok(path.to_string())
    }

    fn artifact_url(&self, path: &str) -> String {
        format!("http://records.test/artifacts/{}", path.trim_start_matches('/'))
    }
}
