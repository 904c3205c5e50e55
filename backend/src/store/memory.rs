use std::sync::Mutex;
use uuid::Uuid;

use super::{SpinStore, StoreError};
use crate::models::SpinRecord;
use shared::wheel::WheelConfig;

/// In-memory `SpinStore` mirroring the Postgres uniqueness and
/// ordering guarantees, for exercising the services without a
/// database.
#[derive(Default)]
pub struct MemorySpinStore {
    pub config: Mutex<Option<WheelConfig>>,
    pub spins: Mutex<Vec<SpinRecord>>,
}

impl MemorySpinStore {
    pub fn with_config(config: WheelConfig) -> Self {
        Self {
            config: Mutex::new(Some(config)),
            spins: Mutex::new(Vec::new()),
        }
    }

    pub fn spin_count(&self) -> usize {
        self.spins.lock().unwrap().len()
    }
}

#[axum::async_trait]
impl SpinStore for MemorySpinStore {
    async fn load_wheel_config(&self) -> Result<Option<WheelConfig>, StoreError> {
        Ok(self.config.lock().unwrap().clone())
    }

    async fn find_spin_by_token(
        &self,
        user_id: Uuid,
        request_token: &str,
    ) -> Result<Option<SpinRecord>, StoreError> {
        Ok(self
            .spins
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user_id == user_id && s.request_token == request_token)
            .cloned())
    }

    async fn latest_spin(&self, user_id: Uuid) -> Result<Option<SpinRecord>, StoreError> {
        Ok(self
            .spins
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn insert_spin(&self, record: &SpinRecord) -> Result<(), StoreError> {
        let mut spins = self.spins.lock().unwrap();
        if spins
            .iter()
            .any(|s| s.user_id == record.user_id && s.request_token == record.request_token)
        {
            return Err(StoreError::Conflict);
        }
        spins.push(record.clone());
        Ok(())
    }

    async fn list_spins(&self, user_id: Uuid, limit: i64) -> Result<Vec<SpinRecord>, StoreError> {
        let mut rows: Vec<SpinRecord> = self
            .spins
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}
