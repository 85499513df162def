//! 冷却状态（最新位置）内存存储实现

use crate::error::StorageError;
use crate::models::LocationStateRecord;
use crate::traits::LocationStateStore;
use crate::validation::ensure_non_empty;
use std::collections::HashMap;
use std::sync::RwLock;

pub struct InMemoryLocationStateStore {
    states: RwLock<HashMap<String, LocationStateRecord>>,
}

impl InMemoryLocationStateStore {
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryLocationStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LocationStateStore for InMemoryLocationStateStore {
    async fn get_state(&self, subject: &str) -> Result<Option<LocationStateRecord>, StorageError> {
        Ok(self
            .states
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .get(subject)
            .cloned())
    }

    async fn save_state(&self, state: &LocationStateRecord) -> Result<bool, StorageError> {
        ensure_non_empty("subject", &state.subject)?;
        let mut map = self
            .states
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if let Some(current) = map.get(&state.subject) {
            if current.timestamp_ms > state.timestamp_ms {
                return Ok(false);
            }
        }
        map.insert(state.subject.clone(), state.clone());
        Ok(true)
    }
}
