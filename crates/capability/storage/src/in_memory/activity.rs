//! 设备活动内存存储实现（只追加）

use crate::error::StorageError;
use crate::models::ActivityRecord;
use crate::traits::ActivityStore;
use crate::validation::ensure_non_empty;
use std::sync::RwLock;

pub struct InMemoryActivityStore {
    activities: RwLock<Vec<ActivityRecord>>,
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self {
            activities: RwLock::new(Vec::new()),
        }
    }

    /// 全部活动数量（用于测试）
    pub fn len(&self) -> usize {
        self.activities.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryActivityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn append_activity(&self, record: ActivityRecord) -> Result<(), StorageError> {
        ensure_non_empty("activity_id", &record.activity_id)?;
        ensure_non_empty("device_id", &record.device_id)?;
        let mut items = self
            .activities
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        items.push(record);
        Ok(())
    }

    async fn list_activities(
        &self,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, StorageError> {
        let mut items: Vec<ActivityRecord> = self
            .activities
            .read()
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.device_id == device_id)
                    .cloned()
                    .collect()
            })
            .map_err(|_| StorageError::new("lock failed"))?;
        items.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
        items.truncate(limit);
        Ok(items)
    }
}
