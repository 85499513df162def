//! 通知点内存存储实现

use crate::error::StorageError;
use crate::models::NotificationPointRecord;
use crate::traits::NotificationPointStore;
use crate::validation::ensure_non_empty;
use std::sync::RwLock;

pub struct InMemoryNotificationPointStore {
    points: RwLock<Vec<NotificationPointRecord>>,
}

impl InMemoryNotificationPointStore {
    pub fn new() -> Self {
        Self {
            points: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryNotificationPointStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl NotificationPointStore for InMemoryNotificationPointStore {
    async fn list_active_points(
        &self,
        owner_id: &str,
        gateway_id: &str,
    ) -> Result<Vec<NotificationPointRecord>, StorageError> {
        let items = self
            .points
            .read()
            .map(|items| {
                items
                    .iter()
                    .filter(|item| {
                        item.is_active && item.owner_id == owner_id && item.gateway_id == gateway_id
                    })
                    .cloned()
                    .collect()
            })
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(items)
    }

    async fn create_point(
        &self,
        record: NotificationPointRecord,
    ) -> Result<NotificationPointRecord, StorageError> {
        ensure_non_empty("point_id", &record.point_id)?;
        ensure_non_empty("owner_id", &record.owner_id)?;
        ensure_non_empty("gateway_id", &record.gateway_id)?;
        let mut items = self
            .points
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if items.iter().any(|item| item.point_id == record.point_id) {
            return Err(StorageError::new("notification point exists"));
        }
        items.push(record.clone());
        Ok(record)
    }
}
