//! 警报内存存储实现

use crate::error::StorageError;
use crate::models::AlertRecord;
use crate::traits::AlertStore;
use crate::validation::ensure_non_empty;
use domain::AlertType;
use std::sync::RwLock;

pub struct InMemoryAlertStore {
    alerts: RwLock<Vec<AlertRecord>>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self {
            alerts: RwLock::new(Vec::new()),
        }
    }

    /// 全部警报（用于测试）
    pub fn all(&self) -> Vec<AlertRecord> {
        self.alerts
            .read()
            .map(|items| items.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryAlertStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn recent_alerts(
        &self,
        elder_id: &str,
        gateway_id: &str,
        alert_type: AlertType,
        limit: usize,
    ) -> Result<Vec<AlertRecord>, StorageError> {
        let mut items: Vec<AlertRecord> = self
            .alerts
            .read()
            .map(|items| {
                items
                    .iter()
                    .filter(|item| {
                        item.elder_id == elder_id
                            && item.gateway_id == gateway_id
                            && item.alert_type == alert_type
                    })
                    .cloned()
                    .collect()
            })
            .map_err(|_| StorageError::new("lock failed"))?;
        items.sort_by(|a, b| b.triggered_at_ms.cmp(&a.triggered_at_ms));
        items.truncate(limit);
        Ok(items)
    }

    async fn create_alert(&self, record: AlertRecord) -> Result<AlertRecord, StorageError> {
        ensure_non_empty("alert_id", &record.alert_id)?;
        let mut items = self
            .alerts
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        items.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::poison;

    #[tokio::test]
    async fn poisoned_lock_does_not_reopen_debounce() {
        let store = InMemoryAlertStore::new();
        poison(&store.alerts);

        let err = store
            .recent_alerts("elder-1", "gw-edge", AlertType::Boundary, 10)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "lock failed");
    }
}
