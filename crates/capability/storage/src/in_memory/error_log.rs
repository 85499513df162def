//! 错误日志内存存储实现

use crate::error::StorageError;
use crate::models::ErrorLogRecord;
use crate::traits::ErrorLogStore;
use std::sync::RwLock;

pub struct InMemoryErrorLogStore {
    logs: RwLock<Vec<ErrorLogRecord>>,
}

impl InMemoryErrorLogStore {
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryErrorLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ErrorLogStore for InMemoryErrorLogStore {
    async fn create_error_log(&self, record: ErrorLogRecord) -> Result<(), StorageError> {
        let mut logs = self
            .logs
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        logs.push(record);
        Ok(())
    }

    async fn list_error_logs(&self, limit: usize) -> Result<Vec<ErrorLogRecord>, StorageError> {
        let mut items = self
            .logs
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .clone();
        items.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        items.truncate(limit);
        Ok(items)
    }
}
