//! 网关内存存储实现

use crate::error::StorageError;
use crate::models::GatewayRecord;
use crate::traits::GatewayStore;
use crate::validation::ensure_non_empty;
use std::collections::HashMap;
use std::sync::RwLock;

/// 网关内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryGatewayStore {
    gateways: RwLock<HashMap<String, GatewayRecord>>,
}

impl InMemoryGatewayStore {
    pub fn new() -> Self {
        Self {
            gateways: RwLock::new(HashMap::new()),
        }
    }

    /// 网关数量（用于测试）
    pub fn len(&self) -> usize {
        self.gateways.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_active<F>(&self, predicate: F) -> Result<Option<GatewayRecord>, StorageError>
    where
        F: Fn(&GatewayRecord) -> bool,
    {
        let map = self
            .gateways
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map
            .values()
            .find(|item| item.is_active && predicate(item))
            .cloned())
    }
}

impl Default for InMemoryGatewayStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl GatewayStore for InMemoryGatewayStore {
    async fn find_active_by_mac(&self, mac: &str) -> Result<Option<GatewayRecord>, StorageError> {
        self.find_active(|item| item.mac_address.as_deref() == Some(mac))
    }

    async fn find_active_by_imei(
        &self,
        imei: &str,
    ) -> Result<Option<GatewayRecord>, StorageError> {
        self.find_active(|item| item.imei.as_deref() == Some(imei))
    }

    async fn find_active_by_serial(
        &self,
        serial_number: &str,
    ) -> Result<Option<GatewayRecord>, StorageError> {
        self.find_active(|item| item.serial_number == serial_number)
    }

    async fn find_gateway(&self, gateway_id: &str) -> Result<Option<GatewayRecord>, StorageError> {
        let item = self
            .gateways
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .get(gateway_id)
            .cloned();
        Ok(item)
    }

    async fn insert_gateway_if_absent(
        &self,
        record: GatewayRecord,
    ) -> Result<(GatewayRecord, bool), StorageError> {
        ensure_non_empty("gateway_id", &record.gateway_id)?;
        let mut map = self
            .gateways
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if let Some(existing) = map.get(&record.gateway_id) {
            return Ok((existing.clone(), false));
        }
        map.insert(record.gateway_id.clone(), record.clone());
        Ok((record, true))
    }
}
