//! 通知对象内存存储：长者、租户（含成员）、地图 App 用户。

use crate::error::StorageError;
use crate::models::{ElderRecord, MapUserRecord, TenantMemberRecord, TenantRecord};
use crate::traits::{ElderStore, MapUserStore, TenantStore};
use crate::validation::ensure_non_empty;
use std::collections::HashMap;
use std::sync::RwLock;

pub struct InMemoryElderStore {
    elders: RwLock<HashMap<String, ElderRecord>>,
}

impl InMemoryElderStore {
    pub fn new() -> Self {
        Self {
            elders: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryElderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ElderStore for InMemoryElderStore {
    async fn find_elder(&self, elder_id: &str) -> Result<Option<ElderRecord>, StorageError> {
        Ok(self
            .elders
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .get(elder_id)
            .cloned())
    }

    async fn create_elder(&self, record: ElderRecord) -> Result<ElderRecord, StorageError> {
        ensure_non_empty("elder_id", &record.elder_id)?;
        ensure_non_empty("tenant_id", &record.tenant_id)?;
        let mut map = self
            .elders
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.elder_id) {
            return Err(StorageError::new("elder exists"));
        }
        map.insert(record.elder_id.clone(), record.clone());
        Ok(record)
    }
}

pub struct InMemoryTenantStore {
    tenants: RwLock<HashMap<String, TenantRecord>>,
    members: RwLock<Vec<TenantMemberRecord>>,
}

impl InMemoryTenantStore {
    pub fn new() -> Self {
        Self {
            tenants: RwLock::new(HashMap::new()),
            members: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryTenantStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn find_tenant(&self, tenant_id: &str) -> Result<Option<TenantRecord>, StorageError> {
        Ok(self
            .tenants
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .get(tenant_id)
            .cloned())
    }

    async fn create_tenant(&self, record: TenantRecord) -> Result<TenantRecord, StorageError> {
        ensure_non_empty("tenant_id", &record.tenant_id)?;
        let mut map = self
            .tenants
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.tenant_id) {
            return Err(StorageError::new("tenant exists"));
        }
        map.insert(record.tenant_id.clone(), record.clone());
        Ok(record)
    }

    async fn list_members(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<TenantMemberRecord>, StorageError> {
        let items = self
            .members
            .read()
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.tenant_id == tenant_id)
                    .cloned()
                    .collect()
            })
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(items)
    }

    async fn add_member(
        &self,
        record: TenantMemberRecord,
    ) -> Result<TenantMemberRecord, StorageError> {
        ensure_non_empty("tenant_id", &record.tenant_id)?;
        ensure_non_empty("member_id", &record.member_id)?;
        let mut items = self
            .members
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if items
            .iter()
            .any(|item| item.tenant_id == record.tenant_id && item.member_id == record.member_id)
        {
            return Err(StorageError::new("member exists"));
        }
        items.push(record.clone());
        Ok(record)
    }
}

pub struct InMemoryMapUserStore {
    users: RwLock<HashMap<String, MapUserRecord>>,
}

impl InMemoryMapUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryMapUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MapUserStore for InMemoryMapUserStore {
    async fn find_map_user(&self, user_id: &str) -> Result<Option<MapUserRecord>, StorageError> {
        Ok(self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .get(user_id)
            .cloned())
    }

    async fn create_map_user(&self, record: MapUserRecord) -> Result<MapUserRecord, StorageError> {
        ensure_non_empty("user_id", &record.user_id)?;
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.user_id) {
            return Err(StorageError::new("map user exists"));
        }
        map.insert(record.user_id.clone(), record.clone());
        Ok(record)
    }
}
