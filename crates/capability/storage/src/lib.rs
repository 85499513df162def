//! # Beacon Storage 模块
//!
//! 信标处理核心的存储抽象层，支持多种存储后端实现。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：每类记录一个异步 Trait
//! 2. **数据模型层** (`models.rs`)：网关、设备、通知对象、活动、警报、冷却状态、错误日志
//! 3. **错误处理层** (`error.rs`)：统一的 `StorageError`
//! 4. **验证辅助层** (`validation.rs`)：写入前的非空检查
//! 5. **连接管理层** (`connection.rs`)：Postgres 连接池
//! 6. **实现层**：
//!    - `in_memory/`：`RwLock` + `HashMap`/`Vec`，用于测试与本地演示
//!    - `postgres/`：sqlx 参数化查询，生产环境使用
//!    - `redis.rs`：冷却状态的 Redis 实现
//!
//! ## 核心约束
//!
//! - **网关自动注册不覆盖**：`insert_gateway_if_absent` 遇到同 ID 记录时原样返回
//! - **活动只追加**：`ActivityStore` 不提供更新和删除
//! - **冷却状态单调**：`save_state` 丢弃比已存状态更旧的写入
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use beacon_storage::{InMemoryLocationStateStore, LocationStateStore};
//!
//! let states = InMemoryLocationStateStore::new();
//! let latest = states.get_state("elder:e-1").await?;
//! ```

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod redis;
pub mod traits;
pub mod validation;

pub use connection::*;
pub use error::*;
pub use models::*;
pub use crate::redis::RedisLocationStateStore;
pub use traits::*;
pub use validation::*;

pub use in_memory::{
    InMemoryActivityStore, InMemoryAlertStore, InMemoryDeviceStore, InMemoryElderStore,
    InMemoryErrorLogStore, InMemoryGatewayStore, InMemoryLocationStateStore, InMemoryMapUserStore,
    InMemoryNotificationPointStore, InMemoryTenantStore,
};

pub use postgres::{
    PgActivityStore, PgAlertStore, PgDeviceStore, PgElderStore, PgErrorLogStore, PgGatewayStore,
    PgLocationStateStore, PgMapUserStore, PgNotificationPointStore, PgTenantStore,
};
