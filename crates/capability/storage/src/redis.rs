//! Redis 冷却状态（最新位置）存储实现
//!
//! 每个主体一个键 `beacon:location:{subject}`，值为 JSON。写入用 Lua 脚本
//! 在服务端比较时间戳后再覆盖，避免读后写的竞争。

use crate::error::StorageError;
use crate::models::LocationStateRecord;
use crate::traits::LocationStateStore;
use crate::validation::ensure_non_empty;
use redis::AsyncCommands;

// KEYS[1] 状态键；ARGV[1] 新时间戳；ARGV[2] 新 JSON。返回 1 表示已写入。
const SAVE_IF_NEWER: &str = r#"
local current = redis.call('GET', KEYS[1])
if current then
  local decoded = cjson.decode(current)
  if tonumber(decoded['timestamp_ms']) > tonumber(ARGV[1]) then
    return 0
  end
end
redis.call('SET', KEYS[1], ARGV[2])
return 1
"#;

fn state_key(subject: &str) -> String {
    format!("beacon:location:{subject}")
}

/// Redis 冷却状态存储
pub struct RedisLocationStateStore {
    client: redis::Client,
    script: redis::Script,
}

impl RedisLocationStateStore {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            script: redis::Script::new(SAVE_IF_NEWER),
        }
    }

    pub fn connect(redis_url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self::new(client))
    }
}

#[async_trait::async_trait]
impl LocationStateStore for RedisLocationStateStore {
    async fn get_state(&self, subject: &str) -> Result<Option<LocationStateRecord>, StorageError> {
        let mut connection = self.client.get_multiplexed_tokio_connection().await?;
        let data: Option<String> = connection.get(state_key(subject)).await?;
        let Some(data) = data else {
            return Ok(None);
        };
        let state: LocationStateRecord = serde_json::from_str(&data)?;
        Ok(Some(state))
    }

    async fn save_state(&self, state: &LocationStateRecord) -> Result<bool, StorageError> {
        ensure_non_empty("subject", &state.subject)?;
        let mut connection = self.client.get_multiplexed_tokio_connection().await?;
        let data = serde_json::to_string(state)?;
        let written: i64 = self
            .script
            .key(state_key(&state.subject))
            .arg(state.timestamp_ms)
            .arg(data)
            .invoke_async(&mut connection)
            .await?;
        Ok(written == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::state_key;

    #[test]
    fn state_key_is_namespaced() {
        assert_eq!(state_key("elder:e-1"), "beacon:location:elder:e-1");
    }
}
