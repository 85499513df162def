//! 验证辅助函数
//!
//! 写入前的最小一致性检查：主键与关联键不得为空。

use crate::error::StorageError;

/// 验证字段非空
pub fn ensure_non_empty(field: &str, value: &str) -> Result<(), StorageError> {
    if value.trim().is_empty() {
        return Err(StorageError::new(format!("{field} required")));
    }
    Ok(())
}

/// 把数据库中的整数还原为 major/minor。
pub fn to_u16(field: &str, value: i32) -> Result<u16, StorageError> {
    u16::try_from(value).map_err(|_| StorageError::new(format!("{field} out of range: {value}")))
}
