//! 验证辅助函数
//!
//! 提供统一的验证逻辑，确保数据一致性：
//! - ensure_principal：验证请求主体非空
//! - ensure_owner：验证记录归属请求主体
//!
//! 使用场景：
//! - 所有命令记录访问前验证请求主体
//! - 写入前验证记录归属发起者

use crate::error::StorageError;
use crate::models::CommandRecord;
use domain::Principal;

/// 验证请求主体非空
///
/// 确保所有数据访问都有已认证的调用者。
pub fn ensure_principal(principal: &Principal) -> Result<(), StorageError> {
    if principal.user_id.is_empty() {
        return Err(StorageError::new("user_id required"));
    }
    Ok(())
}

/// 验证记录归属
///
/// 命令记录必须由发起者本人拥有。
pub fn ensure_owner(principal: &Principal, record: &CommandRecord) -> Result<(), StorageError> {
    ensure_principal(principal)?;
    if record.owner != principal.user_id || record.user_id != principal.user_id {
        return Err(StorageError::new("owner mismatch"));
    }
    Ok(())
}
