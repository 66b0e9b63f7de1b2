//! 数据模型
//!
//! 定义所有存储相关的数据模型：
//! - 用户模型：UserRecord
//! - 命令记录模型：CommandRecord（追加语义，写后不变）

/// 用户记录。
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    /// 当前有效的 refresh token jti（登录/刷新时轮换）。
    pub refresh_jti: Option<String>,
}

impl UserRecord {
    /// 将用户记录转换为请求主体（来源地址由中间件补全）。
    pub fn to_principal(&self) -> domain::Principal {
        domain::Principal::new(self.user_id.clone(), self.email.clone(), "")
    }
}

/// 命令记录：一次命令执行的持久化结果。
///
/// `id` 为 `<epoch_ms>-<随机后缀>`，时间有序且无需中心序列。
/// 记录由发起者所有（`owner == user_id`），写入一次后不再变更。
#[derive(Debug, Clone)]
pub struct CommandRecord {
    pub id: String,
    pub user_id: String,
    /// RFC 3339 UTC 时间戳（毫秒精度，字典序即时间序）。
    pub timestamp: String,
    pub command: String,
    pub value: String,
    pub area: Option<String>,
    pub address: Option<String>,
    /// "success" | "error"，取自执行器报告的状态。
    pub status: String,
    /// 执行器返回的结果载荷（序列化 JSON）。
    pub result: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub owner: String,
}
