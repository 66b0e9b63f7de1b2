//! 审计事件模型。

use chrono::{SecondsFormat, Utc};
use domain::{PlcCommand, Principal};
use serde::{Deserialize, Serialize};

/// 命令成功路径的审计动作。
pub const ACTION_COMMAND: &str = "PLC_COMMAND";
/// 命令失败路径的审计动作。
pub const ACTION_COMMAND_ERROR: &str = "PLC_COMMAND_ERROR";

/// 审计事件：一次命令尝试的不可变记录，无论结果如何都会尝试写入。
///
/// 成功事件携带 `command` 与 `result`；失败事件额外携带 `error`。
/// 与命令记录互为独立兄弟，仅通过 `user_id` + `timestamp` 关联——
/// 审计写入失败因此不会阻塞或污染命令记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub action: String,
    pub timestamp: String,
    #[serde(rename = "sourceIP", default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<PlcCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEvent {
    /// 成功形态事件（action = PLC_COMMAND，result 取执行器报告的状态）。
    pub fn command(principal: &Principal, command: &PlcCommand, result: impl Into<String>) -> Self {
        Self {
            user_id: Some(principal.user_id.clone()),
            user_email: Some(principal.email.clone()),
            action: ACTION_COMMAND.to_string(),
            timestamp: now_rfc3339(),
            source_ip: Some(principal.source_address.clone()),
            command: Some(command.clone()),
            result: Some(result.into()),
            error: None,
        }
    }

    /// 失败形态事件（action = PLC_COMMAND_ERROR，携带错误消息）。
    pub fn command_error(
        principal: &Principal,
        command: Option<&PlcCommand>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(principal.user_id.clone()),
            user_email: Some(principal.email.clone()),
            action: ACTION_COMMAND_ERROR.to_string(),
            timestamp: now_rfc3339(),
            source_ip: Some(principal.source_address.clone()),
            command: command.cloned(),
            result: None,
            error: Some(error.into()),
        }
    }
}

/// 当前 UTC 时间的 RFC 3339 表示（毫秒精度）。
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
