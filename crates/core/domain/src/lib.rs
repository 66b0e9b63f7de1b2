//! 核心领域模型：请求主体与 PLC 命令。

use serde::{Deserialize, Serialize};

/// 请求主体：认证通过后每个请求携带的调用者身份。
///
/// 由身份提供方的 claims 解析一次得到，请求生命周期内不可变。
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub email: String,
    pub source_address: String,
}

impl Principal {
    /// 构造显式身份的请求主体。
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        source_address: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            source_address: source_address.into(),
        }
    }

    /// 替换来源地址（中间件在连接层补全）。
    pub fn with_source_address(mut self, source_address: impl Into<String>) -> Self {
        self.source_address = source_address.into();
        self
    }
}

impl Default for Principal {
    /// 空主体（仅用于测试或占位）。
    fn default() -> Self {
        Self {
            user_id: "".to_string(),
            email: "".to_string(),
            source_address: "".to_string(),
        }
    }
}

/// 读命令。
pub const COMMAND_READ: &str = "read";
/// 写命令。
pub const COMMAND_WRITE: &str = "write";

/// PLC 命令：经校验构造的命令输入。
///
/// `command` 与 `value` 必须非空；`area`、`address` 可选。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlcCommand {
    pub command: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl PlcCommand {
    /// 校验并构造命令：`command`/`value` 去除空格后非空才通过。
    pub fn validated(
        command: impl Into<String>,
        value: impl Into<String>,
        area: Option<String>,
        address: Option<String>,
    ) -> Result<Self, CommandValidationError> {
        let command = command.into().trim().to_string();
        let value = value.into().trim().to_string();
        if command.is_empty() || value.is_empty() {
            return Err(CommandValidationError::MissingField);
        }
        Ok(Self {
            command,
            value,
            area,
            address,
        })
    }

    /// 是否为写命令（写操作不允许隐式重试）。
    pub fn is_write(&self) -> bool {
        self.command == COMMAND_WRITE
    }
}

/// 命令构造校验错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandValidationError {
    MissingField,
}

impl std::fmt::Display for CommandValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField => write!(f, "command and value are required"),
        }
    }
}

impl std::error::Error for CommandValidationError {}
