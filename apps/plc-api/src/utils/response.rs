//! HTTP 响应辅助函数和 DTO 转换
//!
//! 提供统一的错误响应构造函数和 DTO 转换函数：
//! - 错误响应：auth_error, bad_request_error, internal_auth_error, gateway_error, storage_error
//! - DTO 转换：command_record_to_dto
//!
//! 设计原则：
//! - 所有错误返回统一的 ApiResponse 格式
//! - HTTP 状态码与错误码对应
//! - 调用方要么拿到完整的命令记录，要么拿到单个结构化错误

use api_contract::{ApiResponse, CommandRecordDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use plc_auth::AuthError;
use plc_control::GatewayError;
use plc_storage::{CommandRecord, StorageError};

/// 认证错误响应
pub fn auth_error(status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()>::error(
            "AUTH.UNAUTHORIZED",
            "unauthorized",
        )),
    )
        .into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 认证内部错误响应
pub fn internal_auth_error(err: AuthError) -> Response {
    let message = err.to_string();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// 存储错误响应
pub fn storage_error(err: StorageError) -> Response {
    let message = err.to_string();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// 网关错误响应：错误分类映射到状态码与错误码
pub fn gateway_error(err: GatewayError) -> Response {
    let (status, code) = match &err {
        GatewayError::Validation(_) => (StatusCode::BAD_REQUEST, "COMMAND.VALIDATION"),
        GatewayError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMAND.CONFIGURATION"),
        GatewayError::Execution(_) => (StatusCode::BAD_GATEWAY, "COMMAND.EXECUTION"),
        GatewayError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMAND.PERSISTENCE"),
    };
    (
        status,
        Json(ApiResponse::<()>::error(code, err.to_string())),
    )
        .into_response()
}

/// CommandRecord 转 CommandRecordDto
pub fn command_record_to_dto(record: CommandRecord) -> CommandRecordDto {
    let result = record
        .result
        .as_deref()
        .map(|raw| serde_json::from_str(raw).unwrap_or(serde_json::Value::String(raw.to_string())));
    CommandRecordDto {
        id: record.id,
        user_id: record.user_id,
        timestamp: record.timestamp,
        command: record.command,
        value: record.value,
        area: record.area,
        address: record.address,
        status: record.status,
        result,
        created_at: record.created_at,
        updated_at: record.updated_at,
        owner: record.owner,
    }
}
