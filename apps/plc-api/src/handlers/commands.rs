//! 控制命令 handlers
//!
//! - POST /plc/command
//! - GET /plc/commands

use crate::AppState;
use crate::middleware::require_principal;
use crate::utils::response::{command_record_to_dto, gateway_error, storage_error};
use api_contract::{ApiResponse, CommandHistoryQuery, CommandRecordDto, ExecuteCommandRequest};
use axum::{
    Json,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use plc_control::CommandInput;
use std::net::SocketAddr;

/// 下发命令
///
/// 字段校验、参数解析、执行、落库与审计全部由网关编排；
/// handler 只负责认证与形状转换。
pub async fn execute_command(
    State(state): State<AppState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<ExecuteCommandRequest>,
) -> Response {
    let principal = match require_principal(&state, &headers, peer_addr) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    let input = CommandInput {
        command: req.command,
        value: req.value,
        area: req.area,
        address: req.address,
    };
    match state.gateway.execute_command(&principal, input).await {
        Ok(record) => (
            StatusCode::OK,
            Json(ApiResponse::success(command_record_to_dto(record))),
        )
            .into_response(),
        Err(err) => gateway_error(err),
    }
}

/// 列出自己的命令历史（时间倒序）
pub async fn list_commands(
    State(state): State<AppState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    Query(query): Query<CommandHistoryQuery>,
    headers: HeaderMap,
) -> Response {
    let principal = match require_principal(&state, &headers, peer_addr) {
        Ok(principal) => principal,
        Err(response) => return response,
    };
    let limit = query.limit.unwrap_or(100).max(0);
    match state
        .command_store
        .list_command_records(&principal, limit)
        .await
    {
        Ok(items) => {
            let data: Vec<CommandRecordDto> =
                items.into_iter().map(command_record_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}
