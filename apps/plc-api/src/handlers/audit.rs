//! 审计日志 handlers
//!
//! - GET /audit-logs
//!
//! 查询参数:
//!   - startTime: 可选，RFC 3339 开始时间（闭区间）
//!   - endTime: 可选，RFC 3339 结束时间（闭区间）
//!   - limit: 可选，返回数量限制（默认 100，服务端上限 1000）

use crate::AppState;
use crate::middleware::require_principal;
use crate::utils::response::bad_request_error;
use api_contract::{ApiResponse, AuditLogQuery};
use axum::{
    Json,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::DateTime;
use std::net::SocketAddr;

/// 查询审计日志
pub async fn get_audit_logs(
    State(state): State<AppState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    Query(query): Query<AuditLogQuery>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = require_principal(&state, &headers, peer_addr) {
        return response;
    }
    let from_ms = match parse_time(query.start_time.as_deref(), "startTime") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let to_ms = match parse_time(query.end_time.as_deref(), "endTime") {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state.audit_query.query(from_ms, to_ms, query.limit).await {
        Ok(page) => (StatusCode::OK, Json(ApiResponse::success(page))).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error("INTERNAL.ERROR", err.to_string())),
        )
            .into_response(),
    }
}

/// RFC 3339 时间戳转毫秒；非法输入拒绝整个请求。
fn parse_time(value: Option<&str>, field: &str) -> Result<Option<i64>, Response> {
    match value {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|at| Some(at.timestamp_millis()))
            .map_err(|_| bad_request_error(format!("{field} must be an RFC 3339 timestamp"))),
        None => Ok(None),
    }
}
