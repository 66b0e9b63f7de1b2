//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 健康检查：/health
//! - 认证接口：/login, /refresh-token
//! - 命令下发与历史：/plc/command, /plc/commands
//! - 审计查询：/audit-logs
//! - 指标快照：/metrics

use super::AppState;
use super::handlers::*;
use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post},
};

/// 创建 API 路由
///
/// 返回包含所有 API 端点的 Router，由 main 挂载到 / 和 /api/ 两种前缀
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/plc/command", post(execute_command))
        .route("/plc/commands", get(list_commands))
        .route("/audit-logs", get(get_audit_logs))
        .route("/metrics", get(get_metrics))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}
