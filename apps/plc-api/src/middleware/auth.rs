//! 认证和请求上下文中间件
//!
//! 提供以下中间件和辅助函数：
//! - request_context：请求上下文中间件，注入 request_id/trace_id
//! - bearer_token：从 Authorization 头提取 Bearer token
//! - require_principal：验证 token 并产出带来源地址的请求主体
//!
//! 认证流程：
//! 1. request_context：在所有请求前注入追踪 ID
//! 2. bearer_token：从请求头提取 token
//! 3. require_principal：验证 JWT 签名，补全来源地址，得到 Principal
//!
//! 授权模型是粗粒度的：任何已认证主体都可以下发命令和查询审计，
//! 未认证调用在到达网关之前就被拒绝。

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use domain::Principal;
use plc_auth::AuthError;
use plc_telemetry::new_request_ids;
use std::net::SocketAddr;
use tracing::{Instrument, info_span};

use crate::AppState;
use crate::utils::response::auth_error;

/// 请求上下文中间件：注入 request_id/trace_id
pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response: axum::response::Response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}

/// 从请求头中提取 Bearer token
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header_value = headers.get(header::AUTHORIZATION)?;
    let auth_str = header_value.to_str().ok()?;
    auth_str.strip_prefix("Bearer ")
}

/// 验证并产出请求主体（来源地址取转发头，退化为对端地址）
pub fn require_principal(
    state: &AppState,
    headers: &HeaderMap,
    peer_addr: SocketAddr,
) -> Result<Principal, Response> {
    let token = match bearer_token(headers) {
        Some(token) => token,
        None => return Err(auth_error(axum::http::StatusCode::UNAUTHORIZED)),
    };
    let principal = match state.auth.verify_access_token(token) {
        Ok(principal) => principal,
        Err(AuthError::TokenInvalid | AuthError::TokenExpired) => {
            return Err(auth_error(axum::http::StatusCode::UNAUTHORIZED));
        }
        Err(err) => return Err(crate::utils::response::internal_auth_error(err)),
    };
    Ok(principal.with_source_address(source_address(headers, peer_addr)))
}

/// 请求来源地址：x-forwarded-for 的第一跳优先，其次为对端地址。
fn source_address(headers: &HeaderMap, peer_addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| peer_addr.ip().to_string())
}
