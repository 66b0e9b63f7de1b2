//! Telemetry 指标快照
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use plc_telemetry::metrics;
use std::net::SocketAddr;

use crate::AppState;
use crate::middleware::require_principal;

pub async fn get_metrics(
    State(state): State<AppState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = require_principal(&state, &headers, peer_addr) {
        return response;
    }

    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            commands_received: snapshot.commands_received,
            commands_succeeded: snapshot.commands_succeeded,
            commands_failed: snapshot.commands_failed,
            validation_failures: snapshot.validation_failures,
            configuration_failures: snapshot.configuration_failures,
            execution_failures: snapshot.execution_failures,
            persistence_failures: snapshot.persistence_failures,
            audit_events_appended: snapshot.audit_events_appended,
            audit_append_failures: snapshot.audit_append_failures,
            audit_queries: snapshot.audit_queries,
            command_latency_ms_total: snapshot.command_latency_ms_total,
            command_latency_ms_count: snapshot.command_latency_ms_count,
        })),
    )
        .into_response()
}
