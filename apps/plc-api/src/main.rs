//! PLC 控制网关 HTTP API：登录/刷新、命令下发、命令历史与审计查询。

mod handlers;
mod middleware;
mod routes;
mod utils;

use plc_audit::{
    AuditQueryService, AuditSink, AuditStreamStore, InMemoryAuditStreamStore, PgAuditStreamStore,
};
use plc_auth::{AuthService, JwtManager};
use plc_config::{AppConfig, ExecutorKind};
use plc_control::{
    CommandExecutor, CommandGateway, CommandGatewayConfig, MqttExecutor, MqttExecutorConfig,
    SimulatedExecutor,
};
use plc_secrets::{EnvParameterStore, SecretResolver};
use plc_storage::{
    CommandRecordStore, InMemoryCommandRecordStore, InMemoryUserStore, PgCommandRecordStore,
    PgUserStore, UserStore, connect_pool,
};
use plc_telemetry::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 进程级共享状态：每个协作方一个无状态、可并发复用的客户端。
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub gateway: Arc<CommandGateway>,
    pub audit_query: Arc<AuditQueryService>,
    pub command_store: Arc<dyn CommandRecordStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // 存储：有数据库配置时用 Postgres，否则用内存实现（本地演示）
    let (user_store, command_store, audit_store): (
        Arc<dyn UserStore>,
        Arc<dyn CommandRecordStore>,
        Arc<dyn AuditStreamStore>,
    ) = match &config.database_url {
        Some(database_url) => {
            let pool = connect_pool(database_url).await?;
            (
                Arc::new(PgUserStore::new(pool.clone())),
                Arc::new(PgCommandRecordStore::new(pool.clone())),
                Arc::new(PgAuditStreamStore::new(pool)),
            )
        }
        None => {
            info!(target: "plc.api", "no database configured, using in-memory stores");
            (
                Arc::new(InMemoryUserStore::with_default_operator()),
                Arc::new(InMemoryCommandRecordStore::new()),
                Arc::new(InMemoryAuditStreamStore::new()),
            )
        }
    };

    // 身份提供方：JWT 签发与校验
    let jwt = JwtManager::new(
        config.jwt_secret.clone(),
        config.jwt_access_ttl_seconds,
        config.jwt_refresh_ttl_seconds,
    );
    let auth = Arc::new(AuthService::new(user_store, jwt));

    // 秘密参数解析器（环境变量参数存储，短 TTL 缓存可选）
    let secrets = Arc::new(SecretResolver::with_cache_ttl(
        Arc::new(EnvParameterStore::new()),
        config.parameter_prefix.clone(),
        Duration::from_secs(config.secret_cache_ttl_seconds),
    ));

    // 命令执行器：模拟或 MQTT
    let executor: Arc<dyn CommandExecutor> = match config.executor {
        ExecutorKind::Simulated => Arc::new(SimulatedExecutor),
        ExecutorKind::Mqtt => {
            let (executor, _eventloop) = MqttExecutor::connect(MqttExecutorConfig {
                host: config.mqtt_host.clone(),
                port: config.mqtt_port,
                username: config.mqtt_username.clone(),
                password: config.mqtt_password.clone(),
                qos: config.mqtt_qos,
            })?;
            Arc::new(executor)
        }
    };

    // 审计：写入端 + 查询端共用一个流存储
    let audit_sink = Arc::new(AuditSink::new(
        audit_store.clone(),
        config.audit_log_group.clone(),
    ));
    let audit_query = Arc::new(AuditQueryService::new(
        audit_store,
        config.audit_log_group.clone(),
    ));

    // 命令网关（编排器）
    let gateway = Arc::new(CommandGateway::new_with_config(
        secrets,
        executor,
        command_store.clone(),
        audit_sink,
        CommandGatewayConfig {
            execute_timeout_ms: config.command_timeout_seconds.saturating_mul(1000),
        },
    ));

    let state = AppState {
        auth,
        gateway,
        audit_query,
        command_store,
    };

    // 路由同时挂在 / 和 /api/ 两种前缀下
    let api = routes::create_api_router();
    let app = axum::Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(axum::middleware::from_fn(middleware::request_context));

    info!(target: "plc.api", addr = %config.http_addr, "listening");
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
