use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use domain::{PlcCommand, Principal};
use plc_audit::{
    AuditLogEntry, AuditQueryService, AuditSink, AuditStreamStore, InMemoryAuditStreamStore,
};
use plc_control::{
    CommandExecutor, CommandGateway, CommandGatewayConfig, CommandInput, ExecutionOutcome,
    ExecutorError, GatewayError, SimulatedExecutor,
};
use plc_secrets::{ParameterStore, SecretError, SecretResolver};
use plc_storage::{CommandRecord, CommandRecordStore, InMemoryCommandRecordStore, StorageError};

const LOG_GROUP: &str = "plc-control-audit";

/// 记录调用次数的参数存储。
struct CountingParameterStore {
    calls: AtomicUsize,
    entries: HashMap<String, String>,
}

impl CountingParameterStore {
    fn seeded() -> Self {
        let mut entries = HashMap::new();
        entries.insert("/plc/secure/ip-address".to_string(), "192.0.2.1".to_string());
        entries.insert("/plc/secure/mqtt-topic".to_string(), "plant/line-1/plc".to_string());
        entries.insert("/plc/secure/gateway-id".to_string(), "gw-01".to_string());
        Self {
            calls: AtomicUsize::new(0),
            entries,
        }
    }

    fn missing_gateway_id() -> Self {
        let mut store = Self::seeded();
        store.entries.remove("/plc/secure/gateway-id");
        store
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ParameterStore for CountingParameterStore {
    async fn get_parameters(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, String>, SecretError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(names
            .iter()
            .filter_map(|name| {
                self.entries
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect())
    }
}

/// 记录调用次数的执行器。
struct CountingExecutor {
    calls: AtomicUsize,
    inner: SimulatedExecutor,
}

impl CountingExecutor {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            inner: SimulatedExecutor,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CommandExecutor for CountingExecutor {
    async fn execute(
        &self,
        params: &plc_secrets::SecureParameters,
        command: &PlcCommand,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(params, command).await
    }
}

/// 总是失败的执行器。
struct FailingExecutor;

#[async_trait::async_trait]
impl CommandExecutor for FailingExecutor {
    async fn execute(
        &self,
        _: &plc_secrets::SecureParameters,
        _: &PlcCommand,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        Err(ExecutorError::Transport("device unreachable".to_string()))
    }
}

/// 永不返回的执行器（验证墙钟上限）。
struct HangingExecutor;

#[async_trait::async_trait]
impl CommandExecutor for HangingExecutor {
    async fn execute(
        &self,
        _: &plc_secrets::SecureParameters,
        _: &PlcCommand,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        unreachable!("timeout must fire first")
    }
}

/// 记录调用次数的命令记录存储。
struct CountingRecordStore {
    calls: AtomicUsize,
    inner: InMemoryCommandRecordStore,
    fail: bool,
}

impl CountingRecordStore {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            inner: InMemoryCommandRecordStore::new(),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            inner: InMemoryCommandRecordStore::new(),
            fail: true,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CommandRecordStore for CountingRecordStore {
    async fn create_command_record(
        &self,
        principal: &Principal,
        record: CommandRecord,
    ) -> Result<CommandRecord, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StorageError::new("store unavailable"));
        }
        self.inner.create_command_record(principal, record).await
    }

    async fn list_command_records(
        &self,
        principal: &Principal,
        limit: i64,
    ) -> Result<Vec<CommandRecord>, StorageError> {
        self.inner.list_command_records(principal, limit).await
    }
}

/// 总是失败的审计流存储。
struct FailingAuditStore {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl AuditStreamStore for FailingAuditStore {
    async fn create_stream(&self, _: &str, _: &str) -> Result<(), plc_audit::AuditStoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(plc_audit::AuditStoreError::Store("unreachable".to_string()))
    }

    async fn append(
        &self,
        _: &str,
        _: &str,
        _: plc_audit::RawAuditEntry,
    ) -> Result<(), plc_audit::AuditStoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(plc_audit::AuditStoreError::Store("unreachable".to_string()))
    }

    async fn filter(
        &self,
        _: &str,
        _: Option<i64>,
        _: Option<i64>,
        _: i64,
    ) -> Result<plc_audit::AuditPage, plc_audit::AuditStoreError> {
        Err(plc_audit::AuditStoreError::Store("unreachable".to_string()))
    }
}

struct Fixture {
    gateway: CommandGateway,
    params: Arc<CountingParameterStore>,
    executor: Arc<CountingExecutor>,
    records: Arc<CountingRecordStore>,
    audit_store: Arc<InMemoryAuditStreamStore>,
}

fn fixture() -> Fixture {
    let params = Arc::new(CountingParameterStore::seeded());
    let executor = Arc::new(CountingExecutor::new());
    let records = Arc::new(CountingRecordStore::new());
    let audit_store = Arc::new(InMemoryAuditStreamStore::new());
    let gateway = CommandGateway::new(
        Arc::new(SecretResolver::new(params.clone(), "/plc/secure")),
        executor.clone(),
        records.clone(),
        Arc::new(AuditSink::new(audit_store.clone(), LOG_GROUP)),
    );
    Fixture {
        gateway,
        params,
        executor,
        records,
        audit_store,
    }
}

fn alice() -> Principal {
    Principal::new("alice", "alice@example.com", "203.0.113.10")
}

fn write_command() -> CommandInput {
    CommandInput {
        command: "write".to_string(),
        value: "100".to_string(),
        area: Some("DM".to_string()),
        address: Some("31000".to_string()),
    }
}

async fn audit_events(store: Arc<InMemoryAuditStreamStore>) -> Vec<AuditLogEntry> {
    AuditQueryService::new(store, LOG_GROUP)
        .query(None, None, None)
        .await
        .expect("query")
        .logs
}

#[tokio::test]
async fn happy_path_returns_persisted_record_and_audits_once() {
    let fx = fixture();
    let record = fx
        .gateway
        .execute_command(&alice(), write_command())
        .await
        .expect("record");

    assert_eq!(record.status, "success");
    assert_eq!(record.owner, "alice");
    assert_eq!(record.value, "100");
    assert_eq!(record.area.as_deref(), Some("DM"));

    let events = audit_events(fx.audit_store).await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        AuditLogEntry::Event(event) => {
            assert_eq!(event.action, "PLC_COMMAND");
            assert_eq!(event.result.as_deref(), Some("success"));
            assert_eq!(event.user_id.as_deref(), Some("alice"));
            assert_eq!(event.source_ip.as_deref(), Some("203.0.113.10"));
        }
        other => panic!("expected event, got {other:?}"),
    }
}

#[tokio::test]
async fn record_ids_are_unique_across_runs() {
    let fx = fixture();
    let mut ids = std::collections::HashSet::new();
    for _ in 0..20 {
        let record = fx
            .gateway
            .execute_command(&alice(), write_command())
            .await
            .expect("record");
        assert!(ids.insert(record.id));
    }
}

#[tokio::test]
async fn validation_failure_makes_no_downstream_calls() {
    let fx = fixture();
    let input = CommandInput {
        command: "".to_string(),
        value: "100".to_string(),
        area: None,
        address: None,
    };
    let result = fx.gateway.execute_command(&alice(), input).await;
    assert!(matches!(result, Err(GatewayError::Validation(_))));

    assert_eq!(fx.params.call_count(), 0);
    assert_eq!(fx.executor.call_count(), 0);
    assert_eq!(fx.records.call_count(), 0);
    assert!(audit_events(fx.audit_store).await.is_empty());

    let input = CommandInput {
        command: "write".to_string(),
        value: "  ".to_string(),
        area: None,
        address: None,
    };
    let result = fx.gateway.execute_command(&alice(), input).await;
    assert!(matches!(result, Err(GatewayError::Validation(_))));
}

#[tokio::test]
async fn audit_failure_does_not_change_result() {
    let params = Arc::new(CountingParameterStore::seeded());
    let records = Arc::new(CountingRecordStore::new());
    let audit_store = Arc::new(FailingAuditStore {
        calls: AtomicUsize::new(0),
    });
    let gateway = CommandGateway::new(
        Arc::new(SecretResolver::new(params, "/plc/secure")),
        Arc::new(SimulatedExecutor),
        records.clone(),
        Arc::new(AuditSink::new(audit_store.clone(), LOG_GROUP)),
    );

    let record = gateway
        .execute_command(&alice(), write_command())
        .await
        .expect("record despite audit failure");
    assert_eq!(record.status, "success");
    // 审计确实被尝试过
    assert!(audit_store.calls.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn missing_parameter_is_audited_configuration_error() {
    let params = Arc::new(CountingParameterStore::missing_gateway_id());
    let records = Arc::new(CountingRecordStore::new());
    let audit_store = Arc::new(InMemoryAuditStreamStore::new());
    let gateway = CommandGateway::new(
        Arc::new(SecretResolver::new(params, "/plc/secure")),
        Arc::new(SimulatedExecutor),
        records.clone(),
        Arc::new(AuditSink::new(audit_store.clone(), LOG_GROUP)),
    );

    let result = gateway.execute_command(&alice(), write_command()).await;
    assert!(matches!(result, Err(GatewayError::Configuration(_))));
    assert_eq!(records.call_count(), 0);

    let events = audit_events(audit_store).await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        AuditLogEntry::Event(event) => {
            assert_eq!(event.action, "PLC_COMMAND_ERROR");
            assert!(event.error.as_deref().unwrap_or_default().contains("gateway-id"));
        }
        other => panic!("expected event, got {other:?}"),
    }
}

#[tokio::test]
async fn executor_failure_is_audited_and_not_retried() {
    let params = Arc::new(CountingParameterStore::seeded());
    let records = Arc::new(CountingRecordStore::new());
    let audit_store = Arc::new(InMemoryAuditStreamStore::new());
    let gateway = CommandGateway::new(
        Arc::new(SecretResolver::new(params, "/plc/secure")),
        Arc::new(FailingExecutor),
        records.clone(),
        Arc::new(AuditSink::new(audit_store.clone(), LOG_GROUP)),
    );

    let result = gateway.execute_command(&alice(), write_command()).await;
    assert!(matches!(result, Err(GatewayError::Execution(_))));
    // 执行失败不落命令记录
    assert_eq!(records.call_count(), 0);

    let events = audit_events(audit_store).await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        AuditLogEntry::Event(event) => assert_eq!(event.action, "PLC_COMMAND_ERROR"),
        other => panic!("expected event, got {other:?}"),
    }
}

#[tokio::test]
async fn hung_device_call_hits_wall_clock_ceiling() {
    let params = Arc::new(CountingParameterStore::seeded());
    let audit_store = Arc::new(InMemoryAuditStreamStore::new());
    let gateway = CommandGateway::new_with_config(
        Arc::new(SecretResolver::new(params, "/plc/secure")),
        Arc::new(HangingExecutor),
        Arc::new(CountingRecordStore::new()),
        Arc::new(AuditSink::new(audit_store.clone(), LOG_GROUP)),
        CommandGatewayConfig {
            execute_timeout_ms: 20,
        },
    );

    let result = gateway.execute_command(&alice(), write_command()).await;
    match result {
        Err(GatewayError::Execution(message)) => assert!(message.contains("timed out")),
        other => panic!("expected execution timeout, got {other:?}"),
    }
    let events = audit_events(audit_store).await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn persistence_failure_is_audited_and_surfaced() {
    let params = Arc::new(CountingParameterStore::seeded());
    let records = Arc::new(CountingRecordStore::failing());
    let audit_store = Arc::new(InMemoryAuditStreamStore::new());
    let gateway = CommandGateway::new(
        Arc::new(SecretResolver::new(params, "/plc/secure")),
        Arc::new(SimulatedExecutor),
        records.clone(),
        Arc::new(AuditSink::new(audit_store.clone(), LOG_GROUP)),
    );

    let result = gateway.execute_command(&alice(), write_command()).await;
    assert!(matches!(result, Err(GatewayError::Persistence(_))));
    assert_eq!(records.call_count(), 1);

    let events = audit_events(audit_store).await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        AuditLogEntry::Event(event) => assert_eq!(event.action, "PLC_COMMAND_ERROR"),
        other => panic!("expected event, got {other:?}"),
    }
}
