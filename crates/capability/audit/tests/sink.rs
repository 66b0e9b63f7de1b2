use std::sync::Arc;

use domain::{PlcCommand, Principal};
use plc_audit::{
    AuditEvent, AuditSink, AuditStoreError, AuditStreamStore, InMemoryAuditStreamStore,
};

const LOG_GROUP: &str = "plc-control-audit";

fn success_event() -> AuditEvent {
    let principal = Principal::new("alice", "alice@example.com", "203.0.113.10");
    let command = PlcCommand::validated("write", "100", Some("DM".to_string()), None).expect("command");
    AuditEvent::command(&principal, &command, "success")
}

#[tokio::test]
async fn append_creates_day_stream_lazily() {
    let store = Arc::new(InMemoryAuditStreamStore::new());
    let sink = AuditSink::new(store.clone(), LOG_GROUP);

    sink.append(&success_event()).await;

    let streams = store.stream_names(LOG_GROUP);
    assert_eq!(streams.len(), 1);
    // 流名为 UTC 日期
    assert_eq!(streams[0].len(), "2026-08-07".len());

    let page = store.filter(LOG_GROUP, None, None, 100).await.expect("filter");
    assert_eq!(page.entries.len(), 1);
}

#[tokio::test]
async fn same_day_create_race_is_tolerated() {
    let store = Arc::new(InMemoryAuditStreamStore::new());
    let sink = AuditSink::new(store.clone(), LOG_GROUP);

    // 第二次 append 会命中"流已存在"，两次都必须成功
    sink.append(&success_event()).await;
    sink.append(&success_event()).await;

    let page = store.filter(LOG_GROUP, None, None, 100).await.expect("filter");
    assert_eq!(page.entries.len(), 2);
    assert_eq!(store.stream_names(LOG_GROUP).len(), 1);
}

#[tokio::test]
async fn append_failure_is_swallowed() {
    struct FailingStore;

    #[async_trait::async_trait]
    impl AuditStreamStore for FailingStore {
        async fn create_stream(&self, _: &str, _: &str) -> Result<(), AuditStoreError> {
            Err(AuditStoreError::Store("unreachable".to_string()))
        }

        async fn append(
            &self,
            _: &str,
            _: &str,
            _: plc_audit::RawAuditEntry,
        ) -> Result<(), AuditStoreError> {
            Err(AuditStoreError::Store("unreachable".to_string()))
        }

        async fn filter(
            &self,
            _: &str,
            _: Option<i64>,
            _: Option<i64>,
            _: i64,
        ) -> Result<plc_audit::AuditPage, AuditStoreError> {
            Err(AuditStoreError::Store("unreachable".to_string()))
        }
    }

    let sink = AuditSink::new(Arc::new(FailingStore), LOG_GROUP);
    // 不发生 panic、不返回错误——失败只在本地可见
    sink.append(&success_event()).await;
}
