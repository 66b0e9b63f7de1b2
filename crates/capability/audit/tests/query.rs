use std::sync::Arc;

use plc_audit::{
    AuditLogEntry, AuditQueryService, AuditStreamStore, InMemoryAuditStreamStore, MAX_QUERY_LIMIT,
    RawAuditEntry,
};

const LOG_GROUP: &str = "plc-control-audit";

async fn seeded_store(entries: Vec<RawAuditEntry>) -> Arc<InMemoryAuditStreamStore> {
    let store = Arc::new(InMemoryAuditStreamStore::new());
    store
        .create_stream(LOG_GROUP, "2023-11-14")
        .await
        .expect("stream");
    for entry in entries {
        store
            .append(LOG_GROUP, "2023-11-14", entry)
            .await
            .expect("append");
    }
    store
}

fn event_line(ts_ms: i64, action: &str) -> RawAuditEntry {
    RawAuditEntry {
        ts_ms,
        message: format!(
            r#"{{"userId":"alice","userEmail":"alice@example.com","action":"{action}","timestamp":"2023-11-14T22:13:20.000Z","sourceIP":"203.0.113.10","result":"success"}}"#
        ),
    }
}

#[tokio::test]
async fn limit_is_clamped_to_ceiling() {
    let entries: Vec<RawAuditEntry> = (0..1100)
        .map(|index| event_line(1_700_000_000_000 + index, "PLC_COMMAND"))
        .collect();
    let store = seeded_store(entries).await;
    let service = AuditQueryService::new(store, LOG_GROUP);

    let page = service.query(None, None, Some(5000)).await.expect("query");
    assert_eq!(page.count, MAX_QUERY_LIMIT as usize);
    assert_eq!(page.logs.len(), 1000);
    assert!(page.next_token.is_some());
}

#[tokio::test]
async fn malformed_line_degrades_to_raw() {
    let store = seeded_store(vec![
        RawAuditEntry {
            ts_ms: 1_700_000_000_000,
            message: "not json at all".to_string(),
        },
        event_line(1_700_000_000_001, "PLC_COMMAND"),
    ])
    .await;
    let service = AuditQueryService::new(store, LOG_GROUP);

    let page = service.query(None, None, None).await.expect("query");
    assert_eq!(page.count, 2);
    match &page.logs[0] {
        AuditLogEntry::Raw { timestamp, message } => {
            assert_eq!(message, "not json at all");
            assert!(timestamp.starts_with("2023-11-14T"));
        }
        other => panic!("expected raw entry, got {other:?}"),
    }
    match &page.logs[1] {
        AuditLogEntry::Event(event) => assert_eq!(event.action, "PLC_COMMAND"),
        other => panic!("expected event entry, got {other:?}"),
    }
}

#[tokio::test]
async fn time_bounds_are_inclusive() {
    let store = seeded_store(vec![
        event_line(1_700_000_000_000, "PLC_COMMAND"),
        event_line(1_700_000_000_500, "PLC_COMMAND"),
        event_line(1_700_000_001_000, "PLC_COMMAND_ERROR"),
    ])
    .await;
    let service = AuditQueryService::new(store, LOG_GROUP);

    let page = service
        .query(Some(1_700_000_000_000), Some(1_700_000_000_500), None)
        .await
        .expect("query");
    assert_eq!(page.count, 2);
}

#[tokio::test]
async fn ordering_is_chronological() {
    let store = seeded_store(vec![
        event_line(1_700_000_001_000, "PLC_COMMAND"),
        event_line(1_700_000_000_000, "PLC_COMMAND_ERROR"),
    ])
    .await;
    let service = AuditQueryService::new(store, LOG_GROUP);

    let page = service.query(None, None, None).await.expect("query");
    match (&page.logs[0], &page.logs[1]) {
        (AuditLogEntry::Event(first), AuditLogEntry::Event(second)) => {
            assert_eq!(first.action, "PLC_COMMAND_ERROR");
            assert_eq!(second.action, "PLC_COMMAND");
        }
        other => panic!("expected two events, got {other:?}"),
    }
}
