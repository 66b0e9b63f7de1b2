use std::sync::Arc;
use std::time::Duration;

use plc_secrets::{
    InMemoryParameterStore, PARAM_DEVICE_ADDRESS, PARAM_GATEWAY_ID, PARAM_TOPIC, SecretError,
    SecretResolver,
};

fn seeded_store() -> Arc<InMemoryParameterStore> {
    let store = Arc::new(InMemoryParameterStore::new());
    store.put("/plc/secure/ip-address", "192.0.2.1");
    store.put("/plc/secure/mqtt-topic", "plant/line-1/plc");
    store.put("/plc/secure/gateway-id", "gw-01");
    store
}

#[tokio::test]
async fn resolves_all_three_parameters() {
    let resolver = SecretResolver::new(seeded_store(), "/plc/secure");
    let params = resolver.resolve().await.expect("params");
    assert_eq!(params.device_address, "192.0.2.1");
    assert_eq!(params.topic, "plant/line-1/plc");
    assert_eq!(params.gateway_id, "gw-01");
}

#[tokio::test]
async fn missing_parameter_is_an_error() {
    let store = seeded_store();
    store.remove("/plc/secure/gateway-id");
    let resolver = SecretResolver::new(store, "/plc/secure");
    let result = resolver.resolve().await;
    match result {
        Err(SecretError::MissingParameter(name)) => {
            assert_eq!(name, format!("/plc/secure/{PARAM_GATEWAY_ID}"));
        }
        other => panic!("expected missing parameter, got {other:?}"),
    }
}

#[tokio::test]
async fn uncached_resolver_sees_rotation_immediately() {
    let store = seeded_store();
    let resolver = SecretResolver::new(store.clone(), "/plc/secure");
    assert_eq!(resolver.resolve().await.expect("params").device_address, "192.0.2.1");

    store.put("/plc/secure/ip-address", "192.0.2.2");
    assert_eq!(resolver.resolve().await.expect("params").device_address, "192.0.2.2");
}

#[tokio::test]
async fn cached_resolver_serves_within_ttl() {
    let store = seeded_store();
    let resolver = SecretResolver::with_cache_ttl(store.clone(), "/plc/secure", Duration::from_secs(60));
    assert_eq!(resolver.resolve().await.expect("params").device_address, "192.0.2.1");

    // TTL 内命中缓存，不再访问存储
    store.remove("/plc/secure/ip-address");
    assert_eq!(resolver.resolve().await.expect("params").device_address, "192.0.2.1");
}

#[tokio::test]
async fn prefix_suffixes_are_fixed() {
    let store = Arc::new(InMemoryParameterStore::new());
    store.put(format!("/custom/{PARAM_DEVICE_ADDRESS}"), "198.51.100.7");
    store.put(format!("/custom/{PARAM_TOPIC}"), "custom/topic");
    store.put(format!("/custom/{PARAM_GATEWAY_ID}"), "gw-42");
    let resolver = SecretResolver::new(store, "/custom/");
    let params = resolver.resolve().await.expect("params");
    assert_eq!(params.gateway_id, "gw-42");
}
