use domain::{PlcCommand, Principal};

#[test]
fn principal_builds() {
    let principal = Principal::new("user-1", "user-1@example.com", "")
        .with_source_address("203.0.113.10");

    assert_eq!(principal.user_id, "user-1");
    assert_eq!(principal.email, "user-1@example.com");
    assert_eq!(principal.source_address, "203.0.113.10");
}

#[test]
fn command_validates_required_fields() {
    let command = PlcCommand::validated(
        "write",
        "100",
        Some("DM".to_string()),
        Some("31000".to_string()),
    )
    .expect("command");

    assert_eq!(command.command, "write");
    assert_eq!(command.value, "100");
    assert!(command.is_write());

    assert!(PlcCommand::validated("", "100", None, None).is_err());
    assert!(PlcCommand::validated("read", "   ", None, None).is_err());
}

#[test]
fn command_serializes_without_absent_optionals() {
    let command = PlcCommand::validated("read", "0", None, None).expect("command");
    let json = serde_json::to_value(&command).expect("json");
    assert!(json.get("area").is_none());
    assert!(json.get("address").is_none());
}
