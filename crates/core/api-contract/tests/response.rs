use api_contract::ApiResponse;

#[test]
fn api_response_success_wraps_data() {
    let response = ApiResponse::success("ok");
    assert!(response.success);
    assert_eq!(response.data, Some("ok"));
    assert!(response.error.is_none());
}

#[test]
fn api_response_error_carries_code() {
    let response = ApiResponse::<()>::error("COMMAND.VALIDATION", "command and value are required");
    assert!(!response.success);
    assert!(response.data.is_none());
    let error = response.error.expect("error");
    assert_eq!(error.code, "COMMAND.VALIDATION");
}
