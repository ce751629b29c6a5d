use super::*;

#[test]
fn detail_message_handles_string_structured_and_missing_details() {
    let body = ApiErrorBody::parse(br#"{"detail":"File too large"}"#);
    assert_eq!(body.detail_message().as_deref(), Some("File too large"));

    let body = ApiErrorBody::parse(br#"{"detail":[{"loc":["body","file"],"msg":"field required"}]}"#);
    let message = body.detail_message().expect("structured detail");
    assert!(message.contains("field required"));

    assert!(ApiErrorBody::parse(b"Internal Server Error").detail_message().is_none());
    assert!(ApiErrorBody::parse(br#"{"detail":null}"#).detail_message().is_none());
}

#[test]
fn policy_violation_requires_400_and_marker() {
    assert!(is_policy_violation(400, Some("Document rejected: 3 policy violations found.")));
    assert!(!is_policy_violation(422, Some("3 policy violations found")));
    assert!(!is_policy_violation(400, Some("File type not allowed")));
    assert!(!is_policy_violation(400, None));
}
