//! Regression coverage for the domain error payload.

use super::*;
use rstest::rstest;
use uuid::Uuid;

#[rstest]
fn insufficient_points_carries_both_amounts() {
    let err = Error::insufficient_points(100, 35);

    assert_eq!(err.code(), ErrorCode::InsufficientPoints);
    assert_eq!(
        err.details(),
        Some(&json!({ "required": 100, "available": 35 }))
    );
    assert_eq!(
        err.to_string(),
        "insufficient points: 100 required, 35 available"
    );
}

#[rstest]
fn redaction_only_touches_internal_errors() {
    let not_found = Error::not_found("request missing").with_details(json!({ "id": 1 }));
    assert_eq!(not_found.redacted(), not_found);

    let internal = Error::internal("pool exploded")
        .with_trace_id("abc")
        .with_details(json!({ "secret": "x" }));
    let redacted = internal.redacted();
    assert_eq!(redacted.message(), "Internal server error");
    assert!(redacted.details().is_none());
    assert_eq!(redacted.trace_id(), Some("abc"));
}

#[rstest]
fn serialises_snake_case_codes_and_camel_case_fields() {
    let err = Error::invalid_state("request already decided").with_trace_id("t-1");
    let value = serde_json::to_value(&err).expect("serialise error");

    assert_eq!(
        value,
        json!({
            "code": "invalid_state",
            "message": "request already decided",
            "traceId": "t-1",
        })
    );
}

#[tokio::test]
async fn captures_trace_id_in_scope() {
    let trace_id = TraceId::from_uuid(Uuid::nil());
    let err = TraceId::scope(trace_id, async { Error::unauthorized("nope") }).await;

    assert_eq!(err.trace_id(), Some(Uuid::nil().to_string().as_str()));
}

#[rstest]
fn omits_trace_id_out_of_scope() {
    assert!(Error::unauthenticated("missing identity").trace_id().is_none());
}
