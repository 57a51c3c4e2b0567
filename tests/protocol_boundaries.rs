// SPDX-License-Identifier: MIT OR Apache-2.0
//! Boundary and edge-case tests for the wire layer: line caps, batch caps,
//! id shapes, and widget payload typing.

use hawk_protocol::params::{ConfigValue, MethodCall, WidgetData, WidgetKind};
use hawk_protocol::stream::LineAssembler;
use hawk_protocol::{
    Envelope, ErrorCode, JsonlCodec, MAX_BATCH_LEN, MAX_LINE_LEN, ProtocolError, RequestId,
    WireFrame, peek_id,
};
use serde_json::{Value, json};

// ── helpers ──────────────────────────────────────────────────────────

/// A minimal valid `hawk.log` line padded to exactly `target` bytes.
fn padded_log_line(target: usize) -> String {
    let skeleton = r#"{"jsonrpc":"2.0","method":"hawk.log","params":{"message":""}}"#;
    let padding = target - skeleton.len();
    format!(
        r#"{{"jsonrpc":"2.0","method":"hawk.log","params":{{"message":"{}"}}}}"#,
        "a".repeat(padding)
    )
}

fn minimal_metric(id: Option<&str>) -> Value {
    let mut envelope = json!({
        "jsonrpc": "2.0",
        "method": "hawk.metric",
        "params": {"name": "m", "value": 1}
    });
    if let Some(id) = id {
        envelope["id"] = json!(id);
    }
    envelope
}

// ── 1. Line length cap ──────────────────────────────────────────────

#[test]
fn line_of_exactly_one_mebibyte_is_accepted() {
    let line = padded_log_line(MAX_LINE_LEN);
    assert_eq!(line.len(), MAX_LINE_LEN);

    let mut assembler = LineAssembler::new();
    let mut input = line.into_bytes();
    input.push(b'\n');
    let results = assembler.push(&input);
    assert_eq!(results.len(), 1);
    let text = results[0].as_ref().unwrap();

    // And the accepted line parses into a routable envelope.
    let WireFrame::Single(value) = JsonlCodec::decode_line(text).unwrap() else {
        panic!("expected single envelope");
    };
    let envelope = Envelope::from_value(&value).unwrap();
    assert_eq!(envelope.method.as_deref(), Some("hawk.log"));
}

#[test]
fn line_one_byte_over_the_cap_is_rejected() {
    let line = padded_log_line(MAX_LINE_LEN + 1);
    let mut assembler = LineAssembler::new();
    let mut input = line.into_bytes();
    input.push(b'\n');
    let results = assembler.push(&input);
    assert_eq!(results.len(), 1);
    let err = results[0].as_ref().unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::InvalidRequest);
    assert!(matches!(err, ProtocolError::OversizeLine { .. }));
}

// ── 2. Batch length cap ─────────────────────────────────────────────

#[test]
fn batch_of_exactly_one_hundred_is_accepted() {
    let batch: Vec<Value> = (0..MAX_BATCH_LEN).map(|_| minimal_metric(None)).collect();
    let line = serde_json::to_string(&batch).unwrap();
    let WireFrame::Batch(items) = JsonlCodec::decode_line(&line).unwrap() else {
        panic!("expected batch");
    };
    assert_eq!(items.len(), MAX_BATCH_LEN);
    for item in &items {
        Envelope::from_value(item).unwrap();
    }
}

#[test]
fn oversize_batch_first_id_is_peekable_for_the_reply() {
    let mut batch: Vec<Value> = vec![minimal_metric(Some("x"))];
    batch.extend((0..MAX_BATCH_LEN).map(|_| minimal_metric(None)));
    assert_eq!(batch.len(), MAX_BATCH_LEN + 1);

    let line = serde_json::to_string(&batch).unwrap();
    let WireFrame::Batch(items) = JsonlCodec::decode_line(&line).unwrap() else {
        panic!("expected batch");
    };
    assert!(items.len() > MAX_BATCH_LEN);
    assert_eq!(
        items.first().and_then(peek_id),
        Some(RequestId::Str("x".into()))
    );
}

// ── 3. Envelope shape rules ─────────────────────────────────────────

#[test]
fn protocol_tag_must_be_the_literal_two_point_zero() {
    for bad in [json!("2"), json!("2.1"), json!(2.0), json!(null)] {
        let mut envelope = minimal_metric(None);
        envelope["jsonrpc"] = bad;
        let err = Envelope::from_value(&envelope).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidRequest);
    }
}

#[test]
fn id_shapes_follow_jsonrpc() {
    for (id, expected) in [
        (json!("abc"), Some(RequestId::Str("abc".into()))),
        (json!(7), Some(RequestId::Num(7))),
        (json!(null), Some(RequestId::Null)),
    ] {
        let mut envelope = minimal_metric(None);
        envelope["id"] = id;
        let parsed = Envelope::from_value(&envelope).unwrap();
        assert_eq!(parsed.id, expected);
    }

    for bad in [json!(1.5), json!(true), json!([1]), json!({"id": 1})] {
        let mut envelope = minimal_metric(None);
        envelope["id"] = bad;
        assert!(Envelope::from_value(&envelope).is_err());
    }
}

#[test]
fn error_codes_match_the_wire_contract() {
    assert_eq!(ErrorCode::ParseError.code(), -32700);
    assert_eq!(ErrorCode::InvalidRequest.code(), -32600);
    assert_eq!(ErrorCode::MethodNotFound.code(), -32601);
    assert_eq!(ErrorCode::InvalidParams.code(), -32602);
    assert_eq!(ErrorCode::InternalError.code(), -32603);
    assert_eq!(ErrorCode::UnsupportedMessageType.code(), -32001);
    assert_eq!(ErrorCode::InvalidData.code(), -32002);
    assert_eq!(ErrorCode::ResourceLimitExceeded.code(), -32003);
}

// ── 4. Typed parameter decoding ─────────────────────────────────────

#[test]
fn method_call_rejects_unknown_methods_and_bad_params() {
    assert!(MethodCall::decode("hawk.unknown", Some(json!({}))).is_err());
    assert!(MethodCall::decode("hawk.progress", Some(json!({"id": "x"}))).is_err());
    assert!(
        MethodCall::decode(
            "hawk.progress",
            Some(json!({"id": "x", "label": "X", "current": 1, "total": 10}))
        )
        .is_ok()
    );
}

#[test]
fn widget_payloads_are_typed_per_kind() {
    // Every kind decodes its own shape and rejects the others'.
    let gauge = json!({"value": 2.0, "max": 4.0});
    assert!(WidgetData::decode(WidgetKind::Gauge, gauge.clone()).is_ok());
    assert!(WidgetData::decode(WidgetKind::Table, gauge.clone()).is_err());
    assert!(WidgetData::decode(WidgetKind::Histogram, gauge).is_err());

    let table = json!({"columns": ["a"], "rows": [["1"], ["2"]]});
    assert!(WidgetData::decode(WidgetKind::Table, table.clone()).is_ok());
    assert!(WidgetData::decode(WidgetKind::StatusGrid, table).is_err());
}

#[test]
fn config_values_decode_into_narrowest_type() {
    let call = MethodCall::decode(
        "hawk.config",
        Some(json!({"key": "k", "value": 3, "type": "float"})),
    )
    .unwrap();
    let MethodCall::Config(params) = call else {
        panic!("expected config");
    };
    // An integer wire value satisfies a float kind without coercion noise.
    let value = params.value.unwrap();
    assert_eq!(value, ConfigValue::Integer(3));
    assert!(value.matches_kind(hawk_protocol::params::ConfigKind::Float));
}

// ── 5. Outbound framing ─────────────────────────────────────────────

#[test]
fn outbound_lines_are_newline_terminated_compact_json() {
    let message = hawk_protocol::Outbound::Request {
        kind: "logs".into(),
        filter: Some("multi\nline".into()),
        timerange: None,
        limit: None,
    };
    let line = JsonlCodec::encode_line(&message);
    assert!(line.ends_with('\n'));
    assert_eq!(line.matches('\n').count(), 1);
    let value: Value = serde_json::from_str(line.trim_end()).unwrap();
    assert_eq!(value["method"], "hawk.request");
}
