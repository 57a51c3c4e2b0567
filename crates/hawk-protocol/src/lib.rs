// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! hawk-protocol
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Wire format for talking to an instrumented emitter.
//! Current transport: JSON-RPC 2.0 as JSONL over stdio.

pub mod error;
pub mod outbound;
pub mod params;
pub mod stream;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

pub use error::{ErrorCode, ErrorObject, ErrorReply, ProtocolError};
pub use outbound::Outbound;
pub use params::MethodCall;
pub use stream::LineAssembler;

/// Protocol tag every envelope must carry.
pub const JSONRPC_VERSION: &str = "2.0";

/// Maximum accepted line length in bytes. A line of exactly this many bytes
/// is accepted; one byte more is rejected.
pub const MAX_LINE_LEN: usize = 1024 * 1024;

/// Maximum number of envelopes in a single batch array. Larger batches are
/// rejected whole.
pub const MAX_BATCH_LEN: usize = 100;

/// Inbound method names the router recognizes.
pub mod methods {
    /// Append a log record.
    pub const LOG: &str = "hawk.log";
    /// Update a metric and extend its time series.
    pub const METRIC: &str = "hawk.metric";
    /// Declare or update a configuration item.
    pub const CONFIG: &str = "hawk.config";
    /// Create or advance a progress item.
    pub const PROGRESS: &str = "hawk.progress";
    /// Upsert a dashboard widget.
    pub const DASHBOARD: &str = "hawk.dashboard";
    /// Record an application event.
    pub const EVENT: &str = "hawk.event";

    /// Renderer → emitter: a committed config edit.
    pub const CONFIG_UPDATE: &str = "hawk.config_update";
    /// Renderer → emitter: a command-widget activation.
    pub const EXECUTE: &str = "hawk.execute";
    /// Renderer → emitter: an explicit data request.
    pub const REQUEST: &str = "hawk.request";
}

// ---------------------------------------------------------------------------
// RequestId
// ---------------------------------------------------------------------------

/// A JSON-RPC correlation id: string, integer, or the literal `null`.
///
/// Presence of an id turns a message into a request expecting a reply; this
/// type therefore distinguishes an *absent* id (the field is missing, the
/// message is a notification) from an id that is literally `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestId {
    /// A string id.
    Str(String),
    /// An integer id. Fractional ids are rejected as invalid requests.
    Num(i64),
    /// The literal `null`.
    Null,
}

impl RequestId {
    /// Decode an id from its raw JSON value, rejecting non-id shapes.
    pub fn from_value(value: &Value) -> Result<Self, ProtocolError> {
        match value {
            Value::String(s) => Ok(Self::Str(s.clone())),
            Value::Number(n) => n.as_i64().map(Self::Num).ok_or_else(|| {
                ProtocolError::InvalidEnvelope {
                    reason: format!("id must be an integer, a string, or null, got {n}"),
                }
            }),
            Value::Null => Ok(Self::Null),
            other => Err(ProtocolError::InvalidEnvelope {
                reason: format!("id must be a string, number, or null, got {}", json_type(other)),
            }),
        }
    }

    /// The raw JSON value for serialization.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.clone()),
            Self::Num(n) => Value::from(*n),
            Self::Null => Value::Null,
        }
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Num(n) => write!(f, "{n}"),
            Self::Null => write!(f, "null"),
        }
    }
}

// ---------------------------------------------------------------------------
// HawkMeta
// ---------------------------------------------------------------------------

/// Emitter-declared metadata nested under `hawk_meta`. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HawkMeta {
    /// Display name of the emitting application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// Emitting component within the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Emitter-chosen session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Emitter-side sequence number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// One parsed JSON-RPC 2.0 message.
///
/// The `params` payload stays opaque here; the router performs the typed
/// decode once the method name is known (see [`params::MethodCall`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Method name. Present on requests and notifications, absent on
    /// responses.
    pub method: Option<String>,
    /// Raw parameter payload, decoded later per method.
    pub params: Option<Value>,
    /// Correlation id. `None` means the field was absent (notification).
    pub id: Option<RequestId>,
    /// Whether the envelope carried a `result` or `error` member.
    pub is_response: bool,
    /// Emitter metadata, if declared.
    pub meta: Option<HawkMeta>,
}

impl Envelope {
    /// Decode and shape-validate a single envelope object.
    ///
    /// Enforces the JSON-RPC structural rules: the `"2.0"` protocol tag,
    /// mutual exclusion of `method` and `result`/`error`, and the id type.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidEnvelope`] on any structural
    /// violation and [`ProtocolError::TopLevelShape`] if `value` is not an
    /// object.
    pub fn from_value(value: &Value) -> Result<Self, ProtocolError> {
        let obj = value.as_object().ok_or(ProtocolError::TopLevelShape {
            got: json_type(value),
        })?;

        match obj.get("jsonrpc").and_then(Value::as_str) {
            Some(JSONRPC_VERSION) => {}
            Some(other) => {
                return Err(ProtocolError::InvalidEnvelope {
                    reason: format!("jsonrpc must be \"2.0\", got \"{other}\""),
                });
            }
            None => {
                return Err(ProtocolError::InvalidEnvelope {
                    reason: "missing jsonrpc protocol tag".to_owned(),
                });
            }
        }

        let method = match obj.get("method") {
            None => None,
            Some(Value::String(m)) => Some(m.clone()),
            Some(other) => {
                return Err(ProtocolError::InvalidEnvelope {
                    reason: format!("method must be a string, got {}", json_type(other)),
                });
            }
        };

        let has_result = obj.contains_key("result");
        let has_error = obj.contains_key("error");
        let is_response = has_result || has_error;

        // method and result/error are mutually exclusive, and one side must
        // be present.
        if method.is_some() && is_response {
            return Err(ProtocolError::InvalidEnvelope {
                reason: "envelope carries both method and result/error".to_owned(),
            });
        }
        if method.is_none() && !is_response {
            return Err(ProtocolError::InvalidEnvelope {
                reason: "envelope carries neither method nor result/error".to_owned(),
            });
        }
        if has_result && has_error {
            return Err(ProtocolError::InvalidEnvelope {
                reason: "envelope carries both result and error".to_owned(),
            });
        }

        let id = obj.get("id").map(RequestId::from_value).transpose()?;

        let meta = match obj.get("hawk_meta") {
            None | Some(Value::Null) => None,
            Some(v) => Some(serde_json::from_value::<HawkMeta>(v.clone()).map_err(|e| {
                ProtocolError::InvalidEnvelope {
                    reason: format!("malformed hawk_meta: {e}"),
                }
            })?),
        };

        Ok(Self {
            method,
            params: obj.get("params").cloned(),
            id,
            is_response,
            meta,
        })
    }
}

// ---------------------------------------------------------------------------
// JsonlCodec
// ---------------------------------------------------------------------------

/// One decoded wire line: a single envelope or a batch of raw objects.
///
/// Batch members stay as raw values so one malformed member cannot sink its
/// siblings; the router decodes them one at a time.
#[derive(Debug, Clone)]
pub enum WireFrame {
    /// The line was a single envelope object.
    Single(Value),
    /// The line was a batch array.
    Batch(Vec<Value>),
}

/// Stateless codec for decoding inbound lines and encoding outbound ones.
///
/// # Examples
///
/// ```
/// use hawk_protocol::{Envelope, JsonlCodec, WireFrame};
///
/// let line = r#"{"jsonrpc":"2.0","method":"hawk.log","params":{"message":"boot"}}"#;
/// let frame = JsonlCodec::decode_line(line).unwrap();
/// let WireFrame::Single(value) = frame else { panic!("expected single") };
/// let envelope = Envelope::from_value(&value).unwrap();
/// assert_eq!(envelope.method.as_deref(), Some("hawk.log"));
/// assert!(envelope.id.is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct JsonlCodec;

impl JsonlCodec {
    /// Parse one text line into a [`WireFrame`].
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Json`] if the line is not valid JSON and
    /// [`ProtocolError::TopLevelShape`] if the top-level value is neither an
    /// object nor an array.
    pub fn decode_line(line: &str) -> Result<WireFrame, ProtocolError> {
        let value: Value = serde_json::from_str(line)?;
        match value {
            Value::Object(_) => Ok(WireFrame::Single(value)),
            Value::Array(items) => Ok(WireFrame::Batch(items)),
            other => Err(ProtocolError::TopLevelShape {
                got: json_type(&other),
            }),
        }
    }

    /// Serialize an outbound message as one compact, newline-terminated
    /// JSON line. Newlines inside string values are escaped by the JSON
    /// encoder, so the frame boundary is always the trailing byte.
    #[must_use]
    pub fn encode_line(message: &Outbound) -> String {
        let mut line = message.to_value().to_string();
        line.push('\n');
        line
    }
}

/// Extract a correlation id from a raw, not-yet-validated envelope value.
///
/// Used to address an error reply for input that fails before full envelope
/// decoding — e.g. the first element of an oversize batch.
#[must_use]
pub fn peek_id(value: &Value) -> Option<RequestId> {
    let id = value.as_object()?.get("id")?;
    RequestId::from_value(id).ok()
}

/// JSON type name for diagnostics.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notification_has_no_id() {
        let value = json!({"jsonrpc": "2.0", "method": "hawk.log", "params": {"message": "x"}});
        let env = Envelope::from_value(&value).unwrap();
        assert_eq!(env.method.as_deref(), Some("hawk.log"));
        assert!(env.id.is_none());
        assert!(!env.is_response);
    }

    #[test]
    fn request_keeps_null_id_distinct_from_absent() {
        let value = json!({"jsonrpc": "2.0", "method": "hawk.log", "id": null});
        let env = Envelope::from_value(&value).unwrap();
        assert_eq!(env.id, Some(RequestId::Null));
    }

    #[test]
    fn wrong_protocol_tag_is_invalid_request() {
        let value = json!({"jsonrpc": "1.0", "method": "hawk.log"});
        let err = Envelope::from_value(&value).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn missing_protocol_tag_is_invalid_request() {
        let value = json!({"method": "hawk.log"});
        let err = Envelope::from_value(&value).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn method_and_result_are_mutually_exclusive() {
        let value = json!({"jsonrpc": "2.0", "method": "hawk.log", "result": 1});
        assert!(Envelope::from_value(&value).is_err());
    }

    #[test]
    fn neither_method_nor_result_is_invalid() {
        let value = json!({"jsonrpc": "2.0", "id": 1});
        assert!(Envelope::from_value(&value).is_err());
    }

    #[test]
    fn response_envelope_decodes() {
        let value = json!({"jsonrpc": "2.0", "id": 7, "result": {"ok": true}});
        let env = Envelope::from_value(&value).unwrap();
        assert!(env.is_response);
        assert_eq!(env.id, Some(RequestId::Num(7)));
    }

    #[test]
    fn fractional_id_is_rejected() {
        let value = json!({"jsonrpc": "2.0", "method": "hawk.log", "id": 1.5});
        assert!(Envelope::from_value(&value).is_err());
    }

    #[test]
    fn boolean_id_is_rejected() {
        let value = json!({"jsonrpc": "2.0", "method": "hawk.log", "id": true});
        assert!(Envelope::from_value(&value).is_err());
    }

    #[test]
    fn hawk_meta_is_extracted() {
        let value = json!({
            "jsonrpc": "2.0",
            "method": "hawk.log",
            "hawk_meta": {"app_name": "demo", "sequence": 3}
        });
        let env = Envelope::from_value(&value).unwrap();
        let meta = env.meta.unwrap();
        assert_eq!(meta.app_name.as_deref(), Some("demo"));
        assert_eq!(meta.sequence, Some(3));
    }

    #[test]
    fn decode_line_distinguishes_single_and_batch() {
        match JsonlCodec::decode_line(r#"{"jsonrpc":"2.0","method":"hawk.log"}"#).unwrap() {
            WireFrame::Single(_) => {}
            WireFrame::Batch(_) => panic!("expected single"),
        }
        match JsonlCodec::decode_line(r#"[{"jsonrpc":"2.0","method":"hawk.log"}]"#).unwrap() {
            WireFrame::Batch(items) => assert_eq!(items.len(), 1),
            WireFrame::Single(_) => panic!("expected batch"),
        }
    }

    #[test]
    fn decode_line_rejects_scalar_top_level() {
        let err = JsonlCodec::decode_line("42").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ParseError);
    }

    #[test]
    fn peek_id_reads_unvalidated_values() {
        let value = json!({"jsonrpc": "2.0", "method": "hawk.metric", "id": "x"});
        assert_eq!(peek_id(&value), Some(RequestId::Str("x".into())));
        assert_eq!(peek_id(&json!({"method": "hawk.metric"})), None);
        assert_eq!(peek_id(&json!(17)), None);
    }
}
