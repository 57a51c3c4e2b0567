// SPDX-License-Identifier: MIT OR Apache-2.0
//! Renderer → emitter messages.
//!
//! Every outbound message is a notification (no correlation id) except the
//! error reply, which echoes the inbound id. Batches are never emitted in
//! this direction.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::error::{ErrorObject, ErrorReply};
use crate::params::ConfigValue;
use crate::{JSONRPC_VERSION, RequestId, methods};

/// A renderer-initiated outbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// `hawk.config_update` — the user committed a config edit.
    ConfigUpdate {
        /// Dotted configuration key.
        key: String,
        /// New value, serialized in the item's stored kind.
        value: ConfigValue,
    },
    /// `hawk.execute` — the user activated a command widget.
    Execute {
        /// Registered command name.
        command: String,
        /// String-keyed argument map.
        args: BTreeMap<String, String>,
    },
    /// `hawk.request` — the user asked the emitter to send data.
    Request {
        /// Requested data type (e.g. `"logs"`).
        kind: String,
        /// Active filter text, if any.
        filter: Option<String>,
        /// Requested time range, if any.
        timerange: Option<String>,
        /// Maximum item count, if any.
        limit: Option<u64>,
    },
    /// A JSON-RPC error reply echoing an inbound correlation id.
    Error(ErrorReply),
}

impl Outbound {
    /// Build an error reply for a rejected envelope.
    #[must_use]
    pub fn error_reply(id: RequestId, error: ErrorObject) -> Self {
        Self::Error(ErrorReply { id, error })
    }

    /// The complete JSON-RPC value for this message.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::ConfigUpdate { key, value } => json!({
                "jsonrpc": JSONRPC_VERSION,
                "method": methods::CONFIG_UPDATE,
                "params": {"key": key, "value": value},
            }),
            Self::Execute { command, args } => json!({
                "jsonrpc": JSONRPC_VERSION,
                "method": methods::EXECUTE,
                "params": {"command": command, "args": args},
            }),
            Self::Request {
                kind,
                filter,
                timerange,
                limit,
            } => {
                let mut params = serde_json::Map::new();
                params.insert("type".to_owned(), json!(kind));
                if let Some(filter) = filter {
                    params.insert("filter".to_owned(), json!(filter));
                }
                if let Some(timerange) = timerange {
                    params.insert("timerange".to_owned(), json!(timerange));
                }
                if let Some(limit) = limit {
                    params.insert("limit".to_owned(), json!(limit));
                }
                json!({
                    "jsonrpc": JSONRPC_VERSION,
                    "method": methods::REQUEST,
                    "params": Value::Object(params),
                })
            }
            Self::Error(reply) => json!({
                "jsonrpc": JSONRPC_VERSION,
                "id": &reply.id,
                "error": &reply.error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use crate::JsonlCodec;

    #[test]
    fn config_update_shape() {
        let msg = Outbound::ConfigUpdate {
            key: "server.port".into(),
            value: ConfigValue::Integer(9090),
        };
        let v = msg.to_value();
        assert_eq!(v["jsonrpc"], "2.0");
        assert_eq!(v["method"], "hawk.config_update");
        assert_eq!(v["params"]["key"], "server.port");
        assert_eq!(v["params"]["value"], 9090);
        assert!(v.get("id").is_none());
    }

    #[test]
    fn execute_carries_string_args() {
        let mut args = BTreeMap::new();
        args.insert("widget".to_owned(), "deploy-btn".to_owned());
        let msg = Outbound::Execute {
            command: "deploy".into(),
            args,
        };
        let v = msg.to_value();
        assert_eq!(v["method"], "hawk.execute");
        assert_eq!(v["params"]["args"]["widget"], "deploy-btn");
    }

    #[test]
    fn request_omits_absent_fields() {
        let msg = Outbound::Request {
            kind: "logs".into(),
            filter: Some("error".into()),
            timerange: None,
            limit: Some(500),
        };
        let v = msg.to_value();
        assert_eq!(v["params"]["type"], "logs");
        assert_eq!(v["params"]["filter"], "error");
        assert_eq!(v["params"]["limit"], 500);
        assert!(v["params"].get("timerange").is_none());
    }

    #[test]
    fn error_reply_echoes_id() {
        let msg = Outbound::error_reply(
            RequestId::Str("x".into()),
            ErrorObject::new(ErrorCode::InvalidRequest),
        );
        let v = msg.to_value();
        assert_eq!(v["id"], "x");
        assert_eq!(v["error"]["code"], -32600);
        assert!(v.get("method").is_none());
    }

    #[test]
    fn null_id_error_reply_serializes_null() {
        let msg = Outbound::error_reply(RequestId::Null, ErrorObject::new(ErrorCode::ParseError));
        let v = msg.to_value();
        assert!(v["id"].is_null());
        assert!(v.as_object().unwrap().contains_key("id"));
    }

    #[test]
    fn encoded_line_is_single_framed() {
        let msg = Outbound::ConfigUpdate {
            key: "k".into(),
            value: ConfigValue::Text("line1\nline2".into()),
        };
        let line = JsonlCodec::encode_line(&msg);
        assert!(line.ends_with('\n'));
        // The embedded newline is escaped; only the frame boundary remains.
        assert_eq!(line.matches('\n').count(), 1);
    }
}
