// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON-RPC error-code catalog shared by the codec and the router.
//!
//! The standard codes (−32700 … −32603) follow the JSON-RPC 2.0
//! specification; the −32000 block carries hawk-specific domain codes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::RequestId;

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Enumeration of every error code the renderer can put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The line was not valid JSON, not UTF-8, or the top-level shape was
    /// neither an object nor an array.
    ParseError,
    /// The envelope violates JSON-RPC structure: wrong protocol tag, both or
    /// neither of method and result/error, bad id type, oversize batch.
    InvalidRequest,
    /// The method name is not in the `hawk.*` set.
    MethodNotFound,
    /// Typed parameter decoding failed or a field invariant was violated.
    InvalidParams,
    /// A handler failed in a way that is not a domain error.
    InternalError,
    /// The envelope is well-formed JSON-RPC but of a kind the renderer does
    /// not consume (e.g. a response envelope).
    UnsupportedMessageType,
    /// The payload decoded but its content is unusable (e.g. a widget data
    /// shape that does not match the widget kind).
    InvalidData,
    /// A bounded resource (line length, batch size, collection cap) was
    /// exceeded.
    ResourceLimitExceeded,
}

impl ErrorCode {
    /// Numeric wire code per JSON-RPC 2.0.
    #[must_use]
    pub fn code(&self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::UnsupportedMessageType => -32001,
            Self::InvalidData => -32002,
            Self::ResourceLimitExceeded => -32003,
        }
    }

    /// Default human-readable message for this code.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::UnsupportedMessageType => "Unsupported message type",
            Self::InvalidData => "Invalid data",
            Self::ResourceLimitExceeded => "Resource limit exceeded",
        }
    }

    /// Look up the variant for a numeric wire code.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -32700 => Some(Self::ParseError),
            -32600 => Some(Self::InvalidRequest),
            -32601 => Some(Self::MethodNotFound),
            -32602 => Some(Self::InvalidParams),
            -32603 => Some(Self::InternalError),
            -32001 => Some(Self::UnsupportedMessageType),
            -32002 => Some(Self::InvalidData),
            -32003 => Some(Self::ResourceLimitExceeded),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.message())
    }
}

impl std::error::Error for ErrorCode {}

// ---------------------------------------------------------------------------
// ErrorObject
// ---------------------------------------------------------------------------

/// The `error` member of a JSON-RPC error reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Numeric wire code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    /// Build an error object carrying the code's default message.
    #[must_use]
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_owned(),
            data: None,
        }
    }

    /// Build an error object with an explicit detail message.
    ///
    /// The detail replaces the code's default message on the wire; the
    /// numeric code alone identifies the error class.
    #[must_use]
    pub fn with_detail(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: detail.into(),
            data: None,
        }
    }

    /// Attach structured data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

// ---------------------------------------------------------------------------
// ProtocolError
// ---------------------------------------------------------------------------

/// Errors produced while reading or validating inbound wire data.
///
/// Every variant maps onto exactly one [`ErrorCode`], so the ingest layer
/// can turn any of these into a reply without further classification.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The bytes were not a valid JSON document.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The line was not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The top-level JSON value was neither an object nor an array.
    #[error("top-level value must be an object or an array, got {got}")]
    TopLevelShape {
        /// JSON type name of the offending value.
        got: &'static str,
    },

    /// A line exceeded the configured byte cap.
    #[error("line length exceeds maximum of {limit} bytes")]
    OversizeLine {
        /// The configured cap in bytes.
        limit: usize,
    },

    /// A batch array exceeded the envelope-count cap.
    #[error("batch of {count} envelopes exceeds maximum of {limit}")]
    OversizeBatch {
        /// Number of envelopes in the rejected batch.
        count: usize,
        /// The configured cap.
        limit: usize,
    },

    /// A JSON-RPC structural rule was violated.
    #[error("invalid request: {reason}")]
    InvalidEnvelope {
        /// Which rule was broken.
        reason: String,
    },
}

impl ProtocolError {
    /// The wire error code this failure is reported as.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Json(_) | Self::Utf8(_) | Self::TopLevelShape { .. } => ErrorCode::ParseError,
            Self::OversizeLine { .. } | Self::OversizeBatch { .. } | Self::InvalidEnvelope { .. } => {
                ErrorCode::InvalidRequest
            }
        }
    }

    /// Convert into a wire [`ErrorObject`] carrying this error's detail text.
    #[must_use]
    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject::with_detail(self.error_code(), self.to_string())
    }
}

/// A complete error reply: the echoed correlation id plus the error object.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReply {
    /// The inbound envelope's id, echoed back.
    pub id: RequestId,
    /// The error payload.
    pub error: ErrorObject,
}
