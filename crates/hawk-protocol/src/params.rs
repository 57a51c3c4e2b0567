// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed parameter payloads for the six inbound `hawk.*` methods.
//!
//! The inbound `params` field is heterogeneous per method, so it is modeled
//! as the [`MethodCall`] tagged union with one variant per supported method.
//! The router decodes eagerly via [`MethodCall::decode`]; raw payload maps
//! never travel past it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::methods;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Log severity. Wire form is uppercase (`"WARN"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Diagnostic chatter.
    Debug,
    /// Routine information.
    Info,
    /// Something worth attention.
    Warn,
    /// Something failed.
    Error,
    /// Something completed well.
    Success,
}

impl Severity {
    /// Uppercase wire/display form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Success => "SUCCESS",
        }
    }

    /// All severities in display order.
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Success,
    ];
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonically non-decreasing within a run.
    Counter,
    /// Free-moving value.
    #[default]
    Gauge,
    /// Distribution samples.
    Histogram,
}

/// Declared type of a configuration item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKind {
    /// Free text.
    #[default]
    String,
    /// Whole number.
    Integer,
    /// Floating point number.
    Float,
    /// True/false.
    Boolean,
    /// One of a declared set of choices.
    Enum,
}

impl ConfigKind {
    /// Lowercase wire/display form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
        }
    }
}

/// Progress item status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// Queued, not yet started.
    Pending,
    /// Actively running.
    #[default]
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Error,
}

impl ProgressStatus {
    /// `true` for the terminal states that trigger time-limited display.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Event severity. Distinct from [`Severity`]: events add `critical` and use
/// lowercase wire forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    /// Routine.
    #[default]
    Info,
    /// Worth attention.
    Warning,
    /// Something failed.
    Error,
    /// Something failed badly.
    Critical,
    /// Something completed well.
    Success,
}

impl EventSeverity {
    /// The log severity a promoted event record carries.
    #[must_use]
    pub fn log_severity(&self) -> Severity {
        match self {
            Self::Critical | Self::Error => Severity::Error,
            Self::Warning => Severity::Warn,
            Self::Success => Severity::Success,
            Self::Info => Severity::Info,
        }
    }

    /// Lowercase wire/display form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
            Self::Success => "success",
        }
    }
}

/// Dashboard widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    /// Named cells with a state each.
    StatusGrid,
    /// ASCII line chart over a named metric's series.
    MetricChart,
    /// Columns and rows of text.
    Table,
    /// Free text block.
    Text,
    /// Single fill-ratio gauge.
    Gauge,
    /// Labeled buckets.
    Histogram,
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Numeric epoch values at or above this are read as milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

/// A wire timestamp: an RFC 3339 string, or a bare number of epoch seconds
/// (values ≥ 1e12 are taken as epoch milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Interpret a numeric epoch value.
    #[must_use]
    pub fn from_epoch(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let seconds = if value.abs() >= EPOCH_MILLIS_THRESHOLD {
            value / 1000.0
        } else {
            value
        };
        let secs = seconds.trunc() as i64;
        let nanos = (seconds.fract().abs() * 1e9) as u32;
        DateTime::from_timestamp(secs, nanos).map(Self)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(n) => {
                Timestamp::from_epoch(n).ok_or_else(|| D::Error::custom("timestamp out of range"))
            }
            Repr::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Timestamp(dt.with_timezone(&Utc)))
                .map_err(|e| D::Error::custom(format!("invalid timestamp \"{s}\": {e}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigValue
// ---------------------------------------------------------------------------

/// A configuration value in one of the supported primitive shapes.
///
/// Untagged on the wire; variant order matters so that a JSON integer
/// decodes as [`ConfigValue::Integer`] before falling back to float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Boolean.
    Bool(bool),
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Text, including enum choices.
    Text(String),
}

impl ConfigValue {
    /// Whether this value is type-compatible with the declared kind.
    ///
    /// Integers satisfy `float`; enum choices are text.
    #[must_use]
    pub fn matches_kind(&self, kind: ConfigKind) -> bool {
        matches!(
            (self, kind),
            (Self::Text(_), ConfigKind::String)
                | (Self::Text(_), ConfigKind::Enum)
                | (Self::Integer(_), ConfigKind::Integer)
                | (Self::Integer(_), ConfigKind::Float)
                | (Self::Float(_), ConfigKind::Float)
                | (Self::Bool(_), ConfigKind::Boolean)
        )
    }

    /// Losslessly coerce a mismatched value into the declared kind.
    ///
    /// Used for emitter-origin values, which are coerced rather than
    /// rejected: numeric text parses into numbers, recognized truthy/falsy
    /// text into booleans, numbers and booleans render into text. Returns
    /// `None` when no lossless reading exists.
    #[must_use]
    pub fn coerce_to(&self, kind: ConfigKind) -> Option<Self> {
        if self.matches_kind(kind) {
            return Some(self.clone());
        }
        match (self, kind) {
            (Self::Text(s), ConfigKind::Integer) => s.trim().parse::<i64>().ok().map(Self::Integer),
            (Self::Text(s), ConfigKind::Float) => s.trim().parse::<f64>().ok().map(Self::Float),
            (Self::Text(s), ConfigKind::Boolean) => parse_bool(s).map(Self::Bool),
            (Self::Float(f), ConfigKind::Integer) if f.fract() == 0.0 => {
                Some(Self::Integer(*f as i64))
            }
            (Self::Integer(n), ConfigKind::String | ConfigKind::Enum) => {
                Some(Self::Text(n.to_string()))
            }
            (Self::Float(f), ConfigKind::String | ConfigKind::Enum) => {
                Some(Self::Text(f.to_string()))
            }
            (Self::Bool(b), ConfigKind::String | ConfigKind::Enum) => {
                Some(Self::Text(b.to_string()))
            }
            _ => None,
        }
    }

    /// Parse user-typed text into a value of the declared kind.
    ///
    /// This is the strict, renderer-origin path: failures are surfaced to
    /// the edit sub-mode rather than coerced.
    pub fn parse_for_kind(text: &str, kind: ConfigKind) -> Result<Self, String> {
        match kind {
            ConfigKind::String | ConfigKind::Enum => Ok(Self::Text(text.to_owned())),
            ConfigKind::Integer => text
                .trim()
                .parse::<i64>()
                .map(Self::Integer)
                .map_err(|_| format!("\"{text}\" is not an integer")),
            ConfigKind::Float => text
                .trim()
                .parse::<f64>()
                .map(Self::Float)
                .map_err(|_| format!("\"{text}\" is not a number")),
            ConfigKind::Boolean => {
                parse_bool(text).map(Self::Bool).ok_or_else(|| {
                    format!("\"{text}\" is not a boolean (try true/false, yes/no, on/off)")
                })
            }
        }
    }

    /// Numeric reading, for bounds checks.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Display form used in the config table and edit buffer.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Recognized truthy/falsy text forms.
fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Per-method parameter payloads
// ---------------------------------------------------------------------------

/// Parameters of `hawk.log`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogParams {
    /// Log line text.
    pub message: String,
    /// Severity; INFO when absent.
    #[serde(default)]
    pub level: Option<Severity>,
    /// Emitter timestamp; server-assigned when absent.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    /// Key/value context map.
    #[serde(default)]
    pub context: Option<BTreeMap<String, Value>>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Emitting component.
    #[serde(default)]
    pub component: Option<String>,
}

/// Parameters of `hawk.metric`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricParams {
    /// Dot-notation metric name.
    pub name: String,
    /// Latest value. Non-finite values are rejected by the router.
    pub value: f64,
    /// Metric kind; gauge when absent.
    #[serde(default, rename = "type")]
    pub kind: Option<MetricKind>,
    /// Point timestamp; server-assigned when absent.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    /// Tag map.
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    /// Unit label.
    #[serde(default)]
    pub unit: Option<String>,
}

/// Parameters of `hawk.config`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigParams {
    /// Dotted configuration key.
    pub key: String,
    /// Current value; `null`/absent preserves a renderer-modified value.
    #[serde(default)]
    pub value: Option<ConfigValue>,
    /// Declared kind; string when absent.
    #[serde(default, rename = "type")]
    pub kind: Option<ConfigKind>,
    /// Human description.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared default value.
    #[serde(default)]
    pub default: Option<ConfigValue>,
    /// Lower numeric bound.
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper numeric bound.
    #[serde(default)]
    pub max: Option<f64>,
    /// Enum choices.
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Whether a change requires an application restart.
    #[serde(default)]
    pub restart_required: Option<bool>,
    /// Explicit category; else the first dotted segment, else "General".
    #[serde(default)]
    pub category: Option<String>,
}

/// Parameters of `hawk.progress`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressParams {
    /// Unique progress identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Current position.
    pub current: f64,
    /// Target position.
    pub total: f64,
    /// Unit label.
    #[serde(default)]
    pub unit: Option<String>,
    /// Status; in_progress when absent.
    #[serde(default)]
    pub status: Option<ProgressStatus>,
    /// Detail text.
    #[serde(default)]
    pub details: Option<String>,
    /// Estimated completion time.
    #[serde(default)]
    pub estimated_completion: Option<Timestamp>,
}

/// Grid placement hint for a widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutHint {
    /// Grid row.
    #[serde(default)]
    pub row: Option<u16>,
    /// Grid column.
    #[serde(default)]
    pub col: Option<u16>,
    /// Column span.
    #[serde(default)]
    pub width: Option<u16>,
    /// Row span.
    #[serde(default)]
    pub height: Option<u16>,
}

/// Parameters of `hawk.dashboard`.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardParams {
    /// Unique widget identifier.
    pub widget_id: String,
    /// Widget kind.
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    /// Title; the widget id when absent.
    #[serde(default)]
    pub title: Option<String>,
    /// Kind-specific payload, decoded via [`WidgetData::decode`].
    #[serde(default)]
    pub data: Option<Value>,
    /// Grid placement hint.
    #[serde(default)]
    pub layout: Option<LayoutHint>,
    /// Widget options (e.g. an `"action"` command binding).
    #[serde(default)]
    pub config: Option<BTreeMap<String, Value>>,
}

/// Parameters of `hawk.event`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventParams {
    /// Event type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Event title.
    pub title: String,
    /// Event body.
    #[serde(default)]
    pub message: Option<String>,
    /// Severity; info when absent.
    #[serde(default)]
    pub severity: Option<EventSeverity>,
    /// Emitter timestamp; server-assigned when absent.
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    /// Opaque data map.
    #[serde(default)]
    pub data: Option<BTreeMap<String, Value>>,
}

// ---------------------------------------------------------------------------
// Widget data payloads
// ---------------------------------------------------------------------------

/// One cell of a status grid: either a bare state string or a detailed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusCell {
    /// Bare state text.
    Plain(String),
    /// State text plus an optional status class (`ok`/`warn`/`error`).
    Detailed {
        /// Displayed value.
        value: String,
        /// Status class controlling the cell color.
        #[serde(default)]
        status: Option<String>,
    },
}

impl StatusCell {
    /// Displayed value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Plain(v) => v,
            Self::Detailed { value, .. } => value,
        }
    }

    /// Status class, if declared.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Detailed { status, .. } => status.as_deref(),
        }
    }
}

/// One bucket of a histogram widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Bucket label.
    pub label: String,
    /// Bucket count or weight.
    pub count: f64,
}

fn default_gauge_max() -> f64 {
    1.0
}

/// Typed widget payload, one shape per [`WidgetKind`].
///
/// Arbitrary JSON is never carried to the renderer; payloads that do not
/// match the declared kind are rejected at the router edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidgetData {
    /// `status_grid` payload.
    StatusGrid {
        /// Cell states keyed by item name.
        items: BTreeMap<String, StatusCell>,
    },
    /// `table` payload.
    Table {
        /// Column headers.
        columns: Vec<String>,
        /// Row cells, one inner vec per row.
        rows: Vec<Vec<String>>,
    },
    /// `metric_chart` payload: names the charted metric. The renderer reads
    /// the metric's bounded series; the widget is not a separate data feed.
    MetricChart {
        /// Metric name to chart.
        metric: String,
    },
    /// `histogram` payload.
    Histogram {
        /// Labeled buckets in display order.
        buckets: Vec<HistogramBucket>,
    },
    /// `gauge` payload.
    Gauge {
        /// Current value.
        value: f64,
        /// Full-scale value; 1.0 when absent.
        #[serde(default = "default_gauge_max")]
        max: f64,
        /// Unit label.
        #[serde(default)]
        unit: Option<String>,
    },
    /// `text` payload.
    Text {
        /// Text block.
        text: String,
    },
}

impl WidgetData {
    /// Decode a raw payload against the declared widget kind.
    ///
    /// # Errors
    ///
    /// Returns the underlying decode error when the payload does not match
    /// the kind's shape.
    pub fn decode(kind: WidgetKind, data: Value) -> Result<Self, serde_json::Error> {
        match kind {
            WidgetKind::StatusGrid => {
                #[derive(Deserialize)]
                struct Payload {
                    items: BTreeMap<String, StatusCell>,
                }
                let p: Payload = serde_json::from_value(data)?;
                Ok(Self::StatusGrid { items: p.items })
            }
            WidgetKind::Table => {
                #[derive(Deserialize)]
                struct Payload {
                    columns: Vec<String>,
                    rows: Vec<Vec<String>>,
                }
                let p: Payload = serde_json::from_value(data)?;
                Ok(Self::Table {
                    columns: p.columns,
                    rows: p.rows,
                })
            }
            WidgetKind::MetricChart => {
                #[derive(Deserialize)]
                struct Payload {
                    metric: String,
                }
                let p: Payload = serde_json::from_value(data)?;
                Ok(Self::MetricChart { metric: p.metric })
            }
            WidgetKind::Histogram => {
                #[derive(Deserialize)]
                struct Payload {
                    buckets: Vec<HistogramBucket>,
                }
                let p: Payload = serde_json::from_value(data)?;
                Ok(Self::Histogram { buckets: p.buckets })
            }
            WidgetKind::Gauge => {
                #[derive(Deserialize)]
                struct Payload {
                    value: f64,
                    #[serde(default = "default_gauge_max")]
                    max: f64,
                    #[serde(default)]
                    unit: Option<String>,
                }
                let p: Payload = serde_json::from_value(data)?;
                Ok(Self::Gauge {
                    value: p.value,
                    max: p.max,
                    unit: p.unit,
                })
            }
            WidgetKind::Text => {
                #[derive(Deserialize)]
                struct Payload {
                    text: String,
                }
                let p: Payload = serde_json::from_value(data)?;
                Ok(Self::Text { text: p.text })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MethodCall
// ---------------------------------------------------------------------------

/// Failure to decode an envelope's method + params into a [`MethodCall`].
#[derive(Debug, thiserror::Error)]
pub enum MethodDecodeError {
    /// The method name is not in the known set.
    #[error("unknown method: {method}")]
    UnknownMethod {
        /// The offending method name.
        method: String,
    },
    /// The params payload did not match the method's typed shape.
    #[error("invalid params for {method}: {source}")]
    BadParams {
        /// The method whose decode failed.
        method: &'static str,
        /// The underlying serde error.
        source: serde_json::Error,
    },
}

/// A routed message: one variant per supported inbound method.
#[derive(Debug, Clone)]
pub enum MethodCall {
    /// `hawk.log`
    Log(LogParams),
    /// `hawk.metric`
    Metric(MetricParams),
    /// `hawk.config`
    Config(ConfigParams),
    /// `hawk.progress`
    Progress(ProgressParams),
    /// `hawk.dashboard`
    Dashboard(DashboardParams),
    /// `hawk.event`
    Event(EventParams),
}

impl MethodCall {
    /// Decode a method name and raw params into a typed call.
    ///
    /// An absent params payload decodes as `null`, so methods with required
    /// fields fail with the usual missing-field error.
    pub fn decode(method: &str, params: Option<Value>) -> Result<Self, MethodDecodeError> {
        let payload = params.unwrap_or(Value::Null);

        fn typed<T: serde::de::DeserializeOwned>(
            method: &'static str,
            payload: Value,
        ) -> Result<T, MethodDecodeError> {
            serde_json::from_value(payload)
                .map_err(|source| MethodDecodeError::BadParams { method, source })
        }

        match method {
            methods::LOG => Ok(Self::Log(typed(methods::LOG, payload)?)),
            methods::METRIC => Ok(Self::Metric(typed(methods::METRIC, payload)?)),
            methods::CONFIG => Ok(Self::Config(typed(methods::CONFIG, payload)?)),
            methods::PROGRESS => Ok(Self::Progress(typed(methods::PROGRESS, payload)?)),
            methods::DASHBOARD => Ok(Self::Dashboard(typed(methods::DASHBOARD, payload)?)),
            methods::EVENT => Ok(Self::Event(typed(methods::EVENT, payload)?)),
            other => Err(MethodDecodeError::UnknownMethod {
                method: other.to_owned(),
            }),
        }
    }

    /// The wire method name of this call.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Log(_) => methods::LOG,
            Self::Metric(_) => methods::METRIC,
            Self::Config(_) => methods::CONFIG,
            Self::Progress(_) => methods::PROGRESS,
            Self::Dashboard(_) => methods::DASHBOARD,
            Self::Event(_) => methods::EVENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn severity_wire_forms_are_uppercase() {
        let s: Severity = serde_json::from_value(json!("WARN")).unwrap();
        assert_eq!(s, Severity::Warn);
        assert!(serde_json::from_value::<Severity>(json!("warn")).is_err());
    }

    #[test]
    fn metric_kind_defaults_to_gauge() {
        assert_eq!(MetricKind::default(), MetricKind::Gauge);
    }

    #[test]
    fn event_severity_maps_to_log_severity() {
        assert_eq!(EventSeverity::Critical.log_severity(), Severity::Error);
        assert_eq!(EventSeverity::Error.log_severity(), Severity::Error);
        assert_eq!(EventSeverity::Warning.log_severity(), Severity::Warn);
        assert_eq!(EventSeverity::Success.log_severity(), Severity::Success);
        assert_eq!(EventSeverity::Info.log_severity(), Severity::Info);
    }

    #[test]
    fn timestamp_accepts_rfc3339() {
        let ts: Timestamp = serde_json::from_value(json!("2026-08-01T12:00:00Z")).unwrap();
        assert_eq!(ts.0.timestamp(), 1_785_585_600);
    }

    #[test]
    fn timestamp_accepts_epoch_seconds_and_millis() {
        let secs: Timestamp = serde_json::from_value(json!(1_700_000_000)).unwrap();
        let millis: Timestamp = serde_json::from_value(json!(1_700_000_000_000_i64)).unwrap();
        assert_eq!(secs.0, millis.0);
    }

    #[test]
    fn timestamp_rejects_garbage_text() {
        assert!(serde_json::from_value::<Timestamp>(json!("yesterday")).is_err());
    }

    #[test]
    fn config_value_untagged_ordering() {
        assert_eq!(
            serde_json::from_value::<ConfigValue>(json!(5)).unwrap(),
            ConfigValue::Integer(5)
        );
        assert_eq!(
            serde_json::from_value::<ConfigValue>(json!(5.5)).unwrap(),
            ConfigValue::Float(5.5)
        );
        assert_eq!(
            serde_json::from_value::<ConfigValue>(json!(true)).unwrap(),
            ConfigValue::Bool(true)
        );
        assert_eq!(
            serde_json::from_value::<ConfigValue>(json!("x")).unwrap(),
            ConfigValue::Text("x".into())
        );
    }

    #[test]
    fn config_value_coercion_is_lossless_only() {
        let v = ConfigValue::Text("42".into());
        assert_eq!(v.coerce_to(ConfigKind::Integer), Some(ConfigValue::Integer(42)));
        assert_eq!(
            ConfigValue::Text("4.5".into()).coerce_to(ConfigKind::Float),
            Some(ConfigValue::Float(4.5))
        );
        assert_eq!(
            ConfigValue::Text("on".into()).coerce_to(ConfigKind::Boolean),
            Some(ConfigValue::Bool(true))
        );
        assert_eq!(ConfigValue::Text("abc".into()).coerce_to(ConfigKind::Integer), None);
        assert_eq!(
            ConfigValue::Float(3.0).coerce_to(ConfigKind::Integer),
            Some(ConfigValue::Integer(3))
        );
        assert_eq!(ConfigValue::Float(3.5).coerce_to(ConfigKind::Integer), None);
    }

    #[test]
    fn parse_for_kind_reports_readable_errors() {
        let err = ConfigValue::parse_for_kind("abc", ConfigKind::Integer).unwrap_err();
        assert!(err.contains("not an integer"));
        assert!(ConfigValue::parse_for_kind("maybe", ConfigKind::Boolean).is_err());
        assert_eq!(
            ConfigValue::parse_for_kind("no", ConfigKind::Boolean),
            Ok(ConfigValue::Bool(false))
        );
    }

    #[test]
    fn log_params_required_message() {
        let err = MethodCall::decode("hawk.log", Some(json!({"level": "INFO"}))).unwrap_err();
        assert!(matches!(err, MethodDecodeError::BadParams { method: "hawk.log", .. }));
    }

    #[test]
    fn unknown_method_is_classified() {
        let err = MethodCall::decode("hawk.bogus", None).unwrap_err();
        assert!(matches!(err, MethodDecodeError::UnknownMethod { .. }));
    }

    #[test]
    fn dashboard_params_decode_with_layout() {
        let call = MethodCall::decode(
            "hawk.dashboard",
            Some(json!({
                "widget_id": "w1",
                "type": "gauge",
                "data": {"value": 0.5},
                "layout": {"row": 0, "col": 1}
            })),
        )
        .unwrap();
        let MethodCall::Dashboard(p) = call else { panic!("expected dashboard") };
        assert_eq!(p.kind, WidgetKind::Gauge);
        assert_eq!(p.layout.unwrap().col, Some(1));
    }

    #[test]
    fn widget_data_decodes_per_kind() {
        let gauge = WidgetData::decode(WidgetKind::Gauge, json!({"value": 0.4})).unwrap();
        assert_eq!(
            gauge,
            WidgetData::Gauge {
                value: 0.4,
                max: 1.0,
                unit: None
            }
        );

        let grid = WidgetData::decode(
            WidgetKind::StatusGrid,
            json!({"items": {"db": "ok", "api": {"value": "down", "status": "error"}}}),
        )
        .unwrap();
        let WidgetData::StatusGrid { items } = grid else { panic!("expected grid") };
        assert_eq!(items["db"].value(), "ok");
        assert_eq!(items["api"].status(), Some("error"));
    }

    #[test]
    fn widget_data_rejects_mismatched_shape() {
        assert!(WidgetData::decode(WidgetKind::Table, json!({"value": 1})).is_err());
        assert!(WidgetData::decode(WidgetKind::Text, json!({"metric": "cpu"})).is_err());
    }

    #[test]
    fn metric_params_renamed_type_field() {
        let call = MethodCall::decode(
            "hawk.metric",
            Some(json!({"name": "req.count", "value": 5, "type": "counter"})),
        )
        .unwrap();
        let MethodCall::Metric(p) = call else { panic!("expected metric") };
        assert_eq!(p.kind, Some(MetricKind::Counter));
    }
}
