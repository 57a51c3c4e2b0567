// SPDX-License-Identifier: MIT OR Apache-2.0
//! Domain entities built from routed protocol messages.
//!
//! Entities are constructed once from their wire parameters (defaults
//! applied) and never reference the originating envelope.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use hawk_protocol::params::{
    ConfigKind, ConfigValue, EventParams, EventSeverity, LayoutHint, LogParams, MetricKind,
    ProgressParams, ProgressStatus, Severity, WidgetData, WidgetKind,
};

use crate::ring::Ring;

// ---------------------------------------------------------------------------
// LogRecord
// ---------------------------------------------------------------------------

/// One immutable log entry.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Log line text.
    pub message: String,
    /// Severity.
    pub severity: Severity,
    /// Emitter timestamp, or arrival time when the emitter sent none.
    pub timestamp: DateTime<Utc>,
    /// Emitting component, if declared.
    pub component: Option<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Key/value context map.
    pub context: BTreeMap<String, Value>,
}

impl LogRecord {
    /// Build a record from `hawk.log` parameters, filling defaults.
    #[must_use]
    pub fn from_params(params: LogParams, now: DateTime<Utc>) -> Self {
        Self {
            message: params.message,
            severity: params.level.unwrap_or(Severity::Info),
            timestamp: params.timestamp.map_or(now, Into::into),
            component: params.component,
            tags: params.tags.unwrap_or_default(),
            context: params.context.unwrap_or_default(),
        }
    }

    /// Build the synthesized record for an internal protocol error surface.
    #[must_use]
    pub fn protocol_error(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
            timestamp: now,
            component: Some("hawk.protocol".to_owned()),
            tags: Vec::new(),
            context: BTreeMap::new(),
        }
    }

    /// The text the substring filter matches against.
    #[must_use]
    pub fn search_text(&self) -> String {
        let mut text = self.message.clone();
        if let Some(component) = &self.component {
            text.push(' ');
            text.push_str(component);
        }
        for tag in &self.tags {
            text.push(' ');
            text.push_str(tag);
        }
        text
    }
}

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// One stored time-series point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricPoint {
    /// Point timestamp (stored order is by this, not arrival).
    pub at: DateTime<Utc>,
    /// Point value.
    pub value: f64,
}

/// A named metric with its bounded series.
#[derive(Debug, Clone)]
pub struct Metric {
    /// Dot-notation name, unique.
    pub name: String,
    /// Metric kind.
    pub kind: MetricKind,
    /// Latest accepted value.
    pub latest: f64,
    /// Unit label, if declared.
    pub unit: Option<String>,
    /// Tag map.
    pub tags: BTreeMap<String, String>,
    /// Timestamp of the latest accepted point.
    pub updated_at: DateTime<Utc>,
    /// Bounded (timestamp, value) history.
    pub series: Ring<MetricPoint>,
}

/// Outcome of applying one `hawk.metric` update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricOutcome {
    /// Latest value and series were updated.
    Applied,
    /// The point was older than the newest stored point; nothing changed.
    DroppedOutOfOrder,
    /// A counter-kind metric regressed; nothing changed.
    DroppedCounterRegression,
}

// ---------------------------------------------------------------------------
// ConfigItem
// ---------------------------------------------------------------------------

/// Renderer-side sync state of a configuration item.
///
/// `Modified` and `Drifted` are labeled `M` in the Config view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSyncState {
    /// Never locally edited.
    #[default]
    Pristine,
    /// Locally committed; awaiting emitter confirmation.
    Modified,
    /// Emitter echoed the committed value.
    Confirmed,
    /// Emitter sent a value that disagrees with the last local commit.
    Drifted,
}

impl ConfigSyncState {
    /// Whether the Config view shows the `M` marker.
    #[must_use]
    pub fn is_marked(&self) -> bool {
        matches!(self, Self::Modified | Self::Drifted)
    }
}

/// One configuration item.
#[derive(Debug, Clone)]
pub struct ConfigItem {
    /// Dotted key, unique.
    pub key: String,
    /// Declared kind.
    pub kind: ConfigKind,
    /// Current value, always type-compatible with `kind`.
    pub value: ConfigValue,
    /// Human description.
    pub description: Option<String>,
    /// Declared default.
    pub default: Option<ConfigValue>,
    /// Lower numeric bound.
    pub min: Option<f64>,
    /// Upper numeric bound.
    pub max: Option<f64>,
    /// Enum choices.
    pub options: Option<Vec<String>>,
    /// Whether a change requires an application restart.
    pub restart_required: bool,
    /// Grouping category.
    pub category: String,
    /// Sync state against the emitter.
    pub sync: ConfigSyncState,
    /// Last locally committed value, kept until confirmed or superseded.
    pub pending_commit: Option<ConfigValue>,
    /// Last update time (either direction).
    pub updated_at: DateTime<Utc>,
}

impl ConfigItem {
    /// Check a candidate value against this item's kind, bounds, and
    /// choices. Used on the strict renderer-origin path.
    pub fn check_value(&self, value: &ConfigValue) -> Result<(), String> {
        if !value.matches_kind(self.kind) {
            return Err(format!("value is not {}", self.kind.as_str()));
        }
        if let Some(n) = value.as_f64() {
            if let Some(min) = self.min
                && n < min
            {
                return Err(format!("{n} is below the minimum {min}"));
            }
            if let Some(max) = self.max
                && n > max
            {
                return Err(format!("{n} is above the maximum {max}"));
            }
        }
        if self.kind == ConfigKind::Enum
            && let Some(options) = &self.options
            && let ConfigValue::Text(s) = value
            && !options.iter().any(|o| o == s)
        {
            return Err(format!("\"{s}\" is not one of {}", options.join(", ")));
        }
        Ok(())
    }
}

/// Derive the grouping category: explicit, else the first dotted segment,
/// else `General`.
#[must_use]
pub fn config_category(explicit: Option<String>, key: &str) -> String {
    if let Some(category) = explicit {
        return category;
    }
    match key.split_once('.') {
        Some((head, _)) if !head.is_empty() => head.to_owned(),
        _ => "General".to_owned(),
    }
}

// ---------------------------------------------------------------------------
// ProgressItem
// ---------------------------------------------------------------------------

/// One progress row.
#[derive(Debug, Clone)]
pub struct ProgressItem {
    /// Unique identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Current position.
    pub current: f64,
    /// Target position.
    pub total: f64,
    /// Unit label.
    pub unit: Option<String>,
    /// Lifecycle status.
    pub status: ProgressStatus,
    /// Detail text.
    pub details: Option<String>,
    /// Estimated completion time.
    pub estimated_completion: Option<DateTime<Utc>>,
    /// First-seen time, used for soft-cap eviction order.
    pub created_at: DateTime<Utc>,
    /// When the item reached a terminal status; drives the linger purge.
    pub finished_at: Option<DateTime<Utc>>,
}

impl ProgressItem {
    /// Build an item from `hawk.progress` parameters, filling defaults.
    #[must_use]
    pub fn from_params(params: ProgressParams, now: DateTime<Utc>) -> Self {
        let status = params.status.unwrap_or_default();
        Self {
            id: params.id,
            label: params.label,
            current: params.current,
            total: params.total,
            unit: params.unit,
            status,
            details: params.details,
            estimated_completion: params.estimated_completion.map(Into::into),
            created_at: now,
            finished_at: status.is_terminal().then_some(now),
        }
    }

    /// Completion fraction in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        (self.current / self.total).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// One dashboard widget. Last write wins per identifier.
#[derive(Debug, Clone)]
pub struct Widget {
    /// Unique identifier.
    pub id: String,
    /// Widget kind.
    pub kind: WidgetKind,
    /// Display title.
    pub title: String,
    /// Kind-typed payload.
    pub data: WidgetData,
    /// Grid placement hint.
    pub layout: Option<LayoutHint>,
    /// Command bound to activation, from the widget's `config.action`.
    pub action: Option<String>,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// EventRecord
// ---------------------------------------------------------------------------

/// One application event.
#[derive(Debug, Clone)]
pub struct EventRecord {
    /// Event type tag.
    pub kind: String,
    /// Title.
    pub title: String,
    /// Body text.
    pub message: Option<String>,
    /// Severity.
    pub severity: EventSeverity,
    /// Emitter timestamp, or arrival time.
    pub timestamp: DateTime<Utc>,
    /// Opaque data map.
    pub data: BTreeMap<String, Value>,
}

impl EventRecord {
    /// Build a record from `hawk.event` parameters, filling defaults.
    #[must_use]
    pub fn from_params(params: EventParams, now: DateTime<Utc>) -> Self {
        Self {
            kind: params.kind,
            title: params.title,
            message: params.message,
            severity: params.severity.unwrap_or_default(),
            timestamp: params.timestamp.map_or(now, Into::into),
            data: params.data.unwrap_or_default(),
        }
    }

    /// The log record this event is promoted into.
    #[must_use]
    pub fn promoted_log(&self) -> LogRecord {
        let body = self.message.as_deref().unwrap_or(&self.kind);
        LogRecord {
            message: format!("[EVENT] {}: {}", self.title, body),
            severity: self.severity.log_severity(),
            timestamp: self.timestamp,
            component: Some("event".to_owned()),
            tags: vec![self.kind.clone()],
            context: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn log_defaults_fill_severity_and_timestamp() {
        let params: LogParams =
            serde_json::from_value(json!({"message": "boot"})).unwrap();
        let record = LogRecord::from_params(params, now());
        assert_eq!(record.severity, Severity::Info);
        assert_eq!(record.timestamp, now());
        assert!(record.component.is_none());
    }

    #[test]
    fn search_text_includes_component_and_tags() {
        let params: LogParams = serde_json::from_value(json!({
            "message": "request served",
            "component": "http",
            "tags": ["slow"]
        }))
        .unwrap();
        let record = LogRecord::from_params(params, now());
        let text = record.search_text();
        assert!(text.contains("request served"));
        assert!(text.contains("http"));
        assert!(text.contains("slow"));
    }

    #[test]
    fn category_prefers_explicit_then_dotted_head() {
        assert_eq!(config_category(Some("Net".into()), "server.port"), "Net");
        assert_eq!(config_category(None, "server.port"), "server");
        assert_eq!(config_category(None, "verbose"), "General");
        assert_eq!(config_category(None, ".hidden"), "General");
    }

    #[test]
    fn check_value_enforces_kind_bounds_choices() {
        let item = ConfigItem {
            key: "server.port".into(),
            kind: ConfigKind::Integer,
            value: ConfigValue::Integer(8080),
            description: None,
            default: None,
            min: Some(1.0),
            max: Some(65535.0),
            options: None,
            restart_required: false,
            category: "server".into(),
            sync: ConfigSyncState::Pristine,
            pending_commit: None,
            updated_at: now(),
        };
        assert!(item.check_value(&ConfigValue::Integer(9090)).is_ok());
        assert!(item.check_value(&ConfigValue::Integer(0)).is_err());
        assert!(item.check_value(&ConfigValue::Integer(70000)).is_err());
        assert!(item.check_value(&ConfigValue::Text("9090".into())).is_err());
    }

    #[test]
    fn enum_choices_are_case_sensitive() {
        let item = ConfigItem {
            key: "log.level".into(),
            kind: ConfigKind::Enum,
            value: ConfigValue::Text("info".into()),
            description: None,
            default: None,
            min: None,
            max: None,
            options: Some(vec!["debug".into(), "info".into()]),
            restart_required: false,
            category: "log".into(),
            sync: ConfigSyncState::Pristine,
            pending_commit: None,
            updated_at: now(),
        };
        assert!(item.check_value(&ConfigValue::Text("debug".into())).is_ok());
        assert!(item.check_value(&ConfigValue::Text("Debug".into())).is_err());
    }

    #[test]
    fn terminal_progress_gets_finished_at() {
        let params: ProgressParams = serde_json::from_value(json!({
            "id": "dl", "label": "download", "current": 10, "total": 10,
            "status": "completed"
        }))
        .unwrap();
        let item = ProgressItem::from_params(params, now());
        assert_eq!(item.finished_at, Some(now()));
        assert!((item.fraction() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fraction_guards_zero_total() {
        let params: ProgressParams = serde_json::from_value(json!({
            "id": "x", "label": "x", "current": 5, "total": 0
        }))
        .unwrap();
        let item = ProgressItem::from_params(params, now());
        assert_eq!(item.fraction(), 0.0);
    }

    #[test]
    fn event_promotes_with_severity_mapping() {
        let params: EventParams = serde_json::from_value(json!({
            "type": "deploy", "title": "Deploy failed", "message": "stage 2",
            "severity": "critical"
        }))
        .unwrap();
        let event = EventRecord::from_params(params, now());
        let log = event.promoted_log();
        assert_eq!(log.severity, Severity::Error);
        assert!(log.message.starts_with("[EVENT] Deploy failed:"));
    }
}
