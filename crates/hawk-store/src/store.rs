// SPDX-License-Identifier: MIT OR Apache-2.0
//! The authoritative state container.
//!
//! One [`Store`] value is owned by the controller and shared as
//! `Arc<Store>`. Guards are per collection and critical sections are
//! microsecond-scale; every operation either completes fully or leaves the
//! collection unchanged.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use hawk_protocol::params::{ConfigKind, ConfigParams, ConfigValue, MetricKind, ProgressStatus};

use crate::counters::{ChangeCounters, ProtocolStats};
use crate::ring::Ring;
use crate::types::{
    ConfigItem, ConfigSyncState, EventRecord, LogRecord, Metric, MetricOutcome, MetricPoint,
    ProgressItem, Widget, config_category,
};

/// Default log ring capacity.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Default event ring capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;

/// Default per-metric series capacity.
pub const DEFAULT_SERIES_CAPACITY: usize = 100;

/// Soft cap for the nominally unbounded maps. Crossing it logs one warning
/// per collection per run; progress additionally evicts its oldest
/// finished item.
pub const SOFT_COLLECTION_CAP: usize = 10_000;

/// How long a completed or errored progress item stays visible.
pub const PROGRESS_LINGER_MS: i64 = 1500;

/// Capacity knobs, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct StoreCapacities {
    /// Log ring size.
    pub log: usize,
    /// Event ring size.
    pub event: usize,
    /// Per-metric series size.
    pub series: usize,
}

impl Default for StoreCapacities {
    fn default() -> Self {
        Self {
            log: DEFAULT_LOG_CAPACITY,
            event: DEFAULT_EVENT_CAPACITY,
            series: DEFAULT_SERIES_CAPACITY,
        }
    }
}

/// Outcome of an emitter-origin config upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigUpsertOutcome {
    /// Stored as sent.
    Applied,
    /// Stored after a lossless kind coercion.
    Coerced,
    /// The supplied value had no lossless reading in the declared kind; the
    /// value portion of the update was dropped.
    ValueDropped,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The single authoritative in-memory state container.
#[derive(Debug)]
pub struct Store {
    logs: RwLock<Ring<LogRecord>>,
    metrics: RwLock<BTreeMap<String, Metric>>,
    configs: RwLock<BTreeMap<String, ConfigItem>>,
    progress: RwLock<BTreeMap<String, ProgressItem>>,
    widgets: RwLock<BTreeMap<String, Widget>>,
    events: RwLock<Ring<EventRecord>>,
    changes: ChangeCounters,
    stats: ProtocolStats,
    capacities: StoreCapacities,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a store with the default capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacities(StoreCapacities::default())
    }

    /// Create a store with explicit capacities.
    #[must_use]
    pub fn with_capacities(capacities: StoreCapacities) -> Self {
        Self {
            logs: RwLock::new(Ring::new(capacities.log)),
            metrics: RwLock::new(BTreeMap::new()),
            configs: RwLock::new(BTreeMap::new()),
            progress: RwLock::new(BTreeMap::new()),
            widgets: RwLock::new(BTreeMap::new()),
            events: RwLock::new(Ring::new(capacities.event)),
            changes: ChangeCounters::default(),
            stats: ProtocolStats::default(),
            capacities,
        }
    }

    /// Per-collection change counters.
    #[must_use]
    pub fn changes(&self) -> &ChangeCounters {
        &self.changes
    }

    /// Protocol statistic counters.
    #[must_use]
    pub fn stats(&self) -> &ProtocolStats {
        &self.stats
    }

    // -- read guards -------------------------------------------------------

    /// Read guard over the log ring.
    pub fn logs(&self) -> RwLockReadGuard<'_, Ring<LogRecord>> {
        self.logs.read().expect("log ring lock poisoned")
    }

    /// Read guard over the metric map.
    pub fn metrics(&self) -> RwLockReadGuard<'_, BTreeMap<String, Metric>> {
        self.metrics.read().expect("metric map lock poisoned")
    }

    /// Read guard over the config map.
    pub fn configs(&self) -> RwLockReadGuard<'_, BTreeMap<String, ConfigItem>> {
        self.configs.read().expect("config map lock poisoned")
    }

    /// Read guard over the progress map.
    pub fn progress(&self) -> RwLockReadGuard<'_, BTreeMap<String, ProgressItem>> {
        self.progress.read().expect("progress map lock poisoned")
    }

    /// Read guard over the widget map.
    pub fn widgets(&self) -> RwLockReadGuard<'_, BTreeMap<String, Widget>> {
        self.widgets.read().expect("widget map lock poisoned")
    }

    /// Read guard over the event ring.
    pub fn events(&self) -> RwLockReadGuard<'_, Ring<EventRecord>> {
        self.events.read().expect("event ring lock poisoned")
    }

    // -- ingest-task writes ------------------------------------------------

    /// Append one log record.
    pub fn append_log(&self, record: LogRecord) {
        let mut logs = self.logs.write().expect("log ring lock poisoned");
        logs.push(record);
        drop(logs);
        self.changes.bump_logs();
    }

    /// Apply one metric update.
    ///
    /// A point older than the newest stored point is dropped whole; a
    /// regressing counter value is dropped whole. Either way the metric's
    /// latest value stays unchanged and the matching drop counter advances.
    pub fn record_metric(
        &self,
        name: &str,
        value: f64,
        kind: Option<MetricKind>,
        timestamp: DateTime<Utc>,
        tags: Option<BTreeMap<String, String>>,
        unit: Option<String>,
    ) -> MetricOutcome {
        let mut metrics = self.metrics.write().expect("metric map lock poisoned");

        let outcome = match metrics.get_mut(name) {
            Some(metric) => {
                if let Some(kind) = kind {
                    metric.kind = kind;
                }
                if metric.kind == MetricKind::Counter && value < metric.latest {
                    self.stats.record_counter_regression();
                    MetricOutcome::DroppedCounterRegression
                } else if metric.series.back().is_some_and(|p| timestamp < p.at) {
                    self.stats.record_out_of_order_point();
                    MetricOutcome::DroppedOutOfOrder
                } else {
                    metric.latest = value;
                    metric.updated_at = timestamp;
                    if let Some(tags) = tags {
                        metric.tags = tags;
                    }
                    if unit.is_some() {
                        metric.unit = unit;
                    }
                    metric.series.push(MetricPoint {
                        at: timestamp,
                        value,
                    });
                    MetricOutcome::Applied
                }
            }
            None => {
                let mut series = Ring::new(self.capacities.series);
                series.push(MetricPoint {
                    at: timestamp,
                    value,
                });
                metrics.insert(
                    name.to_owned(),
                    Metric {
                        name: name.to_owned(),
                        kind: kind.unwrap_or_default(),
                        latest: value,
                        unit,
                        tags: tags.unwrap_or_default(),
                        updated_at: timestamp,
                        series,
                    },
                );
                MetricOutcome::Applied
            }
        };

        drop(metrics);
        if outcome == MetricOutcome::Applied {
            self.changes.bump_metrics();
        }
        outcome
    }

    /// Upsert a configuration item from an emitter-origin `hawk.config`.
    ///
    /// Declared metadata always updates. The value updates only when the
    /// message supplies a non-null value; a renderer-modified value is
    /// otherwise preserved. Mismatched values are coerced when losslessly
    /// possible and dropped (with a warning) when not.
    pub fn upsert_config(&self, params: ConfigParams, now: DateTime<Utc>) -> ConfigUpsertOutcome {
        let mut configs = self.configs.write().expect("config map lock poisoned");
        self.warn_on_soft_cap("configs", configs.len());

        let kind = params.kind.unwrap_or_default();
        let category = config_category(params.category, &params.key);

        let outcome = match configs.get_mut(&params.key) {
            Some(item) => {
                item.kind = kind;
                item.description = params.description.or(item.description.take());
                item.default = params.default.or(item.default.take());
                item.min = params.min.or(item.min);
                item.max = params.max.or(item.max);
                item.options = params.options.or(item.options.take());
                if let Some(required) = params.restart_required {
                    item.restart_required = required;
                }
                item.category = category;
                item.updated_at = now;

                match params.value {
                    None => ConfigUpsertOutcome::Applied,
                    Some(value) => match value.coerce_to(kind) {
                        None => {
                            warn!(
                                key = %item.key,
                                kind = kind.as_str(),
                                "dropping config value with no lossless reading in declared kind"
                            );
                            ConfigUpsertOutcome::ValueDropped
                        }
                        Some(coerced) => {
                            let was_coerced = coerced != value;
                            let new_sync = match &item.pending_commit {
                                Some(pending) if *pending == coerced => ConfigSyncState::Confirmed,
                                Some(_) => ConfigSyncState::Drifted,
                                None => item.sync,
                            };
                            if new_sync == ConfigSyncState::Confirmed {
                                item.pending_commit = None;
                            }
                            item.sync = new_sync;
                            item.value = coerced;
                            if was_coerced {
                                self.stats.record_coerced_config();
                                ConfigUpsertOutcome::Coerced
                            } else {
                                ConfigUpsertOutcome::Applied
                            }
                        }
                    },
                }
            }
            None => {
                let (value, outcome) = match params.value {
                    None => (default_value_for(kind, params.default.as_ref()), ConfigUpsertOutcome::Applied),
                    Some(value) => match value.coerce_to(kind) {
                        Some(coerced) if coerced == value => (coerced, ConfigUpsertOutcome::Applied),
                        Some(coerced) => {
                            self.stats.record_coerced_config();
                            (coerced, ConfigUpsertOutcome::Coerced)
                        }
                        None => {
                            warn!(
                                key = %params.key,
                                kind = kind.as_str(),
                                "dropping config value with no lossless reading in declared kind"
                            );
                            (
                                default_value_for(kind, params.default.as_ref()),
                                ConfigUpsertOutcome::ValueDropped,
                            )
                        }
                    },
                };
                configs.insert(
                    params.key.clone(),
                    ConfigItem {
                        key: params.key,
                        kind,
                        value,
                        description: params.description,
                        default: params.default,
                        min: params.min,
                        max: params.max,
                        options: params.options,
                        restart_required: params.restart_required.unwrap_or(false),
                        category,
                        sync: ConfigSyncState::Pristine,
                        pending_commit: None,
                        updated_at: now,
                    },
                );
                outcome
            }
        };

        drop(configs);
        self.changes.bump_configs();
        outcome
    }

    /// Upsert a progress item. Terminal transitions stamp `finished_at` so
    /// the linger purge can remove the row later.
    pub fn upsert_progress(&self, item: ProgressItem) {
        let mut progress = self.progress.write().expect("progress map lock poisoned");
        self.warn_on_soft_cap("progress", progress.len());

        if progress.len() >= SOFT_COLLECTION_CAP && !progress.contains_key(&item.id) {
            let oldest_finished = progress
                .values()
                .filter(|p| p.finished_at.is_some())
                .min_by_key(|p| p.created_at)
                .map(|p| p.id.clone());
            if let Some(id) = oldest_finished {
                progress.remove(&id);
            }
        }

        match progress.get_mut(&item.id) {
            Some(existing) => {
                let created_at = existing.created_at;
                let previously_finished = existing.finished_at;
                *existing = item;
                existing.created_at = created_at;
                // Keep the first terminal stamp so repeated terminal
                // updates do not extend the linger window.
                if existing.finished_at.is_some() && previously_finished.is_some() {
                    existing.finished_at = previously_finished;
                }
            }
            None => {
                progress.insert(item.id.clone(), item);
            }
        }

        drop(progress);
        self.changes.bump_progress();
    }

    /// Last-write-wins widget upsert.
    pub fn upsert_widget(&self, widget: Widget) {
        let mut widgets = self.widgets.write().expect("widget map lock poisoned");
        self.warn_on_soft_cap("widgets", widgets.len());
        widgets.insert(widget.id.clone(), widget);
        drop(widgets);
        self.changes.bump_widgets();
    }

    /// Append an event record and its promoted log entry.
    pub fn append_event(&self, event: EventRecord) {
        let promoted = event.promoted_log();
        {
            let mut events = self.events.write().expect("event ring lock poisoned");
            events.push(event);
        }
        self.changes.bump_events();
        self.append_log(promoted);
    }

    // -- render-task writes ------------------------------------------------

    /// Commit a user config edit: strict validation, optimistic local
    /// apply, sync state → Modified.
    ///
    /// # Errors
    ///
    /// Returns the human-readable reason when the key is unknown or the
    /// value fails the kind/bounds/choices check; the store is unchanged.
    pub fn commit_config_edit(
        &self,
        key: &str,
        value: ConfigValue,
        now: DateTime<Utc>,
    ) -> Result<ConfigValue, String> {
        let mut configs = self.configs.write().expect("config map lock poisoned");
        let item = configs
            .get_mut(key)
            .ok_or_else(|| format!("unknown config key \"{key}\""))?;
        item.check_value(&value)?;
        item.value = value.clone();
        item.pending_commit = Some(value.clone());
        item.sync = ConfigSyncState::Modified;
        item.updated_at = now;
        drop(configs);
        self.changes.bump_configs();
        Ok(value)
    }

    /// Revert an item to its declared default.
    ///
    /// # Errors
    ///
    /// Returns the reason when the key is unknown or has no declared
    /// default.
    pub fn reset_config(&self, key: &str, now: DateTime<Utc>) -> Result<ConfigValue, String> {
        let default = {
            let configs = self.configs.read().expect("config map lock poisoned");
            let item = configs
                .get(key)
                .ok_or_else(|| format!("unknown config key \"{key}\""))?;
            item.default
                .clone()
                .ok_or_else(|| format!("\"{key}\" has no declared default"))?
        };
        self.commit_config_edit(key, default, now)
    }

    /// Remove progress rows whose linger window has expired.
    pub fn purge_expired_progress(&self, now: DateTime<Utc>) {
        let linger = Duration::milliseconds(PROGRESS_LINGER_MS);
        let mut progress = self.progress.write().expect("progress map lock poisoned");
        let before = progress.len();
        progress.retain(|_, item| match item.finished_at {
            Some(finished) => now.signed_duration_since(finished) < linger,
            None => true,
        });
        let purged = before != progress.len();
        drop(progress);
        if purged {
            self.changes.bump_progress();
        }
    }

    /// Progress rows that belong in the footer: pending or in-progress
    /// first (by age), then lingering terminal rows.
    #[must_use]
    pub fn visible_progress(&self) -> Vec<ProgressItem> {
        let progress = self.progress.read().expect("progress map lock poisoned");
        let mut items: Vec<ProgressItem> = progress.values().cloned().collect();
        items.sort_by(|a, b| {
            let a_active = matches!(a.status, ProgressStatus::Pending | ProgressStatus::InProgress);
            let b_active = matches!(b.status, ProgressStatus::Pending | ProgressStatus::InProgress);
            b_active
                .cmp(&a_active)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        items
    }

    // -- internal ----------------------------------------------------------

    fn warn_on_soft_cap(&self, collection: &'static str, len: usize) {
        if len == SOFT_COLLECTION_CAP {
            warn!(collection, cap = SOFT_COLLECTION_CAP, "collection crossed its soft cap");
        }
    }
}

/// The value a freshly declared item gets when the message carried none.
fn default_value_for(kind: ConfigKind, default: Option<&ConfigValue>) -> ConfigValue {
    if let Some(default) = default
        && let Some(v) = default.coerce_to(kind)
    {
        return v;
    }
    match kind {
        ConfigKind::String | ConfigKind::Enum => ConfigValue::Text(String::new()),
        ConfigKind::Integer => ConfigValue::Integer(0),
        ConfigKind::Float => ConfigValue::Float(0.0),
        ConfigKind::Boolean => ConfigValue::Bool(false),
    }
}
