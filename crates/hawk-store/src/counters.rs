// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared atomic counters: per-collection change tracking and protocol
//! statistics for the status bar.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// ChangeCounters
// ---------------------------------------------------------------------------

/// One monotonic counter per collection. View models compare the counter
/// against the value they last indexed to decide whether to rebuild.
#[derive(Debug, Default)]
pub struct ChangeCounters {
    logs: AtomicU64,
    metrics: AtomicU64,
    configs: AtomicU64,
    progress: AtomicU64,
    widgets: AtomicU64,
    events: AtomicU64,
}

macro_rules! change_counter {
    ($field:ident, $bump:ident) => {
        /// Current generation of this collection.
        #[must_use]
        pub fn $field(&self) -> u64 {
            self.$field.load(Ordering::Acquire)
        }

        pub(crate) fn $bump(&self) {
            self.$field.fetch_add(1, Ordering::Release);
        }
    };
}

impl ChangeCounters {
    change_counter!(logs, bump_logs);
    change_counter!(metrics, bump_metrics);
    change_counter!(configs, bump_configs);
    change_counter!(progress, bump_progress);
    change_counter!(widgets, bump_widgets);
    change_counter!(events, bump_events);
}

// ---------------------------------------------------------------------------
// ProtocolStats
// ---------------------------------------------------------------------------

/// Atomic counters for everything the status bar and error surfaces report.
#[derive(Debug, Default)]
pub struct ProtocolStats {
    // Per-method admission counts.
    logs_received: AtomicU64,
    metrics_received: AtomicU64,
    configs_received: AtomicU64,
    progress_received: AtomicU64,
    dashboards_received: AtomicU64,
    events_received: AtomicU64,

    // Rejections and drops.
    parse_errors: AtomicU64,
    invalid_requests: AtomicU64,
    unknown_methods: AtomicU64,
    invalid_params: AtomicU64,
    unsupported_messages: AtomicU64,
    internal_errors: AtomicU64,
    rate_limited: AtomicU64,
    out_of_order_points: AtomicU64,
    counter_regressions: AtomicU64,
    coerced_configs: AtomicU64,
    oversize_lines: AtomicU64,
    oversize_batches: AtomicU64,

    replies_sent: AtomicU64,
    detached: AtomicBool,
}

macro_rules! stat_counter {
    ($field:ident, $record:ident) => {
        /// Current value.
        #[must_use]
        pub fn $field(&self) -> u64 {
            self.$field.load(Ordering::Relaxed)
        }

        /// Increment by one.
        pub fn $record(&self) {
            self.$field.fetch_add(1, Ordering::Relaxed);
        }
    };
}

impl ProtocolStats {
    stat_counter!(logs_received, record_log);
    stat_counter!(metrics_received, record_metric);
    stat_counter!(configs_received, record_config);
    stat_counter!(progress_received, record_progress);
    stat_counter!(dashboards_received, record_dashboard);
    stat_counter!(events_received, record_event);
    stat_counter!(parse_errors, record_parse_error);
    stat_counter!(invalid_requests, record_invalid_request);
    stat_counter!(unknown_methods, record_unknown_method);
    stat_counter!(invalid_params, record_invalid_params);
    stat_counter!(unsupported_messages, record_unsupported);
    stat_counter!(internal_errors, record_internal_error);
    stat_counter!(rate_limited, record_rate_limited);
    stat_counter!(out_of_order_points, record_out_of_order_point);
    stat_counter!(counter_regressions, record_counter_regression);
    stat_counter!(coerced_configs, record_coerced_config);
    stat_counter!(oversize_lines, record_oversize_line);
    stat_counter!(oversize_batches, record_oversize_batch);
    stat_counter!(replies_sent, record_reply_sent);

    /// Total messages admitted across all methods.
    #[must_use]
    pub fn received_total(&self) -> u64 {
        self.logs_received()
            + self.metrics_received()
            + self.configs_received()
            + self.progress_received()
            + self.dashboards_received()
            + self.events_received()
    }

    /// Total messages or points dropped for any reason.
    #[must_use]
    pub fn dropped_total(&self) -> u64 {
        self.parse_errors()
            + self.invalid_requests()
            + self.unknown_methods()
            + self.invalid_params()
            + self.unsupported_messages()
            + self.internal_errors()
            + self.rate_limited()
            + self.out_of_order_points()
            + self.counter_regressions()
            + self.oversize_lines()
            + self.oversize_batches()
    }

    /// Mark that stdin reached end-of-file.
    pub fn set_detached(&self) {
        self.detached.store(true, Ordering::Release);
    }

    /// Whether the emitter side of the pipe is gone.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_counters_start_at_zero_and_advance() {
        let c = ChangeCounters::default();
        assert_eq!(c.logs(), 0);
        c.bump_logs();
        c.bump_logs();
        assert_eq!(c.logs(), 2);
        assert_eq!(c.metrics(), 0);
    }

    #[test]
    fn totals_aggregate_the_right_counters() {
        let s = ProtocolStats::default();
        s.record_log();
        s.record_metric();
        s.record_rate_limited();
        s.record_out_of_order_point();
        assert_eq!(s.received_total(), 2);
        assert_eq!(s.dropped_total(), 2);
    }

    #[test]
    fn detached_flag_latches() {
        let s = ProtocolStats::default();
        assert!(!s.is_detached());
        s.set_detached();
        assert!(s.is_detached());
    }
}
