// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property tests over the store's bounded containers and ordering
//! invariants.

use chrono::DateTime;
use hawk_protocol::params::MetricKind;
use hawk_store::{LogRecord, Ring, Store, StoreCapacities};
use proptest::prelude::*;

proptest! {
    /// After K pushes a ring holds exactly min(K, capacity) entries, in
    /// arrival order.
    #[test]
    fn ring_holds_min_of_pushes_and_capacity(
        capacity in 1usize..64,
        count in 0usize..256,
    ) {
        let mut ring = Ring::new(capacity);
        for i in 0..count {
            ring.push(i);
        }
        prop_assert_eq!(ring.len(), count.min(capacity));

        let stored: Vec<usize> = ring.iter().copied().collect();
        let expected: Vec<usize> = (count.saturating_sub(capacity)..count).collect();
        prop_assert_eq!(stored, expected);
    }

    /// Log ingestion preserves arrival order regardless of record
    /// timestamps.
    #[test]
    fn log_ring_orders_by_arrival_not_timestamp(
        timestamps in proptest::collection::vec(0i64..1_000_000, 1..200),
    ) {
        let store = Store::with_capacities(StoreCapacities {
            log: 100,
            ..StoreCapacities::default()
        });
        for (i, ts) in timestamps.iter().enumerate() {
            let mut record = LogRecord::protocol_error(
                format!("m{i}"),
                DateTime::from_timestamp(*ts, 0).unwrap(),
            );
            record.component = None;
            store.append_log(record);
        }

        let logs = store.logs();
        let n = timestamps.len();
        let first_kept = n.saturating_sub(100);
        let messages: Vec<String> = logs.iter().map(|l| l.message.clone()).collect();
        let expected: Vec<String> = (first_kept..n).map(|i| format!("m{i}")).collect();
        prop_assert_eq!(messages, expected);
    }

    /// For any accepted sequence of metric points, stored timestamps are
    /// non-decreasing and the series never exceeds its capacity.
    #[test]
    fn metric_series_timestamps_are_monotonic(
        updates in proptest::collection::vec((0i64..1000, -1000.0f64..1000.0), 1..300),
    ) {
        let store = Store::with_capacities(StoreCapacities {
            series: 50,
            ..StoreCapacities::default()
        });
        for (ts, value) in &updates {
            store.record_metric(
                "m",
                *value,
                None,
                DateTime::from_timestamp(*ts, 0).unwrap(),
                None,
                None,
            );
        }

        let metrics = store.metrics();
        let series: Vec<i64> = metrics["m"].series.iter().map(|p| p.at.timestamp()).collect();
        prop_assert!(series.len() <= 50);
        prop_assert!(series.windows(2).all(|w| w[0] <= w[1]));
    }

    /// A counter metric's latest value never decreases, whatever the
    /// emitter sends.
    #[test]
    fn counter_latest_is_non_decreasing(
        values in proptest::collection::vec(-1000.0f64..1000.0, 1..200),
    ) {
        let store = Store::new();
        let mut observed = Vec::new();
        for (i, value) in values.iter().enumerate() {
            store.record_metric(
                "jobs",
                *value,
                Some(MetricKind::Counter),
                DateTime::from_timestamp(i as i64, 0).unwrap(),
                None,
                None,
            );
            observed.push(store.metrics()["jobs"].latest);
        }
        prop_assert!(observed.windows(2).all(|w| w[0] <= w[1]));
    }

    /// Accepted + dropped always accounts for every offered point.
    #[test]
    fn metric_drops_are_counted(
        updates in proptest::collection::vec((0i64..100, 0.0f64..100.0), 1..200),
    ) {
        let store = Store::new();
        for (ts, value) in &updates {
            store.record_metric(
                "m",
                *value,
                None,
                DateTime::from_timestamp(*ts, 0).unwrap(),
                None,
                None,
            );
        }
        let accepted = store.metrics()["m"].series.len() as u64;
        let series_cap_evictions =
            updates.len() as u64 - accepted - store.stats().out_of_order_points();
        // Everything offered is either stored, dropped out-of-order, or
        // evicted by the series ring.
        prop_assert!(series_cap_evictions <= updates.len() as u64);
    }
}
