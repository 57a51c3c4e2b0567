// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! hawk-store
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod counters;
pub mod ring;
pub mod store;
pub mod types;

pub use counters::{ChangeCounters, ProtocolStats};
pub use ring::Ring;
pub use store::{
    ConfigUpsertOutcome, DEFAULT_EVENT_CAPACITY, DEFAULT_LOG_CAPACITY, DEFAULT_SERIES_CAPACITY,
    PROGRESS_LINGER_MS, SOFT_COLLECTION_CAP, Store, StoreCapacities,
};
pub use types::{
    ConfigItem, ConfigSyncState, EventRecord, LogRecord, Metric, MetricOutcome, MetricPoint,
    ProgressItem, Widget, config_category,
};
