// SPDX-License-Identifier: MIT OR Apache-2.0
//! Method dispatch: typed decode, defaulting, and store mutation for the
//! six inbound `hawk.*` methods.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use hawk_protocol::params::{MethodCall, MethodDecodeError, WidgetData};
use hawk_protocol::{Envelope, ErrorCode, ErrorObject};
use hawk_store::{EventRecord, LogRecord, ProgressItem, Store, Widget};

/// Dispatches validated envelopes into the store.
#[derive(Debug, Clone)]
pub struct Router {
    store: Arc<Store>,
}

impl Router {
    /// Create a router writing into `store`.
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Route one shape-valid envelope.
    ///
    /// Returns `None` when the envelope was applied and `Some(error)` when
    /// it was rejected; the caller replies with the error iff the envelope
    /// carried a correlation id. A panicking handler is caught here,
    /// demoted to an internal error, and logged — it never crosses the
    /// task boundary.
    pub fn route(&self, envelope: Envelope, now: DateTime<Utc>) -> Option<ErrorObject> {
        if envelope.is_response {
            self.store.stats().record_unsupported();
            return Some(ErrorObject::with_detail(
                ErrorCode::UnsupportedMessageType,
                "the renderer does not consume response envelopes",
            ));
        }

        // Shape validation guarantees a method on non-response envelopes.
        let method = envelope.method.as_deref().unwrap_or_default().to_owned();

        let mut call = match MethodCall::decode(&method, envelope.params) {
            Ok(call) => call,
            Err(MethodDecodeError::UnknownMethod { method }) => {
                self.store.stats().record_unknown_method();
                return Some(ErrorObject::with_detail(
                    ErrorCode::MethodNotFound,
                    format!("unknown method: {method}"),
                ));
            }
            Err(err @ MethodDecodeError::BadParams { .. }) => {
                self.store.stats().record_invalid_params();
                return Some(ErrorObject::with_detail(ErrorCode::InvalidParams, err.to_string()));
            }
        };

        // The emitter-declared component backfills log records that carry
        // none of their own.
        if let MethodCall::Log(params) = &mut call
            && params.component.is_none()
        {
            params.component = envelope.meta.and_then(|meta| meta.component);
        }

        match catch_unwind(AssertUnwindSafe(|| self.dispatch(call, now))) {
            Ok(result) => result,
            Err(_) => {
                self.store.stats().record_internal_error();
                self.store
                    .append_log(LogRecord::protocol_error(format!("handler for {method} panicked"), now));
                error!(target: "hawk::protocol", method, "handler panicked");
                Some(ErrorObject::new(ErrorCode::InternalError))
            }
        }
    }

    fn dispatch(&self, call: MethodCall, now: DateTime<Utc>) -> Option<ErrorObject> {
        let stats = self.store.stats();
        match call {
            MethodCall::Log(params) => {
                stats.record_log();
                self.store.append_log(LogRecord::from_params(params, now));
                None
            }

            MethodCall::Metric(params) => {
                if params.name.is_empty() {
                    stats.record_invalid_params();
                    return Some(ErrorObject::with_detail(
                        ErrorCode::InvalidParams,
                        "metric name must not be empty",
                    ));
                }
                if !params.value.is_finite() {
                    stats.record_invalid_params();
                    return Some(ErrorObject::with_detail(
                        ErrorCode::InvalidParams,
                        format!("metric value must be finite, got {}", params.value),
                    ));
                }
                stats.record_metric();
                let timestamp = params.timestamp.map_or(now, Into::into);
                let outcome = self.store.record_metric(
                    &params.name,
                    params.value,
                    params.kind,
                    timestamp,
                    params.tags,
                    params.unit,
                );
                debug!(target: "hawk::protocol", name = %params.name, ?outcome, "metric");
                None
            }

            MethodCall::Config(params) => {
                if params.key.is_empty() {
                    stats.record_invalid_params();
                    return Some(ErrorObject::with_detail(
                        ErrorCode::InvalidParams,
                        "config key must not be empty",
                    ));
                }
                stats.record_config();
                self.store.upsert_config(params, now);
                None
            }

            MethodCall::Progress(params) => {
                if params.id.is_empty() || params.label.is_empty() {
                    stats.record_invalid_params();
                    return Some(ErrorObject::with_detail(
                        ErrorCode::InvalidParams,
                        "progress id and label must not be empty",
                    ));
                }
                if !params.current.is_finite() || !params.total.is_finite() {
                    stats.record_invalid_params();
                    return Some(ErrorObject::with_detail(
                        ErrorCode::InvalidParams,
                        "progress current and total must be finite",
                    ));
                }
                stats.record_progress();
                self.store.upsert_progress(ProgressItem::from_params(params, now));
                None
            }

            MethodCall::Dashboard(params) => {
                if params.widget_id.is_empty() {
                    stats.record_invalid_params();
                    return Some(ErrorObject::with_detail(
                        ErrorCode::InvalidParams,
                        "widget_id must not be empty",
                    ));
                }
                let Some(raw) = params.data else {
                    stats.record_invalid_params();
                    return Some(ErrorObject::with_detail(
                        ErrorCode::InvalidParams,
                        "dashboard widget requires a data payload",
                    ));
                };
                let data = match WidgetData::decode(params.kind, raw) {
                    Ok(data) => data,
                    Err(e) => {
                        stats.record_invalid_params();
                        return Some(ErrorObject::with_detail(
                            ErrorCode::InvalidData,
                            format!("widget data does not match its declared kind: {e}"),
                        ));
                    }
                };
                stats.record_dashboard();

                let action = params
                    .config
                    .as_ref()
                    .and_then(|c| c.get("action"))
                    .and_then(|v| v.as_str())
                    .map(str::to_owned);
                let title = params.title.unwrap_or_else(|| params.widget_id.clone());

                self.store.upsert_widget(Widget {
                    id: params.widget_id,
                    kind: params.kind,
                    title,
                    data,
                    layout: params.layout,
                    action,
                    updated_at: now,
                });
                None
            }

            MethodCall::Event(params) => {
                if params.kind.is_empty() || params.title.is_empty() {
                    stats.record_invalid_params();
                    return Some(ErrorObject::with_detail(
                        ErrorCode::InvalidParams,
                        "event type and title must not be empty",
                    ));
                }
                stats.record_event();
                self.store.append_event(EventRecord::from_params(params, now));
                None
            }
        }
    }
}
