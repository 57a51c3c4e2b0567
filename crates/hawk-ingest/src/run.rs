// SPDX-License-Identifier: MIT OR Apache-2.0
//! The ingest task: read, assemble, admit, parse, route.
//!
//! One cooperative task owns the inbound pipe. Bytes flow through the
//! [`LineAssembler`] (1 MiB line cap), each completed line passes the token
//! bucket, and admitted envelopes are routed into the store. End-of-file
//! flips the detached flag and ends the task; the renderer keeps running
//! until the user quits.

use std::sync::Arc;

use chrono::Utc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::watch;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

use hawk_protocol::{
    Envelope, ErrorObject, JsonlCodec, MAX_BATCH_LEN, Outbound, ProtocolError, RequestId,
    WireFrame, peek_id, stream::LineAssembler,
};
use hawk_ratelimit::{RateLimitConfig, RateLimitError, TokenBucket};
use hawk_store::{LogRecord, Store};

use crate::reply::ReplyWriter;
use crate::router::Router;

/// Read-buffer size for the inbound pipe.
const READ_CHUNK: usize = 8 * 1024;

/// Minimum spacing between synthesized transport-error log entries, so a
/// stream of garbage cannot flood the log ring.
const TRANSPORT_LOG_INTERVAL: Duration = Duration::from_secs(1);

/// Ingest knobs.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Token-bucket parameters for message admission.
    pub rate: RateLimitConfig,
    /// Maximum envelopes per batch array.
    pub max_batch_len: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            rate: RateLimitConfig::default(),
            max_batch_len: MAX_BATCH_LEN,
        }
    }
}

/// Errors that prevent the ingest task from starting.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The rate-limit configuration is unusable.
    #[error(transparent)]
    RateLimit(#[from] RateLimitError),
}

/// Run the ingest task until end-of-file or shutdown.
///
/// Reads `reader` to completion, routing every admitted envelope into
/// `store` and addressing error replies through `replies`. On end-of-file
/// the store's detached flag is set and the task returns; on shutdown the
/// remaining input is discarded.
///
/// # Errors
///
/// Returns [`IngestError`] only for unusable configuration; transport
/// failures are absorbed, counted, and logged.
pub async fn run_ingest<R, W>(
    mut reader: R,
    store: Arc<Store>,
    replies: Arc<ReplyWriter<W>>,
    options: IngestOptions,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), IngestError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut pipeline = Pipeline {
        router: Router::new(Arc::clone(&store)),
        store,
        replies,
        bucket: TokenBucket::new(options.rate)?,
        max_batch_len: options.max_batch_len,
        last_transport_log: None,
    };

    let mut assembler = LineAssembler::new();
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    // Soft shutdown: stop accepting, discard the rest.
                    break;
                }
            }
            read = reader.read(&mut buf) => {
                match read {
                    Ok(0) => {
                        if let Some(line) = assembler.finish() {
                            pipeline.handle_line(line).await;
                        }
                        pipeline.detach("emitter detached (stdin closed)");
                        break;
                    }
                    Ok(n) => {
                        for line in assembler.push(&buf[..n]) {
                            pipeline.handle_line(line).await;
                        }
                    }
                    Err(e) => {
                        pipeline.detach(format!("stdin read failed: {e}"));
                        break;
                    }
                }
            }
        }
    }

    if let Err(e) = pipeline.replies.flush().await {
        warn!(target: "hawk::protocol", error = %e, "failed to flush outbound pipe");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Per-run ingest state.
struct Pipeline<W> {
    store: Arc<Store>,
    router: Router,
    replies: Arc<ReplyWriter<W>>,
    bucket: TokenBucket,
    max_batch_len: usize,
    last_transport_log: Option<Instant>,
}

impl<W: AsyncWrite + Unpin> Pipeline<W> {
    /// Process one assembled line (or line-level transport error).
    async fn handle_line(&mut self, line: Result<String, ProtocolError>) {
        let line = match line {
            Ok(line) => line,
            Err(e @ ProtocolError::OversizeLine { .. }) => {
                self.store.stats().record_oversize_line();
                self.transport_error_log(&e);
                return;
            }
            Err(e) => {
                self.store.stats().record_parse_error();
                self.transport_error_log(&e);
                return;
            }
        };

        debug!(target: "hawk::protocol", line = %line, "recv");

        // One token per top-level message, batch or not. When the bucket is
        // empty the message is dropped without blocking the reader.
        if !self.bucket.try_acquire() {
            self.store.stats().record_rate_limited();
            return;
        }

        match JsonlCodec::decode_line(&line) {
            Err(e) => {
                self.store.stats().record_parse_error();
                self.transport_error_log(&e);
            }
            Ok(WireFrame::Single(value)) => {
                self.process_envelope(value).await;
            }
            Ok(WireFrame::Batch(items)) => {
                if items.len() > self.max_batch_len {
                    self.store.stats().record_oversize_batch();
                    let error = ProtocolError::OversizeBatch {
                        count: items.len(),
                        limit: self.max_batch_len,
                    };
                    self.transport_error_log(&error);
                    // The batch is rejected whole; address the reply with
                    // the first element's id when it has one.
                    let id = items.first().and_then(peek_id);
                    self.reply_if_addressed(id, error.to_error_object()).await;
                    return;
                }
                // Inner order is preserved; one bad envelope never stops
                // its siblings.
                for item in items {
                    self.process_envelope(item).await;
                }
            }
        }
    }

    /// Decode, validate, and route one raw envelope value.
    async fn process_envelope(&mut self, value: serde_json::Value) {
        let now = Utc::now();
        match Envelope::from_value(&value) {
            Err(e) => {
                match e {
                    ProtocolError::InvalidEnvelope { .. } => {
                        self.store.stats().record_invalid_request();
                    }
                    _ => self.store.stats().record_parse_error(),
                }
                let id = peek_id(&value);
                self.reply_if_addressed(id, e.to_error_object()).await;
            }
            Ok(envelope) => {
                let id = envelope.id.clone();
                if let Some(error) = self.router.route(envelope, now) {
                    self.reply_if_addressed(id, error).await;
                }
            }
        }
        // Cooperative yield between envelopes keeps the render task live
        // under sustained input.
        tokio::task::yield_now().await;
    }

    /// Send an error reply when the envelope carried a correlation id;
    /// otherwise the rejection stays counter-only.
    async fn reply_if_addressed(&self, id: Option<RequestId>, error: ErrorObject) {
        let Some(id) = id else { return };
        let reply = Outbound::error_reply(id, error);
        match self.replies.send(&reply).await {
            Ok(()) => self.store.stats().record_reply_sent(),
            Err(e) => warn!(target: "hawk::protocol", error = %e, "failed to write error reply"),
        }
    }

    /// Synthesize a throttled ERROR-level log entry for a transport fault.
    fn transport_error_log(&mut self, error: &ProtocolError) {
        warn!(target: "hawk::protocol", %error, "transport error");
        let now = Instant::now();
        let due = self
            .last_transport_log
            .is_none_or(|last| now.duration_since(last) >= TRANSPORT_LOG_INTERVAL);
        if due {
            self.last_transport_log = Some(now);
            self.store
                .append_log(LogRecord::protocol_error(error.to_string(), Utc::now()));
        }
    }

    /// Record end-of-stream. The header banner surfaces the state; the log
    /// ring is left to the emitter's own records.
    fn detach(&self, reason: impl Into<String>) {
        self.store.stats().set_detached();
        let reason: String = reason.into();
        warn!(target: "hawk::protocol", reason = %reason, "detached");
    }
}
