// SPDX-License-Identifier: MIT OR Apache-2.0
//! Outbound writes to the emitter.
//!
//! Standard output is shared by everything the renderer sends back, so the
//! writer holds an async mutex and writes one full line per send. Replies
//! and notifications are therefore always atomically framed.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;

use hawk_protocol::{JsonlCodec, Outbound};

/// Single-writer outbound channel.
#[derive(Debug)]
pub struct ReplyWriter<W> {
    inner: Mutex<W>,
}

impl<W: AsyncWrite + Unpin> ReplyWriter<W> {
    /// Wrap a writer (normally `tokio::io::stdout`).
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    /// Serialize and write one message as a single flushed line.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; callers log and count it — a
    /// failed reply never tears down the pipeline.
    pub async fn send(&self, message: &Outbound) -> std::io::Result<()> {
        let line = JsonlCodec::encode_line(message);
        debug!(target: "hawk::protocol", line = line.trim_end(), "send");
        let mut writer = self.inner.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await
    }

    /// Flush any buffered output. Called once during shutdown.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub async fn flush(&self) -> std::io::Result<()> {
        self.inner.lock().await.flush().await
    }

    /// Unwrap the inner writer. Test helper.
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hawk_protocol::params::ConfigValue;
    use tokio::io::AsyncReadExt;

    /// Read all bytes from the read half of a duplex, returning a String.
    async fn drain(mut r: tokio::io::DuplexStream) -> String {
        let mut buf = Vec::new();
        r.read_to_end(&mut buf).await.unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn sends_are_atomic_lines() {
        let (w, r) = tokio::io::duplex(4096);
        let writer = ReplyWriter::new(w);
        writer
            .send(&Outbound::ConfigUpdate {
                key: "a".into(),
                value: ConfigValue::Integer(1),
            })
            .await
            .unwrap();
        writer
            .send(&Outbound::ConfigUpdate {
                key: "b".into(),
                value: ConfigValue::Integer(2),
            })
            .await
            .unwrap();
        drop(writer);

        let text = drain(r).await;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["jsonrpc"], "2.0");
            assert_eq!(value["method"], "hawk.config_update");
        }
    }
}
