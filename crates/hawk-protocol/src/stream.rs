// SPDX-License-Identifier: MIT OR Apache-2.0
//! Incremental line assembly for the inbound byte stream.
//!
//! [`LineAssembler`] buffers incoming bytes and yields complete text lines
//! as they become available, enforcing the [`MAX_LINE_LEN`](crate::MAX_LINE_LEN)
//! byte cap. Data arrives in arbitrary chunks from async I/O, so lines may
//! be split across reads.
//!
//! An oversize line is *drained*, not fatal: once the buffer passes the cap
//! without a newline the assembler discards bytes until the next line
//! boundary, then reports the line once as [`ProtocolError::OversizeLine`]
//! and resumes normally.
//!
//! # Examples
//!
//! ```
//! use hawk_protocol::stream::LineAssembler;
//!
//! let mut assembler = LineAssembler::new();
//!
//! // Feed a partial line…
//! assert!(assembler.push(b"{\"jsonrpc\"").is_empty());
//! // …then the rest.
//! let lines = assembler.push(b":\"2.0\"}\n");
//! assert_eq!(lines.len(), 1);
//! assert_eq!(lines[0].as_deref().unwrap(), "{\"jsonrpc\":\"2.0\"}");
//! ```

use crate::{MAX_LINE_LEN, ProtocolError};

/// Incremental, bounded line assembler.
#[derive(Debug)]
pub struct LineAssembler {
    buf: Vec<u8>,
    max_line_len: usize,
    /// Set while discarding the tail of a line that already blew the cap.
    draining_oversize: bool,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    /// Create an assembler with the protocol's standard 1 MiB cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_line_len(MAX_LINE_LEN)
    }

    /// Create an assembler with a custom byte cap.
    #[must_use]
    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_line_len,
            draining_oversize: false,
        }
    }

    /// Feed a chunk of bytes, returning one result per completed line.
    ///
    /// Blank lines are skipped silently. A line of exactly the cap length is
    /// accepted; one byte more is reported as oversize. Non-UTF-8 lines are
    /// reported as [`ProtocolError::Utf8`].
    pub fn push(&mut self, data: &[u8]) -> Vec<Result<String, ProtocolError>> {
        let mut out = Vec::new();

        for &byte in data {
            if byte == b'\n' {
                if self.draining_oversize {
                    self.draining_oversize = false;
                    out.push(Err(ProtocolError::OversizeLine {
                        limit: self.max_line_len,
                    }));
                } else if let Some(line) = self.take_line() {
                    out.push(line);
                }
                continue;
            }

            if self.draining_oversize {
                continue;
            }

            self.buf.push(byte);
            if self.buf.len() > self.max_line_len {
                self.buf.clear();
                self.draining_oversize = true;
            }
        }

        out
    }

    /// Flush the trailing unterminated line, if any. Used at end-of-file.
    pub fn finish(&mut self) -> Option<Result<String, ProtocolError>> {
        if self.draining_oversize {
            self.draining_oversize = false;
            return Some(Err(ProtocolError::OversizeLine {
                limit: self.max_line_len,
            }));
        }
        self.take_line()
    }

    /// Number of buffered bytes not yet consumed.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    // -- internal ---------------------------------------------------------

    /// Take the buffered bytes as one line, skipping blank lines.
    fn take_line(&mut self) -> Option<Result<String, ProtocolError>> {
        if self.buf.is_empty() {
            return None;
        }
        let bytes = std::mem::take(&mut self.buf);
        match std::str::from_utf8(&bytes) {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Ok(trimmed.to_owned()))
                }
            }
            Err(e) => Some(Err(ProtocolError::Utf8(e))),
        }
    }
}
