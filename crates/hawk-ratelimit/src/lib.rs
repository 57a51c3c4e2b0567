// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! hawk-ratelimit
#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Default sustained admission rate, messages per second.
pub const DEFAULT_RATE_PER_SEC: u32 = 1000;

/// Default burst ceiling. The bucket starts full.
pub const DEFAULT_BURST: u32 = 1000;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Token-bucket parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Sustained refill rate in tokens per second.
    pub rate_per_sec: u32,
    /// Maximum token balance.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rate_per_sec: DEFAULT_RATE_PER_SEC,
            burst: DEFAULT_BURST,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// Rate and burst must both be positive.
    #[error("rate and burst must be positive (rate={rate_per_sec}, burst={burst})")]
    InvalidConfig {
        /// Offending rate.
        rate_per_sec: u32,
        /// Offending burst.
        burst: u32,
    },
}

// ---------------------------------------------------------------------------
// TokenBucket
// ---------------------------------------------------------------------------

/// A continuously-refilled token bucket.
///
/// [`try_acquire`](Self::try_acquire) never blocks: the ingest loop drops
/// the message and counts it when the bucket is empty. The clock is
/// `tokio::time`, so paused-clock tests control refill exactly.
///
/// # Examples
///
/// ```
/// use hawk_ratelimit::{RateLimitConfig, TokenBucket};
///
/// let mut bucket = TokenBucket::new(RateLimitConfig { rate_per_sec: 10, burst: 2 }).unwrap();
/// assert!(bucket.try_acquire());
/// assert!(bucket.try_acquire());
/// // Bucket exhausted; no refill has elapsed.
/// assert!(!bucket.try_acquire());
/// ```
#[derive(Debug)]
pub struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a bucket that starts full.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::InvalidConfig`] when rate or burst is zero.
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        if config.rate_per_sec == 0 || config.burst == 0 {
            return Err(RateLimitError::InvalidConfig {
                rate_per_sec: config.rate_per_sec,
                burst: config.burst,
            });
        }
        Ok(Self {
            tokens: f64::from(config.burst),
            capacity: f64::from(config.burst),
            refill_per_sec: f64::from(config.rate_per_sec),
            last_refill: Instant::now(),
        })
    }

    /// Take one token if available. Returns `false` — drop the message —
    /// when the bucket is empty.
    pub fn try_acquire(&mut self) -> bool {
        self.refill(Instant::now());
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Whole tokens currently available.
    pub fn available(&mut self) -> u32 {
        self.refill(Instant::now());
        self.tokens as u32
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.last_refill = now;
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.refill_per_sec)
            .min(self.capacity);
    }
}
