// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame-rate meter for the status bar.

use std::time::Instant;

/// Smoothing factor: each tick contributes 10% of the new instantaneous
/// rate.
const EMA_ALPHA: f64 = 0.1;

/// Exponential moving average of ticks per second.
#[derive(Debug, Default)]
pub struct FrameMeter {
    ema: f64,
    last_tick: Option<Instant>,
}

impl FrameMeter {
    /// Create an idle meter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick at `now`.
    pub fn tick(&mut self, now: Instant) {
        if let Some(last) = self.last_tick {
            let dt = now.duration_since(last).as_secs_f64();
            if dt > 0.0 {
                let instant_rate = 1.0 / dt;
                self.ema = if self.ema == 0.0 {
                    instant_rate
                } else {
                    EMA_ALPHA * instant_rate + (1.0 - EMA_ALPHA) * self.ema
                };
            }
        }
        self.last_tick = Some(now);
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.ema
    }
}
