// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! hawk-ui
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dashboard;
pub mod fps;
pub mod help;
pub mod input;
pub mod logs;
pub mod metrics;
pub mod render;
pub mod view;

use std::time::{Duration, Instant};

use chrono::Utc;

use hawk_store::Store;

pub use config::{ConfigView, EditState};
pub use dashboard::DashboardView;
pub use fps::FrameMeter;
pub use input::UiAction;
pub use logs::LogsView;
pub use metrics::{MetricSort, MetricsView};
pub use view::{Mode, Selection, SeverityMask};

/// How long the status bar flashes after the drop counter advances.
const DROP_FLASH_WINDOW: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// DropFlash
// ---------------------------------------------------------------------------

/// Status-bar indicator that lights up when the drop total advances and
/// fades after [`DROP_FLASH_WINDOW`].
#[derive(Debug, Default)]
struct DropFlash {
    last_total: u64,
    lit_until: Option<Instant>,
}

impl DropFlash {
    fn observe(&mut self, total: u64, now: Instant) {
        if total > self.last_total {
            self.last_total = total;
            self.lit_until = Some(now + DROP_FLASH_WINDOW);
        }
    }

    fn active(&self) -> bool {
        self.lit_until.is_some_and(|until| Instant::now() < until)
    }
}

// ---------------------------------------------------------------------------
// Ui
// ---------------------------------------------------------------------------

/// All renderer-side view state: the active mode, one model per view, the
/// frame meter, and the search sub-mode flag.
///
/// The controller drives it with [`Ui::on_tick`] (bookkeeping),
/// [`Ui::draw`] (one frame), and [`Ui::handle_key`] (input dispatch).
#[derive(Debug)]
pub struct Ui {
    /// Active view.
    pub mode: Mode,
    /// View to return to when Help closes.
    pub previous_mode: Mode,
    /// Whether the search sub-mode captures text input.
    pub searching: bool,
    /// Logs view model.
    pub logs: LogsView,
    /// Metrics view model.
    pub metrics: MetricsView,
    /// Dashboard view model.
    pub dashboard: DashboardView,
    /// Config view model.
    pub config: ConfigView,
    /// Frame-rate meter.
    pub meter: FrameMeter,
    /// Application name shown in the header.
    pub app_name: String,
    force_refresh: bool,
    drop_flash: DropFlash,
}

impl Ui {
    /// Create the UI in the Logs view.
    #[must_use]
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            mode: Mode::default(),
            previous_mode: Mode::default(),
            searching: false,
            logs: LogsView::default(),
            metrics: MetricsView::default(),
            dashboard: DashboardView::default(),
            config: ConfigView::default(),
            meter: FrameMeter::new(),
            app_name: app_name.into(),
            force_refresh: false,
            drop_flash: DropFlash::default(),
        }
    }

    /// Per-tick bookkeeping: advance the frame meter, run the
    /// renderer-originated progress purge, and update the drop flash.
    pub fn on_tick(&mut self, store: &Store) {
        let now = Instant::now();
        self.meter.tick(now);
        store.purge_expired_progress(Utc::now());
        self.drop_flash.observe(store.stats().dropped_total(), now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_flash_lights_on_advance() {
        let mut flash = DropFlash::default();
        let now = Instant::now();
        flash.observe(0, now);
        assert!(!flash.active());
        flash.observe(3, now);
        assert!(flash.active());
    }

    #[test]
    fn ui_starts_in_logs_view() {
        let ui = Ui::new("demo");
        assert_eq!(ui.mode, Mode::Logs);
        assert!(!ui.searching);
    }
}
