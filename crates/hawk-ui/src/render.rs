// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame composition: fixed header, view-swapped body, status footer, and
//! the built-in palette.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Tabs};

use hawk_protocol::params::{ProgressStatus, Severity};
use hawk_store::{ProgressItem, Store};

use crate::view::Mode;
use crate::{Ui, help};

/// Header height in rows (border, tab line, border).
const HEADER_ROWS: u16 = 3;

/// Maximum progress rows in the footer; excess collapses into `+K more`.
const MAX_PROGRESS_ROWS: usize = 4;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Severity → color, fixed single palette.
#[must_use]
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Debug => Color::DarkGray,
        Severity::Info => Color::Blue,
        Severity::Warn => Color::Yellow,
        Severity::Error => Color::Red,
        Severity::Success => Color::Green,
    }
}

/// Gauge fill color by fill ratio.
#[must_use]
pub fn gauge_color(ratio: f64) -> Color {
    if ratio >= 0.8 {
        Color::Red
    } else if ratio >= 0.6 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Status-grid cell color by declared status class.
#[must_use]
pub fn status_color(status: Option<&str>) -> Color {
    match status.map(str::to_ascii_lowercase).as_deref() {
        Some("ok" | "success" | "healthy" | "up") => Color::Green,
        Some("warn" | "warning" | "degraded") => Color::Yellow,
        Some("error" | "critical" | "down" | "failed") => Color::Red,
        _ => Color::Reset,
    }
}

fn progress_status_color(status: ProgressStatus) -> Color {
    match status {
        ProgressStatus::Pending => Color::DarkGray,
        ProgressStatus::InProgress => Color::Blue,
        ProgressStatus::Completed => Color::Green,
        ProgressStatus::Error => Color::Red,
    }
}

// ---------------------------------------------------------------------------
// Frame composition
// ---------------------------------------------------------------------------

impl Ui {
    /// Compose and draw one frame.
    pub fn draw(&mut self, frame: &mut Frame<'_>, store: &Store) {
        let progress = store.visible_progress();
        let progress_rows = progress.len().min(MAX_PROGRESS_ROWS);
        let footer_height = 1 + progress_rows as u16;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_ROWS),
                Constraint::Min(0),
                Constraint::Length(footer_height),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0], store);
        self.draw_body(frame, chunks[1], store);
        self.draw_footer(frame, chunks[2], store, &progress);
    }

    fn draw_header(&self, frame: &mut Frame<'_>, area: Rect, store: &Store) {
        let state = if store.stats().is_detached() {
            Span::styled(
                " DETACHED ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(" LIVE ", Style::default().fg(Color::Green))
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.app_name))
            .title_top(Line::from(state).right_aligned());

        let titles: Vec<Line> = Mode::TABS
            .iter()
            .enumerate()
            .map(|(i, mode)| Line::from(format!(" {} {} ", i + 1, mode.title())))
            .collect();
        let selected = Mode::TABS.iter().position(|m| *m == self.mode);

        let tabs = Tabs::new(titles)
            .block(block)
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_body(&mut self, frame: &mut Frame<'_>, area: Rect, store: &Store) {
        let force = std::mem::take(&mut self.force_refresh);
        // Only the active view recomputes its derived index.
        match self.mode {
            Mode::Logs => {
                self.logs.refresh(store, force);
                self.logs.render(frame, area, store, self.searching);
            }
            Mode::Metrics => {
                self.metrics.refresh(store, force);
                self.metrics.render(frame, area, store, self.searching);
            }
            Mode::Dashboard => {
                self.dashboard.refresh(store, force);
                self.dashboard.render(frame, area, store);
            }
            Mode::Config => {
                self.config.refresh(store, force);
                self.config.render(frame, area, store, self.searching);
            }
            Mode::Help => help::render(frame, area),
        }
    }

    fn draw_footer(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        store: &Store,
        progress: &[ProgressItem],
    ) {
        let mut constraints = vec![Constraint::Length(1)];
        let shown = progress.len().min(MAX_PROGRESS_ROWS);
        constraints.extend(std::iter::repeat_n(Constraint::Length(1), shown));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        frame.render_widget(self.status_line(store), rows[0]);

        let collapse = progress.len() > MAX_PROGRESS_ROWS;
        for (i, slot) in rows.iter().skip(1).enumerate() {
            if collapse && i == shown - 1 {
                let extra = progress.len() - (shown - 1);
                frame.render_widget(
                    Paragraph::new(format!("  +{extra} more"))
                        .style(Style::default().add_modifier(Modifier::DIM)),
                    *slot,
                );
                break;
            }
            let item = &progress[i];
            let unit = item.unit.as_deref().unwrap_or_default();
            let label = format!(
                "{} {:.0}/{:.0}{unit}",
                item.label, item.current, item.total
            );
            let gauge = Gauge::default()
                .ratio(item.fraction())
                .label(label)
                .gauge_style(Style::default().fg(progress_status_color(item.status)));
            frame.render_widget(gauge, *slot);
        }
    }

    fn status_line(&self, store: &Store) -> Paragraph<'static> {
        let stats = store.stats();
        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.mode.title()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "· rx {} · drop {} ",
                stats.received_total(),
                stats.dropped_total()
            )),
        ];
        if self.drop_flash.active() {
            spans.push(Span::styled(
                "▼DROPS ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        spans.push(Span::raw(format!("· {:.0} fps ", self.meter.fps())));
        spans.push(Span::styled(
            "· q quit · h help",
            Style::default().add_modifier(Modifier::DIM),
        ));
        Paragraph::new(Line::from(spans))
    }
}
