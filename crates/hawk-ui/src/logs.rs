// SPDX-License-Identifier: MIT OR Apache-2.0
//! The Logs view: filtered, severity-masked scrollback over the log ring.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use hawk_protocol::Outbound;
use hawk_store::Store;

use crate::render::severity_color;
use crate::view::{Selection, SeverityMask, matches_filter};

/// Default item cap for an emitted `hawk.request`.
const REQUEST_LIMIT: u64 = 500;

/// Derived state for the Logs view.
#[derive(Debug, Default)]
pub struct LogsView {
    /// Case-insensitive substring filter.
    pub filter: String,
    /// Severity toggle set.
    pub mask: SeverityMask,
    /// Cursor and scroll state.
    pub selection: Selection,
    index: Vec<usize>,
    last_gen: Option<u64>,
    last_filter: String,
    was_at_end: bool,
}

impl LogsView {
    /// Rebuild the filtered index when the ring or the filter changed.
    pub fn refresh(&mut self, store: &Store, force: bool) {
        let generation = store.changes().logs();
        let dirty =
            force || self.last_gen != Some(generation) || self.last_filter != self.filter;
        if !dirty {
            return;
        }

        let follow = self.selection.at_end(self.index.len());
        let logs = store.logs();
        self.index = logs
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                self.mask.shows(record.severity)
                    && matches_filter(&record.search_text(), &self.filter)
            })
            .map(|(i, _)| i)
            .collect();
        drop(logs);

        self.last_gen = Some(generation);
        self.last_filter = self.filter.clone();
        // Auto-follow: stay glued to the tail unless the user scrolled up.
        if follow || self.was_at_end {
            self.selection.end(self.index.len());
        }
        self.was_at_end = self.selection.at_end(self.index.len());
    }

    /// Note a cursor move (breaks or restores auto-follow).
    pub fn after_cursor_move(&mut self) {
        self.was_at_end = self.selection.at_end(self.index.len());
    }

    /// Number of rows passing the current filters.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.index.len()
    }

    /// The `hawk.request` asking the emitter to re-send log history for the
    /// current filter.
    #[must_use]
    pub fn request_message(&self) -> Outbound {
        Outbound::Request {
            kind: "logs".to_owned(),
            filter: (!self.filter.is_empty()).then(|| self.filter.clone()),
            timerange: None,
            limit: Some(REQUEST_LIMIT),
        }
    }

    /// Render the log list into `area`.
    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect, store: &Store, searching: bool) {
        let height = area.height.saturating_sub(2) as usize;
        self.selection.clamp(self.index.len(), height);

        let logs = store.logs();
        let items: Vec<ListItem> = self
            .index
            .iter()
            .filter_map(|&i| logs.get(i))
            .map(|record| {
                let mut spans = vec![
                    Span::styled(
                        record.timestamp.format("%H:%M:%S ").to_string(),
                        Style::default().add_modifier(Modifier::DIM),
                    ),
                    Span::styled(
                        format!("{:7}", record.severity.as_str()),
                        Style::default().fg(severity_color(record.severity)),
                    ),
                ];
                if let Some(component) = &record.component {
                    spans.push(Span::styled(
                        format!("[{component}] "),
                        Style::default().add_modifier(Modifier::DIM),
                    ));
                }
                spans.push(Span::raw(record.message.clone()));
                ListItem::new(Line::from(spans))
            })
            .collect();
        drop(logs);

        let title = self.title(searching);
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default().with_offset(self.selection.offset);
        if !self.index.is_empty() {
            state.select(Some(self.selection.cursor));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn title(&self, searching: bool) -> String {
        let mut title = format!(" Logs ({}) ", self.index.len());
        if searching || !self.filter.is_empty() {
            title.push_str(&format!("/{}", self.filter));
            if searching {
                title.push('_');
            }
            title.push(' ');
        }
        if !self.mask.is_full() {
            title.push_str(&format!("[{}] ", self.mask.summary()));
        }
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use hawk_protocol::params::Severity;
    use hawk_store::LogRecord;
    use std::collections::BTreeMap;

    fn record(message: &str, severity: Severity) -> LogRecord {
        LogRecord {
            message: message.to_owned(),
            severity,
            timestamp: DateTime::from_timestamp(0, 0).unwrap(),
            component: None,
            tags: Vec::new(),
            context: BTreeMap::new(),
        }
    }

    #[test]
    fn refresh_applies_substring_and_mask() {
        let store = Store::new();
        store.append_log(record("connection lost", Severity::Error));
        store.append_log(record("connection ok", Severity::Info));
        store.append_log(record("heartbeat", Severity::Debug));

        let mut view = LogsView::default();
        view.filter = "connection".to_owned();
        view.refresh(&store, false);
        assert_eq!(view.visible_len(), 2);

        view.mask.toggle(Severity::Info);
        view.refresh(&store, true);
        assert_eq!(view.visible_len(), 1);
    }

    #[test]
    fn refresh_is_lazy_until_generation_moves() {
        let store = Store::new();
        store.append_log(record("one", Severity::Info));

        let mut view = LogsView::default();
        view.refresh(&store, false);
        assert_eq!(view.visible_len(), 1);

        // Nothing changed: the rebuild is skipped and the index stays.
        view.refresh(&store, false);
        assert_eq!(view.visible_len(), 1);

        store.append_log(record("two", Severity::Info));
        view.refresh(&store, false);
        assert_eq!(view.visible_len(), 2);
    }

    #[test]
    fn follow_keeps_cursor_on_tail() {
        let store = Store::new();
        let mut view = LogsView::default();
        for i in 0..5 {
            store.append_log(record(&format!("m{i}"), Severity::Info));
            view.refresh(&store, false);
        }
        assert_eq!(view.selection.cursor, 4);
    }

    #[test]
    fn request_carries_active_filter() {
        let mut view = LogsView::default();
        view.filter = "error".to_owned();
        let Outbound::Request { kind, filter, limit, .. } = view.request_message() else {
            panic!("expected request");
        };
        assert_eq!(kind, "logs");
        assert_eq!(filter.as_deref(), Some("error"));
        assert_eq!(limit, Some(REQUEST_LIMIT));
    }
}
