// SPDX-License-Identifier: MIT OR Apache-2.0
//! The Metrics view: sortable metric table plus a sparkline of the
//! selected metric's series.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Row, Sparkline, Table, TableState};

use hawk_store::Store;

use crate::view::{Selection, matches_filter};

/// Sort key for the metric table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetricSort {
    /// Alphabetical by name.
    #[default]
    Name,
    /// Descending by latest value.
    Value,
    /// Most recently updated first.
    Updated,
}

impl MetricSort {
    /// Status-bar label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Value => "value",
            Self::Updated => "updated",
        }
    }
}

/// Derived state for the Metrics view.
#[derive(Debug, Default)]
pub struct MetricsView {
    /// Case-insensitive substring filter over metric names.
    pub filter: String,
    /// Active sort key.
    pub sort: MetricSort,
    /// Cursor and scroll state.
    pub selection: Selection,
    index: Vec<String>,
    last_gen: Option<u64>,
    last_filter: String,
    last_sort: MetricSort,
}

impl MetricsView {
    /// Rebuild the sorted, filtered name index when anything changed.
    pub fn refresh(&mut self, store: &Store, force: bool) {
        let generation = store.changes().metrics();
        let dirty = force
            || self.last_gen != Some(generation)
            || self.last_filter != self.filter
            || self.last_sort != self.sort;
        if !dirty {
            return;
        }

        let metrics = store.metrics();
        let mut names: Vec<String> = metrics
            .values()
            .filter(|m| matches_filter(&m.name, &self.filter))
            .map(|m| m.name.clone())
            .collect();
        match self.sort {
            MetricSort::Name => names.sort(),
            MetricSort::Value => {
                names.sort_by(|a, b| {
                    let va = metrics[a].latest;
                    let vb = metrics[b].latest;
                    vb.total_cmp(&va).then_with(|| a.cmp(b))
                });
            }
            MetricSort::Updated => {
                names.sort_by(|a, b| {
                    metrics[b]
                        .updated_at
                        .cmp(&metrics[a].updated_at)
                        .then_with(|| a.cmp(b))
                });
            }
        }
        drop(metrics);

        self.index = names;
        self.last_gen = Some(generation);
        self.last_filter = self.filter.clone();
        self.last_sort = self.sort;
    }

    /// Number of rows passing the current filter.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.index.len()
    }

    /// Name of the metric under the cursor.
    #[must_use]
    pub fn selected_name(&self) -> Option<&str> {
        self.index.get(self.selection.cursor).map(String::as_str)
    }

    /// Render the table and the selected metric's sparkline.
    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect, store: &Store, searching: bool) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(5)])
            .split(area);

        let table_height = chunks[0].height.saturating_sub(3) as usize;
        self.selection.clamp(self.index.len(), table_height);

        let metrics = store.metrics();
        let rows: Vec<Row> = self
            .index
            .iter()
            .filter_map(|name| metrics.get(name))
            .map(|m| {
                Row::new(vec![
                    m.name.clone(),
                    format_value(m.latest),
                    format!("{:?}", m.kind).to_lowercase(),
                    m.unit.clone().unwrap_or_default(),
                    m.updated_at.format("%H:%M:%S").to_string(),
                ])
            })
            .collect();

        let mut title = format!(" Metrics ({}) sort:{} ", self.index.len(), self.sort.label());
        if searching || !self.filter.is_empty() {
            title.push_str(&format!("/{} ", self.filter));
        }

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(40),
                Constraint::Length(14),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(9),
            ],
        )
        .header(
            Row::new(vec!["Name", "Value", "Type", "Unit", "Updated"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default().with_offset(self.selection.offset);
        if !self.index.is_empty() {
            state.select(Some(self.selection.cursor));
        }
        frame.render_stateful_widget(table, chunks[0], &mut state);

        // Sparkline over the selected metric's bounded series.
        let (spark_title, data) = match self.selected_name().and_then(|n| metrics.get(n)) {
            Some(metric) => {
                let values: Vec<f64> = metric.series.iter().map(|p| p.value).collect();
                (format!(" {} ", metric.name), normalize(&values))
            }
            None => (" series ".to_owned(), Vec::new()),
        };
        drop(metrics);

        let sparkline = Sparkline::default()
            .block(Block::default().borders(Borders::ALL).title(spark_title))
            .data(&data);
        frame.render_widget(sparkline, chunks[1]);
    }
}

/// Compact value formatting for the table column.
fn format_value(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.3}")
    }
}

/// Scale a float series into the u64 range the sparkline widget consumes.
fn normalize(values: &[f64]) -> Vec<u64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let span = max - min;
    values
        .iter()
        .map(|v| {
            if span == 0.0 {
                1
            } else {
                (((v - min) / span) * 100.0).round() as u64 + 1
            }
        })
        .collect()
}
