// SPDX-License-Identifier: MIT OR Apache-2.0
//! The Dashboard view: a grid of emitter-declared widgets.

use std::collections::BTreeMap;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, BarChart, Block, Borders, Chart, Dataset, Gauge, GraphType, List, ListItem, Paragraph,
    Row, Table, Wrap,
};

use hawk_protocol::Outbound;
use hawk_protocol::params::WidgetData;
use hawk_store::{Store, Widget};

use crate::render::{gauge_color, status_color};
use crate::view::{Selection, matches_filter};

/// Derived state for the Dashboard view.
#[derive(Debug, Default)]
pub struct DashboardView {
    /// Case-insensitive substring filter over widget ids and titles.
    pub filter: String,
    /// Widget cursor (flat, row-major over the grid).
    pub selection: Selection,
    index: Vec<String>,
    last_gen: Option<u64>,
    last_filter: String,
}

impl DashboardView {
    /// Rebuild the widget ordering when the widget map or filter changed.
    ///
    /// Widgets with layout hints come first ordered by (row, col); the rest
    /// follow in id order.
    pub fn refresh(&mut self, store: &Store, force: bool) {
        let generation = store.changes().widgets();
        let dirty =
            force || self.last_gen != Some(generation) || self.last_filter != self.filter;
        if !dirty {
            return;
        }

        let widgets = store.widgets();
        let mut ids: Vec<&Widget> = widgets
            .values()
            .filter(|w| matches_filter(&format!("{} {}", w.id, w.title), &self.filter))
            .collect();
        ids.sort_by_key(|w| match w.layout {
            Some(hint) => (0u8, hint.row.unwrap_or(u16::MAX), hint.col.unwrap_or(u16::MAX)),
            None => (1u8, u16::MAX, u16::MAX),
        });
        self.index = ids.iter().map(|w| w.id.clone()).collect();
        drop(widgets);

        self.last_gen = Some(generation);
        self.last_filter = self.filter.clone();
    }

    /// Number of widgets on the dashboard.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.index.len()
    }

    /// The `hawk.execute` for the selected widget, when it is a command
    /// widget.
    #[must_use]
    pub fn activate_selected(&self, store: &Store) -> Option<Outbound> {
        let id = self.index.get(self.selection.cursor)?;
        let widgets = store.widgets();
        let widget = widgets.get(id)?;
        let command = widget.action.clone()?;
        let mut args = BTreeMap::new();
        args.insert("widget".to_owned(), widget.id.clone());
        Some(Outbound::Execute { command, args })
    }

    /// Render the widget grid.
    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect, store: &Store) {
        self.selection.clamp(self.index.len(), self.index.len().max(1));

        if self.index.is_empty() {
            let empty = Paragraph::new("no widgets yet — waiting for hawk.dashboard messages")
                .block(Block::default().borders(Borders::ALL).title(" Dashboard "));
            frame.render_widget(empty, area);
            return;
        }

        let columns = grid_columns(self.index.len(), area.width);
        let rows = self.index.len().div_ceil(columns);

        let row_constraints = vec![Constraint::Ratio(1, rows as u32); rows];
        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(row_constraints)
            .split(area);

        let widgets = store.widgets();
        for (row_index, row_area) in row_areas.iter().enumerate() {
            let col_constraints = vec![Constraint::Ratio(1, columns as u32); columns];
            let col_areas = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(col_constraints)
                .split(*row_area);
            for (col_index, cell) in col_areas.iter().enumerate() {
                let flat = row_index * columns + col_index;
                let Some(id) = self.index.get(flat) else { continue };
                let Some(widget) = widgets.get(id) else { continue };
                render_widget_cell(frame, *cell, widget, store, flat == self.selection.cursor);
            }
        }
    }
}

/// Grid column count: ⌈√K⌉ clamped to `[1, 4]` and by terminal width / 20.
#[must_use]
pub fn grid_columns(widget_count: usize, width: u16) -> usize {
    let by_count = (widget_count as f64).sqrt().ceil() as usize;
    let by_width = (width / 20).max(1) as usize;
    by_count.clamp(1, 4).min(by_width).max(1)
}

/// Render one widget into its grid cell.
fn render_widget_cell(
    frame: &mut Frame<'_>,
    area: Rect,
    widget: &Widget,
    store: &Store,
    selected: bool,
) {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", widget.title));
    if selected {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    if widget.action.is_some() {
        block = block.title_bottom(Line::from(" ⏎ run ").right_aligned());
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &widget.data {
        WidgetData::Text { text } => {
            frame.render_widget(Paragraph::new(text.clone()).wrap(Wrap { trim: false }), inner);
        }

        WidgetData::Gauge { value, max, unit } => {
            let ratio = if *max > 0.0 {
                (value / max).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let label = match unit {
                Some(unit) => format!("{value:.1}{unit} / {max:.1}{unit}"),
                None => format!("{value:.1} / {max:.1}"),
            };
            let gauge = Gauge::default()
                .ratio(ratio)
                .label(label)
                .gauge_style(Style::default().fg(gauge_color(ratio)));
            frame.render_widget(gauge, inner);
        }

        WidgetData::StatusGrid { items } => {
            let rows: Vec<ListItem> = items
                .iter()
                .map(|(name, cell)| {
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("{name}: ")),
                        Span::styled(
                            cell.value().to_owned(),
                            Style::default().fg(status_color(cell.status())),
                        ),
                    ]))
                })
                .collect();
            frame.render_widget(List::new(rows), inner);
        }

        WidgetData::Table { columns, rows } => {
            let widths = vec![
                Constraint::Ratio(1, columns.len().max(1) as u32);
                columns.len().max(1)
            ];
            let body: Vec<Row> = rows.iter().map(|r| Row::new(r.clone())).collect();
            let table = Table::new(body, widths).header(
                Row::new(columns.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
            );
            frame.render_widget(table, inner);
        }

        WidgetData::Histogram { buckets } => {
            let data: Vec<(&str, u64)> = buckets
                .iter()
                .map(|b| (b.label.as_str(), b.count.max(0.0) as u64))
                .collect();
            let chart = BarChart::default()
                .data(&data)
                .bar_width(5)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::Blue));
            frame.render_widget(chart, inner);
        }

        // The chart reads the metric's own bounded series; the widget only
        // names it.
        WidgetData::MetricChart { metric } => {
            let metrics = store.metrics();
            let Some(m) = metrics.get(metric) else {
                frame.render_widget(
                    Paragraph::new(format!("metric \"{metric}\" not seen yet")),
                    inner,
                );
                return;
            };
            let points: Vec<(f64, f64)> = m
                .series
                .iter()
                .enumerate()
                .map(|(i, p)| (i as f64, p.value))
                .collect();
            let (min, max) = points
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
                    (lo.min(*v), hi.max(*v))
                });
            let y_bounds = if min.is_finite() && max.is_finite() && min < max {
                [min, max]
            } else {
                [0.0, min.max(1.0)]
            };
            let dataset = Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Blue))
                .data(&points);
            let chart = Chart::new(vec![dataset])
                .x_axis(Axis::default().bounds([0.0, points.len().saturating_sub(1).max(1) as f64]))
                .y_axis(
                    Axis::default().bounds(y_bounds).labels([
                        format!("{:.1}", y_bounds[0]),
                        format!("{:.1}", y_bounds[1]),
                    ]),
                );
            frame.render_widget(chart, inner);
        }
    }
}
