// SPDX-License-Identifier: MIT OR Apache-2.0
//! The Config view: category-grouped configuration editor with an inline
//! edit sub-mode.
//!
//! Committing an edit applies locally (optimistic) and emits a
//! `hawk.config_update`; the item is labeled `M` until the emitter echoes
//! the committed value back.

use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};

use hawk_protocol::Outbound;
use hawk_protocol::params::ConfigValue;
use hawk_store::Store;

use crate::view::{Selection, matches_filter};

/// In-progress edit of one item.
#[derive(Debug, Clone)]
pub struct EditState {
    /// Key being edited.
    pub key: String,
    /// Text buffer.
    pub buffer: String,
    /// Rejection reason from the last commit attempt.
    pub error: Option<String>,
}

/// Derived state for the Config view.
#[derive(Debug, Default)]
pub struct ConfigView {
    /// Case-insensitive substring filter over keys and descriptions.
    pub filter: String,
    /// Selected category; `None` shows every category.
    pub category: Option<String>,
    /// Cursor and scroll state.
    pub selection: Selection,
    /// Active edit sub-mode, if any.
    pub edit: Option<EditState>,
    index: Vec<String>,
    categories: Vec<String>,
    last_gen: Option<u64>,
    last_filter: String,
    last_category: Option<String>,
}

impl ConfigView {
    /// Rebuild the key index and category list when anything changed.
    pub fn refresh(&mut self, store: &Store, force: bool) {
        let generation = store.changes().configs();
        let dirty = force
            || self.last_gen != Some(generation)
            || self.last_filter != self.filter
            || self.last_category != self.category;
        if !dirty {
            return;
        }

        let configs = store.configs();
        let mut categories: Vec<String> = configs.values().map(|i| i.category.clone()).collect();
        categories.sort();
        categories.dedup();

        // A category that disappeared falls back to "all".
        if let Some(active) = &self.category
            && !categories.contains(active)
        {
            self.category = None;
        }

        self.index = configs
            .values()
            .filter(|item| {
                self.category.as_ref().is_none_or(|c| &item.category == c)
                    && matches_filter(
                        &format!(
                            "{} {} {}",
                            item.key,
                            item.description.as_deref().unwrap_or_default(),
                            item.value.display()
                        ),
                        &self.filter,
                    )
            })
            .map(|item| item.key.clone())
            .collect();
        drop(configs);

        self.categories = categories;
        self.last_gen = Some(generation);
        self.last_filter = self.filter.clone();
        self.last_category = self.category.clone();
    }

    /// Number of rows passing the current filters.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.index.len()
    }

    /// Key under the cursor.
    #[must_use]
    pub fn selected_key(&self) -> Option<&str> {
        self.index.get(self.selection.cursor).map(String::as_str)
    }

    /// Cycle the category selection: all → first → … → last → all.
    pub fn cycle_category(&mut self, forward: bool) {
        if self.categories.is_empty() {
            self.category = None;
            return;
        }
        let position = self
            .category
            .as_ref()
            .and_then(|c| self.categories.iter().position(|x| x == c));
        let count = self.categories.len();
        let next = match (position, forward) {
            (None, true) => Some(0),
            (Some(i), true) if i + 1 < count => Some(i + 1),
            (Some(_), true) => None,
            (None, false) => Some(count - 1),
            (Some(0), false) => None,
            (Some(i), false) => Some(i - 1),
        };
        self.category = next.map(|i| self.categories[i].clone());
        self.selection = Selection::default();
    }

    /// Enter the edit sub-mode on the selected item.
    pub fn begin_edit(&mut self, store: &Store) {
        let Some(key) = self.selected_key() else { return };
        let configs = store.configs();
        let Some(item) = configs.get(key) else { return };
        self.edit = Some(EditState {
            key: item.key.clone(),
            buffer: item.value.display(),
            error: None,
        });
    }

    /// Commit the edit buffer.
    ///
    /// Parses the buffer in the item's declared kind, applies the value
    /// locally, and returns the `hawk.config_update` to emit. A value equal
    /// to the stored one closes the sub-mode without emitting; a rejected
    /// value keeps the sub-mode open with an inline error.
    pub fn commit_edit(&mut self, store: &Store) -> Option<Outbound> {
        let edit = self.edit.as_mut()?;

        let (kind, current) = {
            let configs = store.configs();
            let item = configs.get(&edit.key)?;
            (item.kind, item.value.clone())
        };

        let value = match ConfigValue::parse_for_kind(&edit.buffer, kind) {
            Ok(value) => value,
            Err(reason) => {
                edit.error = Some(reason);
                return None;
            }
        };

        if value == current {
            self.edit = None;
            return None;
        }

        match store.commit_config_edit(&edit.key, value, Utc::now()) {
            Ok(committed) => {
                let key = edit.key.clone();
                self.edit = None;
                Some(Outbound::ConfigUpdate {
                    key,
                    value: committed,
                })
            }
            Err(reason) => {
                edit.error = Some(reason);
                None
            }
        }
    }

    /// Revert the selected item to its declared default.
    pub fn reset_selected(&mut self, store: &Store) -> Option<Outbound> {
        let key = self.selected_key()?.to_owned();
        let unchanged = {
            let configs = store.configs();
            let item = configs.get(&key)?;
            item.default.as_ref() == Some(&item.value)
        };
        if unchanged {
            return None;
        }
        match store.reset_config(&key, Utc::now()) {
            Ok(value) => Some(Outbound::ConfigUpdate { key, value }),
            Err(reason) => {
                tracing::debug!(key, reason, "config reset skipped");
                None
            }
        }
    }

    /// Render the config table and, when editing, the edit panel.
    pub fn render(&mut self, frame: &mut Frame<'_>, area: Rect, store: &Store, searching: bool) {
        let editing = self.edit.is_some();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(if editing {
                vec![Constraint::Min(4), Constraint::Length(4)]
            } else {
                vec![Constraint::Min(4)]
            })
            .split(area);

        let table_height = chunks[0].height.saturating_sub(3) as usize;
        self.selection.clamp(self.index.len(), table_height);

        let configs = store.configs();
        let rows: Vec<Row> = self
            .index
            .iter()
            .filter_map(|key| configs.get(key))
            .map(|item| {
                let marker = if item.sync.is_marked() { "M" } else { " " };
                let restart = if item.restart_required { "↺" } else { " " };
                Row::new(vec![
                    marker.to_owned(),
                    item.key.clone(),
                    item.value.display(),
                    item.kind.as_str().to_owned(),
                    item.category.clone(),
                    restart.to_owned(),
                ])
            })
            .collect();
        drop(configs);

        let category = self.category.as_deref().unwrap_or("all");
        let mut title = format!(" Config ({}) category:{category} ", self.index.len());
        if searching || !self.filter.is_empty() {
            title.push_str(&format!("/{} ", self.filter));
        }

        let table = Table::new(
            rows,
            [
                Constraint::Length(1),
                Constraint::Percentage(35),
                Constraint::Percentage(25),
                Constraint::Length(8),
                Constraint::Percentage(20),
                Constraint::Length(2),
            ],
        )
        .header(
            Row::new(vec!["", "Key", "Value", "Type", "Category", ""])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default().with_offset(self.selection.offset);
        if !self.index.is_empty() {
            state.select(Some(self.selection.cursor));
        }
        frame.render_stateful_widget(table, chunks[0], &mut state);

        if let Some(edit) = &self.edit {
            render_edit_panel(frame, chunks[1], store, edit);
        }
    }
}

/// The bottom panel shown while the edit sub-mode is active.
fn render_edit_panel(frame: &mut Frame<'_>, area: Rect, store: &Store, edit: &EditState) {
    let configs = store.configs();
    let hint = configs.get(&edit.key).map_or_else(String::new, |item| {
        let mut hint = item.kind.as_str().to_owned();
        if let (Some(min), Some(max)) = (item.min, item.max) {
            hint.push_str(&format!(", {min}..{max}"));
        } else if let Some(min) = item.min {
            hint.push_str(&format!(", ≥{min}"));
        } else if let Some(max) = item.max {
            hint.push_str(&format!(", ≤{max}"));
        }
        if let Some(options) = &item.options {
            hint.push_str(&format!(", one of: {}", options.join(" | ")));
        }
        hint
    });
    drop(configs);

    let status = match &edit.error {
        Some(error) => Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "Enter commit · Esc cancel",
            Style::default().add_modifier(Modifier::DIM),
        )),
    };

    let body = vec![
        Line::from(vec![
            Span::raw(format!("{} ({hint}): ", edit.key)),
            Span::styled(
                format!("{}▏", edit.buffer),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        status,
    ];
    let panel = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title(" edit "));
    frame.render_widget(panel, area);
}
