// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keystroke dispatch.
//!
//! Keys consult the top-level map first (view switching, help, quit,
//! search, refresh); anything unclaimed is forwarded to the active view.
//! The search and config-edit sub-modes capture text input before either
//! map runs.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use hawk_protocol::Outbound;
use hawk_protocol::params::Severity;
use hawk_store::Store;

use crate::metrics::MetricSort;
use crate::view::Mode;
use crate::Ui;

/// What the controller should do with a handled keystroke.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Nothing beyond local state changes.
    None,
    /// Soft-shutdown the process.
    Quit,
    /// Put a message on the outbound pipe.
    Emit(Outbound),
}

impl Ui {
    /// Dispatch one key press.
    pub fn handle_key(&mut self, key: KeyEvent, store: &Store) -> UiAction {
        // Ctrl-C quits from anywhere, sub-modes included.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return UiAction::Quit;
        }

        if self.config.edit.is_some() && self.mode == Mode::Config {
            return self.handle_edit_key(key, store);
        }
        if self.searching {
            return self.handle_search_key(key);
        }

        // Top-level map.
        match key.code {
            KeyCode::Char('1') => return self.switch(Mode::Logs),
            KeyCode::Char('2') => return self.switch(Mode::Metrics),
            KeyCode::Char('3') => return self.switch(Mode::Dashboard),
            KeyCode::Char('4') => return self.switch(Mode::Config),
            KeyCode::Char('h') | KeyCode::Char('?') => {
                if self.mode != Mode::Help {
                    self.previous_mode = self.mode;
                    self.mode = Mode::Help;
                }
                return UiAction::None;
            }
            KeyCode::Char('q') => return UiAction::Quit,
            KeyCode::Esc => {
                if self.mode == Mode::Help {
                    self.mode = self.previous_mode;
                } else {
                    self.active_filter_mut().clear();
                    self.force_refresh = true;
                }
                return UiAction::None;
            }
            KeyCode::Char('/') if self.mode != Mode::Help => {
                self.searching = true;
                return UiAction::None;
            }
            KeyCode::Tab => return self.switch(self.mode.next()),
            KeyCode::BackTab => return self.switch(self.mode.prev()),
            KeyCode::Char('r') => {
                self.force_refresh = true;
                return UiAction::None;
            }
            _ => {}
        }

        // Forward to the active view.
        match self.mode {
            Mode::Logs => self.handle_logs_key(key),
            Mode::Metrics => self.handle_metrics_key(key),
            Mode::Dashboard => self.handle_dashboard_key(key, store),
            Mode::Config => self.handle_config_key(key, store),
            Mode::Help => UiAction::None,
        }
    }

    fn switch(&mut self, mode: Mode) -> UiAction {
        self.mode = mode;
        UiAction::None
    }

    fn active_filter_mut(&mut self) -> &mut String {
        match self.mode {
            Mode::Metrics => &mut self.metrics.filter,
            Mode::Config => &mut self.config.filter,
            Mode::Dashboard => &mut self.dashboard.filter,
            _ => &mut self.logs.filter,
        }
    }

    // -- sub-modes ---------------------------------------------------------

    fn handle_search_key(&mut self, key: KeyEvent) -> UiAction {
        match key.code {
            KeyCode::Esc => {
                self.active_filter_mut().clear();
                self.searching = false;
                self.force_refresh = true;
            }
            KeyCode::Enter => self.searching = false,
            KeyCode::Backspace => {
                self.active_filter_mut().pop();
            }
            KeyCode::Char(c) => self.active_filter_mut().push(c),
            _ => {}
        }
        UiAction::None
    }

    fn handle_edit_key(&mut self, key: KeyEvent, store: &Store) -> UiAction {
        match key.code {
            KeyCode::Esc => {
                self.config.edit = None;
                UiAction::None
            }
            KeyCode::Enter => match self.config.commit_edit(store) {
                Some(message) => UiAction::Emit(message),
                None => UiAction::None,
            },
            KeyCode::Backspace => {
                if let Some(edit) = &mut self.config.edit {
                    edit.buffer.pop();
                    edit.error = None;
                }
                UiAction::None
            }
            KeyCode::Char(c) => {
                if let Some(edit) = &mut self.config.edit {
                    edit.buffer.push(c);
                    edit.error = None;
                }
                UiAction::None
            }
            _ => UiAction::None,
        }
    }

    // -- per-view keys -----------------------------------------------------

    fn handle_logs_key(&mut self, key: KeyEvent) -> UiAction {
        let len = self.logs.visible_len();
        match key.code {
            KeyCode::Up => self.logs.selection.step(-1, len),
            KeyCode::Down => self.logs.selection.step(1, len),
            KeyCode::PageUp => self.logs.selection.step(-10, len),
            KeyCode::PageDown => self.logs.selection.step(10, len),
            KeyCode::Home => self.logs.selection.home(),
            KeyCode::End => self.logs.selection.end(len),
            KeyCode::Char('d') => self.toggle_severity(Severity::Debug),
            KeyCode::Char('i') => self.toggle_severity(Severity::Info),
            KeyCode::Char('w') => self.toggle_severity(Severity::Warn),
            KeyCode::Char('e') => self.toggle_severity(Severity::Error),
            KeyCode::Char('s') => self.toggle_severity(Severity::Success),
            KeyCode::Char('R') => return UiAction::Emit(self.logs.request_message()),
            _ => return UiAction::None,
        }
        self.logs.after_cursor_move();
        UiAction::None
    }

    fn toggle_severity(&mut self, severity: Severity) {
        self.logs.mask.toggle(severity);
        self.force_refresh = true;
    }

    fn handle_metrics_key(&mut self, key: KeyEvent) -> UiAction {
        let len = self.metrics.visible_len();
        match key.code {
            KeyCode::Up => self.metrics.selection.step(-1, len),
            KeyCode::Down => self.metrics.selection.step(1, len),
            KeyCode::PageUp => self.metrics.selection.step(-10, len),
            KeyCode::PageDown => self.metrics.selection.step(10, len),
            KeyCode::Home => self.metrics.selection.home(),
            KeyCode::End => self.metrics.selection.end(len),
            KeyCode::Char('n') => self.metrics.sort = MetricSort::Name,
            KeyCode::Char('v') => self.metrics.sort = MetricSort::Value,
            KeyCode::Char('u') => self.metrics.sort = MetricSort::Updated,
            _ => {}
        }
        UiAction::None
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, store: &Store) -> UiAction {
        let len = self.dashboard.visible_len();
        match key.code {
            KeyCode::Up | KeyCode::Left => self.dashboard.selection.step(-1, len),
            KeyCode::Down | KeyCode::Right => self.dashboard.selection.step(1, len),
            KeyCode::Enter => {
                if let Some(message) = self.dashboard.activate_selected(store) {
                    return UiAction::Emit(message);
                }
            }
            _ => {}
        }
        UiAction::None
    }

    fn handle_config_key(&mut self, key: KeyEvent, store: &Store) -> UiAction {
        let len = self.config.visible_len();
        match key.code {
            KeyCode::Up => self.config.selection.step(-1, len),
            KeyCode::Down => self.config.selection.step(1, len),
            KeyCode::PageUp => self.config.selection.step(-10, len),
            KeyCode::PageDown => self.config.selection.step(10, len),
            KeyCode::Home => self.config.selection.home(),
            KeyCode::End => self.config.selection.end(len),
            KeyCode::Left => self.config.cycle_category(false),
            KeyCode::Right => self.config.cycle_category(true),
            KeyCode::Enter => self.config.begin_edit(store),
            KeyCode::Char('u') => {
                if let Some(message) = self.config.reset_selected(store) {
                    return UiAction::Emit(message);
                }
            }
            _ => {}
        }
        UiAction::None
    }
}
