// SPDX-License-Identifier: MIT OR Apache-2.0
//! The Help view: static key reference.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

/// Key bindings shown in the help body, one `(keys, action)` pair per row.
const BINDINGS: &[(&str, &str)] = &[
    ("1-4", "switch view (Logs, Metrics, Dashboard, Config)"),
    ("Tab / Shift-Tab", "cycle views"),
    ("h or ?", "this help"),
    ("Esc", "leave help, search, or edit"),
    ("q / Ctrl-C", "quit"),
    ("/", "search within the active view"),
    ("r", "force refresh of the active view"),
    ("↑ ↓ PgUp PgDn Home End", "move the cursor"),
    ("", ""),
    ("Logs: d i w e s", "toggle DEBUG / INFO / WARN / ERROR / SUCCESS"),
    ("Logs: R", "request log history from the application"),
    ("Metrics: n v u", "sort by name / value / last update"),
    ("Dashboard: Enter", "run the selected command widget"),
    ("Config: ← →", "cycle categories"),
    ("Config: Enter", "edit the selected item"),
    ("Config: u", "revert the selected item to its default"),
];

/// Render the key reference.
pub fn render(frame: &mut Frame<'_>, area: Rect) {
    let lines: Vec<Line> = BINDINGS
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(
                    format!("  {keys:<24}"),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(*action),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Help — Esc to close "));
    frame.render_widget(paragraph, area);
}
