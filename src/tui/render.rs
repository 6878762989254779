use crate::tui::{footer, header, log_pane, Ui};
use crate::view::RunLogView;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

pub fn render(f: &mut Frame, view: &RunLogView, ui: &Ui) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    header::render(f, rows[0], view, ui);
    log_pane::render(f, rows[1], view);
    footer::render(f, rows[2], view, ui);
}

/// Reflow width for a given terminal width: inside the log pane borders.
pub fn reflow_width(terminal_width: u16) -> usize {
    usize::from(terminal_width.saturating_sub(2)).max(1)
}
