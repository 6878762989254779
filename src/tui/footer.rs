use crate::tui::Ui;
use crate::view::RunLogView;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const HINTS: &str = " / search | n/N match | a follow | s stop run | r restart | q quit ";

pub fn render(f: &mut Frame, area: Rect, view: &RunLogView, ui: &Ui) {
    // Priority: error banner > frozen-reflow banner > search bar > hints
    let line = if let Some((message, _)) = &ui.error {
        Line::from(Span::styled(
            format!(" {message} (Esc to dismiss)"),
            Style::default().fg(Color::Red),
        ))
    } else if let Some(banner) = &view.banner {
        Line::from(Span::styled(
            format!(" {banner}"),
            Style::default().fg(Color::Red),
        ))
    } else if ui.search_entry {
        Line::from(vec![
            Span::styled(" /", Style::default().fg(Color::Yellow)),
            Span::raw(ui.pending_query.clone()),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
        ])
    } else if !view.search.query().is_empty() {
        let position = match view.search.cursor_index() {
            Some(i) => format!("{}/{}", i + 1, view.search.match_count()),
            None => format!("{} matches", view.search.match_count()),
        };
        Line::from(vec![
            Span::styled(
                format!(" /{} ", view.search.query()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(position),
            Span::styled(HINTS, Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(Span::styled(HINTS, Style::default().fg(Color::DarkGray)))
    };

    f.render_widget(Paragraph::new(line), area);
}
