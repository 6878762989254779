use crate::view::RunLogView;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Splits one display line into spans, highlighting query occurrences.
/// Offsets are in characters; overlapping matches collapse to the first
/// one that starts past the previous highlight (a rendering concern only,
/// the index itself records every occurrence).
fn styled_line(text: &str, starts: &[usize], current: Option<usize>, query_len: usize) -> Line<'static> {
    if starts.is_empty() || query_len == 0 {
        return Line::from(Span::raw(text.to_string()));
    }
    let chars: Vec<char> = text.chars().collect();
    let mut spans = Vec::new();
    let mut pos = 0;
    for &start in starts {
        if start < pos || start >= chars.len() {
            continue;
        }
        let end = (start + query_len).min(chars.len());
        if start > pos {
            spans.push(Span::raw(chars[pos..start].iter().collect::<String>()));
        }
        let style = if current == Some(start) {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED)
        };
        spans.push(Span::styled(chars[start..end].iter().collect::<String>(), style));
        pos = end;
    }
    if pos < chars.len() {
        spans.push(Span::raw(chars[pos..].iter().collect::<String>()));
    }
    Line::from(spans)
}

pub fn render(f: &mut Frame, area: Rect, view: &RunLogView) {
    let inner_height = area.height.saturating_sub(2) as usize;
    let start = view.viewport_start(inner_height);
    let total = view.buffer.len();

    let scroll_info = if total > inner_height {
        format!(" [{}-{}/{}] ", start + 1, (start + inner_height).min(total), total)
    } else {
        String::new()
    };
    let block = Block::default()
        .title(format!(" log {scroll_info}"))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let query_len = view.search.query().chars().count();
    let current = view.search.current().copied();

    let visible: Vec<Line> = view
        .buffer
        .iter()
        .enumerate()
        .skip(start)
        .take(inner_height)
        .map(|(i, line)| {
            let starts: Vec<usize> = view
                .search
                .matches()
                .iter()
                .filter(|m| m.line == i)
                .map(|m| m.offset)
                .collect();
            let current_here = current.filter(|m| m.line == i).map(|m| m.offset);
            styled_line(&line.text, &starts, current_here, query_len)
        })
        .collect();

    f.render_widget(Paragraph::new(visible).block(block), area);
}
