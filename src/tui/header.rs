use crate::run::RunStatus;
use crate::scheduler::PollPhase;
use crate::tui::Ui;
use crate::view::RunLogView;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

fn status_color(status: RunStatus) -> Color {
    match status {
        RunStatus::Success => Color::Green,
        RunStatus::Failed => Color::Red,
        RunStatus::Stopped => Color::Magenta,
        RunStatus::Running => Color::Yellow,
        RunStatus::Pending | RunStatus::Queued | RunStatus::NeedsRetry => Color::Cyan,
        RunStatus::Unknown => Color::DarkGray,
    }
}

pub fn render(f: &mut Frame, area: Rect, view: &RunLogView, ui: &Ui) {
    let mut spans = vec![Span::styled(
        format!(" run {} ", view.run_id),
        Style::default().add_modifier(Modifier::BOLD),
    )];

    if let Some(snap) = &view.snapshot {
        spans.push(Span::styled(
            snap.status.as_str(),
            Style::default().fg(status_color(snap.status)),
        ));
        if let Some(code) = snap.exit_code {
            spans.push(Span::raw(format!("  exit {code}")));
        }
        if let Some(finished) = snap.finished_at {
            spans.push(Span::raw(format!("  finished {}", finished.format("%H:%M:%S"))));
        }
    } else {
        spans.push(Span::styled("loading", Style::default().fg(Color::DarkGray)));
    }

    let phase = match ui.phase {
        PollPhase::Idle => "poll: idle",
        PollPhase::Active => "poll: active",
        PollPhase::Stopped => "poll: done",
    };
    spans.push(Span::styled(
        format!("  [{phase}]"),
        Style::default().fg(Color::DarkGray),
    ));
    if view.autoscroll {
        spans.push(Span::styled("  [follow]", Style::default().fg(Color::DarkGray)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
