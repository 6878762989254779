use runlog::cli;
use runlog::client;
use runlog::cursor;
use runlog::events;
use runlog::input;
use runlog::reflow;
use runlog::run;
use runlog::scheduler;
use runlog::tui;
use runlog::view;

use clap::Parser;
use cli::Cli;
use client::{HttpBackend, RunBackend};
use color_eyre::eyre::Result;
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use cursor::LogCursorStore;
use events::{AppEvent, EventHandler};
use input::Action;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use reflow::ReflowWorker;
use scheduler::PollScheduler;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tui::Ui;
use view::RunLogView;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    // Stdout belongs to the TUI; tracing goes to a file when requested.
    if let Ok(path) = std::env::var("RUNLOG_LOG") {
        let file = std::fs::File::create(path)?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .init();
    }

    // Setup terminal with panic hook
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let events = EventHandler::new(Duration::from_millis(100));
    let tx = events.sender();

    let rest: Arc<dyn RunBackend> = Arc::new(HttpBackend::new(&args.server));
    let store = Arc::new(Mutex::new(LogCursorStore::new()));
    let worker = ReflowWorker::spawn(tx.clone());

    let width = match args.width {
        Some(w) => w,
        None => terminal
            .size()
            .map(|s| tui::render::reflow_width(s.width))
            .unwrap_or(run::DEFAULT_MAX_LEN),
    };
    let mut view = RunLogView::new(args.run, store.clone(), worker, width);
    view.autoscroll = !args.no_follow;

    let scheduler = PollScheduler::new(rest.clone(), args.run, store, tx.clone());
    scheduler.start(Duration::from_millis(args.interval.max(1)));

    let result = run_app(
        &mut terminal,
        &mut view,
        events,
        &scheduler,
        &rest,
        &args,
    )
    .await;

    scheduler.stop();

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    view: &mut RunLogView,
    mut events: EventHandler,
    scheduler: &PollScheduler,
    rest: &Arc<dyn RunBackend>,
    args: &Cli,
) -> Result<()> {
    let mut ui = Ui::new();
    let tx = events.sender();

    loop {
        terminal.draw(|f| tui::render::render(f, view, &ui))?;
        ui.prune_error();

        let Some(event) = events.next().await else {
            return Ok(());
        };

        match event {
            AppEvent::Key(key) => {
                let ctx = input::InputContext {
                    search_entry: ui.search_entry,
                    has_error: ui.has_error(),
                };
                match input::map_key(key, &ctx) {
                    Action::Quit => return Ok(()),
                    Action::DismissError => ui.clear_error(),
                    Action::ScrollUp => view.scroll_up(1, log_height(terminal)),
                    Action::ScrollDown => view.scroll_down(1, log_height(terminal)),
                    Action::PageUp => view.scroll_up(20, log_height(terminal)),
                    Action::PageDown => view.scroll_down(20, log_height(terminal)),
                    Action::ScrollToTop => view.scroll_to_top(),
                    Action::ScrollToBottom => view.scroll_to_bottom(),
                    Action::ToggleAutoscroll => view.toggle_autoscroll(),
                    Action::OpenSearch => {
                        ui.search_entry = true;
                        ui.pending_query = view.search.query().to_string();
                    }
                    Action::SearchChar(c) => ui.pending_query.push(c),
                    Action::SearchBackspace => {
                        ui.pending_query.pop();
                    }
                    Action::SearchSubmit => {
                        ui.search_entry = false;
                        view.set_query(&ui.pending_query);
                        view.next_match();
                    }
                    Action::SearchCancel => {
                        ui.search_entry = false;
                        ui.pending_query.clear();
                    }
                    Action::NextMatch => view.next_match(),
                    Action::PrevMatch => view.previous_match(),
                    Action::StopRun => {
                        let rest2 = rest.clone();
                        let tx2 = tx.clone();
                        let run_id = view.run_id;
                        tokio::spawn(async move {
                            if let Err(e) = rest2.stop_run(run_id).await {
                                let _ = tx2.send(AppEvent::Error(format!("stop failed: {e}")));
                            }
                        });
                    }
                    Action::RestartPolling => {
                        scheduler.start(Duration::from_millis(args.interval.max(1)));
                    }
                    Action::None => {}
                }
            }
            AppEvent::Tick => {}
            AppEvent::Resize(w, _) => {
                // A fixed --width overrides viewport-driven reflow.
                if args.width.is_none() {
                    view.set_width(tui::render::reflow_width(w));
                }
            }
            AppEvent::Status(snapshot) => {
                view.snapshot = Some(snapshot);
            }
            AppEvent::ChunkAccepted { index, chunk } => {
                view.on_chunk_accepted(index, chunk);
            }
            AppEvent::Reflowed(batch) => {
                view.on_reflow_batch(batch);
            }
            AppEvent::PhaseChanged(phase) => {
                ui.phase = phase;
            }
            AppEvent::Warning(message) | AppEvent::Error(message) => {
                ui.set_error(message);
            }
        }
    }
}

/// Inner height of the log pane: terminal minus header, footer and borders.
fn log_height(terminal: &Terminal<CrosstermBackend<io::Stdout>>) -> usize {
    terminal
        .size()
        .map(|s| usize::from(s.height).saturating_sub(4))
        .unwrap_or(20)
        .max(1)
}
