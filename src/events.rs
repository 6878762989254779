use crate::cursor::LogChunk;
use crate::reflow::ReflowBatch;
use crate::run::RunSnapshot;
use crate::scheduler::PollPhase;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(u16, u16),
    /// Fresh run snapshot from a settled poll tick.
    Status(RunSnapshot),
    /// A chunk the cursor store accepted, at the index it landed on.
    ChunkAccepted { index: usize, chunk: LogChunk },
    /// Display lines back from the background reflow task.
    Reflowed(ReflowBatch),
    PhaseChanged(PollPhase),
    /// Degraded-but-continuing conditions: unknown status, cursor regression.
    Warning(String),
    /// Transient fetch failure; next tick proceeds on schedule.
    Error(String),
}

/// Bridges the blocking crossterm event read onto the async event channel,
/// emitting `Tick` whenever no terminal event arrives within the tick rate.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    _tx: mpsc::UnboundedSender<AppEvent>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = shutdown.clone();

        let thread = std::thread::spawn(move || {
            while !shutdown_flag.load(Ordering::Relaxed) {
                if event::poll(tick_rate).unwrap_or(false) {
                    let forwarded = match event::read() {
                        Ok(CrosstermEvent::Key(key)) => event_tx.send(AppEvent::Key(key)),
                        Ok(CrosstermEvent::Resize(w, h)) => event_tx.send(AppEvent::Resize(w, h)),
                        _ => Ok(()),
                    };
                    if forwarded.is_err() {
                        break;
                    }
                } else if event_tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self {
            rx,
            _tx: tx,
            shutdown,
            thread: Some(thread),
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self._tx.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.stop();
    }
}
