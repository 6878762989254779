use crate::client::RunBackend;
use crate::cursor::LogCursorStore;
use crate::error::AppendError;
use crate::events::AppEvent;
use crate::run::{classify, Classification};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

/// Externally observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Not polling; either never started or explicitly stopped.
    Idle,
    Active,
    /// Halted itself after observing a terminal run status.
    Stopped,
}

/// What one settled tick decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// Terminal status observed; this tick already delivered the final
    /// snapshot and chunk, so the loop halts without another fetch.
    Terminal,
    /// Transport failure; reported, next tick proceeds with the same cursor.
    Failed,
}

/// Cancellable fixed-interval poll loop for one run.
///
/// Ticks never overlap: the next fetch is only issued after the previous
/// one settles, so a fetch slower than the interval delays the next tick
/// rather than duplicating it. Stopping bumps the generation counter; a
/// loop whose generation is stale exits at its next check, which lets an
/// in-flight fetch finish and update the stores without re-activating a
/// stopped scheduler.
#[derive(Clone)]
pub struct PollScheduler {
    backend: Arc<dyn RunBackend>,
    run_id: u64,
    store: Arc<Mutex<LogCursorStore>>,
    tx: mpsc::UnboundedSender<AppEvent>,
    phase: Arc<Mutex<PollPhase>>,
    generation: Arc<AtomicU64>,
    wake: Arc<Notify>,
}

impl PollScheduler {
    pub fn new(
        backend: Arc<dyn RunBackend>,
        run_id: u64,
        store: Arc<Mutex<LogCursorStore>>,
        tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            backend,
            run_id,
            store,
            tx,
            phase: Arc::new(Mutex::new(PollPhase::Idle)),
            generation: Arc::new(AtomicU64::new(0)),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn phase(&self) -> PollPhase {
        *lock(&self.phase)
    }

    fn set_phase(&self, phase: PollPhase) {
        *lock(&self.phase) = phase;
        let _ = self.tx.send(AppEvent::PhaseChanged(phase));
    }

    /// Enters `Active` and spawns the poll loop: one immediate tick, then
    /// one per interval. No-op if already active. Restarting after
    /// `Stopped` resumes from wherever the shared cursor store left off.
    pub fn start(&self, interval: Duration) {
        if self.phase() == PollPhase::Active {
            return;
        }
        let my_gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_phase(PollPhase::Active);
        let sched = self.clone();
        tokio::spawn(async move {
            sched.run_loop(my_gen, interval).await;
        });
    }

    /// Idempotent, callable from any phase. Cancels the pending timer
    /// immediately; an in-flight fetch settles on its own but finds its
    /// generation stale.
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.set_phase(PollPhase::Idle);
        self.wake.notify_waiters();
    }

    async fn run_loop(&self, my_gen: u64, interval: Duration) {
        loop {
            let outcome = self.poll_once().await;
            if self.generation.load(Ordering::SeqCst) != my_gen {
                return;
            }
            if outcome == TickOutcome::Terminal {
                self.set_phase(PollPhase::Stopped);
                return;
            }
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                () = self.wake.notified() => {}
            }
            if self.generation.load(Ordering::SeqCst) != my_gen {
                return;
            }
        }
    }

    /// One settled fetch cycle: run status, then the next log slice from
    /// the stored cursor. Public so tests can drive ticks without timers.
    pub async fn poll_once(&self) -> TickOutcome {
        let classification = match self.backend.fetch_status(self.run_id).await {
            Ok(snapshot) => {
                let c = classify(&snapshot);
                if c == Classification::UnknownStatus {
                    let _ = self.tx.send(AppEvent::Warning(format!(
                        "run {}: unrecognized status from server; still polling",
                        self.run_id
                    )));
                }
                let _ = self.tx.send(AppEvent::Status(snapshot));
                c
            }
            Err(e) => {
                let _ = self.tx.send(AppEvent::Error(format!("status fetch failed: {e}")));
                return TickOutcome::Failed;
            }
        };

        let cursor = lock(&self.store).cursor().to_string();
        match self.backend.fetch_log(self.run_id, &cursor).await {
            Ok(chunk) => match lock(&self.store).append_chunk(chunk.clone()) {
                Ok(index) => {
                    let _ = self.tx.send(AppEvent::ChunkAccepted { index, chunk });
                }
                // Replayed cursor from a flaky retry; already accounted for.
                Err(AppendError::Duplicate(_)) => {}
                Err(e @ AppendError::CursorRegression { .. }) => {
                    tracing::warn!(run_id = self.run_id, "{e}");
                    let _ = self.tx.send(AppEvent::Warning(format!("{e}; chunk discarded")));
                }
            },
            Err(e) => {
                let _ = self.tx.send(AppEvent::Error(format!("log fetch failed: {e}")));
                return TickOutcome::Failed;
            }
        }

        match classification {
            Classification::Terminal => TickOutcome::Terminal,
            Classification::NonTerminal | Classification::UnknownStatus => TickOutcome::Continue,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
