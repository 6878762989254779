use crate::cursor::{LogCursorStore, LogChunk};
use crate::reflow::{reflow_chunks, DisplayLine, ReflowBatch, ReflowRequest, ReflowWorker};
use crate::run::RunSnapshot;
use crate::search::SearchIndex;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Per-run orchestration: feeds accepted chunks to the reflow worker,
/// applies its batches to the display buffer, keeps the search index in
/// step with buffer growth, and owns the rendering-side flags (autoscroll,
/// scroll offset, banner).
///
/// All state here belongs to exactly one viewed run; switching runs
/// discards it wholesale.
pub struct RunLogView {
    pub run_id: u64,
    store: Arc<Mutex<LogCursorStore>>,
    worker: ReflowWorker,
    pub buffer: Vec<DisplayLine>,
    pub search: SearchIndex,
    pub autoscroll: bool,
    pub scroll: usize,
    max_len: usize,
    /// Generation stamp; reflow batches from a superseded width or run are
    /// dropped instead of interleaving with fresh output.
    epoch: u64,
    /// Store index up to which chunks are already covered by submitted
    /// work. A chunk event that predates a full-backlog reprocess would
    /// otherwise be reflowed twice.
    forwarded: usize,
    reflow_retry_used: bool,
    pub reflow_frozen: bool,
    pub snapshot: Option<RunSnapshot>,
    pub banner: Option<String>,
}

impl RunLogView {
    pub fn new(run_id: u64, store: Arc<Mutex<LogCursorStore>>, worker: ReflowWorker, max_len: usize) -> Self {
        Self {
            run_id,
            store,
            worker,
            buffer: Vec::new(),
            search: SearchIndex::new(),
            autoscroll: true,
            scroll: 0,
            max_len: max_len.max(1),
            epoch: 0,
            forwarded: 0,
            reflow_retry_used: false,
            reflow_frozen: false,
            snapshot: None,
            banner: None,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn store(&self) -> Arc<Mutex<LogCursorStore>> {
        self.store.clone()
    }

    /// Forwards a newly accepted chunk to the background reflow task.
    pub fn on_chunk_accepted(&mut self, index: usize, chunk: LogChunk) {
        if self.reflow_frozen || index < self.forwarded {
            return;
        }
        self.forwarded = index + 1;
        let ok = self.worker.submit(ReflowRequest {
            chunks: vec![chunk],
            first_chunk_index: index,
            max_len: self.max_len,
            epoch: self.epoch,
            reset: false,
        });
        if !ok {
            self.handle_reflow_failure();
        }
    }

    /// Applies a batch from the reflow worker. Stale epochs are dropped;
    /// extensions only ever append, so the search cursor keeps its
    /// referent.
    pub fn on_reflow_batch(&mut self, batch: ReflowBatch) {
        if batch.epoch != self.epoch {
            return;
        }
        if batch.reset {
            self.buffer = batch.lines;
            let query = self.search.query().to_string();
            self.search.set_query(&query, &self.buffer);
        } else {
            let start = self.buffer.len();
            self.search.on_buffer_extended(start, &batch.lines);
            self.buffer.extend(batch.lines);
        }
    }

    /// Width change: discard derived state atomically and reprocess the
    /// full raw backlog at the new width. Raw chunks are never touched.
    /// While reflow is frozen this is a no-op: the displayed lines stay at
    /// the old width rather than being wiped with nothing to replace them.
    pub fn set_width(&mut self, max_len: usize) {
        let max_len = max_len.max(1);
        if max_len == self.max_len || self.reflow_frozen {
            return;
        }
        self.max_len = max_len;
        self.epoch += 1;
        self.buffer.clear();
        self.search.clear_matches();
        self.scroll = 0;
        let chunks = lock(&self.store).chunks().to_vec();
        self.forwarded = chunks.len();
        let ok = self.worker.submit(ReflowRequest {
            chunks,
            first_chunk_index: 0,
            max_len: self.max_len,
            epoch: self.epoch,
            reset: true,
        });
        if !ok {
            self.handle_reflow_failure();
        }
    }

    /// Worker unavailable: retry once synchronously from the raw backlog;
    /// a repeated failure freezes further reflow, keeping what is already
    /// displayed.
    fn handle_reflow_failure(&mut self) {
        if self.reflow_retry_used {
            self.reflow_frozen = true;
            self.banner = Some("log reflow unavailable; display frozen".to_string());
            tracing::error!(run_id = self.run_id, "reflow worker gone twice; freezing log view");
            return;
        }
        self.reflow_retry_used = true;
        tracing::warn!(run_id = self.run_id, "reflow worker gone; reprocessing backlog inline");
        let chunks = lock(&self.store).chunks().to_vec();
        self.forwarded = chunks.len();
        self.epoch += 1;
        self.buffer = reflow_chunks(&chunks, 0, self.max_len);
        let query = self.search.query().to_string();
        self.search.set_query(&query, &self.buffer);
    }

    pub fn set_query(&mut self, query: &str) {
        self.search.set_query(query, &self.buffer);
    }

    /// Jumps the viewport to the current match; leaves follow mode so the
    /// match stays on screen while new content streams in.
    pub fn next_match(&mut self) {
        self.search.next();
        self.jump_to_current_match();
    }

    pub fn previous_match(&mut self) {
        self.search.previous();
        self.jump_to_current_match();
    }

    fn jump_to_current_match(&mut self) {
        if let Some(m) = self.search.current() {
            self.scroll = m.line;
            self.autoscroll = false;
        }
    }

    /// Rendering-only toggle; fetch cadence is untouched.
    pub fn toggle_autoscroll(&mut self) {
        self.autoscroll = !self.autoscroll;
    }

    /// First visible buffer index for a viewport of `height` lines.
    pub fn viewport_start(&self, height: usize) -> usize {
        if self.autoscroll {
            self.buffer.len().saturating_sub(height)
        } else {
            self.scroll.min(self.buffer.len().saturating_sub(1))
        }
    }

    /// Moves up from the current viewport start, which under follow mode is
    /// the tail position, not the last manual offset.
    pub fn scroll_up(&mut self, n: usize, height: usize) {
        self.scroll = self.viewport_start(height).saturating_sub(n);
        self.autoscroll = false;
    }

    pub fn scroll_down(&mut self, n: usize, height: usize) {
        let max_start = self.buffer.len().saturating_sub(height);
        self.scroll = (self.viewport_start(height) + n).min(max_start);
        // Reaching the tail re-engages follow mode.
        self.autoscroll = self.scroll == max_start;
    }

    pub fn scroll_to_top(&mut self) {
        self.autoscroll = false;
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.autoscroll = true;
    }

    /// Discards all per-run state for a new run id: fresh cursor store,
    /// empty buffer, empty matches. The caller restarts the scheduler
    /// against the store returned here.
    pub fn switch_run(&mut self, run_id: u64) -> Arc<Mutex<LogCursorStore>> {
        self.run_id = run_id;
        self.store = Arc::new(Mutex::new(LogCursorStore::new()));
        self.buffer.clear();
        self.search = SearchIndex::new();
        self.autoscroll = true;
        self.scroll = 0;
        self.epoch += 1;
        self.forwarded = 0;
        self.reflow_retry_used = false;
        self.reflow_frozen = false;
        self.snapshot = None;
        self.banner = None;
        self.store.clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
