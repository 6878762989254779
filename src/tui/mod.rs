pub mod footer;
pub mod header;
pub mod log_pane;
pub mod render;

use crate::scheduler::PollPhase;
use std::time::Instant;

pub const ERROR_TTL_SECS: u64 = 10;

/// Transient chrome state that is not part of the per-run engine state.
pub struct Ui {
    pub phase: PollPhase,
    pub search_entry: bool,
    pub pending_query: String,
    pub error: Option<(String, Instant)>,
}

impl Ui {
    pub fn new() -> Self {
        Self {
            phase: PollPhase::Idle,
            search_entry: false,
            pending_query: String::new(),
            error: None,
        }
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some((message, Instant::now()));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn prune_error(&mut self) {
        if let Some((_, at)) = &self.error {
            if at.elapsed().as_secs() >= ERROR_TTL_SECS {
                self.error = None;
            }
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}
