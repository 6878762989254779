use chrono::{DateTime, Utc};

// Polling defaults (milliseconds)
pub const POLL_INTERVAL_DEFAULT_MS: u64 = 2000;

// Display defaults
pub const DEFAULT_MAX_LEN: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    Queued,
    Running,
    Stopped,
    NeedsRetry,
    Success,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Statuses from which the server will never transition away.
pub const TERMINAL: [RunStatus; 3] = [RunStatus::Stopped, RunStatus::Success, RunStatus::Failed];

impl RunStatus {
    /// Terminal statuses halt polling. Unknown statuses fail open (polling
    /// continues) so a new server-side status never strands the viewer; the
    /// caller is expected to surface the warning from [`classify`].
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Success | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Stopped => "STOPPED",
            Self::NeedsRetry => "NEEDS_RETRY",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Classifies a snapshot's status for the poll loop, logging when the server
/// sent a status string outside the known enum.
pub fn classify(snapshot: &RunSnapshot) -> Classification {
    if snapshot.status == RunStatus::Unknown {
        tracing::warn!(run_id = snapshot.run_id, "unknown run status from server; treating as non-terminal");
        return Classification::UnknownStatus;
    }
    if snapshot.status.is_terminal() {
        Classification::Terminal
    } else {
        Classification::NonTerminal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Terminal,
    NonTerminal,
    /// Not in the known enum: treated as non-terminal, surfaced as a warning.
    UnknownStatus,
}

/// Read-only snapshot of one run, replaced wholesale on each poll tick.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RunSnapshot {
    pub run_id: u64,
    #[serde(default)]
    pub definition_id: Option<u64>,
    pub status: RunStatus,
    #[serde(default)]
    pub exit_code: Option<i64>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}
