use async_trait::async_trait;
use runlog::client::RunBackend;
use runlog::cursor::LogChunk;
use runlog::error::FetchError;
use runlog::run::{RunSnapshot, RunStatus};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Backend replaying a scripted status sequence and chunk feed. The last
/// status repeats once the script runs out; an exhausted chunk feed replays
/// the last cursor with no new text, which the cursor store dedupes.
pub struct ScriptedBackend {
    statuses: Mutex<VecDeque<RunStatus>>,
    chunks: Mutex<VecDeque<LogChunk>>,
    last_cursor: Mutex<String>,
    pub stop_requests: Mutex<Vec<u64>>,
}

impl ScriptedBackend {
    pub fn new(statuses: &[RunStatus], chunks: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(statuses.iter().copied().collect()),
            chunks: Mutex::new(
                chunks
                    .iter()
                    .map(|(text, cursor)| LogChunk {
                        chunk: (*text).to_string(),
                        last_seen: (*cursor).to_string(),
                    })
                    .collect(),
            ),
            last_cursor: Mutex::new(String::new()),
            stop_requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RunBackend for ScriptedBackend {
    async fn fetch_status(&self, run_id: u64) -> Result<RunSnapshot, FetchError> {
        let mut script = self.statuses.lock().unwrap();
        let status = if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            *script.front().expect("status script must not be empty")
        };
        Ok(RunSnapshot {
            run_id,
            definition_id: Some(1),
            status,
            exit_code: status.is_terminal().then_some(0),
            started_at: None,
            finished_at: None,
        })
    }

    async fn fetch_log(&self, _run_id: u64, _last_seen: &str) -> Result<LogChunk, FetchError> {
        let mut feed = self.chunks.lock().unwrap();
        if let Some(chunk) = feed.pop_front() {
            *self.last_cursor.lock().unwrap() = chunk.last_seen.clone();
            Ok(chunk)
        } else {
            Ok(LogChunk {
                chunk: String::new(),
                last_seen: self.last_cursor.lock().unwrap().clone(),
            })
        }
    }

    async fn stop_run(&self, run_id: u64) -> Result<(), FetchError> {
        self.stop_requests.lock().unwrap().push(run_id);
        Ok(())
    }
}
