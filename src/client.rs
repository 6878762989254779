use crate::cursor::LogChunk;
use crate::error::FetchError;
use crate::run::RunSnapshot;
use async_trait::async_trait;

/// The REST collaborator owning run state and log delivery. The engine only
/// ever talks to this trait; tests substitute a scripted fake.
#[async_trait]
pub trait RunBackend: Send + Sync {
    async fn fetch_status(&self, run_id: u64) -> Result<RunSnapshot, FetchError>;

    /// Fetches the next log slice. An empty `last_seen` asks for the full
    /// backlog from the start.
    async fn fetch_log(&self, run_id: u64, last_seen: &str) -> Result<LogChunk, FetchError>;

    /// Requests run termination. The server is the authority; the viewer
    /// just observes the resulting status on subsequent ticks.
    async fn stop_run(&self, run_id: u64) -> Result<(), FetchError>;
}

pub fn parse_status(json: &str) -> Result<RunSnapshot, FetchError> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_chunk(json: &str) -> Result<LogChunk, FetchError> {
    Ok(serde_json::from_str(json)?)
}

/// Dashboard REST API over HTTP.
pub struct HttpBackend {
    base: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn get_text(&self, url: String) -> Result<String, FetchError> {
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl RunBackend for HttpBackend {
    async fn fetch_status(&self, run_id: u64) -> Result<RunSnapshot, FetchError> {
        let body = self.get_text(format!("{}/api/runs/{run_id}", self.base)).await?;
        parse_status(&body)
    }

    async fn fetch_log(&self, run_id: u64, last_seen: &str) -> Result<LogChunk, FetchError> {
        let mut url = format!("{}/api/runs/{run_id}/log", self.base);
        if !last_seen.is_empty() {
            url.push_str("?lastSeen=");
            url.push_str(last_seen);
        }
        let body = self.get_text(url).await?;
        parse_chunk(&body)
    }

    async fn stop_run(&self, run_id: u64) -> Result<(), FetchError> {
        let url = format!("{}/api/runs/{run_id}/stop", self.base);
        let resp = self.client.post(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunStatus;

    #[test]
    fn parse_running_status() {
        let json = r#"{
            "run_id": 42,
            "definition_id": 7,
            "status": "RUNNING",
            "started_at": "2024-03-01T12:00:00Z"
        }"#;
        let snap = parse_status(json).unwrap();
        assert_eq!(snap.run_id, 42);
        assert_eq!(snap.definition_id, Some(7));
        assert_eq!(snap.status, RunStatus::Running);
        assert!(snap.started_at.is_some());
        assert!(snap.finished_at.is_none());
        assert!(snap.exit_code.is_none());
    }

    #[test]
    fn parse_finished_status_with_exit_code() {
        let json = r#"{
            "run_id": 42,
            "status": "FAILED",
            "exit_code": 137,
            "started_at": "2024-03-01T12:00:00Z",
            "finished_at": "2024-03-01T12:05:00Z"
        }"#;
        let snap = parse_status(json).unwrap();
        assert_eq!(snap.status, RunStatus::Failed);
        assert_eq!(snap.exit_code, Some(137));
        assert!(snap.finished_at.is_some());
    }

    #[test]
    fn parse_all_status_strings() {
        let cases = [
            ("PENDING", RunStatus::Pending),
            ("QUEUED", RunStatus::Queued),
            ("RUNNING", RunStatus::Running),
            ("STOPPED", RunStatus::Stopped),
            ("NEEDS_RETRY", RunStatus::NeedsRetry),
            ("SUCCESS", RunStatus::Success),
            ("FAILED", RunStatus::Failed),
        ];
        for (s, expected) in cases {
            let json = format!(r#"{{"run_id": 1, "status": "{s}"}}"#);
            let snap = parse_status(&json).unwrap();
            assert_eq!(snap.status, expected, "status string: {s}");
        }
    }

    #[test]
    fn parse_unknown_status_string() {
        let json = r#"{"run_id": 1, "status": "SOMETHING_NEW"}"#;
        let snap = parse_status(json).unwrap();
        assert_eq!(snap.status, RunStatus::Unknown);
    }

    #[test]
    fn parse_status_invalid_json() {
        assert!(parse_status("not json").is_err());
    }

    #[test]
    fn parse_status_missing_fields() {
        assert!(parse_status(r#"{"run_id": 1}"#).is_err());
    }

    #[test]
    fn parse_chunk_fields() {
        let json = r#"{"chunk": "line one\nline two", "lastSeen": "offset-123"}"#;
        let chunk = parse_chunk(json).unwrap();
        assert_eq!(chunk.chunk, "line one\nline two");
        assert_eq!(chunk.last_seen, "offset-123");
    }

    #[test]
    fn parse_chunk_empty_delivery() {
        let json = r#"{"chunk": "", "lastSeen": "offset-123"}"#;
        let chunk = parse_chunk(json).unwrap();
        assert!(chunk.chunk.is_empty());
    }

    #[test]
    fn parse_chunk_unicode_payload() {
        let json = r#"{"chunk": "构建 🚀 テスト", "lastSeen": "9"}"#;
        let chunk = parse_chunk(json).unwrap();
        assert_eq!(chunk.chunk, "构建 🚀 テスト");
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let backend = HttpBackend::new("http://localhost:8080/");
        assert_eq!(backend.base, "http://localhost:8080");
    }
}
