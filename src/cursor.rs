use crate::error::AppendError;

/// One contiguous slice of raw log text plus the opaque server cursor
/// marking how far delivery has progressed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct LogChunk {
    pub chunk: String,
    #[serde(rename = "lastSeen")]
    pub last_seen: String,
}

/// Ordered raw chunks for one run, plus the continuation cursor.
///
/// Append order is the single source of truth for line order. Chunks are
/// immutable once accepted; a width change reprocesses via [`chunks`], it
/// never mutates the backlog.
#[derive(Debug, Default)]
pub struct LogCursorStore {
    chunks: Vec<LogChunk>,
    cursor: String,
}

impl LogCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a chunk if its cursor advances past the stored one.
    ///
    /// Returns the index the chunk landed at. A replayed cursor (equal to
    /// the stored one) is deduped; a cursor lexically behind the stored one
    /// is a server-side regression and the chunk is discarded.
    pub fn append_chunk(&mut self, chunk: LogChunk) -> Result<usize, AppendError> {
        if chunk.last_seen == self.cursor {
            return Err(AppendError::Duplicate(chunk.last_seen));
        }
        if chunk.last_seen < self.cursor {
            return Err(AppendError::CursorRegression {
                stored: self.cursor.clone(),
                received: chunk.last_seen,
            });
        }
        self.cursor = chunk.last_seen.clone();
        self.chunks.push(chunk);
        Ok(self.chunks.len() - 1)
    }

    /// Empty before the first chunk: the initial fetch asks for the full
    /// backlog from the start.
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    /// Read-only backlog view, for full reprocessing after a width change.
    pub fn chunks(&self) -> &[LogChunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
