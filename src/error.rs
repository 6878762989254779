use thiserror::Error;

/// Transport-level failure during a poll tick. Always transient: the
/// scheduler reports it and proceeds on the next tick with the same cursor.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Outcome of offering a chunk to the cursor store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppendError {
    /// Same cursor delivered twice (flaky retry); the chunk is dropped
    /// without touching the store.
    #[error("duplicate chunk for cursor {0:?}")]
    Duplicate(String),
    /// Server cursor moved backwards; the chunk is discarded and polling
    /// continues from the stored cursor.
    #[error("cursor regression: stored {stored:?}, received {received:?}")]
    CursorRegression { stored: String, received: String },
}
