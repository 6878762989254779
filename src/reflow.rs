use crate::cursor::LogChunk;
use crate::events::AppEvent;
use tokio::sync::mpsc;

/// One rendered line of at most `max_len` characters, tagged with the chunk
/// it came from and its segment position within the raw source line so
/// search hits can be mapped back to raw positions.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DisplayLine {
    pub text: String,
    pub chunk_index: usize,
    pub segment: usize,
}

/// Reflows a batch of raw chunks into display lines.
///
/// Each chunk is split on newlines; raw lines longer than `max_len` are
/// sliced into consecutive `max_len`-character segments (the final segment
/// may be shorter). Control characters pass through untouched; sanitization
/// is a rendering concern. Holds no state, so reprocessing the full backlog
/// (e.g. after a width change) is just another call.
pub fn reflow_chunks(chunks: &[LogChunk], first_chunk_index: usize, max_len: usize) -> Vec<DisplayLine> {
    let max_len = max_len.max(1);
    let mut out = Vec::new();
    for (offset, chunk) in chunks.iter().enumerate() {
        let chunk_index = first_chunk_index + offset;
        for raw_line in chunk.chunk.split('\n') {
            let mut segment = 0;
            let mut buf = String::new();
            let mut count = 0;
            for ch in raw_line.chars() {
                buf.push(ch);
                count += 1;
                if count == max_len {
                    out.push(DisplayLine {
                        text: std::mem::take(&mut buf),
                        chunk_index,
                        segment,
                    });
                    segment += 1;
                    count = 0;
                }
            }
            if !buf.is_empty() || segment == 0 {
                out.push(DisplayLine {
                    text: buf,
                    chunk_index,
                    segment,
                });
            }
        }
    }
    out
}

/// Plain-data request across the worker boundary.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReflowRequest {
    pub chunks: Vec<LogChunk>,
    pub first_chunk_index: usize,
    pub max_len: usize,
    /// Generation stamp; results from a superseded run or width are dropped
    /// by the view instead of interleaving with fresh output.
    pub epoch: u64,
    /// True when this batch replaces the buffer (full backlog reprocess)
    /// rather than extending it.
    pub reset: bool,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ReflowBatch {
    pub lines: Vec<DisplayLine>,
    pub epoch: u64,
    pub reset: bool,
}

/// Handle to the background reflow task.
///
/// A single consumer loop processes requests strictly in arrival order, so
/// output batches can never be delivered out of order even with several
/// requests queued.
pub struct ReflowWorker {
    req_tx: mpsc::UnboundedSender<ReflowRequest>,
}

impl ReflowWorker {
    pub fn spawn(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        let (req_tx, mut req_rx) = mpsc::unbounded_channel::<ReflowRequest>();
        tokio::spawn(async move {
            while let Some(req) = req_rx.recv().await {
                let lines = reflow_chunks(&req.chunks, req.first_chunk_index, req.max_len);
                let batch = ReflowBatch {
                    lines,
                    epoch: req.epoch,
                    reset: req.reset,
                };
                if tx.send(AppEvent::Reflowed(batch)).is_err() {
                    break;
                }
            }
        });
        Self { req_tx }
    }

    /// Queues a batch. `false` means the worker is gone; the caller decides
    /// whether to retry from the raw backlog or freeze reflow.
    pub fn submit(&self, req: ReflowRequest) -> bool {
        self.req_tx.send(req).is_ok()
    }

    /// A handle whose worker has already exited, for exercising the
    /// failure path.
    #[cfg(test)]
    pub(crate) fn closed_for_tests() -> Self {
        let (req_tx, _) = mpsc::unbounded_channel();
        Self { req_tx }
    }
}
