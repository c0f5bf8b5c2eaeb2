//! Transfer progress reporting.
//!
//! Progress for the primary upload is derived from actual byte counts as the
//! transport consumes the stream. The chunked-session fallback emits per-chunk
//! events with `simulated` set so telemetry can tell the two apart.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::sync::Arc;

/// A single progress observation for an in-flight transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferProgress {
    pub bytes_sent: u64,
    pub total_bytes: Option<u64>,
    /// True when the event was synthesized per-chunk rather than observed from
    /// byte-level transport progress.
    pub simulated: bool,
}

impl TransferProgress {
    /// Fractional completion in 0..=100 when the total is known.
    pub fn percent(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.bytes_sent as f64 / total as f64 * 100.0).min(100.0)
            }
        })
    }
}

/// Callback invoked with progress observations. Shared across tasks.
pub type ProgressSink = Arc<dyn Fn(TransferProgress) + Send + Sync>;

/// A sink that discards all observations.
pub fn noop_progress() -> ProgressSink {
    Arc::new(|_| {})
}

/// Wrap an in-memory payload as a chunked byte stream that reports cumulative
/// real progress as each chunk is handed to the transport.
pub fn observed_byte_stream(
    data: Vec<u8>,
    chunk_size: usize,
    progress: ProgressSink,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send {
    let total = data.len() as u64;
    let chunks: Vec<Bytes> = if data.is_empty() {
        vec![Bytes::new()]
    } else {
        data.chunks(chunk_size.max(1))
            .map(Bytes::copy_from_slice)
            .collect()
    };
    futures::stream::iter(chunks).scan(0u64, move |sent, chunk| {
        *sent += chunk.len() as u64;
        progress(TransferProgress {
            bytes_sent: *sent,
            total_bytes: Some(total),
            simulated: false,
        });
        futures::future::ready(Some(Ok(chunk)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::Mutex;

    #[test]
    fn test_percent() {
        let half = TransferProgress {
            bytes_sent: 50,
            total_bytes: Some(100),
            simulated: false,
        };
        assert_eq!(half.percent(), Some(50.0));

        let unknown = TransferProgress {
            bytes_sent: 50,
            total_bytes: None,
            simulated: false,
        };
        assert_eq!(unknown.percent(), None);

        let empty = TransferProgress {
            bytes_sent: 0,
            total_bytes: Some(0),
            simulated: true,
        };
        assert_eq!(empty.percent(), Some(100.0));
    }

    #[tokio::test]
    async fn test_observed_byte_stream_reports_cumulative_progress() {
        let observed: Arc<Mutex<Vec<TransferProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink: ProgressSink = {
            let observed = observed.clone();
            Arc::new(move |p| observed.lock().unwrap().push(p))
        };

        let data = vec![7u8; 10];
        let stream = observed_byte_stream(data, 4, sink);
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 3);

        let events = observed.lock().unwrap();
        let sent: Vec<u64> = events.iter().map(|p| p.bytes_sent).collect();
        assert_eq!(sent, vec![4, 8, 10]);
        assert!(events.iter().all(|p| p.total_bytes == Some(10)));
        assert!(events.iter().all(|p| !p.simulated));
        assert_eq!(events.last().unwrap().percent(), Some(100.0));
    }
}
