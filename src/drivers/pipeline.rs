use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use crate::drivers::{decode_line, ChannelBufferSet, LineFramer};
/// Aggregate ingest counters shared between a session and the UI.
#[derive(Debug, Default)]
pub struct IngestStats {
    bytes_received: AtomicU64,
    lines_decoded: AtomicU64,
    lines_dropped: AtomicU64,
}
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestCounts {
    pub bytes_received: u64,
    pub lines_decoded: u64,
    pub lines_dropped: u64,
}
impl IngestStats {
    pub fn counts(&self) -> IngestCounts {
        IngestCounts {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            lines_decoded: self.lines_decoded.load(Ordering::Relaxed),
            lines_dropped: self.lines_dropped.load(Ordering::Relaxed),
        }
    }
}
/// Write side of the data path: frames raw chunks, decodes each line and
/// appends the resulting sample vectors to the shared buffers in arrival order.
pub struct IngestPipeline {
    framer: LineFramer,
    buffers: Arc<ChannelBufferSet>,
    stats: Arc<IngestStats>,
}
impl IngestPipeline {
    pub fn new(buffers: Arc<ChannelBufferSet>, stats: Arc<IngestStats>, max_line_len: usize) -> Self {
        Self {
            framer: LineFramer::new(max_line_len),
            buffers,
            stats,
        }
    }
    /// Returns how many sample vectors the chunk completed and applied.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> usize {
        self.stats
            .bytes_received
            .fetch_add(chunk.len() as u64, Ordering::Relaxed);
        let mut applied = 0;
        for line in self.framer.push_chunk(chunk) {
            match decode_line(&line) {
                Some(sample) => {
                    self.buffers.append(&sample);
                    applied += 1;
                }
                None => {
                    log::trace!("dropping malformed line: {:?}", String::from_utf8_lossy(&line));
                    self.stats.lines_dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        self.stats
            .lines_decoded
            .fetch_add(applied as u64, Ordering::Relaxed);
        applied
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn pipeline_applies_lines_in_order_and_counts_drops() {
        let buffers = Arc::new(ChannelBufferSet::new(2, 10).unwrap());
        let stats = Arc::new(IngestStats::default());
        let mut pipeline = IngestPipeline::new(Arc::clone(&buffers), Arc::clone(&stats), 1024);
        assert_eq!(pipeline.push_chunk(b"1,10\n2,x\n3"), 1);
        assert_eq!(pipeline.push_chunk(b",30\n4\n"), 2);
        assert_eq!(buffers.snapshot(0).unwrap().values, vec![1.0, 3.0, 4.0]);
        assert_eq!(buffers.snapshot(1).unwrap().values, vec![10.0, 30.0]);
        assert_eq!(
            stats.counts(),
            IngestCounts {
                bytes_received: 16,
                lines_decoded: 3,
                lines_dropped: 1,
            }
        );
    }
    #[test]
    fn malformed_line_touches_no_channel() {
        let buffers = Arc::new(ChannelBufferSet::new(4, 10).unwrap());
        let mut pipeline =
            IngestPipeline::new(Arc::clone(&buffers), Arc::new(IngestStats::default()), 1024);
        pipeline.push_chunk(b"1,2,x,4\n");
        assert!(buffers.snapshot_all().iter().all(|s| s.is_empty()));
    }
}
