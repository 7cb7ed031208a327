use crate::drivers::SampleVector;
/// Reassembles arbitrary byte chunks into `\n`-terminated lines.
pub struct LineFramer {
    pending: Vec<u8>,
    max_line_len: usize,
    /// Set after an oversized remainder was thrown away; the bytes up to the
    /// next newline belong to that line and are skipped too.
    resyncing: bool,
}
impl LineFramer {
    pub fn new(max_line_len: usize) -> Self {
        Self {
            pending: Vec::with_capacity(max_line_len.min(256)),
            max_line_len: max_line_len.max(1),
            resyncing: false,
        }
    }
    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
    /// Appends `chunk` and returns every line it completed, in order, without
    /// the terminator. The unterminated tail is kept for the next call.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            rest = &tail[1..];
            if self.resyncing {
                self.resyncing = false;
                continue;
            }
            self.pending.extend_from_slice(head);
            if self.pending.len() > self.max_line_len {
                log::warn!(
                    "dropping oversized line ({} bytes > {})",
                    self.pending.len(),
                    self.max_line_len
                );
                self.pending.clear();
                continue;
            }
            lines.push(std::mem::take(&mut self.pending));
        }
        if !self.resyncing {
            self.pending.extend_from_slice(rest);
            if self.pending.len() > self.max_line_len {
                log::warn!(
                    "discarding {} buffered bytes without a line terminator",
                    self.pending.len()
                );
                self.pending.clear();
                self.resyncing = true;
            }
        }
        lines
    }
}
/// Parses one line of comma-separated decimal numbers.
///
/// Undecodable bytes are skipped rather than failing the line; any field that
/// is not a number (including an empty line) rejects the whole line.
pub fn decode_line(line: &[u8]) -> Option<SampleVector> {
    let text = String::from_utf8_lossy(line);
    let text: String = text
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect();
    text.trim()
        .split(',')
        .map(|field| field.trim().parse::<f64>().ok())
        .collect()
}
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    fn decode_all(framer: &mut LineFramer, chunk: &[u8]) -> Vec<SampleVector> {
        framer
            .push_chunk(chunk)
            .iter()
            .filter_map(|line| decode_line(line))
            .collect()
    }
    #[test]
    fn holds_incomplete_line_until_terminator() {
        let mut framer = LineFramer::new(1024);
        let first = decode_all(&mut framer, b"1,2,3,4\n5,6,");
        assert_eq!(first, vec![vec![1.0, 2.0, 3.0, 4.0]]);
        assert_eq!(framer.pending_len(), 4);
        assert!(decode_all(&mut framer, b"7,8").is_empty());
        let second = decode_all(&mut framer, b"\n");
        assert_eq!(second, vec![vec![5.0, 6.0, 7.0, 8.0]]);
        assert_eq!(framer.pending_len(), 0);
    }
    #[test]
    fn malformed_line_is_dropped_whole() {
        let mut framer = LineFramer::new(1024);
        let out = decode_all(&mut framer, b"1,2,x,4\n5,6,7,8\n");
        assert_eq!(out, vec![vec![5.0, 6.0, 7.0, 8.0]]);
    }
    #[test]
    fn decoder_tolerates_whitespace_crlf_and_bad_bytes() {
        assert_eq!(decode_line(b" 1.5, -2 ,3e2\r"), Some(vec![1.5, -2.0, 300.0]));
        assert_eq!(decode_line(b"1.0,\xff2.5"), Some(vec![1.0, 2.5]));
        assert_eq!(decode_line(b"42"), Some(vec![42.0]));
        assert_eq!(decode_line(b""), None);
        assert_eq!(decode_line(b"1,,2"), None);
        assert_eq!(decode_line(b"hello"), None);
    }
    #[test]
    fn empty_lines_between_records_are_skipped() {
        let mut framer = LineFramer::new(1024);
        let out = decode_all(&mut framer, b"\n\n1,2\n\n");
        assert_eq!(out, vec![vec![1.0, 2.0]]);
    }
    #[test]
    fn oversized_line_is_discarded_and_framing_recovers() {
        let mut framer = LineFramer::new(8);
        assert!(framer.push_chunk(b"1234567890").is_empty());
        assert_eq!(framer.pending_len(), 0);
        // Tail of the oversized line, then a good record.
        let out = decode_all(&mut framer, b"123\n9,9\n");
        assert_eq!(out, vec![vec![9.0, 9.0]]);
        // A complete line that is too long inside a single chunk.
        let out = decode_all(&mut framer, b"1,2,3,4,5,6\n7\n");
        assert_eq!(out, vec![vec![7.0]]);
    }
    proptest! {
        #[test]
        fn chunk_boundaries_do_not_change_output(split in 0usize..=15) {
            let data = b"1,2,3,4\n5,6,7,8";
            let mut framer = LineFramer::new(1024);
            let mut out = decode_all(&mut framer, &data[..split]);
            out.extend(decode_all(&mut framer, &data[split..]));
            prop_assert_eq!(out, vec![vec![1.0, 2.0, 3.0, 4.0]]);
            prop_assert_eq!(framer.pending_len(), 7);
        }
    }
}
