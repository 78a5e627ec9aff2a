//! Incremental reader for a streamed generation body.
//!
//! Bytes are decoded as UTF-8 across chunk boundaries, appended to one
//! accumulator and the full text so far is republished after every chunk.

use futures::{Stream, StreamExt};
use std::fmt;

/// A read failure that ended the stream early. The text received before the
/// failure is kept so it can stay on screen.
#[derive(Debug)]
pub struct ConsumeError<E> {
    pub partial: String,
    pub source: E,
}

impl<E: fmt::Display> fmt::Display for ConsumeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stream failed after {} bytes: {}",
            self.partial.len(),
            self.source
        )
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ConsumeError<E> {}

/// UTF-8 decoder that holds back an incomplete trailing sequence until the
/// next chunk completes it.
#[derive(Debug, Default)]
pub struct TextAccumulator {
    text: String,
    pending: Vec<u8>,
}

impl TextAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        let mut start = 0;
        loop {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    // valid_up_to marks a verified UTF-8 prefix
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.pending[start..valid_end]));
                    match e.error_len() {
                        Some(bad) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + bad;
                        }
                        None => {
                            self.pending.drain(..valid_end);
                            return;
                        }
                    }
                }
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Flushes a dangling partial sequence as a replacement character.
    pub fn finish(mut self) -> String {
        if !self.pending.is_empty() {
            self.text.push_str(&String::from_utf8_lossy(&self.pending));
        }
        self.text
    }
}

/// Reads `chunks` to the end, calling `publish` with the accumulated text
/// after each chunk. Returns the complete text, or the partial text together
/// with the read error.
pub async fn consume<S, B, E, F>(chunks: S, mut publish: F) -> Result<String, ConsumeError<E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    F: FnMut(&str),
{
    let mut chunks = std::pin::pin!(chunks);
    let mut accumulator = TextAccumulator::new();

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(bytes) => {
                accumulator.push(bytes.as_ref());
                publish(accumulator.as_str());
            }
            Err(source) => {
                log::warn!(
                    "generation stream aborted after {} bytes",
                    accumulator.as_str().len()
                );
                return Err(ConsumeError {
                    partial: accumulator.finish(),
                    source,
                });
            }
        }
    }

    Ok(accumulator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::stream;

    fn ok_chunks(parts: &[&[u8]]) -> Vec<Result<Vec<u8>, String>> {
        parts.iter().map(|p| Ok(p.to_vec())).collect()
    }

    #[test]
    fn test_accumulates_in_order_and_publishes_each_chunk() {
        let mut published = Vec::new();
        let text = block_on(consume(
            stream::iter(ok_chunks(&[b"Hello ", b"streaming ", b"world "])),
            |s| published.push(s.to_string()),
        ))
        .unwrap();

        assert_eq!(text, "Hello streaming world ");
        assert_eq!(
            published,
            ["Hello ", "Hello streaming ", "Hello streaming world "]
        );
    }

    #[test]
    fn test_result_independent_of_chunking() {
        let full = "Subject: Café ☕ update\n\nHi there, 👋 everyone.";
        let bytes = full.as_bytes();
        for size in [1, 2, 3, 5, 7, bytes.len()] {
            let chunks: Vec<Result<Vec<u8>, String>> =
                bytes.chunks(size).map(|c| Ok(c.to_vec())).collect();
            let text = block_on(consume(stream::iter(chunks), |_| {})).unwrap();
            assert_eq!(text, full, "chunk size {size}");
        }
    }

    #[test]
    fn test_split_multibyte_char_is_held_back() {
        let mut acc = TextAccumulator::new();
        let crab = "🦀".as_bytes();
        acc.push(&crab[..2]);
        assert_eq!(acc.as_str(), "");
        acc.push(&crab[2..]);
        assert_eq!(acc.as_str(), "🦀");
    }

    #[test]
    fn test_invalid_bytes_become_replacement_chars() {
        let mut acc = TextAccumulator::new();
        acc.push(b"ok \xff then");
        assert_eq!(acc.finish(), "ok \u{FFFD} then");
    }

    #[test]
    fn test_truncated_sequence_flushed_on_finish() {
        let mut acc = TextAccumulator::new();
        acc.push(b"end ");
        acc.push(&"é".as_bytes()[..1]);
        assert_eq!(acc.finish(), "end \u{FFFD}");
    }

    #[test]
    fn test_error_keeps_partial_text() {
        let chunks: Vec<Result<Vec<u8>, String>> = vec![
            Ok(b"partial ".to_vec()),
            Ok(b"text ".to_vec()),
            Err("connection reset".to_string()),
            Ok(b"never read".to_vec()),
        ];
        let mut last = String::new();
        let err = block_on(consume(stream::iter(chunks), |s| last = s.to_string())).unwrap_err();
        assert_eq!(err.partial, "partial text ");
        assert_eq!(err.source, "connection reset");
        assert_eq!(last, "partial text ");
    }

    #[test]
    fn test_empty_stream_yields_empty_text() {
        let chunks: Vec<Result<Vec<u8>, String>> = Vec::new();
        assert_eq!(block_on(consume(stream::iter(chunks), |_| {})).unwrap(), "");
    }
}
