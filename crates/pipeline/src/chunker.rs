//! Text chunking with configurable size and overlap.

use ragline_core::{AppError, AppResult};

/// Splits document text into overlapping fixed-size segments.
///
/// Sizes are measured in characters, and chunk boundaries always fall on
/// UTF-8 character boundaries. Each chunk after the first begins
/// `chunk_size - overlap` characters after the previous chunk's start, and
/// trailing content shorter than `chunk_size` is kept.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker.
    ///
    /// `overlap >= chunk_size` is a configuration error, rejected here
    /// rather than at chunking time.
    pub fn new(chunk_size: usize, overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        if overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "overlap ({}) must be less than chunk_size ({})",
                overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Split text into ordered overlapping chunks covering the whole input.
    ///
    /// A document shorter than `chunk_size` yields exactly one chunk; empty
    /// input yields none. For input of L characters with L > chunk_size S
    /// and overlap O, this produces `ceil((L - O) / (S - O))` chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return vec![];
        }

        // Byte offset of every character boundary, plus the end of input,
        // so character windows map cleanly onto byte slices.
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());

        let total_chars = boundaries.len() - 1;
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0usize;

        loop {
            let end = (start + self.chunk_size).min(total_chars);
            chunks.push(text[boundaries[start]..boundaries[end]].to_string());

            // The final chunk is the one that reaches the end of input;
            // stepping past it would only re-emit overlap.
            if end == total_chars {
                break;
            }

            start += step;
        }

        tracing::debug!(
            "Chunked {} chars into {} chunks (size: {}, overlap: {})",
            total_chars,
            chunks.len(),
            self.chunk_size,
            self.overlap
        );

        chunks
    }

    /// Maximum chunk length in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap between consecutive chunks in characters.
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn test_rejects_overlap_not_less_than_size() {
        assert!(Chunker::new(100, 100).is_err());
        assert!(Chunker::new(100, 150).is_err());
        assert!(Chunker::new(0, 0).is_err());
        assert!(Chunker::new(100, 99).is_ok());
    }

    #[test]
    fn test_short_document_yields_one_chunk() {
        let chunker = Chunker::new(100, 10).unwrap();
        let chunks = chunker.chunk("short text");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "short text");
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunker = Chunker::new(100, 10).unwrap();
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn test_chunk_count_formula() {
        // ceil((L - O) / (S - O)) for L > S
        for &(l, s, o) in &[(1000, 200, 50), (950, 200, 50), (300, 100, 0), (513, 512, 64)] {
            let chunker = Chunker::new(s, o).unwrap();
            let text = "x".repeat(l);
            let chunks = chunker.chunk(&text);

            let expected = (l - o).div_ceil(s - o);
            assert_eq!(
                chunks.len(),
                expected,
                "L={}, S={}, O={}: got {} chunks",
                l,
                s,
                o,
                chunks.len()
            );

            for chunk in &chunks {
                assert!(char_len(chunk) <= s);
            }
        }
    }

    #[test]
    fn test_overlap_region_reproduced_exactly() {
        let chunker = Chunker::new(50, 10).unwrap();
        let text: String = ('a'..='z').cycle().take(500).collect();
        let chunks = chunker.chunk(&text);

        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(50 - 10).collect();
            let head: String = pair[1].chars().take(10).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_covers_whole_text_including_tail() {
        let chunker = Chunker::new(100, 20).unwrap();
        let text = "y".repeat(250);
        let chunks = chunker.chunk(&text);

        // Last chunk must end exactly at the end of input
        let last = chunks.last().unwrap();
        assert!(text.ends_with(last.as_str()));

        // Reassemble by dropping each successor's overlap prefix
        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk.chars().skip(20).collect::<String>());
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_multibyte_boundaries() {
        let chunker = Chunker::new(10, 2).unwrap();
        let text = "日本語のテキストです。".repeat(5);
        let chunks = chunker.chunk(&text);

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(char_len(chunk) <= 10);
        }
        // No panics on multibyte input means boundaries were respected
    }
}
