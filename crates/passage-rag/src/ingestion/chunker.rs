//! Text chunking into fixed-stride overlapping windows
//!
//! Windows are cut on character boundaries with a stride of
//! `chunk_size - overlap`, so stripping the first `overlap` characters from
//! every segment after the first and concatenating reconstructs the
//! original text exactly. Offsets are character positions.

use uuid::Uuid;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::document::Segment;

/// Windowed chunker with configurable size and overlap
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker, rejecting invalid parameters
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chunk_size: config.chunk_size,
            overlap: config.overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into overlapping segments covering it completely.
    /// Text shorter than the chunk size yields exactly one segment.
    pub fn split(&self, document_id: Uuid, text: &str) -> Vec<Segment> {
        // Byte offset of every character, plus a sentinel for the text end
        let mut byte_offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        byte_offsets.push(text.len());
        let char_count = byte_offsets.len() - 1;

        let stride = self.chunk_size - self.overlap;
        let mut segments = Vec::new();
        let mut start = 0usize;

        loop {
            let end = (start + self.chunk_size).min(char_count);
            let content = text[byte_offsets[start]..byte_offsets[end]].to_string();
            segments.push(Segment::new(
                document_id,
                content,
                start,
                end,
                segments.len() as u32,
            ));
            if end == char_count {
                break;
            }
            start += stride;
        }

        segments
    }
}

/// Reassemble the original text from a document's segments by stripping the
/// leading overlap from every segment after the first. Inverse of
/// [`Chunker::split`]; mainly useful for verification.
pub fn reconstruct(segments: &[Segment], overlap: usize) -> String {
    let mut text = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i == 0 {
            text.push_str(&segment.content);
        } else {
            let tail: String = segment.content.chars().skip(overlap).collect();
            text.push_str(&tail);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chunker(chunk_size: usize, overlap: usize) -> Chunker {
        Chunker::new(ChunkingConfig::new(chunk_size, overlap)).unwrap()
    }

    #[test]
    fn short_text_yields_one_segment() {
        let segments = chunker(100, 10).split(Uuid::new_v4(), "short text");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].content, "short text");
        assert_eq!(segments[0].char_start, 0);
        assert_eq!(segments[0].char_end, 10);
    }

    #[test]
    fn exact_chunk_size_yields_one_segment() {
        let text = "a".repeat(50);
        let segments = chunker(50, 10).split(Uuid::new_v4(), &text);
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn consecutive_segments_overlap() {
        let text: String = ('a'..='z').collect();
        let segments = chunker(10, 4).split(Uuid::new_v4(), &text);
        assert!(segments.len() > 1);
        for pair in segments.windows(2) {
            let prev_tail: String = pair[0].content.chars().rev().take(4).collect::<Vec<_>>()
                .into_iter().rev().collect();
            let next_head: String = pair[1].content.chars().take(4).collect();
            assert_eq!(prev_tail, next_head);
            assert_eq!(pair[1].char_start, pair[0].char_start + 6);
        }
    }

    #[test]
    fn offsets_index_original_text() {
        let text = "héllo wörld, this is ünïcode text for chunking";
        let segments = chunker(12, 3).split(Uuid::new_v4(), text);
        let chars: Vec<char> = text.chars().collect();
        for segment in &segments {
            let expected: String = chars[segment.char_start..segment.char_end].iter().collect();
            assert_eq!(segment.content, expected);
        }
    }

    #[test]
    fn segment_indices_are_sequential() {
        let text = "x".repeat(100);
        let segments = chunker(10, 2).split(Uuid::new_v4(), &text);
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.segment_index, i as u32);
        }
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(Chunker::new(ChunkingConfig::new(10, 10)).is_err());
        assert!(Chunker::new(ChunkingConfig::new(0, 0)).is_err());
    }

    proptest! {
        #[test]
        fn reconstruction_is_lossless(
            text in "\\PC{0,300}",
            chunk_size in 2usize..60,
            overlap_fraction in 0usize..100,
        ) {
            let overlap = (overlap_fraction * (chunk_size - 1)) / 100;
            let segments = chunker(chunk_size, overlap).split(Uuid::new_v4(), &text);
            prop_assert_eq!(reconstruct(&segments, overlap), text);
        }
    }
}
