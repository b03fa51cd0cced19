//! Fixed-width transcript chunking.
//!
//! Splits a transcript into character windows small enough to fit a model's
//! context, with no gaps and no overlap. Chunk boundaries are counted in
//! characters so multi-byte text is never split mid-codepoint.

use crate::error::{ReferatError, Result};

/// Lazy iterator over fixed-width transcript chunks.
///
/// Yields borrowed slices of the source text in original order. The final
/// chunk may be shorter than the requested size.
pub struct Chunks<'a> {
    rest: &'a str,
    chunk_size: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        // Byte offset of the first character past the window, or the whole
        // remainder if fewer than chunk_size characters are left.
        let end = self
            .rest
            .char_indices()
            .nth(self.chunk_size)
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest.len());

        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

/// Split a transcript into chunks of at most `chunk_size` characters.
///
/// Returns an error if `chunk_size` is zero; an empty transcript yields an
/// empty iterator.
pub fn chunk_transcript(text: &str, chunk_size: usize) -> Result<Chunks<'_>> {
    if chunk_size == 0 {
        return Err(ReferatError::InvalidInput(
            "chunk_size must be a positive integer".to_string(),
        ));
    }

    Ok(Chunks {
        rest: text,
        chunk_size,
    })
}
