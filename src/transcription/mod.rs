//! Transcription module for Referat.
//!
//! Converts audio files to plain-text transcripts through the OpenAI
//! speech-to-text API, with a TTL-bounded per-path result cache in front of
//! the network call.

mod cache;
mod whisper;

pub use cache::CachedTranscriber;
pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file and return the plain-text transcript.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}
