//! Meeting minutes pipeline.
//!
//! Coordinates the strict linear flow: transcribe, chunk, per-chunk
//! extraction, per-category cohesive merge. The first unrecoverable error
//! aborts the whole run; no partial results are returned.

use crate::chunking::chunk_transcript;
use crate::completion::{Completer, OpenAICompleter};
use crate::config::{Prompts, Settings};
use crate::error::{ReferatError, Result};
use crate::extraction::{Category, Extractor};
use crate::merge::Merger;
use crate::minutes::MeetingMinutes;
use crate::render::PdfRenderer;
use crate::transcription::{CachedTranscriber, Transcriber, WhisperTranscriber};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, instrument};

/// The four extraction results for one chunk, indexed parallel to
/// [`Category::ALL`].
type ChunkNotes = [String; 4];

/// The main pipeline for turning transcripts into meeting minutes.
pub struct Pipeline {
    settings: Settings,
    transcriber: Arc<dyn Transcriber>,
    extractor: Extractor,
    merger: Merger,
    renderer: PdfRenderer,
}

impl Pipeline {
    /// Create a pipeline backed by the OpenAI APIs.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

        let extraction_completer: Arc<dyn Completer> =
            Arc::new(OpenAICompleter::new(&settings.extraction.model));
        let merge_completer: Arc<dyn Completer> =
            Arc::new(OpenAICompleter::new(&settings.merge.model));

        let whisper = Arc::new(WhisperTranscriber::with_config(
            &settings.transcription.model,
            settings.retry.policy(),
        ));
        let transcriber: Arc<dyn Transcriber> =
            Arc::new(CachedTranscriber::new(whisper, settings.cache_ttl()));

        Ok(Self::with_components(
            settings,
            transcriber,
            extraction_completer,
            merge_completer,
            prompts,
        ))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: Settings,
        transcriber: Arc<dyn Transcriber>,
        extraction_completer: Arc<dyn Completer>,
        merge_completer: Arc<dyn Completer>,
        prompts: Prompts,
    ) -> Self {
        let retry = settings.retry.policy();

        let extractor = Extractor::new(extraction_completer, prompts.clone(), retry.clone());
        let merger = Merger::new(
            merge_completer,
            prompts,
            retry,
            settings.merge.max_tokens,
        );
        let renderer = PdfRenderer::new(
            settings
                .render
                .font_dir
                .as_deref()
                .map(Settings::expand_path),
        );

        Self {
            settings,
            transcriber,
            extractor,
            merger,
            renderer,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the PDF renderer.
    pub fn renderer(&self) -> &PdfRenderer {
        &self.renderer
    }

    /// Transcribe an audio file, memoized per path.
    pub async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        self.transcriber.transcribe(audio_path).await
    }

    /// Generate meeting minutes from a transcript.
    pub async fn generate_minutes(
        &self,
        transcription: &str,
        chunk_size: Option<usize>,
    ) -> Result<MeetingMinutes> {
        self.generate_minutes_shared(transcription, chunk_size, None)
            .await
    }

    /// Generate meeting minutes, with an optional shared progress counter
    /// incremented once per completed chunk.
    #[instrument(skip_all, fields(transcript_chars = transcription.chars().count()))]
    pub async fn generate_minutes_shared(
        &self,
        transcription: &str,
        chunk_size: Option<usize>,
        progress: Option<Arc<AtomicU64>>,
    ) -> Result<MeetingMinutes> {
        let chunk_size = chunk_size.unwrap_or(self.settings.extraction.chunk_size);
        let chunks: Vec<&str> = chunk_transcript(transcription, chunk_size)?.collect();

        if chunks.is_empty() {
            return Err(ReferatError::InvalidInput(
                "transcription is empty".to_string(),
            ));
        }

        info!("Processing {} transcript chunks", chunks.len());

        let chunk_notes = if self.settings.extraction.max_concurrent <= 1 {
            self.extract_sequential(&chunks, progress).await?
        } else {
            self.extract_concurrent(&chunks, progress).await?
        };

        // Every chunk contributed one result per category; merge only runs
        // once all of them are in.
        let mut minutes = MeetingMinutes::default();
        for (idx, category) in Category::ALL.into_iter().enumerate() {
            let sections: Vec<String> = chunk_notes.iter().map(|n| n[idx].clone()).collect();
            let passage = self.merger.merge(category, &sections).await?;
            minutes.set(category, passage);
        }

        Ok(minutes)
    }

    /// Extract all categories for one chunk.
    async fn extract_chunk(&self, chunk: &str) -> Result<ChunkNotes> {
        let mut notes = ChunkNotes::default();
        for (idx, category) in Category::ALL.into_iter().enumerate() {
            notes[idx] = self.extractor.extract(category, chunk).await?;
        }
        Ok(notes)
    }

    /// Original sequential loop with a fixed inter-chunk delay, throttling
    /// requests against upstream rate limits.
    async fn extract_sequential(
        &self,
        chunks: &[&str],
        progress: Option<Arc<AtomicU64>>,
    ) -> Result<Vec<ChunkNotes>> {
        let mut results = Vec::with_capacity(chunks.len());

        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.settings.chunk_delay()).await;
            }

            results.push(self.extract_chunk(chunk).await?);
            if let Some(p) = &progress {
                p.fetch_add(1, Ordering::Relaxed);
            }
        }

        Ok(results)
    }

    /// Concurrency-bounded chunk processing. `buffered` keeps completion
    /// order aligned with chunk order, so per-category results stay ordered.
    async fn extract_concurrent(
        &self,
        chunks: &[&str],
        progress: Option<Arc<AtomicU64>>,
    ) -> Result<Vec<ChunkNotes>> {
        stream::iter(chunks.iter().copied())
            .map(|chunk| {
                let progress = progress.clone();
                async move {
                    let notes = self.extract_chunk(chunk).await?;
                    if let Some(p) = &progress {
                        p.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(notes)
                }
            })
            .buffered(self.settings.extraction.max_concurrent)
            // Boxing erases the map closure's type, working around rustc's
            // higher-ranked lifetime inference failing on closures over &str
            // when this future flows into an axum handler
            // (rust-lang/rust#89976).
            .boxed()
            .try_collect()
            .await
    }
}
