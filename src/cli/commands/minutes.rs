//! Minutes command implementation.

use crate::chunking::chunk_transcript;
use crate::cli::Output;
use crate::completion::is_api_key_configured;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::render::heading_from_key;
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Run the minutes command: transcript file in, PDF (and optionally JSON) out.
pub async fn run_minutes(
    transcript_path: &str,
    chunk_size: Option<usize>,
    output: Option<String>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    if !is_api_key_configured() {
        Output::error("OPENAI_API_KEY is not set.");
        return Err(anyhow::anyhow!("missing API key"));
    }

    let pipeline = Pipeline::new(settings)?;
    run_minutes_with_pipeline(&pipeline, transcript_path, chunk_size, output, json).await
}

/// Run the minutes command against an existing pipeline.
pub async fn run_minutes_with_pipeline(
    pipeline: &Pipeline,
    transcript_path: &str,
    chunk_size: Option<usize>,
    output: Option<String>,
    json: bool,
) -> Result<()> {
    let transcription = std::fs::read_to_string(transcript_path)?;
    if transcription.trim().is_empty() {
        Output::error("Transcript file is empty.");
        return Err(anyhow::anyhow!("transcript file is empty"));
    }

    let pdf_path = match output {
        Some(path) => std::path::PathBuf::from(path),
        None => pipeline
            .settings()
            .output_dir()
            .join("meeting_minutes.pdf"),
    };

    let size = chunk_size.unwrap_or(pipeline.settings().extraction.chunk_size);
    let chunk_count = chunk_transcript(&transcription, size)?.count();

    Output::info(&format!(
        "Generating minutes from {} chunk(s)...",
        chunk_count
    ));

    let progress = Arc::new(AtomicU64::new(0));
    let pb = Output::progress_bar(chunk_count as u64, "extracting");

    let minutes = {
        let run = pipeline.generate_minutes_shared(&transcription, chunk_size, Some(progress.clone()));
        tokio::pin!(run);

        loop {
            tokio::select! {
                result = &mut run => break result?,
                _ = tokio::time::sleep(std::time::Duration::from_millis(100)) => {
                    pb.set_position(progress.load(Ordering::Relaxed));
                }
            }
        }
    };
    pb.finish_and_clear();

    pipeline.renderer().render(&minutes.sections(), &pdf_path)?;
    Output::success(&format!("Minutes written to {}", pdf_path.display()));

    if json {
        println!("{}", serde_json::to_string_pretty(&minutes)?);
    } else {
        for (key, body) in minutes.sections() {
            Output::section(&heading_from_key(&key), &body);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{Completer, CompletionRequest};
    use crate::config::Prompts;
    use crate::error::ReferatError;
    use crate::transcription::Transcriber;
    use async_trait::async_trait;
    use std::path::Path;

    struct StaticCompleter {
        response: String,
    }

    #[async_trait]
    impl Completer for StaticCompleter {
        async fn complete(&self, _request: CompletionRequest) -> crate::error::Result<String> {
            Ok(self.response.clone())
        }
    }

    struct FixedTranscriber;

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, _audio_path: &Path) -> crate::error::Result<String> {
            Ok("a transcript".to_string())
        }
    }

    fn mock_pipeline(settings: Settings) -> Pipeline {
        Pipeline::with_components(
            settings,
            Arc::new(FixedTranscriber),
            Arc::new(StaticCompleter {
                response: "extracted".to_string(),
            }),
            Arc::new(StaticCompleter {
                response: "a cohesive passage".to_string(),
            }),
            Prompts::default(),
        )
    }

    #[tokio::test]
    async fn test_minutes_command_writes_pdf_to_requested_path() {
        let dir = tempfile::tempdir().unwrap();
        let transcript_path = dir.path().join("transcript.txt");
        std::fs::write(&transcript_path, "The team discussed the quarterly roadmap.").unwrap();
        let pdf_path = dir.path().join("out").join("minutes.pdf");

        let mut settings = Settings::default();
        settings.extraction.chunk_delay_ms = 0;
        let pipeline = mock_pipeline(settings);

        let result = run_minutes_with_pipeline(
            &pipeline,
            transcript_path.to_str().unwrap(),
            Some(10),
            Some(pdf_path.display().to_string()),
            false,
        )
        .await;

        match result {
            Ok(()) => {
                let bytes = std::fs::read(&pdf_path).unwrap();
                assert!(bytes.starts_with(b"%PDF"));
            }
            Err(e) => {
                // No TTF fonts available on this machine.
                match e.downcast_ref::<ReferatError>() {
                    Some(ReferatError::Render(_)) => {}
                    _ => panic!("unexpected error: {}", e),
                }
            }
        }
    }

    #[tokio::test]
    async fn test_minutes_command_rejects_empty_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let transcript_path = dir.path().join("empty.txt");
        std::fs::write(&transcript_path, "   \n").unwrap();

        let pipeline = mock_pipeline(Settings::default());

        let result = run_minutes_with_pipeline(
            &pipeline,
            transcript_path.to_str().unwrap(),
            None,
            None,
            false,
        )
        .await;

        assert!(result.is_err());
    }
}
