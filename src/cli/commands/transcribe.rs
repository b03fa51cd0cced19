//! Transcribe command implementation.

use crate::cli::Output;
use crate::completion::is_api_key_configured;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;
use std::path::Path;

/// Run the transcribe command.
pub async fn run_transcribe(
    audio: &str,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    if !is_api_key_configured() {
        Output::error("OPENAI_API_KEY is not set.");
        return Err(anyhow::anyhow!("missing API key"));
    }

    let pipeline = Pipeline::new(settings)?;
    run_transcribe_with_pipeline(&pipeline, audio, output).await
}

/// Run the transcribe command against an existing pipeline.
pub async fn run_transcribe_with_pipeline(
    pipeline: &Pipeline,
    audio: &str,
    output: Option<String>,
) -> Result<()> {
    let audio_path = Path::new(audio);
    if !audio_path.exists() {
        Output::error(&format!("Audio file not found: {}", audio));
        return Err(anyhow::anyhow!("audio file not found"));
    }

    let spinner = Output::spinner("Transcribing...");
    let transcript = pipeline.transcribe(audio_path).await?;
    spinner.finish_and_clear();

    match output {
        Some(path) => {
            std::fs::write(&path, &transcript)?;
            Output::success(&format!("Transcript written to {}", path));
        }
        None => println!("{}", transcript),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{Completer, CompletionRequest};
    use crate::config::Prompts;
    use crate::transcription::Transcriber;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StaticCompleter;

    #[async_trait]
    impl Completer for StaticCompleter {
        async fn complete(&self, _request: CompletionRequest) -> crate::error::Result<String> {
            Ok("unused".to_string())
        }
    }

    struct FixedTranscriber;

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, _audio_path: &Path) -> crate::error::Result<String> {
            Ok("the whole transcript".to_string())
        }
    }

    fn mock_pipeline() -> Pipeline {
        Pipeline::with_components(
            Settings::default(),
            Arc::new(FixedTranscriber),
            Arc::new(StaticCompleter),
            Arc::new(StaticCompleter),
            Prompts::default(),
        )
    }

    #[tokio::test]
    async fn test_transcribe_command_writes_transcript_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let audio_path = dir.path().join("meeting.mp3");
        std::fs::write(&audio_path, b"fake audio").unwrap();
        let out_path = dir.path().join("transcript.txt");

        let pipeline = mock_pipeline();
        run_transcribe_with_pipeline(
            &pipeline,
            audio_path.to_str().unwrap(),
            Some(out_path.display().to_string()),
        )
        .await
        .unwrap();

        let written = std::fs::read_to_string(&out_path).unwrap();
        assert_eq!(written, "the whole transcript");
    }

    #[tokio::test]
    async fn test_transcribe_command_rejects_missing_audio() {
        let pipeline = mock_pipeline();
        let result =
            run_transcribe_with_pipeline(&pipeline, "/nonexistent/audio.mp3", None).await;
        assert!(result.is_err());
    }
}
