//! OpenAI Whisper transcription implementation.

use super::Transcriber;
use crate::completion::create_client;
use crate::error::{ReferatError, Result};
use crate::retry::RetryPolicy;
use async_openai::types::CreateTranscriptionRequestArgs;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument};

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    retry: RetryPolicy,
}

impl WhisperTranscriber {
    /// Create a new Whisper transcriber with default settings.
    pub fn new() -> Self {
        Self::with_config("whisper-1", RetryPolicy::default())
    }

    /// Create a new Whisper transcriber with custom configuration.
    pub fn with_config(model: &str, retry: RetryPolicy) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            retry,
        }
    }
}

impl Default for WhisperTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        let transcript = self
            .retry
            .run("transcribe", || {
                let file_name = file_name.clone();
                let file_bytes = file_bytes.clone();
                async move {
                    let request = CreateTranscriptionRequestArgs::default()
                        .file(async_openai::types::AudioInput::from_vec_u8(
                            file_name, file_bytes,
                        ))
                        .model(&self.model)
                        .build()
                        .map_err(|e| {
                            ReferatError::Transcription(format!("Failed to build request: {}", e))
                        })?;

                    let response = self
                        .client
                        .audio()
                        .transcribe(request)
                        .await
                        .map_err(|e| ReferatError::OpenAI(format!("Whisper API error: {}", e)))?;

                    Ok(response.text)
                }
            })
            .await?;

        debug!("Transcribed {} characters", transcript.len());
        Ok(transcript)
    }
}
