//! Configuration settings for Referat.

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcription: TranscriptionSettings,
    pub extraction: ExtractionSettings,
    pub merge: MergeSettings,
    pub retry: RetrySettings,
    pub render: RenderSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where rendered PDFs are written.
    pub output_dir: String,
    /// Directory where uploaded audio files are stored.
    pub upload_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            upload_dir: "uploads".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Speech-to-text model to use.
    pub model: String,
    /// How long a transcription result stays memoized per file path, in seconds.
    pub cache_ttl_seconds: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            cache_ttl_seconds: 3600,
        }
    }
}

/// Per-chunk extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Chat model used for the four extraction categories.
    pub model: String,
    /// Default transcript chunk size in characters.
    pub chunk_size: usize,
    /// Maximum chunks processed concurrently. 1 means strictly sequential.
    pub max_concurrent: usize,
    /// Delay between chunks when processing sequentially, in milliseconds.
    /// Throttles requests against upstream rate limits.
    pub chunk_delay_ms: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            chunk_size: 25000,
            max_concurrent: 1,
            chunk_delay_ms: 1000,
        }
    }
}

/// Cohesion merge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Chat model used for the cohesive merge pass.
    pub model: String,
    /// Output-length cap for merged passages.
    pub max_tokens: u32,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            max_tokens: 400,
        }
    }
}

/// Retry policy settings, applied to every external API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum attempts before an error becomes terminal.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Multiplier applied to the delay after each failed attempt.
    pub factor: f64,
    /// Upper bound for a single delay, in seconds.
    pub max_delay_seconds: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay_ms: 1000,
            factor: 4.0,
            max_delay_seconds: 60,
        }
    }
}

impl RetrySettings {
    /// Build the retry policy described by these settings.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            self.factor,
            Duration::from_secs(self.max_delay_seconds),
        )
    }
}

/// PDF rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct RenderSettings {
    /// Directory containing TTF fonts for the PDF renderer. When unset,
    /// common system font locations are searched.
    pub font_dir: Option<String>,
}


/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Maximum accepted upload size in megabytes.
    pub max_upload_mb: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_upload_mb: 50,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ReferatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("referat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Get the expanded upload directory path.
    pub fn upload_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.upload_dir)
    }

    /// Transcription cache time-to-live.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.transcription.cache_ttl_seconds)
    }

    /// Delay between sequential chunk extractions.
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.extraction.chunk_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_expectations() {
        let settings = Settings::default();
        assert_eq!(settings.extraction.chunk_size, 25000);
        assert_eq!(settings.retry.max_attempts, 10);
        assert_eq!(settings.transcription.model, "whisper-1");
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let settings = Settings::default();
        let serialized = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.extraction.chunk_size, settings.extraction.chunk_size);
        assert_eq!(parsed.server.port, settings.server.port);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Settings = toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.extraction.chunk_size, 25000);
    }
}
