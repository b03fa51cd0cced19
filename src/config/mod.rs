//! Configuration module for Referat.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ExtractionPrompts, MergePrompts, Prompts};
pub use settings::{
    ExtractionSettings, GeneralSettings, MergeSettings, PromptSettings, RenderSettings,
    RetrySettings, ServerSettings, Settings, TranscriptionSettings,
};
