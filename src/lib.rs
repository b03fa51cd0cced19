//! Referat - Meeting Minutes from Recorded Audio
//!
//! A tool and HTTP service that turns recorded meetings into structured
//! minutes rendered as PDF.
//!
//! The name "Referat" comes from the Norwegian word for "meeting minutes."
//!
//! # Overview
//!
//! Referat allows you to:
//! - Transcribe recorded audio via a speech-to-text API
//! - Derive an abstract summary, key points, action items, and sentiment
//!   from the transcript with LLM prompts
//! - Merge per-chunk results into one cohesive passage per category
//! - Render the minutes as a paginated PDF
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `transcription` - Speech-to-text transcription with a TTL result cache
//! - `chunking` - Fixed-width transcript chunking
//! - `extraction` - Per-chunk note extraction (four categories)
//! - `merge` - Cohesion merge pass
//! - `render` - PDF rendering
//! - `pipeline` - Pipeline coordination
//! - `retry` - Exponential backoff for external API calls
//!
//! # Example
//!
//! ```rust,no_run
//! use referat::config::Settings;
//! use referat::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let transcript = pipeline.transcribe("meeting.mp3".as_ref()).await?;
//!     let minutes = pipeline.generate_minutes(&transcript, None).await?;
//!     println!("{}", minutes.abstract_summary);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod extraction;
pub mod merge;
pub mod minutes;
pub mod pipeline;
pub mod render;
pub mod retry;
pub mod transcription;

pub use error::{ReferatError, Result};
