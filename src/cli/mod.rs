//! CLI module for Referat.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Referat - Meeting minutes from recorded audio
///
/// Transcribes audio, derives structured meeting notes with an LLM, and
/// renders the result as a PDF. The name "Referat" comes from the Norwegian
/// word for "meeting minutes."
#[derive(Parser, Debug)]
#[command(name = "referat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a local audio file
    Transcribe {
        /// Path to the audio file
        audio: String,

        /// Write the transcript to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate meeting minutes from a transcript file
    Minutes {
        /// Path to a plain-text transcript file
        transcript: String,

        /// Transcript chunk size in characters
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Output PDF path (defaults to <output_dir>/meeting_minutes.pdf)
        #[arg(short, long)]
        output: Option<String>,

        /// Print the minutes as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
