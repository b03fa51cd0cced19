//! CLI command implementations.

mod config;
mod minutes;
mod serve;
mod transcribe;

pub use config::run_config;
pub use minutes::run_minutes;
pub use serve::run_serve;
pub use transcribe::run_transcribe;
