//! Cohesion merge pass.
//!
//! Chunk-level extraction loses cross-chunk coherence; this second model pass
//! combines all per-chunk outputs for a category into one authoritative
//! passage.

use crate::completion::{Completer, CompletionRequest};
use crate::config::Prompts;
use crate::error::Result;
use crate::extraction::Category;
use crate::retry::RetryPolicy;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Merges per-chunk extraction outputs into one cohesive passage per category.
pub struct Merger {
    completer: Arc<dyn Completer>,
    prompts: Prompts,
    retry: RetryPolicy,
    max_tokens: u32,
}

impl Merger {
    /// Create a new merger with a bounded output-length cap.
    pub fn new(
        completer: Arc<dyn Completer>,
        prompts: Prompts,
        retry: RetryPolicy,
        max_tokens: u32,
    ) -> Self {
        Self {
            completer,
            prompts,
            retry,
            max_tokens,
        }
    }

    /// Merge all chunk outputs for one category into a single passage.
    ///
    /// The sections are newline-joined under the category title inside a
    /// single system message; the response is trimmed of surrounding
    /// whitespace.
    #[instrument(skip(self, sections), fields(category = %category, sections = sections.len()))]
    pub async fn merge(&self, category: Category, sections: &[String]) -> Result<String> {
        debug!("Merging {} sections for {}", sections.len(), category);

        let system = format!(
            "{}\n\n{}:\n{}",
            self.prompts.merge.system,
            category.title(),
            sections.join("\n")
        );

        let passage = self
            .retry
            .run("merge", || {
                self.completer.complete(CompletionRequest {
                    system: system.clone(),
                    user: Some(String::new()),
                    max_tokens: Some(self.max_tokens),
                })
            })
            .await?;

        Ok(passage.trim().to_string())
    }
}
