//! Per-chunk note extraction.
//!
//! Each transcript chunk is run through four independent, stateless
//! transformations, one per note category, each with its own fixed system
//! instruction.

use crate::completion::{Completer, CompletionRequest};
use crate::config::Prompts;
use crate::error::Result;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// The fixed set of note categories derived from a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AbstractSummary,
    KeyPoints,
    ActionItems,
    Sentiment,
}

impl Category {
    /// All categories, in the order they appear in rendered minutes.
    pub const ALL: [Category; 4] = [
        Category::AbstractSummary,
        Category::KeyPoints,
        Category::ActionItems,
        Category::Sentiment,
    ];

    /// Stable snake_case key, used in JSON payloads and section maps.
    pub fn key(&self) -> &'static str {
        match self {
            Category::AbstractSummary => "abstract_summary",
            Category::KeyPoints => "key_points",
            Category::ActionItems => "action_items",
            Category::Sentiment => "sentiment",
        }
    }

    /// Human-readable title, used in prompts and document headings.
    pub fn title(&self) -> &'static str {
        match self {
            Category::AbstractSummary => "Abstract Summary",
            Category::KeyPoints => "Key Points",
            Category::ActionItems => "Action Items",
            Category::Sentiment => "Sentiment Analysis",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abstract_summary" => Ok(Category::AbstractSummary),
            "key_points" => Ok(Category::KeyPoints),
            "action_items" => Ok(Category::ActionItems),
            "sentiment" => Ok(Category::Sentiment),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Extracts one note category from one transcript chunk.
pub struct Extractor {
    completer: Arc<dyn Completer>,
    prompts: Prompts,
    retry: RetryPolicy,
}

impl Extractor {
    /// Create a new extractor.
    pub fn new(completer: Arc<dyn Completer>, prompts: Prompts, retry: RetryPolicy) -> Self {
        Self {
            completer,
            prompts,
            retry,
        }
    }

    /// Run one (chunk, category) extraction and return the response text.
    #[instrument(skip(self, chunk), fields(category = %category, chunk_chars = chunk.chars().count()))]
    pub async fn extract(&self, category: Category, chunk: &str) -> Result<String> {
        debug!("Extracting {}", category);

        let system = self.prompts.extraction.for_category(category).to_string();

        self.retry
            .run(category.key(), || {
                self.completer.complete(CompletionRequest {
                    system: system.clone(),
                    user: Some(chunk.to_string()),
                    max_tokens: None,
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReferatError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Completer that records requests and replays canned responses.
    struct MockCompleter {
        requests: Mutex<Vec<CompletionRequest>>,
        response: String,
    }

    impl MockCompleter {
        fn new(response: &str) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                response: response.to_string(),
            }
        }
    }

    #[async_trait]
    impl Completer for MockCompleter {
        async fn complete(&self, request: CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_extraction_returns_response_unmodified() {
        let completer = Arc::new(MockCompleter::new("The team agreed on the roadmap.  "));
        let extractor = Extractor::new(
            completer.clone(),
            Prompts::default(),
            RetryPolicy::no_retry(),
        );

        for category in Category::ALL {
            let result = extractor.extract(category, "chunk text").await.unwrap();
            assert_eq!(result, "The team agreed on the roadmap.  ");
        }
        assert_eq!(completer.requests.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_extraction_sends_category_prompt_and_chunk() {
        let completer = Arc::new(MockCompleter::new("ok"));
        let prompts = Prompts::default();
        let extractor = Extractor::new(completer.clone(), prompts.clone(), RetryPolicy::no_retry());

        extractor
            .extract(Category::ActionItems, "Alice will send the report.")
            .await
            .unwrap();

        let requests = completer.requests.lock().unwrap();
        assert_eq!(requests[0].system, prompts.extraction.action_items);
        assert_eq!(
            requests[0].user.as_deref(),
            Some("Alice will send the report.")
        );
        assert_eq!(requests[0].max_tokens, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extraction_retries_transient_failures() {
        struct FlakyCompleter {
            failures_left: Mutex<u32>,
        }

        #[async_trait]
        impl Completer for FlakyCompleter {
            async fn complete(&self, _request: CompletionRequest) -> Result<String> {
                let mut left = self.failures_left.lock().unwrap();
                if *left > 0 {
                    *left -= 1;
                    return Err(ReferatError::OpenAI("rate limited".to_string()));
                }
                Ok("recovered".to_string())
            }
        }

        let completer = Arc::new(FlakyCompleter {
            failures_left: Mutex::new(2),
        });
        let retry = RetryPolicy::new(
            5,
            std::time::Duration::from_millis(10),
            2.0,
            std::time::Duration::from_secs(1),
        );
        let extractor = Extractor::new(completer, Prompts::default(), retry);

        let result = extractor
            .extract(Category::KeyPoints, "chunk")
            .await
            .unwrap();
        assert_eq!(result, "recovered");
    }

    #[test]
    fn test_category_keys_parse_back() {
        for category in Category::ALL {
            assert_eq!(category.key().parse::<Category>().unwrap(), category);
        }
    }
}
