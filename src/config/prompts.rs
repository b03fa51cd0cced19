//! Prompt templates for Referat.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory (`extraction.toml`, `merge.toml`).

use crate::extraction::Category;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub extraction: ExtractionPrompts,
    pub merge: MergePrompts,
}


/// System instructions for the four extraction categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPrompts {
    pub abstract_summary: String,
    pub key_points: String,
    pub action_items: String,
    pub sentiment: String,
}

impl Default for ExtractionPrompts {
    fn default() -> Self {
        Self {
            abstract_summary: "You are a highly skilled AI trained in language comprehension and \
                summarization. I would like you to read the following text and summarize it into a \
                concise abstract paragraph. Aim to retain the most important points, providing a \
                coherent and readable summary that could help a person understand the main points \
                of the discussion without needing to read the entire text. Please avoid unnecessary \
                details or tangential points."
                .to_string(),

            key_points: "You are a proficient AI with a specialty in distilling information into \
                key points. Based on the following text, identify and list the main points that \
                were discussed or brought up. These should be the most important ideas, findings, \
                or topics that are crucial to the essence of the discussion. Your goal is to \
                provide a list that someone could read to quickly understand what was talked about."
                .to_string(),

            action_items: "You are an AI expert in analyzing conversations and extracting action \
                items. Please review the text and identify any tasks, assignments, or actions that \
                were agreed upon or mentioned as needing to be done. These could be tasks assigned \
                to specific individuals, or general actions that the group has decided to take. \
                Please list these action items clearly and concisely."
                .to_string(),

            sentiment: "As an AI with expertise in language and emotion analysis, your task is to \
                analyze the sentiment of the following text. Please consider the overall tone of \
                the discussion, the emotion conveyed by the language used, and the context in \
                which words and phrases are used. Indicate whether the sentiment is generally \
                positive, negative, or neutral, and provide brief explanations for your analysis \
                where possible."
                .to_string(),
        }
    }
}

impl ExtractionPrompts {
    /// System instruction for a category.
    pub fn for_category(&self, category: Category) -> &str {
        match category {
            Category::AbstractSummary => &self.abstract_summary,
            Category::KeyPoints => &self.key_points,
            Category::ActionItems => &self.action_items,
            Category::Sentiment => &self.sentiment,
        }
    }
}

/// Prompt for the cohesion merge pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergePrompts {
    pub system: String,
}

impl Default for MergePrompts {
    fn default() -> Self {
        Self {
            system: "You are an AI language model trained to generate cohesive passages. You \
                always use the correct formatting such as paragraphs, code blocks, scientific \
                notation, bullet lists and numbered lists, etc. Given the following sections, \
                create a single coherent passage that captures the main points and information."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default templates, with optional overrides from
    /// a custom directory.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let extraction_path = custom_path.join("extraction.toml");
            if extraction_path.exists() {
                let content = std::fs::read_to_string(&extraction_path)?;
                prompts.extraction = toml::from_str(&content)?;
            }

            let merge_path = custom_path.join("merge.toml");
            if merge_path.exists() {
                let content = std::fs::read_to_string(&merge_path)?;
                prompts.merge = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts_are_nonempty() {
        let prompts = Prompts::default();
        for category in Category::ALL {
            assert!(!prompts.extraction.for_category(category).is_empty());
        }
        assert!(!prompts.merge.system.is_empty());
    }

    #[test]
    fn test_custom_extraction_prompts_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("extraction.toml"),
            "abstract_summary = \"Summarize briefly.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str()).unwrap();
        assert_eq!(prompts.extraction.abstract_summary, "Summarize briefly.");
        // Untouched categories fall back to defaults.
        assert!(!prompts.extraction.key_points.is_empty());
        assert!(!prompts.merge.system.is_empty());
    }
}
