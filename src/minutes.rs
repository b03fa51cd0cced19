//! Final meeting minutes payload.

use crate::extraction::Category;
use serde::{Deserialize, Serialize};

/// The four cohesive passages produced by a full pipeline run.
///
/// Serializes with snake_case keys matching [`Category::key`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingMinutes {
    pub abstract_summary: String,
    pub key_points: String,
    pub action_items: String,
    pub sentiment: String,
}

impl MeetingMinutes {
    /// Passage for a category.
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::AbstractSummary => &self.abstract_summary,
            Category::KeyPoints => &self.key_points,
            Category::ActionItems => &self.action_items,
            Category::Sentiment => &self.sentiment,
        }
    }

    /// Set the passage for a category.
    pub fn set(&mut self, category: Category, passage: String) {
        match category {
            Category::AbstractSummary => self.abstract_summary = passage,
            Category::KeyPoints => self.key_points = passage,
            Category::ActionItems => self.action_items = passage,
            Category::Sentiment => self.sentiment = passage,
        }
    }

    /// Ordered (key, passage) pairs for rendering.
    pub fn sections(&self) -> Vec<(String, String)> {
        Category::ALL
            .iter()
            .map(|c| (c.key().to_string(), self.get(*c).to_string()))
            .collect()
    }
}
