//! Core data models for the top stories reader
//!
//! This module contains the category identifier, the story projection shown in
//! the UI, and the provider client that produces them.

pub mod top_stories;

pub use top_stories::{FetchError, StoryProvider, TopStoriesClient, MAX_STORIES};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Image reference used when a provider record has no multimedia
pub const PLACEHOLDER_IMAGE: &str = "placeholder.jpg";

/// Sections offered as tabs, in display order
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "home",
    "world",
    "us",
    "politics",
    "business",
    "technology",
    "science",
    "health",
    "sports",
    "arts",
    "books",
    "food",
    "travel",
    "opinion",
];

/// A news section identifier such as `world` or `technology`
///
/// Categories are interpolated into both the request path and the storage
/// keys, so only lowercase ASCII letters, digits and `-` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Parses a category, trimming and lowercasing the input
    ///
    /// Returns `None` for an empty string or one containing other characters.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        valid.then_some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns the tab categories in display order
pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .filter_map(|name| Category::parse(name))
        .collect()
}

/// The minimal projection of a provider record needed for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySummary {
    pub title: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    /// Link to the full article
    pub url: String,
    /// First multimedia URL, or [`PLACEHOLDER_IMAGE`]
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}
