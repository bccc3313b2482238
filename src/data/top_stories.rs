//! Top Stories API client
//!
//! Fetches a section's top stories from the provider and projects the first
//! few records into [`StorySummary`] values.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{Category, StorySummary, PLACEHOLDER_IMAGE};

/// Default provider host
const DEFAULT_BASE_URL: &str = "https://api.nytimes.com";

/// Maximum number of stories kept from a single response
pub const MAX_STORIES: usize = 5;

/// Errors that can occur when fetching top stories
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("Provider returned HTTP status {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse API response: {0}")]
    Parse(#[from] serde_json::Error),

    /// No API key was configured
    #[error("No API key configured")]
    MissingApiKey,
}

/// Response body of the top stories endpoint
#[derive(Debug, Deserialize)]
struct ApiResponse {
    results: Vec<StoryRecord>,
}

/// A single story record from the API
#[derive(Debug, Deserialize)]
struct StoryRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "abstract")]
    summary: Option<String>,
    #[serde(default)]
    url: Option<String>,
    /// Sent as `null` by some sections
    #[serde(default)]
    multimedia: Option<Vec<Multimedia>>,
}

#[derive(Debug, Deserialize)]
struct Multimedia {
    url: Option<String>,
}

impl StoryRecord {
    fn into_summary(self) -> StorySummary {
        let image_url = self
            .multimedia
            .and_then(|media| media.into_iter().next())
            .and_then(|m| m.url)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

        StorySummary {
            title: self.title.unwrap_or_default(),
            summary: self.summary.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            image_url,
        }
    }
}

/// Source of top stories for a category
///
/// The feed controller only depends on this trait, so tests can swap the
/// HTTP client for a scripted provider.
#[async_trait]
pub trait StoryProvider: Send + Sync {
    /// Fetches at most [`MAX_STORIES`] stories for `category`, in provider order
    async fn fetch_top_stories(&self, category: &Category) -> Result<Vec<StorySummary>, FetchError>;
}

/// Client for the provider's top stories endpoint
#[derive(Debug, Clone)]
pub struct TopStoriesClient {
    /// HTTP client for making requests
    http_client: Client,
    /// API key appended to every request
    api_key: String,
    /// Provider host (allows override for testing)
    base_url: String,
}

impl TopStoriesClient {
    /// Creates a client against the default provider host
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom host, e.g. a local proxy or test server
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds the endpoint URL for a category, without the API key
    fn endpoint(&self, category: &Category) -> String {
        format!("{}/svc/topstories/v2/{}.json", self.base_url, category)
    }

    /// Parses a response body into at most [`MAX_STORIES`] summaries
    fn parse_body(body: &str) -> Result<Vec<StorySummary>, FetchError> {
        let response: ApiResponse = serde_json::from_str(body)?;
        Ok(response
            .results
            .into_iter()
            .take(MAX_STORIES)
            .map(StoryRecord::into_summary)
            .collect())
    }
}

#[async_trait]
impl StoryProvider for TopStoriesClient {
    async fn fetch_top_stories(&self, category: &Category) -> Result<Vec<StorySummary>, FetchError> {
        if self.api_key.is_empty() {
            return Err(FetchError::MissingApiKey);
        }

        let response = self
            .http_client
            .get(self.endpoint(category))
            .query(&[("api-key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        Self::parse_body(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json(i: usize) -> String {
        format!(
            r#"{{"title":"Story {i}","abstract":"Abstract {i}","url":"https://example.com/{i}","multimedia":[{{"url":"https://img.example.com/{i}.jpg"}}]}}"#
        )
    }

    fn body_with(n: usize) -> String {
        let records: Vec<String> = (0..n).map(record_json).collect();
        format!(r#"{{"status":"OK","results":[{}]}}"#, records.join(","))
    }

    #[test]
    fn test_parse_body_truncates_to_max_stories_in_order() {
        let stories = TopStoriesClient::parse_body(&body_with(7)).unwrap();

        assert_eq!(stories.len(), MAX_STORIES);
        for (i, story) in stories.iter().enumerate() {
            assert_eq!(story.title, format!("Story {i}"));
            assert_eq!(story.image_url, format!("https://img.example.com/{i}.jpg"));
        }
    }

    #[test]
    fn test_parse_body_keeps_short_results() {
        let stories = TopStoriesClient::parse_body(&body_with(2)).unwrap();
        assert_eq!(stories.len(), 2);
    }

    #[test]
    fn test_missing_multimedia_falls_back_to_placeholder() {
        let body = r#"{"results":[
            {"title":"No media","abstract":"a","url":"u1"},
            {"title":"Null media","abstract":"b","url":"u2","multimedia":null},
            {"title":"Empty media","abstract":"c","url":"u3","multimedia":[]}
        ]}"#;

        let stories = TopStoriesClient::parse_body(body).unwrap();

        assert_eq!(stories.len(), 3);
        for story in &stories {
            assert_eq!(story.image_url, PLACEHOLDER_IMAGE);
        }
    }

    #[test]
    fn test_missing_text_fields_become_empty() {
        let body = r#"{"results":[{"multimedia":[{"url":"https://img/1.jpg"}]}]}"#;

        let stories = TopStoriesClient::parse_body(body).unwrap();

        assert_eq!(stories[0].title, "");
        assert_eq!(stories[0].summary, "");
        assert_eq!(stories[0].url, "");
        assert_eq!(stories[0].image_url, "https://img/1.jpg");
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let result = TopStoriesClient::parse_body("<html>rate limited</html>");
        assert!(matches!(result, Err(FetchError::Parse(_))));

        let result = TopStoriesClient::parse_body(r#"{"status":"OK"}"#);
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_endpoint_format() {
        let client = TopStoriesClient::with_base_url("key", "http://localhost:1234/");
        let category = Category::parse("technology").unwrap();

        assert_eq!(
            client.endpoint(&category),
            "http://localhost:1234/svc/topstories/v2/technology.json"
        );
    }

    #[test]
    fn test_default_client_targets_provider_host() {
        let client = TopStoriesClient::new("key");
        assert!(client.base_url.contains("api.nytimes.com"));
    }

    #[tokio::test]
    async fn test_empty_api_key_is_rejected_before_request() {
        let client = TopStoriesClient::with_base_url("", "http://127.0.0.1:9");
        let category = Category::parse("world").unwrap();

        let result = client.fetch_top_stories(&category).await;

        assert!(matches!(result, Err(FetchError::MissingApiKey)));
    }
}
