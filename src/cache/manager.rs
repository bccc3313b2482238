//! Story cache over a key-value store
//!
//! Provides a `StoryCache` that writes a category's stories and timestamp
//! together and reads them back with a freshness check.

use thiserror::Error;

use crate::data::{Category, StorySummary};
use crate::storage::{KeyValueStore, StorageError};

/// How long a cached category stays fresh, in milliseconds (10 minutes)
pub const DEFAULT_TTL_MILLIS: i64 = 600_000;

/// Errors that can occur while reading or writing cached stories
#[derive(Debug, Error)]
pub enum CacheError {
    /// The underlying store failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A cached value exists but cannot be decoded
    #[error("corrupt cache value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    /// The stories could not be encoded for storage
    #[error("failed to encode stories: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage key holding a category's JSON-encoded stories
pub fn stories_key(category: &Category) -> String {
    format!("stories_{}", category)
}

/// Storage key holding a category's fetch time in epoch milliseconds
pub fn timestamp_key(category: &Category) -> String {
    format!("timestamp_{}", category)
}

/// A category's cached stories and when they were fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub category: Category,
    pub stories: Vec<StorySummary>,
    pub fetched_at_millis: i64,
}

impl CacheEntry {
    /// Milliseconds elapsed since the fetch, saturating at the i64 bounds
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.fetched_at_millis)
    }

    /// True while the age is non-negative and strictly below `ttl_millis`
    ///
    /// A timestamp in the future is never fresh.
    pub fn is_fresh(&self, now_millis: i64, ttl_millis: i64) -> bool {
        let age = self.age_millis(now_millis);
        (0..ttl_millis).contains(&age)
    }
}

/// Reads and writes per-category story entries
#[derive(Debug, Clone)]
pub struct StoryCache<S> {
    store: S,
}

impl<S: KeyValueStore> StoryCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access to the backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the entry for `category`
    ///
    /// # Returns
    /// * `Ok(Some(entry))` if both keys are present and decode
    /// * `Ok(None)` if either key is missing
    /// * `Err(CacheError::Corrupt)` if a value is present but malformed
    pub fn read(&self, category: &Category) -> Result<Option<CacheEntry>, CacheError> {
        let ts_key = timestamp_key(category);
        let st_key = stories_key(category);

        let (Some(raw_timestamp), Some(raw_stories)) =
            (self.store.get(&ts_key)?, self.store.get(&st_key)?)
        else {
            return Ok(None);
        };

        let fetched_at_millis =
            raw_timestamp
                .trim()
                .parse::<i64>()
                .map_err(|e| CacheError::Corrupt {
                    key: ts_key,
                    reason: e.to_string(),
                })?;

        let stories: Vec<StorySummary> =
            serde_json::from_str(&raw_stories).map_err(|e| CacheError::Corrupt {
                key: st_key,
                reason: e.to_string(),
            })?;

        Ok(Some(CacheEntry {
            category: category.clone(),
            stories,
            fetched_at_millis,
        }))
    }

    /// Replaces the entry for `category`
    ///
    /// Stories are written before the timestamp, so an interrupted write never
    /// pairs a fresh timestamp with the previous stories.
    pub fn write(
        &self,
        category: &Category,
        stories: &[StorySummary],
        fetched_at_millis: i64,
    ) -> Result<(), CacheError> {
        let json = serde_json::to_string(stories)?;
        self.store.set(&stories_key(category), &json)?;
        self.store
            .set(&timestamp_key(category), &fetched_at_millis.to_string())?;
        Ok(())
    }
}
