//! Cache module for storing fetched stories per category
//!
//! Each category's stories and fetch timestamp are stored as two separate keys
//! in a [`KeyValueStore`](crate::storage::KeyValueStore). Freshness is judged at
//! read time against a fixed TTL; stale entries are left in place and simply
//! overwritten by the next successful fetch.

mod manager;

pub use manager::{stories_key, timestamp_key, CacheEntry, CacheError, StoryCache, DEFAULT_TTL_MILLIS};
