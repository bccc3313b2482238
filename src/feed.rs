//! Story feed controller
//!
//! Decides, per category selection, whether cached stories are fresh enough to
//! show or whether the provider must be asked again, and tracks what the story
//! pane should display as a result.
//!
//! A selection is split into [`StoryFeedController::begin_selection`] and
//! [`StoryFeedController::complete_fetch`] so that the network call can run on
//! a background task. Every selection is numbered; a fetch result carrying an
//! older number than the latest selection is dropped, so the most recently
//! requested category always wins regardless of response order.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::cache::{StoryCache, DEFAULT_TTL_MILLIS};
use crate::data::{Category, FetchError, StoryProvider, StorySummary, MAX_STORIES};
use crate::storage::KeyValueStore;

/// The single message shown for any failed fetch
pub const FETCH_FAILED_MESSAGE: &str = "Failed to load stories. Please try again later.";

/// Source of the current time in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// What the story pane currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    /// No category selected yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// Stories are displayed; may be empty
    Rendered(Vec<StorySummary>),
    /// The last fetch failed
    Error(String),
}

/// Identifies one in-flight fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    category: Category,
    generation: u64,
}

impl FetchTicket {
    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of starting a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Fresh cached stories were rendered; nothing to fetch
    Served(Vec<StorySummary>),
    /// The caller must fetch and hand the result to `complete_fetch`
    Fetch(FetchTicket),
}

/// Outcome of handing a fetch result back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was rendered (and cached on success)
    Applied,
    /// A newer selection was made meanwhile; the result was dropped
    Superseded,
}

/// Orchestrates cache lookups, provider fetches and the displayed state
pub struct StoryFeedController<S, P> {
    cache: StoryCache<S>,
    provider: Arc<P>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
    state: FeedState,
    current: Option<Category>,
    generation: u64,
}

impl<S, P> StoryFeedController<S, P>
where
    S: KeyValueStore,
    P: StoryProvider,
{
    /// Creates a controller using wall-clock time and the default TTL
    pub fn new(store: S, provider: Arc<P>) -> Self {
        Self::with_clock(store, provider, Arc::new(SystemClock))
    }

    /// Creates a controller with a custom clock
    pub fn with_clock(store: S, provider: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: StoryCache::new(store),
            provider,
            clock,
            ttl_millis: DEFAULT_TTL_MILLIS,
            state: FeedState::Idle,
            current: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// The most recently selected category
    pub fn current_category(&self) -> Option<&Category> {
        self.current.as_ref()
    }

    /// Shared handle to the provider, for running fetches off the UI task
    pub fn provider(&self) -> Arc<P> {
        Arc::clone(&self.provider)
    }

    pub fn cache(&self) -> &StoryCache<S> {
        &self.cache
    }

    /// Starts a selection of `category`
    ///
    /// Serves fresh cached stories immediately. Otherwise switches to
    /// [`FeedState::Loading`] and returns a ticket for the fetch the caller
    /// must perform. Any earlier outstanding ticket is superseded either way.
    pub fn begin_selection(&mut self, category: Category) -> Selection {
        self.generation += 1;
        self.current = Some(category.clone());
        let now = self.clock.now_millis();

        match self.cache.read(&category) {
            Ok(Some(entry)) if entry.is_fresh(now, self.ttl_millis) => {
                info!(category = %category, "Loading stories from cache");
                self.state = FeedState::Rendered(entry.stories.clone());
                return Selection::Served(entry.stories);
            }
            Ok(Some(entry)) => {
                info!(
                    category = %category,
                    age_ms = entry.age_millis(now),
                    "Cached stories are stale"
                );
            }
            Ok(None) => {
                info!(category = %category, "No cached stories");
            }
            Err(e) => {
                warn!(category = %category, error = %e, "Ignoring unreadable cache entry");
            }
        }

        info!(category = %category, "Fetching stories from API");
        self.state = FeedState::Loading;
        Selection::Fetch(FetchTicket {
            category,
            generation: self.generation,
        })
    }

    /// Applies the result of the fetch identified by `ticket`
    ///
    /// On success the stories are truncated to [`MAX_STORIES`], cached with the
    /// current time and rendered. On failure the error message is shown and the
    /// cache is left untouched. Results for superseded tickets change nothing.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<StorySummary>, FetchError>,
    ) -> Completion {
        if ticket.generation != self.generation {
            debug!(
                category = %ticket.category,
                generation = ticket.generation,
                latest = self.generation,
                "Dropping result of superseded fetch"
            );
            return Completion::Superseded;
        }

        match result {
            Ok(mut stories) => {
                stories.truncate(MAX_STORIES);
                let fetched_at = self.clock.now_millis();
                if let Err(e) = self.cache.write(&ticket.category, &stories, fetched_at) {
                    warn!(category = %ticket.category, error = %e, "Failed to cache stories");
                }
                info!(category = %ticket.category, count = stories.len(), "Fetched stories");
                self.state = FeedState::Rendered(stories);
            }
            Err(e) => {
                error!(category = %ticket.category, error = %e, "Error fetching stories");
                self.state = FeedState::Error(FETCH_FAILED_MESSAGE.to_string());
            }
        }

        Completion::Applied
    }

    /// Selects `category`, fetching inline if the cache cannot serve it
    pub async fn select_category(&mut self, category: Category) -> &FeedState {
        if let Selection::Fetch(ticket) = self.begin_selection(category) {
            let result = self.provider.fetch_top_stories(ticket.category()).await;
            self.complete_fetch(ticket, result);
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{stories_key, timestamp_key};
    use crate::data::PLACEHOLDER_IMAGE;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    const T0: i64 = 1_700_000_000_000;

    /// Provider that replays queued responses and counts calls
    #[derive(Default)]
    struct ScriptedProvider {
        responses: Mutex<VecDeque<Result<Vec<StorySummary>, FetchError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn push(&self, response: Result<Vec<StorySummary>, FetchError>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StoryProvider for ScriptedProvider {
        async fn fetch_top_stories(
            &self,
            _category: &Category,
        ) -> Result<Vec<StorySummary>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::Status(500)))
        }
    }

    fn stories(prefix: &str, n: usize) -> Vec<StorySummary> {
        (0..n)
            .map(|i| StorySummary {
                title: format!("{prefix} {i}"),
                summary: format!("{prefix} abstract {i}"),
                url: format!("https://example.com/{prefix}/{i}"),
                image_url: PLACEHOLDER_IMAGE.to_string(),
            })
            .collect()
    }

    fn cat(name: &str) -> Category {
        Category::parse(name).unwrap()
    }

    fn setup() -> (
        StoryFeedController<Arc<MemoryStore>, ScriptedProvider>,
        Arc<MemoryStore>,
        Arc<ScriptedProvider>,
        Arc<ManualClock>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(ScriptedProvider::default());
        let clock = Arc::new(ManualClock::new(T0));
        let controller =
            StoryFeedController::with_clock(Arc::clone(&store), Arc::clone(&provider), clock.clone());
        (controller, store, provider, clock)
    }

    #[test]
    fn test_initial_state_is_idle() {
        let (controller, _, _, _) = setup();
        assert_eq!(controller.state(), &FeedState::Idle);
        assert!(controller.current_category().is_none());
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_once_and_caches_with_fetch_time() {
        let (mut controller, store, provider, clock) = setup();
        provider.push(Ok(stories("world", 3)));
        clock.set(T0 + 1234);

        let state = controller.select_category(cat("world")).await.clone();

        assert_eq!(provider.calls(), 1);
        assert_eq!(state, FeedState::Rendered(stories("world", 3)));
        let expected_ts = (T0 + 1234).to_string();
        assert_eq!(
            store.get(&timestamp_key(&cat("world"))).unwrap().as_deref(),
            Some(expected_ts.as_str())
        );
        assert!(store.get(&stories_key(&cat("world"))).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fresh_cache_is_served_without_request() {
        let (mut controller, _, provider, clock) = setup();
        provider.push(Ok(stories("world", 2)));
        controller.select_category(cat("world")).await;

        clock.advance(DEFAULT_TTL_MILLIS - 1);
        let selection = controller.begin_selection(cat("world"));

        assert_eq!(selection, Selection::Served(stories("world", 2)));
        assert_eq!(controller.state(), &FeedState::Rendered(stories("world", 2)));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_triggers_refetch() {
        let (mut controller, _, provider, clock) = setup();
        provider.push(Ok(stories("old", 2)));
        provider.push(Ok(stories("new", 4)));
        controller.select_category(cat("world")).await;

        clock.advance(DEFAULT_TTL_MILLIS);
        let state = controller.select_category(cat("world")).await.clone();

        assert_eq!(provider.calls(), 2);
        assert_eq!(state, FeedState::Rendered(stories("new", 4)));
    }

    #[test]
    fn test_cache_miss_enters_loading() {
        let (mut controller, _, _, _) = setup();

        let selection = controller.begin_selection(cat("science"));

        assert!(matches!(selection, Selection::Fetch(ref t) if t.category() == &cat("science")));
        assert_eq!(controller.state(), &FeedState::Loading);
    }

    #[test]
    fn test_result_is_truncated_to_max_stories_in_order() {
        let (mut controller, store, _, _) = setup();

        let Selection::Fetch(ticket) = controller.begin_selection(cat("world")) else {
            panic!("expected a fetch");
        };
        controller.complete_fetch(ticket, Ok(stories("world", 7)));

        let expected = stories("world", 5);
        assert_eq!(controller.state(), &FeedState::Rendered(expected.clone()));
        let cached = StoryCache::new(store).read(&cat("world")).unwrap().unwrap();
        assert_eq!(cached.stories, expected);
    }

    #[tokio::test]
    async fn test_failed_fetch_shows_message_and_keeps_prior_cache() {
        let (mut controller, store, provider, clock) = setup();
        provider.push(Ok(stories("world", 2)));
        controller.select_category(cat("world")).await;
        let before_stories = store.get(&stories_key(&cat("world"))).unwrap();
        let before_ts = store.get(&timestamp_key(&cat("world"))).unwrap();

        clock.advance(DEFAULT_TTL_MILLIS + 5);
        provider.push(Err(FetchError::Status(503)));
        let state = controller.select_category(cat("world")).await.clone();

        assert_eq!(state, FeedState::Error(FETCH_FAILED_MESSAGE.to_string()));
        assert_eq!(store.get(&stories_key(&cat("world"))).unwrap(), before_stories);
        assert_eq!(store.get(&timestamp_key(&cat("world"))).unwrap(), before_ts);
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_create_entry() {
        let (mut controller, store, provider, _) = setup();
        provider.push(Err(FetchError::MissingApiKey));

        controller.select_category(cat("arts")).await;

        assert!(store.is_empty());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_rendered_and_cached() {
        let (mut controller, _, provider, _) = setup();
        provider.push(Ok(Vec::new()));

        controller.select_category(cat("books")).await;
        assert_eq!(controller.state(), &FeedState::Rendered(Vec::new()));

        let selection = controller.begin_selection(cat("books"));
        assert_eq!(selection, Selection::Served(Vec::new()));
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_superseded_fetch_is_dropped() {
        let (mut controller, store, _, _) = setup();

        let Selection::Fetch(first) = controller.begin_selection(cat("world")) else {
            panic!("expected a fetch");
        };
        let Selection::Fetch(second) = controller.begin_selection(cat("arts")) else {
            panic!("expected a fetch");
        };

        // The later request resolves first, then the earlier one arrives.
        assert_eq!(
            controller.complete_fetch(second, Ok(stories("arts", 2))),
            Completion::Applied
        );
        assert_eq!(
            controller.complete_fetch(first, Ok(stories("world", 2))),
            Completion::Superseded
        );

        assert_eq!(controller.state(), &FeedState::Rendered(stories("arts", 2)));
        assert_eq!(controller.current_category(), Some(&cat("arts")));
        assert!(store.get(&stories_key(&cat("world"))).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_hit_supersedes_outstanding_fetch() {
        let (mut controller, _, provider, _) = setup();
        provider.push(Ok(stories("world", 1)));
        controller.select_category(cat("world")).await;

        let Selection::Fetch(pending) = controller.begin_selection(cat("arts")) else {
            panic!("expected a fetch");
        };
        controller.begin_selection(cat("world"));

        assert_eq!(
            controller.complete_fetch(pending, Err(FetchError::Status(500))),
            Completion::Superseded
        );
        assert_eq!(controller.state(), &FeedState::Rendered(stories("world", 1)));
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_triggers_refetch() {
        let (mut controller, store, provider, _) = setup();
        store.set(&stories_key(&cat("world")), "not json").unwrap();
        store.set(&timestamp_key(&cat("world")), &T0.to_string()).unwrap();
        provider.push(Ok(stories("world", 2)));

        let state = controller.select_category(cat("world")).await.clone();

        assert_eq!(provider.calls(), 1);
        assert_eq!(state, FeedState::Rendered(stories("world", 2)));
        let repaired = StoryCache::new(store).read(&cat("world")).unwrap().unwrap();
        assert_eq!(repaired.stories, stories("world", 2));
    }

    #[tokio::test]
    async fn test_out_of_range_timestamp_triggers_refetch() {
        let (mut controller, store, provider, _) = setup();
        store.set(&stories_key(&cat("world")), "[]").unwrap();
        store.set(&timestamp_key(&cat("world")), &i64::MIN.to_string()).unwrap();
        provider.push(Ok(stories("world", 1)));

        let state = controller.select_category(cat("world")).await.clone();

        assert_eq!(provider.calls(), 1);
        assert_eq!(state, FeedState::Rendered(stories("world", 1)));
        let expected_ts = T0.to_string();
        assert_eq!(
            store.get(&timestamp_key(&cat("world"))).unwrap().as_deref(),
            Some(expected_ts.as_str())
        );
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10);
        clock.advance(5);
        assert_eq!(clock.now_millis(), 15);
        clock.set(3);
        assert_eq!(clock.now_millis(), 3);
    }
}
