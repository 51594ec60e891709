//! In-memory metadata cache with TTL expiry and single-flight lookups
//!
//! Every key owns an async slot. A caller that finds the slot empty or stale
//! fetches while holding the slot lock, so concurrent callers for the same key
//! queue behind the in-flight fetch and then read the entry it wrote. Entries
//! are replaced whole; a reader never sees a partially written one.

use crate::cache::clock::Clock;
use crate::extractor::models::{StreamInfo, VideoDetails};
use crate::extractor::traits::StreamProvider;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Cached provider result for one video URL
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub video_url: String,
    pub details: Arc<VideoDetails>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry is stale once its age reaches the TTL
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.fetched_at >= ttl
    }
}

type Slot = Arc<tokio::sync::Mutex<Option<CacheEntry>>>;

/// Memoizes [`StreamProvider`] lookups per video URL
pub struct StreamCache {
    provider: Arc<dyn StreamProvider>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl StreamCache {
    pub fn new(provider: Arc<dyn StreamProvider>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = chrono::Duration::from_std(ttl)
            .unwrap_or_else(|_| chrono::Duration::days(365 * 100));
        Self {
            provider,
            ttl,
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Provider behind the cache, for calls that must not be memoized
    pub fn provider(&self) -> Arc<dyn StreamProvider> {
        Arc::clone(&self.provider)
    }

    /// Streams for `video_url`, fetched at most once per TTL window
    pub async fn get_streams(&self, video_url: &str) -> Result<Vec<StreamInfo>> {
        let details = self.get_video(video_url).await?;
        Ok(details.streams.clone())
    }

    /// Video details (title, uploader, streams) for `video_url`
    pub async fn get_video(&self, video_url: &str) -> Result<Arc<VideoDetails>> {
        let key = video_url.trim();
        let slot = self.slot(key);
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref() {
            if !cached.is_stale(self.clock.now(), self.ttl) {
                debug!("Cache hit for {}", key);
                return Ok(Arc::clone(&cached.details));
            }
            debug!("Cache entry for {} is stale", key);
        } else {
            debug!("Cache miss for {}", key);
        }

        // A stale entry must never be served again, even if the refetch fails
        *entry = None;

        match self.provider.fetch_video(key).await {
            Ok(details) => {
                let details = Arc::new(details);
                *entry = Some(CacheEntry {
                    video_url: key.to_string(),
                    details: Arc::clone(&details),
                    fetched_at: self.clock.now(),
                });
                drop(entry);
                self.prune_stale();
                Ok(details)
            }
            Err(e) => {
                warn!("Provider {} failed for {}: {}", self.provider.id(), key, e);
                drop(entry);
                self.release_if_unused(key, &slot);
                Err(e)
            }
        }
    }

    /// Drop the entry for one URL
    pub fn invalidate(&self, video_url: &str) {
        self.lock_slots().remove(video_url.trim());
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock_slots().clear();
    }

    /// Number of stored entries, fresh or stale
    pub async fn len(&self) -> usize {
        let slots: Vec<Slot> = self.lock_slots().values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = self.lock_slots();
        Arc::clone(slots.entry(key.to_string()).or_default())
    }

    /// Forget an empty slot nobody else is waiting on
    fn release_if_unused(&self, key: &str, slot: &Slot) {
        let mut slots = self.lock_slots();
        // Slots are only cloned under this lock: the map and `slot` are the two owners
        let ours = slots.get(key).map_or(false, |s| Arc::ptr_eq(s, slot));
        if ours && Arc::strong_count(slot) <= 2 {
            slots.remove(key);
        }
    }

    /// Drop stale entries that no caller currently holds
    fn prune_stale(&self) {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut slots = self.lock_slots();
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry.as_ref().map_or(false, |e| !e.is_stale(now, ttl)),
                Err(_) => true,
            }
        });
        let pruned = before - slots.len();
        if pruned > 0 {
            debug!("Pruned {} stale cache slots", pruned);
        }
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::extractor::ytdlp::YtDlpProvider;
    use crate::utils::config::AppSettings;
    use crate::utils::error::TubegrabError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail_first: usize,
        delay: Duration,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first: 0,
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StreamProvider for CountingProvider {
        fn id(&self) -> &'static str {
            "counting"
        }

        async fn fetch_video(&self, url: &str) -> Result<VideoDetails> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if call < self.fail_first {
                return Err(TubegrabError::Fetch("network down".into()));
            }
            Ok(VideoDetails {
                id: format!("id-{}", call),
                title: url.to_string(),
                webpage_url: url.to_string(),
                uploader: None,
                duration_secs: None,
                view_count: None,
                thumbnail: None,
                streams: vec![],
            })
        }

        async fn resolve_url(&self, _url: &str, _itag: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn cache_with(provider: Arc<CountingProvider>, clock: Arc<ManualClock>) -> StreamCache {
        StreamCache::new(provider, Duration::from_secs(60), clock)
    }

    #[tokio::test]
    async fn test_hit_within_ttl_fetches_once() {
        let provider = Arc::new(CountingProvider::new());
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider.clone(), clock.clone());

        cache.get_streams("https://youtu.be/a").await.unwrap();
        clock.advance(chrono::Duration::seconds(59));
        cache.get_streams("https://youtu.be/a").await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_entry_at_ttl_is_refetched() {
        let provider = Arc::new(CountingProvider::new());
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider.clone(), clock.clone());

        let first = cache.get_video("https://youtu.be/a").await.unwrap();
        clock.advance(chrono::Duration::seconds(60));
        let second = cache.get_video("https://youtu.be/a").await.unwrap();

        assert_eq!(provider.calls(), 2);
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_failure_writes_no_entry() {
        let provider = Arc::new(CountingProvider {
            fail_first: 1,
            ..CountingProvider::new()
        });
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider.clone(), clock);

        let err = cache.get_streams("https://youtu.be/a").await.unwrap_err();
        assert!(matches!(err, TubegrabError::Fetch(_)));
        assert!(cache.is_empty().await);

        cache.get_streams("https://youtu.be/a").await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_discards_stale_entry() {
        let provider = Arc::new(CountingProvider::new());
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider.clone(), clock.clone());

        cache.get_streams("https://youtu.be/a").await.unwrap();
        clock.advance(chrono::Duration::minutes(5));

        // Every further call fails
        let failing = Arc::new(CountingProvider {
            fail_first: usize::MAX,
            ..CountingProvider::new()
        });
        let cache = StreamCache {
            provider: failing,
            ..cache
        };
        assert!(cache.get_streams("https://youtu.be/a").await.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_fetch() {
        let provider = Arc::new(CountingProvider {
            delay: Duration::from_millis(50),
            ..CountingProvider::new()
        });
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider.clone(), clock);

        let (a, b, c) = tokio::join!(
            cache.get_video("https://youtu.be/a"),
            cache.get_video("https://youtu.be/a"),
            cache.get_video(" https://youtu.be/a "),
        );

        assert_eq!(provider.calls(), 1);
        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert!(c.is_ok());
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let provider = Arc::new(CountingProvider::new());
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider.clone(), clock);

        let (a, b) = tokio::join!(
            cache.get_streams("https://youtu.be/a"),
            cache.get_streams("https://youtu.be/b"),
        );
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(provider.calls(), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_failed_lookups_leave_no_slots() {
        let provider = Arc::new(CountingProvider {
            fail_first: usize::MAX,
            ..CountingProvider::new()
        });
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider.clone(), clock);

        for i in 0..1000 {
            let url = format!("https://youtu.be/{}", i);
            assert!(cache.get_streams(&url).await.is_err());
        }

        assert_eq!(provider.calls(), 1000);
        assert!(cache.lock_slots().is_empty());
    }

    #[tokio::test]
    async fn test_stale_entries_are_pruned_on_insert() {
        let provider = Arc::new(CountingProvider::new());
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider.clone(), clock.clone());

        cache.get_streams("https://youtu.be/a").await.unwrap();
        cache.get_streams("https://youtu.be/b").await.unwrap();
        clock.advance(chrono::Duration::seconds(61));
        cache.get_streams("https://youtu.be/c").await.unwrap();

        let slots = cache.lock_slots();
        assert_eq!(slots.len(), 1);
        assert!(slots.contains_key("https://youtu.be/c"));
    }

    #[tokio::test]
    async fn test_waiters_keep_a_failing_slot_alive() {
        let provider = Arc::new(CountingProvider {
            fail_first: 1,
            delay: Duration::from_millis(50),
            ..CountingProvider::new()
        });
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider.clone(), clock);

        let (first, second) = tokio::join!(
            cache.get_streams("https://youtu.be/a"),
            cache.get_streams("https://youtu.be/a"),
        );

        assert!(first.is_err());
        assert!(second.is_ok());
        assert_eq!(provider.calls(), 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_fetch_failure() {
        let provider = Arc::new(YtDlpProvider::from_settings(&AppSettings::default()));
        let cache = StreamCache::new(
            provider,
            Duration::from_secs(60),
            Arc::new(ManualClock::default()),
        );

        let err = cache.get_streams("not a url").await.unwrap_err();
        assert_eq!(err.kind(), "fetch");
        assert!(matches!(err, TubegrabError::Fetch(_)));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let provider = Arc::new(CountingProvider::new());
        let clock = Arc::new(ManualClock::default());
        let cache = cache_with(provider.clone(), clock);

        cache.get_streams("https://youtu.be/a").await.unwrap();
        cache.get_streams("https://youtu.be/b").await.unwrap();

        cache.invalidate("https://youtu.be/a");
        assert_eq!(cache.len().await, 1);
        cache.get_streams("https://youtu.be/a").await.unwrap();
        assert_eq!(provider.calls(), 3);

        cache.clear();
        assert!(cache.is_empty().await);
    }
}
