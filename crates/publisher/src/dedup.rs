use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;

const MAX_ENTRIES: usize = 10_000;

pub type DedupKey = (String, String, i64);

/// Bounded, time-windowed dedup set over `(client_id, session_id, created_at)`.
///
/// Entries older than the configured window are dropped once per `evict_expired`
/// call rather than on every insert, matching how often the publisher actually
/// polls.
pub struct DedupSet {
    cache: LruCache<DedupKey, DateTime<Utc>>,
    window: Duration,
}

impl DedupSet {
    pub fn new(window: Duration) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(MAX_ENTRIES).expect("MAX_ENTRIES is nonzero")),
            window,
        }
    }

    /// Checks whether this key has been published before, without recording
    /// it. A failed publish must leave the key eligible for retry, so
    /// marking only happens once the caller knows the publish succeeded —
    /// see [`DedupSet::mark`].
    pub fn is_unseen(&self, key: &DedupKey) -> bool {
        !self.cache.contains(key)
    }

    /// Records a key as published. Call only after a successful publish.
    pub fn mark(&mut self, key: DedupKey, now: DateTime<Utc>) {
        self.cache.put(key, now);
    }

    pub fn evict_expired(&mut self, now: DateTime<Utc>) {
        let window = self.window;
        let stale: Vec<DedupKey> = self
            .cache
            .iter()
            .filter(|(_, seen_at)| {
                now.signed_duration_since(**seen_at).to_std().unwrap_or_default() > window
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            self.cache.pop(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_is_unseen_repeat_is_not() {
        let mut dedup = DedupSet::new(Duration::from_secs(600));
        let key = ("client-1".to_owned(), "session-1".to_owned(), 100);
        let now = Utc::now();
        assert!(dedup.is_unseen(&key));
        dedup.mark(key.clone(), now);
        assert!(!dedup.is_unseen(&key));
    }

    #[test]
    fn a_key_that_was_never_marked_is_still_unseen() {
        let dedup = DedupSet::new(Duration::from_secs(600));
        let key = ("client-1".to_owned(), "session-1".to_owned(), 100);
        assert!(dedup.is_unseen(&key));
        assert!(dedup.is_unseen(&key));
    }

    #[test]
    fn eviction_drops_only_stale_entries() {
        let mut dedup = DedupSet::new(Duration::from_secs(600));
        let now = Utc::now();
        let old_key = ("client-1".to_owned(), "session-1".to_owned(), 1);
        let fresh_key = ("client-2".to_owned(), "session-2".to_owned(), 2);
        dedup.mark(old_key.clone(), now - chrono::Duration::seconds(700));
        dedup.mark(fresh_key.clone(), now);

        dedup.evict_expired(now);

        assert!(dedup.is_unseen(&old_key));
        assert!(!dedup.is_unseen(&fresh_key));
    }
}
