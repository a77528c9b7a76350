//! Small in-process key/value cache with per-entry expiry.
//!
//! Callers pass the current time explicitly, normally from a
//! [`mockable::Clock`], so expiry is deterministic under test.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

impl<V> Entry<V> {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Sharded concurrent map whose entries expire a fixed time after insertion.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    ttl: TimeDelta,
    entries: DashMap<K, Entry<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates an empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Returns the configured time to live.
    #[must_use]
    pub const fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Returns the value for `key` if it has not expired at `now`.
    #[must_use]
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// Expired entries are dropped on every insert, keeping the map bounded
    /// by the number of keys written within one TTL window.
    pub fn insert(&self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.retain(|_, entry| entry.is_fresh(now));
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Removes `key` and returns its value if it was still fresh at `now`.
    ///
    /// Removal is atomic: when several callers race for one key, at most one
    /// receives the value.
    pub fn take(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        self.entries
            .remove(key)
            .map(|(_, entry)| entry)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value)
    }

    /// Number of entries, including ones that expired but were not yet
    /// purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::TtlCache;
    use chrono::{DateTime, TimeDelta, Utc};
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use std::thread;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    #[fixture]
    fn cache() -> TtlCache<String, String> {
        TtlCache::new(TimeDelta::seconds(60))
    }

    #[rstest]
    fn fresh_entries_are_returned(cache: TtlCache<String, String>, now: DateTime<Utc>) {
        cache.insert("42".to_owned(), "alice".to_owned(), now);

        let later = now + TimeDelta::seconds(59);
        assert_eq!(cache.get(&"42".to_owned(), later), Some("alice".to_owned()));
    }

    #[rstest]
    fn entries_expire_after_ttl(cache: TtlCache<String, String>, now: DateTime<Utc>) {
        cache.insert("42".to_owned(), "alice".to_owned(), now);

        let expired = now + TimeDelta::seconds(60);
        assert_eq!(cache.get(&"42".to_owned(), expired), None);
    }

    #[rstest]
    fn take_removes_entry(cache: TtlCache<String, String>, now: DateTime<Utc>) {
        cache.insert("state".to_owned(), "pending".to_owned(), now);

        assert_eq!(
            cache.take(&"state".to_owned(), now),
            Some("pending".to_owned())
        );
        assert_eq!(cache.take(&"state".to_owned(), now), None);
        assert!(cache.is_empty());
    }

    #[rstest]
    fn insert_purges_expired_entries(cache: TtlCache<String, String>, now: DateTime<Utc>) {
        cache.insert("old".to_owned(), "a".to_owned(), now);
        cache.insert("new".to_owned(), "b".to_owned(), now + TimeDelta::seconds(120));

        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn racing_takers_receive_the_value_once(now: DateTime<Utc>) {
        let shared = Arc::new(TtlCache::new(TimeDelta::seconds(60)));
        shared.insert("state".to_owned(), "pending".to_owned(), now);

        let takers: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&shared);
                thread::spawn(move || cache.take(&"state".to_owned(), now))
            })
            .collect();
        let winners = takers
            .into_iter()
            .map(|taker| taker.join().expect("taker thread should finish"))
            .filter(Option::is_some)
            .count();

        assert_eq!(winners, 1);
        assert!(shared.is_empty());
    }
}
