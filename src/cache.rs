use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// In-memory TTL cache safe to share between request handlers.
///
/// Expired entries are evicted lazily on read and by [`ResponseCache::purge_expired`].
/// Eviction re-checks expiry under the shard write lock, so it can never drop
/// a value a concurrent `set` just stored.
#[derive(Debug)]
pub struct ResponseCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<K, V> ResponseCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Some(entry.value.clone());
            }
        }
        // shard read guard is dropped before taking the write lock
        self.entries.remove_if(key, |_, entry| entry.is_expired());
        None
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for ResponseCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_get_returns_fresh_value() {
        let cache: ResponseCache<String, u32> = ResponseCache::new(Duration::from_secs(10));
        cache.set("a".to_string(), 1);

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert!(cache.contains(&"a".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_evicts_expired_entry() {
        let cache: ResponseCache<String, u32> = ResponseCache::new(Duration::from_secs(10));
        cache.set("a".to_string(), 1);
        assert_eq!(cache.len(), 1);

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.get(&"a".to_string()), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_after_expiry_replaces_entry() {
        let cache: ResponseCache<String, u32> = ResponseCache::new(Duration::from_secs(10));
        cache.set("a".to_string(), 1);
        tokio::time::advance(Duration::from_secs(11)).await;

        cache.set("a".to_string(), 2);
        assert_eq!(cache.get(&"a".to_string()), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_with_ttl_overrides_default() {
        let cache: ResponseCache<&'static str, u32> = ResponseCache::new(Duration::from_secs(10));
        cache.set_with_ttl("short", 1, Duration::from_secs(1));
        cache.set("long", 2);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get(&"short"), None);
        assert_eq!(cache.get(&"long"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache: ResponseCache<u32, u32> = ResponseCache::new(Duration::from_secs(10));
        for i in 0..5 {
            cache.set(i, i);
        }
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.set(100, 100);
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(cache.purge_expired(), 5);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&100), Some(100));
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let cache: ResponseCache<u32, &'static str> = ResponseCache::default();
        cache.set(1, "one");
        cache.set(2, "two");

        assert!(cache.invalidate(&1));
        assert!(!cache.invalidate(&1));
        assert_eq!(cache.get(&1), None);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let cache: Arc<ResponseCache<u32, u32>> = Arc::new(ResponseCache::default());
        let mut handles = Vec::new();
        for worker in 0..8u32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100u32 {
                    cache.set(i, worker);
                    assert!(cache.get(&i).is_some());
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(cache.len(), 100);
    }
}
