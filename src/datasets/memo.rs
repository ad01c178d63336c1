use log::debug;
use lru::LruCache;
use polars::frame::DataFrame;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;

/// Number of distinct argument combinations each memoized function keeps.
pub const DEFAULT_MEMO_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// Bounded least-recently-used memoization of one function's results, keyed by its
/// arguments.
///
/// Values are cloned out of the cache, which is cheap for polars frames. The lock is
/// released while a missing value is computed.
pub struct Memo<K: Hash + Eq, V = DataFrame> {
    name: &'static str,
    capacity: NonZeroUsize,
    entries: Mutex<LruCache<K, V>>,
}

impl<K, V> Memo<K, V>
where
    K: Hash + Eq + Debug,
    V: Clone,
{
    pub fn new(name: &'static str, capacity: NonZeroUsize) -> Self {
        Self {
            name,
            capacity,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the cached value for `key`, or runs `compute` and caches its success.
    /// Errors are passed through and not cached.
    pub async fn get_or_try_insert_with<E, Fut>(
        &self,
        key: K,
        compute: impl FnOnce() -> Fut,
    ) -> Result<V, E>
    where
        Fut: Future<Output = Result<V, E>>,
    {
        {
            let mut entries = self.entries.lock().await;
            if let Some(value) = entries.get(&key) {
                debug!("{} memo hit for {:?}", self.name, key);
                return Ok(value.clone());
            }
        }

        debug!("{} memo miss for {:?}", self.name, key);
        let value = compute().await?;
        self.entries.lock().await.put(key, value.clone());
        Ok(value)
    }

    /// Whether `key` is cached. Does not count as a use.
    pub async fn contains(&self, key: &K) -> bool {
        self.entries.lock().await.contains(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
}
