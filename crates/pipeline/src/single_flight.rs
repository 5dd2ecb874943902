//! Per-key deduplication of in-flight computations.
//!
//! Concurrent requests for the same cache key would each trigger the
//! full search-and-fetch chain; holding a per-key async lock while
//! computing lets the second caller find the first caller's result in
//! the cache instead. Locks are created on demand and kept for the
//! process lifetime (one small entry per distinct key ever seen).

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A map of per-key async locks.
pub struct SingleFlight<K: Eq + Hash + Copy> {
    locks: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K: Eq + Hash + Copy> SingleFlight<K> {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for `key`, waiting if another computation for
    /// the same key is in flight. The guard must be held across the
    /// cache re-check and the compute-and-store step.
    pub async fn acquire(&self, key: K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            locks
                .entry(key)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

impl<K: Eq + Hash + Copy> Default for SingleFlight<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Two concurrent get-or-compute calls for the same key must compute
    /// once; a different key computes independently.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn dedups_same_key() {
        let flights = Arc::new(SingleFlight::<u64>::new());
        let cache = Arc::new(Mutex::new(HashMap::<u64, u32>::new()));
        let computations = Arc::new(AtomicUsize::new(0));

        let get_or_compute = |key: u64| {
            let flights = flights.clone();
            let cache = cache.clone();
            let computations = computations.clone();
            async move {
                let _guard = flights.acquire(key).await;
                if let Some(v) = cache.lock().unwrap().get(&key) {
                    return *v;
                }
                computations.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                cache.lock().unwrap().insert(key, 42);
                42
            }
        };

        let (a, b, c) = tokio::join!(get_or_compute(7), get_or_compute(7), get_or_compute(9));

        assert_eq!(a, 42);
        assert_eq!(b, 42);
        assert_eq!(c, 42);
        // Key 7 computed once, key 9 once
        assert_eq!(computations.load(Ordering::SeqCst), 2);
    }
}
