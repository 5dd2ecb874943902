//! Content-addressed memoization of per-timepoint index rasters.
//!
//! Replaces the original scripts' opaque caching decorator with an
//! explicit abstraction: a key derived from every input that affects the
//! computed rasters, and an injectable store with get/put semantics.
//! Values are `Arc`-shared and immutable once inserted; there is no
//! invalidation — results are assumed durable for the process lifetime,
//! bounded only by the LRU capacity.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use landshift_core::raster::resample::Resampling;

use crate::config::{AnalysisConfig, DateRange};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Hash of everything that determines one timepoint's index rasters:
/// catalog, collection, bbox, date range, band set, resampling and the
/// cloud ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(u64);

/// Derive the cache key for one (config, date range) timepoint.
pub fn timepoint_key(config: &AnalysisConfig, range: &DateRange) -> CacheKey {
    let mut hasher = DefaultHasher::new();

    config.catalog.search_url().hash(&mut hasher);
    config.collection.hash(&mut hasher);
    for coord in config.bbox.to_vec() {
        coord.to_bits().hash(&mut hasher);
    }
    range.to_string().hash(&mut hasher);

    // Band set is fixed by the NDVI/NDBI pair but still part of the
    // key: a future index over other bands must miss.
    "red,nir,swir".hash(&mut hasher);
    match config.resampling {
        Resampling::Decimate => "decimate",
        Resampling::Average => "average",
    }
    .hash(&mut hasher);
    config.downsample.hash(&mut hasher);
    config.max_cloud_cover.to_bits().hash(&mut hasher);

    CacheKey(hasher.finish())
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Injectable cache abstraction for computed timepoint values.
pub trait IndexCache<V>: Send + Sync {
    /// Fetch a previously computed value, if present.
    fn get(&self, key: &CacheKey) -> Option<Arc<V>>;

    /// Store a computed value.
    fn put(&self, key: CacheKey, value: Arc<V>);
}

/// In-memory LRU cache.
pub struct MemoryCache<V> {
    inner: Mutex<LruCache<CacheKey, Arc<V>>>,
}

impl<V> MemoryCache<V> {
    /// Create a cache holding up to `capacity` timepoints.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Number of cached values.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Send + Sync> IndexCache<V> for MemoryCache<V> {
    fn get(&self, key: &CacheKey) -> Option<Arc<V>> {
        self.inner.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: CacheKey, value: Arc<V>) {
        self.inner.lock().unwrap().put(key, value);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
