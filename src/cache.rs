//! Memoized graph construction keyed by input fingerprint

use crate::data::Point;
use crate::graph::{build_graph, BuildOutcome};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hit/miss counters of a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Caller-owned, bounded cache of built graphs.
///
/// The store is locked for the whole lookup-or-build sequence, so each
/// distinct fingerprint is built at most once even under concurrent use.
/// Cached outcomes are shared behind `Arc` and never mutated.
pub struct GraphCache {
    store: Mutex<LruCache<String, Arc<BuildOutcome>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GraphCache {
    /// Create a cache holding at most `capacity` graphs
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            store: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached graph for these points, building it on a miss
    pub fn build(&self, points: &[Point]) -> Arc<BuildOutcome> {
        let key = fingerprint(points);
        let mut store = self.store.lock();

        if let Some(outcome) = store.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::debug!("Graph {} served from cache", &key[..12]);
            return Arc::clone(outcome);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let outcome = Arc::new(build_graph(points));
        store.put(key.clone(), Arc::clone(&outcome));
        log::debug!("Graph {} built and cached ({} entries)", &key[..12], store.len());

        outcome
    }

    /// Drop every cached graph
    pub fn clear(&self) {
        self.store.lock().clear();
        log::debug!("Graph cache cleared");
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

/// SHA-256 over the point list sorted by id with sorted neighbor lists.
///
/// The sort is stable, so records sharing an id keep their relative order
/// (which decides the surviving duplicate). Of the extra fields only the
/// community and technology take part, since they end up in the graph.
pub fn fingerprint(points: &[Point]) -> String {
    let mut sorted: Vec<&Point> = points.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let mut hasher = Sha256::new();
    for point in sorted {
        let mut neighbors: Vec<&str> = point.neighbors.iter().map(String::as_str).collect();
        neighbors.sort_unstable();

        hash_text(&mut hasher, &point.id);
        hash_text(&mut hasher, &point.name);
        hasher.update(point.lat.to_bits().to_le_bytes());
        hasher.update(point.lon.to_bits().to_le_bytes());
        hash_optional(&mut hasher, point.community());
        hash_optional(&mut hasher, point.technology());
        hasher.update((neighbors.len() as u64).to_le_bytes());
        for neighbor in neighbors {
            hash_text(&mut hasher, neighbor);
        }
    }
    hex::encode(hasher.finalize())
}

/// Length-prefixed, so adjacent strings cannot run into each other
fn hash_text(hasher: &mut Sha256, text: &str) {
    hasher.update((text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
}

fn hash_optional(hasher: &mut Sha256, text: Option<&str>) {
    match text {
        Some(text) => {
            hasher.update([1u8]);
            hash_text(hasher, text);
        }
        None => hasher.update([0u8]),
    }
}
