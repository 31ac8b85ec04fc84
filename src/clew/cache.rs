//! Clew's extraction memoization: a bounded, per-process cache keyed by
//! a fingerprint over source bytes, language, and oracle identity.
//! `xxhash-rust`'s xxh3 computes the fingerprint; `lru::LruCache` bounds
//! memory. Coherence is per-process only — nothing here is persisted
//! across invocations.

use std::hash::Hasher;
use std::num::NonZeroUsize;

use lru::LruCache;
use xxhash_rust::xxh3::Xxh3;

use crate::model::ConstraintSet;

/// `(source-bytes-hash, language, oracle-identity)` collapsed to one key.
fn fingerprint(source: &[u8], language_tag: &str, oracle_identity: &str) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.write(source);
    hasher.write(b"\0");
    hasher.write(language_tag.as_bytes());
    hasher.write(b"\0");
    hasher.write(oracle_identity.as_bytes());
    hasher.finish()
}

pub struct ExtractionCache {
    entries: LruCache<u64, ConstraintSet>,
}

impl ExtractionCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn get(
        &mut self,
        source: &[u8],
        language_tag: &str,
        oracle_identity: &str,
    ) -> Option<&ConstraintSet> {
        let key = fingerprint(source, language_tag, oracle_identity);
        let hit = self.entries.get(&key);
        if hit.is_some() {
            tracing::debug!(language = language_tag, "clew cache hit");
        }
        hit
    }

    pub fn put(
        &mut self,
        source: &[u8],
        language_tag: &str,
        oracle_identity: &str,
        set: ConstraintSet,
    ) {
        let key = fingerprint(source, language_tag, oracle_identity);
        self.entries.put(key, set);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_hit_the_cache() {
        let mut cache = ExtractionCache::new(NonZeroUsize::new(4).unwrap());
        let src = b"fn f() {}";
        assert!(cache.get(src, "rust", "none").is_none());
        cache.put(src, "rust", "none", ConstraintSet::new("s"));
        assert!(cache.get(src, "rust", "none").is_some());
    }

    #[test]
    fn different_language_tag_misses() {
        let mut cache = ExtractionCache::new(NonZeroUsize::new(4).unwrap());
        let src = b"fn f() {}";
        cache.put(src, "rust", "none", ConstraintSet::new("s"));
        assert!(cache.get(src, "python", "none").is_none());
    }

    #[test]
    fn eviction_keeps_recently_used_entries() {
        let mut cache = ExtractionCache::new(NonZeroUsize::new(1).unwrap());
        cache.put(b"a", "rust", "none", ConstraintSet::new("a"));
        cache.put(b"b", "rust", "none", ConstraintSet::new("b"));
        assert!(cache.get(b"a", "rust", "none").is_none());
        assert!(cache.get(b"b", "rust", "none").is_some());
    }
}
