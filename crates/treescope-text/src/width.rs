#![forbid(unsafe_code)]

//! Display-width measurement.
//!
//! Collapsed widths are measured in terminal cells (`unicode-width`), so a
//! CJK literal counts double. Every text leaf is measured once per part, but
//! the same short strings (delimiters, field names) recur across a tree, so
//! measurements go through a thread-local LRU cache.

use std::cell::RefCell;
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;
use rustc_hash::FxHasher;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Default cache capacity.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Cell width of a string.
#[inline]
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.width()
}

/// Shorten `text` to at most `max_width` cells, ending in `ellipsis` when cut.
///
/// Cuts only at grapheme boundaries.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_width: usize, ellipsis: &str) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(ellipsis.width());
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if used + w > budget {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    if ellipsis.width() <= max_width {
        out.push_str(ellipsis);
    }
    out
}

/// Hit/miss counters for a [`WidthCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to measure.
    pub misses: u64,
    /// Entries currently held.
    pub size: usize,
    /// Maximum number of entries.
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache (0.0 when unused).
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

type FxBuild = BuildHasherDefault<FxHasher>;

/// LRU cache of string widths, keyed by a 64-bit FxHash of the text.
///
/// Not thread-safe; use [`cached_width`] for the per-thread instance.
#[derive(Debug)]
pub struct WidthCache {
    entries: LruCache<u64, usize, FxBuild>,
    hits: u64,
    misses: u64,
}

impl WidthCache {
    /// Create a cache holding up to `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::with_hasher(capacity, FxBuild::default()),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached width of `text`, measuring it on a miss.
    pub fn get_or_compute(&mut self, text: &str) -> usize {
        let key = key_for(text);
        if let Some(&width) = self.entries.get(&key) {
            self.hits += 1;
            return width;
        }
        self.misses += 1;
        let width = display_width(text);
        self.entries.put(key, width);
        width
    }

    /// Whether `text` has a cached width (does not touch LRU order).
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains(&key_for(text))
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
            capacity: self.entries.cap().get(),
        }
    }
}

impl Default for WidthCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[inline]
fn key_for(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

thread_local! {
    static THREAD_CACHE: RefCell<WidthCache> = RefCell::new(WidthCache::default());
}

/// Width of `text` via the thread-local cache.
pub fn cached_width(text: &str) -> usize {
    // Single ASCII bytes are cheaper to measure than to hash.
    if text.len() <= 1 && text.is_ascii() {
        return display_width(text);
    }
    THREAD_CACHE.with(|cache| cache.borrow_mut().get_or_compute(text))
}

/// Counters of the thread-local cache.
pub fn thread_cache_stats() -> CacheStats {
    THREAD_CACHE.with(|cache| cache.borrow().stats())
}

/// Reset the thread-local cache.
pub fn clear_thread_cache() {
    THREAD_CACHE.with(|cache| cache.borrow_mut().clear());
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn cached_matches_uncached(s in "[a-zA-Z0-9 ,:()\\[\\]]{0,40}") {
            prop_assert_eq!(cached_width(&s), display_width(&s));
        }

        #[test]
        fn truncation_never_exceeds_width(s in "[a-z ]{0,60}", width in 2usize..40) {
            let out = truncate_with_ellipsis(&s, width, "…");
            prop_assert!(display_width(&out) <= width);
        }
    }
}
