use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

struct CachedText {
    text: Arc<str>,
    inserted_at: Instant,
}

/// Downloaded book texts keyed by book id, bounded by entry count and age.
pub struct TextCache {
    texts: DashMap<u32, CachedText>,
    max_entries: usize,
    ttl: Duration,
    hits: AtomicUsize,
    misses: AtomicUsize,
    evictions: AtomicUsize,
}

impl TextCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            texts: DashMap::new(),
            max_entries,
            ttl,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            evictions: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, book_id: u32) -> Option<Arc<str>> {
        let cached = self.texts.get(&book_id).map(|entry| {
            (entry.text.clone(), entry.inserted_at.elapsed() >= self.ttl)
        });

        match cached {
            Some((text, false)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(text)
            }
            Some((_, true)) => {
                self.drop_if_expired(book_id);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Remove `book_id` only if it is still expired under the shard lock,
    /// so an entry re-inserted since the read survives
    fn drop_if_expired(&self, book_id: u32) -> bool {
        let removed = self
            .texts
            .remove_if(&book_id, |_, cached| cached.inserted_at.elapsed() >= self.ttl)
            .is_some();
        if removed {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// Cache a downloaded text. A zero-capacity cache stores nothing.
    pub fn insert(&self, book_id: u32, text: Arc<str>) {
        if self.max_entries == 0 {
            return;
        }

        if !self.texts.contains_key(&book_id) && self.texts.len() >= self.max_entries {
            self.make_room();
        }

        self.texts.insert(
            book_id,
            CachedText {
                text,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Purge expired entries, then the oldest quarter if still full
    fn make_room(&self) {
        let before = self.texts.len();
        self.texts
            .retain(|_, cached| cached.inserted_at.elapsed() < self.ttl);

        if self.texts.len() >= self.max_entries {
            let mut by_age: Vec<(u32, Instant)> = self
                .texts
                .iter()
                .map(|entry| (*entry.key(), entry.value().inserted_at))
                .collect();
            by_age.sort_by_key(|&(_, inserted_at)| inserted_at);

            let to_remove = (self.max_entries / 4).max(1);
            for (book_id, _) in by_age.into_iter().take(to_remove) {
                self.texts.remove(&book_id);
            }
        }

        let removed = before.saturating_sub(self.texts.len());
        self.evictions.fetch_add(removed, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            texts_cached: self.texts.len(),
            max_entries: self.max_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.texts.clear();
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub texts_cached: usize,
    pub max_entries: usize,
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
}
