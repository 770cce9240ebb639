//! Time-bound page cache keyed by (template folder, page).
//!
//! Entries are never evicted; a stale entry is ignored and overwritten by the
//! next fetch. Uses tokio's clock so paused-time tests can step past expiry.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub folder: String,
    pub page: String,
}

impl PageKey {
    pub fn new(folder: &str, page: &str) -> Self {
        Self {
            folder: folder.to_string(),
            page: page.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub html: String,
    pub fetched_at: Instant,
}

#[derive(Debug)]
pub struct PageCache {
    entries: HashMap<PageKey, CacheEntry>,
    max_age: Duration,
}

impl PageCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Any entry, fresh or stale.
    pub fn get(&self, folder: &str, page: &str) -> Option<&CacheEntry> {
        self.entries.get(&PageKey::new(folder, page))
    }

    /// The cached HTML if the entry is still inside the freshness window.
    pub fn get_fresh(&self, folder: &str, page: &str) -> Option<&str> {
        self.get(folder, page)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.html.as_str())
    }

    /// Stores `html`, overwriting any entry at the same key.
    pub fn put(&mut self, folder: &str, page: &str, html: String) {
        self.entries.insert(
            PageKey::new(folder, page),
            CacheEntry {
                html,
                fetched_at: Instant::now(),
            },
        );
    }

    /// `now - fetched_at < max_age`
    pub fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.fetched_at.elapsed() < self.max_age
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys as `folder:page`, sorted, for snapshots.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .keys()
            .map(|k| format!("{}:{}", k.folder, k.page))
            .collect();
        keys.sort();
        keys
    }
}
