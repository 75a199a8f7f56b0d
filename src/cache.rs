use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{MAX_CACHE_SIZE, MAX_ENTRY_AGE, MAX_OBJECT_SIZE};

/// A stored response body, compressed at insert time, plus the moment
/// it went in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub body: Bytes,
    pub stored_at: u64,
}

impl CacheEntry {
    /// An entry is stale once it has sat in the cache for longer than
    /// [`MAX_ENTRY_AGE`] seconds. Stale entries are still served; only
    /// a sweep removes them.
    pub fn is_stale(&self, now: u64) -> bool {
        now.saturating_sub(self.stored_at) > MAX_ENTRY_AGE
    }
}

/// What [`CacheStore::insert`] did with the candidate entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Entry admitted; `free_space` is the budget left afterwards.
    Inserted { free_space: usize },
    /// Compressed body alone exceeds [`MAX_OBJECT_SIZE`].
    ObjectTooLarge,
    /// Admitting the entry would push the total past [`MAX_CACHE_SIZE`].
    CacheFull,
}

/// Shared response cache, keyed by absolute URL.
///
/// Cloning is cheap and every clone sees the same entries. The size
/// counter is read without the lock for logging; all mutation happens
/// under the lock so the admission check and the insert are atomic.
#[derive(Debug, Clone)]
pub struct CacheStore {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    total_size: Arc<AtomicUsize>,
}

fn entry_size(url: &str, body: &Bytes) -> usize {
    url.len() + body.len() + std::mem::size_of::<u64>()
}

impl CacheStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            total_size: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Look up a stored response. Staleness is not checked here: an
    /// entry past its age limit is still returned until a sweep
    /// removes it.
    pub async fn get(&self, url: &str) -> Option<CacheEntry> {
        self.entries.lock().await.get(url).cloned()
    }

    /// Try to admit a compressed response body under `url`.
    ///
    /// Replacing an existing entry credits its size back before the
    /// budget check, so a same-URL update is never rejected just
    /// because the old copy is counted twice.
    pub async fn insert(&self, url: String, body: Bytes, stored_at: u64) -> InsertOutcome {
        if body.len() > MAX_OBJECT_SIZE {
            return InsertOutcome::ObjectTooLarge;
        }
        let size = entry_size(&url, &body);
        let mut entries = self.entries.lock().await;
        let replaced = entries
            .get(&url)
            .map(|old| entry_size(&url, &old.body))
            .unwrap_or(0);
        let total = self.total_size.load(Ordering::Relaxed);
        let new_total = total.saturating_sub(replaced) + size;
        if new_total > MAX_CACHE_SIZE {
            return InsertOutcome::CacheFull;
        }
        entries.insert(url, CacheEntry { body, stored_at });
        self.total_size.store(new_total, Ordering::Relaxed);
        InsertOutcome::Inserted {
            free_space: MAX_CACHE_SIZE - new_total,
        }
    }

    /// Remove every entry older than [`MAX_ENTRY_AGE`] seconds and
    /// return how many were dropped.
    pub async fn evict_stale(&self, now: u64) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        let mut freed = 0usize;
        entries.retain(|url, entry| {
            if entry.is_stale(now) {
                freed += entry_size(url, &entry.body);
                false
            } else {
                true
            }
        });
        self.total_size.fetch_sub(freed, Ordering::Relaxed);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Current charged size in bytes across all entries.
    pub fn total_size(&self) -> usize {
        self.total_size.load(Ordering::Relaxed)
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
