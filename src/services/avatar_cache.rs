//! In-memory avatar store with a fixed TTL and a background sweeper.
//!
//! Uploaded profile photos are a cache, not a system of record: entries
//! expire one hour after upload, are swept every thirty minutes, and are
//! lost on restart. The user's `avatar_url` in the database is the durable
//! reference; a stale URL simply 404s.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tokio::time::interval;
use tracing::{debug, info};

/// A cached avatar: raw bytes plus the content type it was uploaded with.
#[derive(Clone)]
struct StoredAvatar {
    bytes: Vec<u8>,
    content_type: String,
    stored_at: Instant,
}

/// Process-local avatar cache. Shared across workers behind an `Arc`; the
/// inner map is RwLock-protected because actix runs multiple worker threads.
pub struct AvatarCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, StoredAvatar>>,
}

impl AvatarCache {
    /// Create a cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Store an avatar under its generated filename.
    pub fn insert(&self, filename: String, bytes: Vec<u8>, content_type: String) {
        let mut entries = self.entries.write().expect("avatar cache lock poisoned");
        entries.insert(
            filename,
            StoredAvatar {
                bytes,
                content_type,
                stored_at: Instant::now(),
            },
        );
    }

    /// Fetch an avatar's bytes and content type.
    ///
    /// Returns None for unknown filenames and for expired entries; an expired
    /// entry is evicted on access rather than waiting for the next sweep.
    pub fn fetch(&self, filename: &str) -> Option<(Vec<u8>, String)> {
        {
            let entries = self.entries.read().expect("avatar cache lock poisoned");
            let entry = entries.get(filename)?;
            if entry.stored_at.elapsed() < self.ttl {
                return Some((entry.bytes.clone(), entry.content_type.clone()));
            }
        }

        // Expired: upgrade to a write lock and evict.
        let mut entries = self.entries.write().expect("avatar cache lock poisoned");
        entries.remove(filename);
        None
    }

    /// Remove every expired entry. Returns the number evicted.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.write().expect("avatar cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }

    /// Number of live entries (including not-yet-swept expired ones).
    pub fn len(&self) -> usize {
        self.entries.read().expect("avatar cache lock poisoned").len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Start the background sweep task.
///
/// Spawns a tokio task that periodically evicts expired avatars so abandoned
/// uploads do not accumulate in memory.
pub fn start_sweep_task(cache: Arc<AvatarCache>, interval_secs: u64) {
    tokio::spawn(async move {
        info!(
            "Starting avatar cache sweeper (interval: {} seconds)",
            interval_secs
        );

        let mut ticker = interval(Duration::from_secs(interval_secs));

        loop {
            ticker.tick().await;

            let evicted = cache.sweep();
            if evicted > 0 {
                info!("Avatar sweep evicted {} expired entries", evicted);
            } else {
                debug!("Avatar sweep found nothing to evict");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_fetch() {
        let cache = AvatarCache::new(Duration::from_secs(60));
        cache.insert(
            "user-1.png".to_string(),
            vec![0x89, 0x50, 0x4e, 0x47],
            "image/png".to_string(),
        );

        let (bytes, content_type) = cache.fetch("user-1.png").unwrap();
        assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(content_type, "image/png");
    }

    #[test]
    fn test_fetch_unknown_is_none() {
        let cache = AvatarCache::new(Duration::from_secs(60));
        assert!(cache.fetch("missing.png").is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted_on_access() {
        let cache = AvatarCache::new(Duration::from_millis(10));
        cache.insert("a.png".to_string(), vec![1], "image/png".to_string());

        std::thread::sleep(Duration::from_millis(25));

        assert!(cache.fetch("a.png").is_none());
        // Eviction happened on access, not just a filtered read
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let cache = AvatarCache::new(Duration::from_millis(50));
        cache.insert("old.png".to_string(), vec![1], "image/png".to_string());

        std::thread::sleep(Duration::from_millis(70));
        cache.insert("new.png".to_string(), vec![2], "image/png".to_string());

        let evicted = cache.sweep();
        assert_eq!(evicted, 1);
        assert!(cache.fetch("old.png").is_none());
        assert!(cache.fetch("new.png").is_some());
    }

    #[test]
    fn test_reupload_refreshes_entry() {
        let cache = AvatarCache::new(Duration::from_millis(80));
        cache.insert("a.png".to_string(), vec![1], "image/png".to_string());

        std::thread::sleep(Duration::from_millis(50));
        cache.insert("a.png".to_string(), vec![2], "image/png".to_string());

        std::thread::sleep(Duration::from_millis(50));
        // Original stamp is 100ms old, but the re-upload reset the clock
        let (bytes, _) = cache.fetch("a.png").unwrap();
        assert_eq!(bytes, vec![2]);
    }
}
