//! In-memory cache of generated print sheets
//!
//! Entries are keyed by request fingerprint and live as long as the owning
//! service. There is no eviction policy: an entry is dropped only when its
//! file is found missing on lookup, when another entry claims the same output
//! path, or when the file is deleted through the service.

use crate::types::PrintFileRecord;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(PrintFileRecord),
    /// An entry existed but its file is gone; the entry has been removed
    Stale(PrintFileRecord),
    Miss,
}

/// Async mutexes handed out per key.
///
/// An entry lives only while some caller holds or waits on its lock.
#[derive(Default)]
struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    fn map(&self) -> MutexGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<()>>>> {
        self.locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn acquire(&self, key: String) -> KeyGuard<'_> {
        let lock = self
            .map()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        KeyGuard {
            owner: self,
            key,
            guard: Some(guard),
        }
    }

    fn len(&self) -> usize {
        self.map().len()
    }
}

/// Held lock for one key; releasing the last holder forgets the key
pub struct KeyGuard<'a> {
    owner: &'a KeyedLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = self.owner.map();
        // Waiters hold their own clone of the Arc
        let idle = map
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            map.remove(&self.key);
        }
    }
}

#[derive(Default)]
pub struct PrintCache {
    entries: Mutex<HashMap<String, PrintFileRecord>>,
    builders: KeyedLocks,
    publishers: KeyedLocks,
}

impl PrintCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, PrintFileRecord>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Serialize builders of the same fingerprint.
    ///
    /// Hold the returned guard across lookup, generation and `put` so that
    /// concurrent identical requests generate the sheet at most once.
    pub async fn lock_fingerprint(&self, fingerprint: &str) -> KeyGuard<'_> {
        self.builders.acquire(fingerprint.to_string()).await
    }

    /// Serialize writers of the same output file.
    ///
    /// Different fingerprints can map to one file name (a single card with and
    /// without bleed). Hold the guard across writing the file and `put` so the
    /// cache always records the bytes that ended up on disk.
    pub async fn lock_output_path(&self, path: &Path) -> KeyGuard<'_> {
        self.publishers
            .acquire(path.to_string_lossy().into_owned())
            .await
    }

    /// Number of fingerprint or path locks currently held or awaited
    pub fn active_locks(&self) -> usize {
        self.builders.len() + self.publishers.len()
    }

    /// Look up a fingerprint, verifying the recorded file still exists
    pub async fn lookup(&self, fingerprint: &str) -> CacheLookup {
        let cached = self.entries().get(fingerprint).cloned();
        let Some(record) = cached else {
            debug!(fingerprint, "cache miss");
            return CacheLookup::Miss;
        };

        let exists = tokio::fs::try_exists(&record.file_path)
            .await
            .unwrap_or(false);
        if exists {
            debug!(fingerprint, id = %record.id, "cache hit");
            return CacheLookup::Hit(record);
        }

        warn!(
            fingerprint,
            path = %record.file_path.display(),
            "cached print file is missing, regenerating"
        );
        self.entries().remove(fingerprint);
        CacheLookup::Stale(record)
    }

    /// Cached record for a fingerprint whose file still exists
    pub async fn get(&self, fingerprint: &str) -> Option<PrintFileRecord> {
        match self.lookup(fingerprint).await {
            CacheLookup::Hit(record) => Some(record),
            CacheLookup::Stale(_) | CacheLookup::Miss => None,
        }
    }

    /// Store a record, replacing any entry that recorded the same file
    pub fn put(&self, fingerprint: impl Into<String>, record: PrintFileRecord) {
        let fingerprint = fingerprint.into();
        let mut entries = self.entries();
        entries.retain(|key, existing| {
            *key == fingerprint || existing.file_path != record.file_path
        });
        entries.insert(fingerprint, record);
    }

    /// Remove every entry whose file is `path`; returns how many were removed
    pub fn evict_path(&self, path: &Path) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, record| record.file_path != path);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}
