use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use super::store::KeyValueStore;
use crate::config::{CACHE_CAPACITY, STORAGE_SLOT};
use crate::shared::error::AppResult;
use crate::shared::types::CacheEntry;

/// Bounded explanation cache, newest entry first.
///
/// Ordering is by insertion only: `lookup` never moves an entry, and
/// `store` moves its key to the front. The whole list is rewritten to one
/// storage slot on every `store`.
#[derive(Clone)]
pub struct ExplanationCache {
    storage: Arc<dyn KeyValueStore>,
    slot: String,
    capacity: usize,
    entries: Arc<Mutex<Vec<CacheEntry>>>,
}

impl ExplanationCache {
    /// Load the cache from the default slot. Never fails: a missing, unreadable
    /// or malformed slot yields an empty cache.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::load_with(storage, STORAGE_SLOT, CACHE_CAPACITY)
    }

    pub fn load_with(storage: Arc<dyn KeyValueStore>, slot: &str, capacity: usize) -> Self {
        let mut entries = read_entries(storage.as_ref(), slot);
        entries.truncate(capacity);
        info!(slot, entries = entries.len(), "loaded explanation cache");

        Self {
            storage,
            slot: slot.to_string(),
            capacity,
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    fn entries_guard(&self) -> MutexGuard<'_, Vec<CacheEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("explanation cache mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Exact, case-sensitive match on the selection text
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.entries_guard()
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.clone())
    }

    /// Insert at the front, dropping any previous entry for `key` and anything
    /// past capacity, then persist.
    ///
    /// The in-memory list is updated even when persisting fails; the error is
    /// returned so the caller can log it.
    pub fn store(&self, key: &str, value: &str) -> AppResult<()> {
        let serialized = {
            let mut entries = self.entries_guard();
            entries.retain(|entry| entry.key != key);
            entries.insert(0, CacheEntry {
                key: key.to_string(),
                value: value.to_string(),
            });
            entries.truncate(self.capacity);
            serde_json::to_string(&*entries)?
        };

        self.storage.set(&self.slot, &serialized)?;
        debug!(key_len = key.len(), "cached explanation");
        Ok(())
    }

    /// Snapshot of the entries, newest first
    pub fn entries(&self) -> Vec<CacheEntry> {
        self.entries_guard().clone()
    }

    pub fn len(&self) -> usize {
        self.entries_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries_guard().is_empty()
    }
}

fn read_entries(storage: &dyn KeyValueStore, slot: &str) -> Vec<CacheEntry> {
    let raw = match storage.get(slot) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, slot, "failed to read explanation cache, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<CacheEntry>>(&raw) {
        Ok(mut entries) => {
            // Keep the first (newest) occurrence of each key
            let mut seen = std::collections::HashSet::new();
            entries.retain(|entry| seen.insert(entry.key.clone()));
            entries
        }
        Err(e) => {
            warn!(error = %e, slot, "malformed explanation cache, starting empty");
            Vec::new()
        }
    }
}
