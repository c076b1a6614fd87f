use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;
use redb::{Database, ReadableTable, TableDefinition};
use tracing::{info, warn};

use crate::shared::error::{AppError, AppResult};

/// Redb table holding named storage slots
/// Key: slot name, Value: serialized payload
const SLOTS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("popover_slots");

/// Durable string slots, the equivalent of a page's local storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, slot: &str) -> AppResult<Option<String>>;
    fn set(&self, slot: &str, value: &str) -> AppResult<()>;
}

/// Redb-based storage implementation
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("Failed to create data directory: {}", e)))?;
        }

        let db = Database::create(path)?;

        // Initialize table so reads never hit a missing table
        let write_txn = db.begin_write()?;
        {
            let _table = write_txn.open_table(SLOTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Open the database in the platform data directory
    pub fn open_default() -> AppResult<Self> {
        let proj_dirs = ProjectDirs::from("com", "antigravity", "explain-popover")
            .ok_or_else(|| AppError::System("Failed to get project directories".to_string()))?;
        let path = proj_dirs.data_dir().join("popover_cache.redb");
        info!(path = %path.display(), "opening popover storage");
        Self::open(&path)
    }

    /// Default database, or an in-memory store if it cannot be opened
    pub fn open_default_or_memory() -> Arc<dyn KeyValueStore> {
        match Self::open_default() {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(error = %e, "failed to open popover storage, using in-memory fallback");
                Arc::new(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, slot: &str) -> AppResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SLOTS_TABLE)?;
        let value = table.get(slot)?.map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn set(&self, slot: &str, value: &str) -> AppResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SLOTS_TABLE)?;
            table.insert(slot, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

/// In-memory fallback storage (used if database initialization fails)
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one slot
    pub fn with_slot(slot: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut slots) = store.slots.lock() {
            slots.insert(slot.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, slot: &str) -> AppResult<Option<String>> {
        let slots = self.slots.lock()
            .map_err(|e| AppError::Storage(format!("Mutex poisoned: {}", e)))?;
        Ok(slots.get(slot).cloned())
    }

    fn set(&self, slot: &str, value: &str) -> AppResult<()> {
        let mut slots = self.slots.lock()
            .map_err(|e| AppError::Storage(format!("Mutex poisoned: {}", e)))?;
        slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }
}
