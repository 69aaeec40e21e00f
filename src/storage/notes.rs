/// Persisted free-text notes keyed by miner symbol
///
/// Shared between the table (editor) and the charts (label decoration).
/// Last write wins; storage failures are logged and absorbed.
use super::kv::KvStore;
use crate::errors::{MonitorError, MonitorResult};
use crate::logger::{self, LogTag};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const NOTES_STORAGE_KEY: &str = "symbolNotes";

pub struct NoteStore {
    storage: Arc<dyn KvStore>,
    notes: RwLock<BTreeMap<String, String>>,
}

impl NoteStore {
    pub fn new(storage: Arc<dyn KvStore>) -> Self {
        Self {
            storage,
            notes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a store and immediately restore persisted notes
    pub fn open(storage: Arc<dyn KvStore>) -> Self {
        let store = Self::new(storage);
        store.load();
        store
    }

    /// Restore notes from storage, replacing the in-memory map
    ///
    /// Unreadable or corrupt documents leave the store empty.
    pub fn load(&self) {
        let loaded = match self.read_persisted() {
            Ok(notes) => notes,
            Err(e) => {
                logger::warning(LogTag::Storage, &format!("Ignoring stored notes: {}", e));
                BTreeMap::new()
            }
        };

        logger::debug(LogTag::Storage, &format!("Loaded {} symbol notes", loaded.len()));
        *self.notes.write() = loaded;
    }

    fn read_persisted(&self) -> MonitorResult<BTreeMap<String, String>> {
        match self.storage.read(NOTES_STORAGE_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| MonitorError::storage(NOTES_STORAGE_KEY, e)),
            None => Ok(BTreeMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.notes.read().get(key).cloned()
    }

    /// Write a note and persist; blank text removes the note
    pub fn set(&self, key: &str, text: &str) {
        {
            let mut notes = self.notes.write();
            if text.trim().is_empty() {
                notes.remove(key);
            } else {
                notes.insert(key.to_string(), text.to_string());
            }
        }

        if let Err(e) = self.persist() {
            logger::warning(LogTag::Storage, &format!("Failed to persist notes: {}", e));
        }
    }

    pub fn all(&self) -> BTreeMap<String, String> {
        self.notes.read().clone()
    }

    pub fn persist(&self) -> MonitorResult<()> {
        let raw = serde_json::to_string(&*self.notes.read())
            .map_err(|e| MonitorError::storage(NOTES_STORAGE_KEY, e))?;
        self.storage.write(NOTES_STORAGE_KEY, &raw)
    }
}
