/// Key-value persistence for small JSON documents
///
/// Each key maps to one JSON document. `FileKvStore` keeps one file per key
/// under the storage directory; `MemoryKvStore` backs tests and dry runs.
use crate::errors::{MonitorError, MonitorResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub trait KvStore: Send + Sync {
    /// Raw document for `key`, `Ok(None)` when nothing was stored yet
    fn read(&self, key: &str) -> MonitorResult<Option<String>>;

    /// Replace the document for `key`
    fn write(&self, key: &str, value: &str) -> MonitorResult<()>;
}

/// File-per-key storage
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl KvStore for FileKvStore {
    fn read(&self, key: &str) -> MonitorResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| MonitorError::storage(key, e))
    }

    fn write(&self, key: &str, value: &str) -> MonitorResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| MonitorError::storage(key, e))?;

        // Write-then-rename, readers never see a truncated document
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| MonitorError::storage(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| MonitorError::storage(key, e))
    }
}

/// In-memory storage
#[derive(Default)]
pub struct MemoryKvStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn read(&self, key: &str) -> MonitorResult<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> MonitorResult<()> {
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
