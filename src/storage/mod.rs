//! Persisted client-side state
//!
//! `kv` is the raw document storage; `notes` and `history` are the owned
//! stores injected into the table, the charts and the poller.

pub mod history;
pub mod kv;
pub mod notes;

pub use history::{HistoryPoint, HistorySeries, HistoryStore, HISTORY_STORAGE_KEY};
pub use kv::{FileKvStore, KvStore, MemoryKvStore};
pub use notes::{NoteStore, NOTES_STORAGE_KEY};
