//! Persisted per-drama watch progress.
//!
//! The store is a plain key-value contract keyed by drama. Every store is
//! capacity-bounded: once full, the entry watched longest ago is evicted.

mod json_file;
mod list;
mod memory;

pub use json_file::JsonFileHistoryStore;
pub use list::{DEFAULT_HISTORY_CAPACITY, HistoryList};
pub use memory::MemoryHistoryStore;

use crate::models::{DramaId, WatchHistoryItem};
use crate::utils::errors::HistoryError;

pub trait HistoryStore: Send {
    /// All entries, most recently watched first
    fn get_all(&self) -> Result<Vec<WatchHistoryItem>, HistoryError>;

    fn get(&self, drama_id: &DramaId) -> Result<Option<WatchHistoryItem>, HistoryError> {
        Ok(self
            .get_all()?
            .into_iter()
            .find(|item| &item.drama_id == drama_id))
    }

    /// Insert or replace the entry for `item.drama_id`
    fn upsert(&mut self, item: WatchHistoryItem) -> Result<(), HistoryError>;

    /// Returns whether an entry existed
    fn remove(&mut self, drama_id: &DramaId) -> Result<bool, HistoryError>;

    fn clear(&mut self) -> Result<(), HistoryError>;
}
