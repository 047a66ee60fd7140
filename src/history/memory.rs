use tracing::debug;

use super::{HistoryList, HistoryStore};
use crate::models::{DramaId, WatchHistoryItem};
use crate::utils::errors::HistoryError;

/// Non-durable store, for tests and sessions without a writable data dir
#[derive(Debug, Default, Clone)]
pub struct MemoryHistoryStore {
    list: HistoryList,
}

impl MemoryHistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            list: HistoryList::new(capacity),
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn get_all(&self) -> Result<Vec<WatchHistoryItem>, HistoryError> {
        Ok(self.list.items().to_vec())
    }

    fn get(&self, drama_id: &DramaId) -> Result<Option<WatchHistoryItem>, HistoryError> {
        Ok(self.list.get(drama_id).cloned())
    }

    fn upsert(&mut self, item: WatchHistoryItem) -> Result<(), HistoryError> {
        for evicted in self.list.upsert(item) {
            debug!("Evicted history entry for {}", evicted.drama_id);
        }
        Ok(())
    }

    fn remove(&mut self, drama_id: &DramaId) -> Result<bool, HistoryError> {
        Ok(self.list.remove(drama_id))
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        self.list.clear();
        Ok(())
    }
}
