use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{HistoryList, HistoryStore};
use crate::models::{DramaId, WatchHistoryItem};
use crate::utils::errors::HistoryError;

/// History persisted as a JSON array, rewritten after every mutation
#[derive(Debug)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
    list: HistoryList,
}

impl JsonFileHistoryStore {
    /// Open the store at `path`. A missing file starts empty; an unreadable
    /// one is logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Result<Self, HistoryError> {
        let path = path.into();
        let list = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            match serde_json::from_str::<Vec<WatchHistoryItem>>(&contents) {
                Ok(items) => {
                    debug!("Loaded {} history entries from {:?}", items.len(), path);
                    HistoryList::from_items(items, capacity)
                }
                Err(e) => {
                    warn!("Discarding unreadable history file {:?}: {}", path, e);
                    HistoryList::new(capacity)
                }
            }
        } else {
            info!("No history file at {:?}, starting empty", path);
            HistoryList::new(capacity)
        };

        Ok(Self { path, list })
    }

    /// `<data dir>/dramapop/history.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("dramapop").join("history.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self.list.items())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl HistoryStore for JsonFileHistoryStore {
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
        self.persist()
    }

    fn remove(&mut self, drama_id: &DramaId) -> Result<bool, HistoryError> {
        let removed = self.list.remove(drama_id);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        self.list.clear();
        self.persist()
    }
}
