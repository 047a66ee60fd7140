use std::cmp::Reverse;

use crate::models::{DramaId, WatchHistoryItem};

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Ordered, bounded set of history entries shared by the store implementations
#[derive(Debug, Clone)]
pub struct HistoryList {
    items: Vec<WatchHistoryItem>,
    capacity: usize,
}

impl Default for HistoryList {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryList {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild from previously persisted entries, restoring the invariants
    /// (one entry per drama, clamped progress, newest first, bounded).
    pub fn from_items(items: Vec<WatchHistoryItem>, capacity: usize) -> Self {
        let mut list = Self::new(capacity);
        // Persisted order is newest first; replay oldest first so ties keep their order.
        for item in items.into_iter().rev() {
            let superseded = list
                .get(&item.drama_id)
                .is_some_and(|existing| existing.last_watched_at > item.last_watched_at);
            if !superseded {
                list.upsert(item);
            }
        }
        list
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[WatchHistoryItem] {
        &self.items
    }

    pub fn get(&self, drama_id: &DramaId) -> Option<&WatchHistoryItem> {
        self.items.iter().find(|item| &item.drama_id == drama_id)
    }

    /// Returns the entries evicted to stay within capacity
    pub fn upsert(&mut self, mut item: WatchHistoryItem) -> Vec<WatchHistoryItem> {
        item.progress = item.progress.min(100);
        self.items.retain(|existing| existing.drama_id != item.drama_id);
        self.items.insert(0, item);
        self.items.sort_by_key(|entry| Reverse(entry.last_watched_at));

        if self.items.len() > self.capacity {
            self.items.split_off(self.capacity)
        } else {
            Vec::new()
        }
    }

    pub fn remove(&mut self, drama_id: &DramaId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.drama_id != drama_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
