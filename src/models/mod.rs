mod identifiers;

pub use identifiers::DramaId;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog entry for a short drama. Refetched, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drama {
    pub id: DramaId,
    pub title: String,
    pub cover: Option<String>,
    pub tags: Vec<String>,
    pub total_episodes: u32,
    pub view_count: u64,
    pub synopsis: Option<String>,
}

/// One playable unit of a drama. `index` is 1-based and contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub drama_id: DramaId,
    pub index: u32,
    pub name: String,
    pub thumbnail: Option<String>,
    pub cdn_sources: Vec<CdnSource>,
}

/// A delivery origin offering the episode in one or more quality tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdnSource {
    pub domain: String,
    pub is_default: bool,
    pub variants: Vec<VideoVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoVariant {
    /// Vertical resolution tier, e.g. 540, 720, 1080
    pub quality: u32,
    pub url: String,
    pub is_default: bool,
}

impl VideoVariant {
    pub fn new(quality: u32, url: impl Into<String>, is_default: bool) -> Self {
        Self {
            quality,
            url: url.into(),
            is_default,
        }
    }
}

/// Per-drama watch progress. At most one entry exists per drama.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryItem {
    pub drama_id: DramaId,
    pub episode_index: u32,
    /// Episode count as known when the entry was written
    pub total_episodes: Option<u32>,
    /// Percentage of the last watched episode, 0-100
    pub progress: u8,
    pub last_watched_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

impl WatchHistoryItem {
    pub fn new(
        drama_id: DramaId,
        episode_index: u32,
        total_episodes: Option<u32>,
        progress: i64,
        last_watched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            drama_id,
            episode_index,
            total_episodes,
            progress: clamp_progress(progress),
            last_watched_at,
            title: None,
            cover: None,
        }
    }

    pub fn with_snapshot(mut self, title: Option<String>, cover: Option<String>) -> Self {
        self.title = title;
        self.cover = cover;
        self
    }
}

/// Clamp a raw percentage into 0..=100.
pub fn clamp_progress(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// `floor(position / duration * 100)`, clamped. Unknown or zero duration yields 0.
pub fn progress_percent(position: f64, duration: f64) -> u8 {
    if !position.is_finite() || !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    clamp_progress((position / duration * 100.0).floor() as i64)
}
