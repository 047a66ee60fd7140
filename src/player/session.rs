use crate::models::DramaId;

use super::types::{LoadGeneration, PlaybackRate, PlaybackState, SkipVisibility};

/// What a session is playing
#[derive(Debug, Clone, PartialEq)]
pub struct MediaTarget {
    pub drama_id: DramaId,
    pub episode_index: u32,
    pub url: String,
}

/// Volume, mute and speed carried from one episode to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSettings {
    pub volume: f64,
    pub muted: bool,
    pub rate: PlaybackRate,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            rate: PlaybackRate::NORMAL,
        }
    }
}

/// Ephemeral state of the single active media element.
///
/// Owned by the playback controller and replaced whenever the episode
/// changes. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub target: MediaTarget,
    pub generation: LoadGeneration,
    pub state: PlaybackState,
    pub position: f64,
    pub duration: Option<f64>,
    pub audio: AudioSettings,
    pub skip: SkipVisibility,
}

impl PlaybackSession {
    pub fn new(target: MediaTarget, generation: LoadGeneration, audio: AudioSettings) -> Self {
        Self {
            target,
            generation,
            state: PlaybackState::Loading,
            position: 0.0,
            duration: None,
            audio,
            skip: SkipVisibility::default(),
        }
    }

    pub fn drama_id(&self) -> &DramaId {
        &self.target.drama_id
    }

    pub fn episode_index(&self) -> u32 {
        self.target.episode_index
    }

    pub fn url(&self) -> &str {
        &self.target.url
    }

    pub fn is_for(&self, drama_id: &DramaId, episode_index: u32) -> bool {
        &self.target.drama_id == drama_id && self.target.episode_index == episode_index
    }

    pub fn remaining(&self) -> Option<f64> {
        self.duration.map(|d| (d - self.position).max(0.0))
    }
}
