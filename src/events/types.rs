use serde::Serialize;

use crate::models::DramaId;
use crate::player::{PlaybackRate, PlaybackState, SkipVisibility};
use crate::utils::errors::PlaybackError;

/// Result of an episode navigation request
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    /// The episode's URL was handed to the player
    Opened {
        drama_id: DramaId,
        episode_index: u32,
        url: String,
    },
    /// Playback ended and there is nothing to advance to
    Finished { drama_id: DramaId, episode_index: u32 },
    Failed {
        drama_id: DramaId,
        episode_index: u32,
        error: PlaybackError,
    },
    /// A newer request replaced this one before it completed
    Superseded { drama_id: DramaId, episode_index: u32 },
    /// Nothing to do (out-of-range target, no episode open, already advanced)
    Ignored,
}

impl NavigationOutcome {
    /// Outcomes the UI needs to hear about
    pub fn is_user_visible(&self) -> bool {
        match self {
            NavigationOutcome::Opened { .. } | NavigationOutcome::Finished { .. } => true,
            NavigationOutcome::Failed { error, .. } => error.is_user_visible(),
            NavigationOutcome::Superseded { .. } | NavigationOutcome::Ignored => false,
        }
    }

    pub fn is_opened(&self) -> bool {
        matches!(self, NavigationOutcome::Opened { .. })
    }
}

/// Everything the UI layer can observe
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    StateChanged {
        from: PlaybackState,
        to: PlaybackState,
    },
    TimeUpdate {
        position: f64,
        duration: Option<f64>,
    },
    BufferingChanged(bool),
    SkipVisibilityChanged(SkipVisibility),
    VolumeChanged {
        volume: f64,
        muted: bool,
    },
    RateChanged(PlaybackRate),
    EndOfMedia {
        drama_id: DramaId,
        episode_index: u32,
    },
    Navigation(NavigationOutcome),
    HistoryUpdated {
        drama_id: DramaId,
        episode_index: u32,
        progress: u8,
    },
}

impl PlayerEvent {
    pub fn kind(&self) -> PlayerEventKind {
        match self {
            PlayerEvent::StateChanged { .. } => PlayerEventKind::State,
            PlayerEvent::TimeUpdate { .. } => PlayerEventKind::Time,
            PlayerEvent::BufferingChanged(_) => PlayerEventKind::Buffering,
            PlayerEvent::SkipVisibilityChanged(_) => PlayerEventKind::Skip,
            PlayerEvent::VolumeChanged { .. } | PlayerEvent::RateChanged(_) => {
                PlayerEventKind::Audio
            }
            PlayerEvent::EndOfMedia { .. } => PlayerEventKind::EndOfMedia,
            PlayerEvent::Navigation(_) => PlayerEventKind::Navigation,
            PlayerEvent::HistoryUpdated { .. } => PlayerEventKind::History,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlayerEventKind {
    State,
    Time,
    Buffering,
    Skip,
    Audio,
    EndOfMedia,
    Navigation,
    History,
}

impl PlayerEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerEventKind::State => "player.state",
            PlayerEventKind::Time => "player.time",
            PlayerEventKind::Buffering => "player.buffering",
            PlayerEventKind::Skip => "player.skip",
            PlayerEventKind::Audio => "player.audio",
            PlayerEventKind::EndOfMedia => "player.ended",
            PlayerEventKind::Navigation => "continuity.navigation",
            PlayerEventKind::History => "continuity.history",
        }
    }
}
