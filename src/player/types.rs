use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport state of the active media session.
///
/// Buffering only exists as a flag on `Playing`/`Paused`, so combinations
/// like buffering-while-idle cannot be expressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing { buffering: bool },
    Paused { buffering: bool },
    Ended,
    Error(String),
}

impl PlaybackState {
    /// States from which play/pause are honoured
    pub fn accepts_transport(&self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Playing { .. } | Self::Paused { .. }
        )
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    pub fn is_buffering(&self) -> bool {
        matches!(
            self,
            Self::Playing { buffering: true } | Self::Paused { buffering: true }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended | Self::Error(_))
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Playing { buffering: false } => write!(f, "playing"),
            Self::Playing { buffering: true } => write!(f, "playing (buffering)"),
            Self::Paused { buffering: false } => write!(f, "paused"),
            Self::Paused { buffering: true } => write!(f, "paused (buffering)"),
            Self::Ended => write!(f, "ended"),
            Self::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

/// Playback speed restricted to the steps offered in the speed menu
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackRate(f64);

impl PlaybackRate {
    pub const ALLOWED: [f64; 8] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];
    pub const NORMAL: PlaybackRate = PlaybackRate(1.0);

    /// Snap an arbitrary request to the nearest allowed step
    pub fn nearest(requested: f64) -> Self {
        if !requested.is_finite() {
            return Self::NORMAL;
        }
        let mut best = Self::ALLOWED[0];
        for step in Self::ALLOWED {
            if (step - requested).abs() < (best - requested).abs() {
                best = step;
            }
        }
        PlaybackRate(best)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Identifies one `load()` call. Media events carrying an older generation
/// belong to a superseded load and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadGeneration(pub u64);

impl LoadGeneration {
    pub fn next(self) -> Self {
        LoadGeneration(self.0 + 1)
    }
}

/// Signals reported by the media pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Metadata loaded and the element can start playing
    Ready { duration: f64 },
    DurationChanged(f64),
    TimeUpdate(f64),
    Buffering(bool),
    Ended,
    Error(String),
}

/// Whether the skip-intro / skip-outro shortcuts are offered right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkipVisibility {
    pub intro: bool,
    pub outro: bool,
}
