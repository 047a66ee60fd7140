use tracing::{debug, info};

/// What to do once the current episode has played to the end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAction {
    /// Open the given episode of the same drama
    Advance { next_index: u32 },
    /// Stay on the ended episode and tell the UI there is nothing next
    Finish,
}

/// End-of-media policy. Advances only with auto-play on and a known next
/// episode; an unknown total is treated as "no next episode".
pub fn decide_after_end(auto_play: bool, current_index: u32, total_episodes: Option<u32>) -> EndAction {
    match total_episodes {
        Some(total) if auto_play && current_index < total => EndAction::Advance {
            next_index: current_index + 1,
        },
        _ => EndAction::Finish,
    }
}

/// Applies [`decide_after_end`] at most once per opened episode.
#[derive(Debug, Clone)]
pub struct AutoPlayManager {
    enabled: bool,
    /// Whether the end policy already ran for the current episode
    auto_play_triggered: bool,
}

impl AutoPlayManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            auto_play_triggered: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Arm the policy for a newly opened episode
    pub fn reset(&mut self) {
        self.auto_play_triggered = false;
    }

    /// Treat the current episode as already handled
    pub fn mark_triggered(&mut self) {
        self.auto_play_triggered = true;
    }

    /// Decide once; later calls for the same episode return `None`
    pub fn on_end_of_media(&mut self, current_index: u32, total_episodes: Option<u32>) -> Option<EndAction> {
        if self.auto_play_triggered {
            debug!("End policy already applied for episode {}", current_index);
            return None;
        }
        self.auto_play_triggered = true;

        let action = decide_after_end(self.enabled, current_index, total_episodes);
        match action {
            EndAction::Advance { next_index } => {
                info!("Auto-play triggered, advancing to episode {}", next_index)
            }
            EndAction::Finish => info!("Episode {} ended with nothing to advance to", current_index),
        }
        Some(action)
    }
}
