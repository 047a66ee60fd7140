use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::auto_play::{AutoPlayManager, EndAction};
use super::progress_tracker::ProgressTracker;
use crate::events::{EventBus, NavigationOutcome, PlayerEvent};
use crate::history::HistoryStore;
use crate::models::{Drama, DramaId, Episode, WatchHistoryItem, progress_percent};
use crate::player::{
    EpisodeSource, LoadGeneration, MediaEvent, MediaSignal, MediaTarget, PlaybackController,
};
use crate::utils::{CatalogError, Clock, PlaybackError};

/// Continuity behaviour that comes from configuration
#[derive(Debug, Clone, Copy)]
pub struct ContinuitySettings {
    /// Advance to the next episode when one ends
    pub auto_play: bool,
    pub preferred_quality: u32,
    pub progress_save_interval: Duration,
}

impl Default for ContinuitySettings {
    fn default() -> Self {
        Self {
            auto_play: true,
            preferred_quality: 720,
            progress_save_interval: Duration::from_secs(10),
        }
    }
}

/// An episode request whose data is still being fetched.
///
/// Hand it back to [`EpisodeContinuity::complete_open`] with the fetch
/// result. Only the most recent ticket is honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTicket {
    generation: u64,
    drama_id: DramaId,
    episode_index: u32,
}

impl OpenTicket {
    pub fn drama_id(&self) -> &DramaId {
        &self.drama_id
    }

    pub fn episode_index(&self) -> u32 {
        self.episode_index
    }
}

/// An episode the caller should open next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub drama_id: DramaId,
    pub episode_index: u32,
}

#[derive(Debug, Clone)]
struct CurrentEpisode {
    drama_id: DramaId,
    index: u32,
    /// Playable URLs, best first. Empty until the episode data arrives.
    candidates: Vec<String>,
    /// Index into `candidates` of the URL the player was given
    attempt: usize,
}

impl CurrentEpisode {
    fn is_loaded(&self) -> bool {
        !self.candidates.is_empty()
    }

    fn is(&self, drama_id: &DramaId, index: u32) -> bool {
        &self.drama_id == drama_id && self.index == index
    }
}

/// Episode-to-episode navigation and progress persistence.
///
/// Opening an episode is split in two around the catalog fetch:
/// [`begin_open`](Self::begin_open) validates the index and puts the player
/// in `Loading`, [`complete_open`](Self::complete_open) resolves a URL from
/// the fetched data and loads it. A completion for anything but the newest
/// request is dropped, and progress is only ever written for the episode
/// that is currently open.
pub struct EpisodeContinuity {
    player: PlaybackController,
    history: Box<dyn HistoryStore>,
    clock: Arc<dyn Clock>,
    tracker: ProgressTracker,
    auto_play: AutoPlayManager,
    preferred_quality: u32,
    dramas: HashMap<DramaId, Drama>,
    current: Option<CurrentEpisode>,
    open_generation: u64,
    events: EventBus,
}

impl EpisodeContinuity {
    pub fn new(
        player: PlaybackController,
        history: Box<dyn HistoryStore>,
        clock: Arc<dyn Clock>,
        settings: ContinuitySettings,
    ) -> Self {
        let events = player.events().clone();
        Self {
            player,
            history,
            clock,
            tracker: ProgressTracker::new(settings.progress_save_interval),
            auto_play: AutoPlayManager::new(settings.auto_play),
            preferred_quality: settings.preferred_quality,
            dramas: HashMap::new(),
            current: None,
            open_generation: 0,
            events,
        }
    }

    pub fn player(&self) -> &PlaybackController {
        &self.player
    }

    /// Transport controls (play, pause, seek, volume) go straight to the player
    pub fn player_mut(&mut self) -> &mut PlaybackController {
        &mut self.player
    }

    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    pub fn history_mut(&mut self) -> &mut dyn HistoryStore {
        self.history.as_mut()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The episode most recently requested, loaded or not
    pub fn current_episode(&self) -> Option<(&DramaId, u32)> {
        self.current.as_ref().map(|c| (&c.drama_id, c.index))
    }

    pub fn total_episodes(&self, drama_id: &DramaId) -> Option<u32> {
        self.dramas.get(drama_id).map(|d| d.total_episodes)
    }

    pub fn drama(&self, drama_id: &DramaId) -> Option<&Drama> {
        self.dramas.get(drama_id)
    }

    pub fn set_auto_play(&mut self, enabled: bool) {
        self.auto_play.set_enabled(enabled);
    }

    pub fn set_preferred_quality(&mut self, quality: u32) {
        self.preferred_quality = quality;
    }

    /// Record catalog data for a drama. Episodes accepted optimistically
    /// before the total was known are checked against it here.
    pub fn reconcile_drama(&mut self, drama: Drama) {
        if let Some(current) = &self.current
            && current.drama_id == drama.id
            && current.index > drama.total_episodes
        {
            warn!(
                "Episode {} of {} is beyond the {} episodes the catalog reports",
                current.index, drama.id, drama.total_episodes
            );
        }
        debug!("{} has {} episodes", drama.id, drama.total_episodes);
        self.dramas.insert(drama.id.clone(), drama);
    }

    fn validate_index(&self, drama_id: &DramaId, index: u32) -> Result<(), PlaybackError> {
        let total = self.total_episodes(drama_id);
        if index == 0 || total.is_some_and(|total| index > total) {
            debug!(
                "Ignoring navigation to episode {} of {} ({:?} episodes)",
                index, drama_id, total
            );
            return Err(PlaybackError::IndexOutOfRange {
                requested: index,
                total: total.unwrap_or(0),
            });
        }
        Ok(())
    }

    /// First half of opening an episode. Fails only with `IndexOutOfRange`,
    /// which callers should ignore rather than show.
    pub fn begin_open(&mut self, drama_id: DramaId, index: u32) -> Result<OpenTicket, PlaybackError> {
        self.validate_index(&drama_id, index)?;

        self.flush_progress();
        self.open_generation += 1;
        self.auto_play.reset();
        self.tracker.reset_save_timer();
        self.current = Some(CurrentEpisode {
            drama_id: drama_id.clone(),
            index,
            candidates: Vec::new(),
            attempt: 0,
        });
        self.player.await_source();

        info!("Opening {} episode {}", drama_id, index);
        Ok(OpenTicket {
            generation: self.open_generation,
            drama_id,
            episode_index: index,
        })
    }

    /// Second half of opening an episode, once its data has been fetched
    pub fn complete_open(
        &mut self,
        ticket: OpenTicket,
        fetched: Result<Episode, CatalogError>,
    ) -> NavigationOutcome {
        let OpenTicket {
            generation,
            drama_id,
            episode_index,
        } = ticket;

        if generation != self.open_generation {
            debug!(
                "Dropping superseded fetch for {} episode {}",
                drama_id, episode_index
            );
            return NavigationOutcome::Superseded {
                drama_id,
                episode_index,
            };
        }

        let episode = match fetched {
            Ok(episode) => episode,
            Err(error) => {
                warn!(
                    "Failed to fetch {} episode {}: {}",
                    drama_id, episode_index, error
                );
                self.player.fail_source(error.to_string());
                return self.publish_navigation(NavigationOutcome::Failed {
                    drama_id,
                    episode_index,
                    error: error.into(),
                });
            }
        };

        let candidates = EpisodeSource::candidate_urls(&episode, self.preferred_quality);
        let Some(url) = candidates.first().cloned() else {
            let error = PlaybackError::SourceUnavailable {
                drama_id: drama_id.clone(),
                episode: episode_index,
            };
            warn!("{}", error);
            self.player.fail_source(error.to_string());
            return self.publish_navigation(NavigationOutcome::Failed {
                drama_id,
                episode_index,
                error,
            });
        };

        if let Some(current) = self.current.as_mut() {
            current.candidates = candidates;
            current.attempt = 0;
        }
        self.player.load(MediaTarget {
            drama_id: drama_id.clone(),
            episode_index,
            url: url.clone(),
        });
        self.record_open(&drama_id, episode_index);

        self.publish_navigation(NavigationOutcome::Opened {
            drama_id,
            episode_index,
            url,
        })
    }

    /// Progress restarts at 0 unless this is the episode history already
    /// points at, in which case its stored percentage is kept.
    fn record_open(&mut self, drama_id: &DramaId, index: u32) {
        let previous = self.stored_entry(drama_id);
        let progress = previous
            .filter(|item| item.episode_index == index)
            .map(|item| item.progress)
            .unwrap_or(0);
        let now = self.clock.now();
        self.write_history(drama_id, index, progress, now);
    }

    fn stored_entry(&self, drama_id: &DramaId) -> Option<WatchHistoryItem> {
        match self.history.get(drama_id) {
            Ok(item) => item,
            Err(e) => {
                warn!("Failed to read history for {}: {}", drama_id, e);
                None
            }
        }
    }

    fn write_history(
        &mut self,
        drama_id: &DramaId,
        index: u32,
        progress: u8,
        now: chrono::DateTime<chrono::Utc>,
    ) -> bool {
        let previous = self.stored_entry(drama_id);
        let drama = self.dramas.get(drama_id);
        let total = drama
            .map(|d| d.total_episodes)
            .or_else(|| previous.as_ref().and_then(|p| p.total_episodes));
        let title = drama
            .map(|d| d.title.clone())
            .or_else(|| previous.as_ref().and_then(|p| p.title.clone()));
        let cover = drama
            .and_then(|d| d.cover.clone())
            .or_else(|| previous.as_ref().and_then(|p| p.cover.clone()));

        let item = WatchHistoryItem::new(drama_id.clone(), index, total, i64::from(progress), now)
            .with_snapshot(title, cover);

        match self.history.upsert(item) {
            Ok(()) => {
                self.tracker.mark_saved(now);
                self.events.publish(PlayerEvent::HistoryUpdated {
                    drama_id: drama_id.clone(),
                    episode_index: index,
                    progress,
                });
                true
            }
            Err(e) => {
                warn!("Failed to save history for {}: {}", drama_id, e);
                false
            }
        }
    }

    /// Periodic progress save. Writes at most once per save interval, only
    /// while playing, and only for the episode that is currently open.
    pub fn save_progress_if_due(&mut self) -> bool {
        self.persist_progress(false)
    }

    fn flush_progress(&mut self) -> bool {
        self.persist_progress(true)
    }

    fn persist_progress(&mut self, force: bool) -> bool {
        let Some(current) = self.current.as_ref().filter(|c| c.is_loaded()) else {
            return false;
        };
        let Some(session) = self.player.session() else {
            return false;
        };
        if !session.is_for(&current.drama_id, current.index) {
            debug!(
                "Skipping progress write for {} episode {}, {} episode {} is open",
                session.drama_id(),
                session.episode_index(),
                current.drama_id,
                current.index
            );
            return false;
        }
        let Some(duration) = session.duration else {
            return false;
        };

        let now = self.clock.now();
        if !force && (!session.state.is_playing() || !self.tracker.should_save_progress(now)) {
            return false;
        }

        let progress = progress_percent(session.position, duration);
        let drama_id = current.drama_id.clone();
        let index = current.index;
        debug!(
            "Saving progress {}% for {} episode {}",
            progress, drama_id, index
        );
        self.write_history(&drama_id, index, progress, now)
    }

    /// Feed a media pipeline event through the player and apply the
    /// continuity policy. Returns the episode to open when auto-play advances.
    pub fn handle_media_event(
        &mut self,
        generation: LoadGeneration,
        event: MediaEvent,
    ) -> Option<OpenRequest> {
        let is_time_update = matches!(event, MediaEvent::TimeUpdate(_));

        match self.player.handle_media_event(generation, event) {
            MediaSignal::Applied => {
                if is_time_update {
                    self.save_progress_if_due();
                }
                None
            }
            MediaSignal::Ignored => None,
            MediaSignal::EndOfMedia(target) => self.on_end_of_media(target),
            MediaSignal::LoadFailed { target, message } => {
                self.publish_navigation(NavigationOutcome::Failed {
                    drama_id: target.drama_id,
                    episode_index: target.episode_index,
                    error: PlaybackError::LoadFailed(message),
                });
                None
            }
        }
    }

    fn on_end_of_media(&mut self, target: MediaTarget) -> Option<OpenRequest> {
        let is_current = self
            .current
            .as_ref()
            .is_some_and(|c| c.is_loaded() && c.is(&target.drama_id, target.episode_index));
        if !is_current {
            debug!(
                "Ignoring end of {} episode {}, no longer open",
                target.drama_id, target.episode_index
            );
            return None;
        }

        let now = self.clock.now();
        self.write_history(&target.drama_id, target.episode_index, 100, now);

        let total = self.total_episodes(&target.drama_id);
        match self.auto_play.on_end_of_media(target.episode_index, total)? {
            EndAction::Advance { next_index } => Some(OpenRequest {
                drama_id: target.drama_id,
                episode_index: next_index,
            }),
            EndAction::Finish => {
                self.publish_navigation(NavigationOutcome::Finished {
                    drama_id: target.drama_id,
                    episode_index: target.episode_index,
                });
                None
            }
        }
    }

    /// The episode after the current one. Range is checked when it is opened.
    pub fn next_request(&self) -> Option<OpenRequest> {
        self.current.as_ref().map(|c| OpenRequest {
            drama_id: c.drama_id.clone(),
            episode_index: c.index + 1,
        })
    }

    pub fn previous_request(&self) -> Option<OpenRequest> {
        self.current.as_ref().map(|c| OpenRequest {
            drama_id: c.drama_id.clone(),
            episode_index: c.index.saturating_sub(1),
        })
    }

    pub fn episode_request(&self, index: u32) -> Option<OpenRequest> {
        self.current.as_ref().map(|c| OpenRequest {
            drama_id: c.drama_id.clone(),
            episode_index: index,
        })
    }

    pub fn skip_intro(&mut self) -> bool {
        self.player.skip_intro()
    }

    /// Move on from the closing credits: the next episode when there is one,
    /// otherwise finish the current one in place.
    pub fn skip_outro(&mut self) -> Option<OpenRequest> {
        let next = self.next_request()?;
        if self
            .validate_index(&next.drama_id, next.episode_index)
            .is_ok()
        {
            return Some(next);
        }

        let (drama_id, index) = (next.drama_id, next.episode_index - 1);
        if !self.is_playing_current(&drama_id, index) {
            debug!(
                "Ignoring outro skip for {} episode {}, nothing loaded",
                drama_id, index
            );
            return None;
        }
        info!("Skipping outro of final episode {} of {}", index, drama_id);
        self.auto_play.mark_triggered();
        self.player.pause();
        let now = self.clock.now();
        self.write_history(&drama_id, index, 100, now);
        self.publish_navigation(NavigationOutcome::Finished {
            drama_id,
            episode_index: index,
        });
        None
    }

    /// The open episode has data and the player session belongs to it
    fn is_playing_current(&self, drama_id: &DramaId, index: u32) -> bool {
        let loaded = self
            .current
            .as_ref()
            .is_some_and(|c| c.is_loaded() && c.is(drama_id, index));
        loaded
            && self
                .player
                .session()
                .is_some_and(|session| session.is_for(drama_id, index))
    }

    /// Load the next fallback URL for the current episode after a failure
    pub fn retry_with_fallback(&mut self) -> NavigationOutcome {
        let Some(current) = self.current.as_mut().filter(|c| c.is_loaded()) else {
            return NavigationOutcome::Ignored;
        };
        let drama_id = current.drama_id.clone();
        let episode_index = current.index;

        let next_attempt = current.attempt + 1;
        let Some(url) = current.candidates.get(next_attempt).cloned() else {
            warn!(
                "No fallback sources left for {} episode {}",
                drama_id, episode_index
            );
            let error = PlaybackError::SourceUnavailable {
                drama_id: drama_id.clone(),
                episode: episode_index,
            };
            return self.publish_navigation(NavigationOutcome::Failed {
                drama_id,
                episode_index,
                error,
            });
        };
        current.attempt = next_attempt;

        info!(
            "Retrying {} episode {} with fallback source {}",
            drama_id, episode_index, url
        );
        self.auto_play.reset();
        self.player.load(MediaTarget {
            drama_id: drama_id.clone(),
            episode_index,
            url: url.clone(),
        });
        self.publish_navigation(NavigationOutcome::Opened {
            drama_id,
            episode_index,
            url,
        })
    }

    /// Episode to open when a drama is opened without an explicit one:
    /// the one history points at, else the first
    pub fn resume_index(&self, drama_id: &DramaId) -> u32 {
        let stored = self
            .stored_entry(drama_id)
            .map(|item| item.episode_index)
            .unwrap_or(1)
            .max(1);
        match self.total_episodes(drama_id) {
            Some(total) if total > 0 && stored > total => total,
            _ => stored,
        }
    }

    fn publish_navigation(&self, outcome: NavigationOutcome) -> NavigationOutcome {
        if outcome.is_user_visible() {
            self.events
                .publish(PlayerEvent::Navigation(outcome.clone()));
        }
        outcome
    }
}
