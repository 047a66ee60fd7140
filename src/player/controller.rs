use tracing::{debug, info, trace, warn};

use super::session::{AudioSettings, MediaTarget, PlaybackSession};
use super::skip_windows::SkipWindows;
use super::traits::MediaBackend;
use super::types::{LoadGeneration, MediaEvent, PlaybackRate, PlaybackState, SkipVisibility};
use crate::events::{EventBus, PlayerEvent};

/// Player behaviour that comes from configuration
#[derive(Debug, Clone, Copy)]
pub struct PlayerSettings {
    pub skip_windows: SkipWindows,
    /// Start playing as soon as the media reports ready
    pub autoplay_on_load: bool,
    pub audio: AudioSettings,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            skip_windows: SkipWindows::new(90.0, 30.0),
            autoplay_on_load: true,
            audio: AudioSettings::default(),
        }
    }
}

/// What a media event meant for the caller
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSignal {
    /// Applied to the current session
    Applied,
    /// Belonged to a superseded load, or made no sense in the current state
    Ignored,
    /// Playback reached the end of the current episode
    EndOfMedia(MediaTarget),
    /// The pipeline rejected the current URL
    LoadFailed { target: MediaTarget, message: String },
}

/// Where the controller is between sessions
#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Empty,
    /// A new episode was requested and its URL is still being fetched
    AwaitingSource,
    /// The fetch for the requested episode failed before anything loaded
    SourceFailed(String),
    Active(PlaybackSession),
}

impl Slot {
    fn session(&self) -> Option<&PlaybackSession> {
        match self {
            Slot::Active(session) => Some(session),
            _ => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut PlaybackSession> {
        match self {
            Slot::Active(session) => Some(session),
            _ => None,
        }
    }

    fn state(&self) -> PlaybackState {
        match self {
            Slot::Empty => PlaybackState::Idle,
            Slot::AwaitingSource => PlaybackState::Loading,
            Slot::SourceFailed(message) => PlaybackState::Error(message.clone()),
            Slot::Active(session) => session.state.clone(),
        }
    }
}

/// Owns the single active media session and its transport state.
///
/// All calls are synchronous and must come from the UI thread. Media
/// readiness arrives later through [`handle_media_event`](Self::handle_media_event),
/// tagged with the [`LoadGeneration`] returned by [`load`](Self::load); only
/// the newest generation is honoured. The controller never retries a failed
/// load by itself.
pub struct PlaybackController {
    backend: Box<dyn MediaBackend>,
    slot: Slot,
    generation: LoadGeneration,
    audio: AudioSettings,
    skip_windows: SkipWindows,
    autoplay_on_load: bool,
    events: EventBus,
}

impl PlaybackController {
    pub fn new(backend: Box<dyn MediaBackend>, settings: PlayerSettings, events: EventBus) -> Self {
        Self {
            backend,
            slot: Slot::Empty,
            generation: LoadGeneration::default(),
            audio: settings.audio,
            skip_windows: settings.skip_windows,
            autoplay_on_load: settings.autoplay_on_load,
            events,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.slot.state()
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.slot.session()
    }

    pub fn current_generation(&self) -> LoadGeneration {
        self.generation
    }

    pub fn audio(&self) -> AudioSettings {
        self.audio
    }

    pub fn skip_visibility(&self) -> SkipVisibility {
        self.slot.session().map(|s| s.skip).unwrap_or_default()
    }

    pub fn set_autoplay_on_load(&mut self, enabled: bool) {
        self.autoplay_on_load = enabled;
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Tear down the current session and sit in `Loading` until the next
    /// URL arrives through [`load`](Self::load) or the fetch fails.
    pub fn await_source(&mut self) {
        self.replace_slot(Slot::AwaitingSource);
    }

    /// The URL fetch for the awaited episode failed
    pub fn fail_source(&mut self, message: impl Into<String>) {
        if self.slot == Slot::AwaitingSource {
            self.replace_slot(Slot::SourceFailed(message.into()));
        }
    }

    /// Replace the session with a fresh one for `target` and start loading it.
    /// Any load still in flight is invalidated.
    pub fn load(&mut self, target: MediaTarget) -> LoadGeneration {
        info!(
            "Loading {} episode {} from {}",
            target.drama_id, target.episode_index, target.url
        );
        self.backend.load(&target.url);
        let session = PlaybackSession::new(target, self.generation.next(), self.audio);
        self.replace_slot(Slot::Active(session));
        debug!("Load generation is now {}", self.generation.0);
        self.generation
    }

    /// Drop the session and stop the media element
    pub fn unload(&mut self) {
        if self.slot != Slot::Empty {
            self.replace_slot(Slot::Empty);
        }
    }

    fn replace_slot(&mut self, next: Slot) {
        let from = self.slot.state();
        let had_skip = self.skip_visibility();

        if matches!(self.slot, Slot::Active(_)) && !matches!(next, Slot::Active(_)) {
            self.backend.stop();
        }
        self.generation = self.generation.next();
        self.slot = next;

        let to = self.slot.state();
        if from != to {
            self.events.publish(PlayerEvent::StateChanged { from, to });
        }
        if had_skip != SkipVisibility::default() {
            self.events
                .publish(PlayerEvent::SkipVisibilityChanged(SkipVisibility::default()));
        }
    }

    pub fn handle_media_event(&mut self, generation: LoadGeneration, event: MediaEvent) -> MediaSignal {
        let is_current = self
            .slot
            .session()
            .is_some_and(|s| s.generation == generation);
        if !is_current {
            debug!(
                "Ignoring {:?} from stale load generation {} (current {})",
                event, generation.0, self.generation.0
            );
            return MediaSignal::Ignored;
        }

        match event {
            MediaEvent::Ready { duration } => self.on_ready(duration),
            MediaEvent::DurationChanged(duration) => {
                if let Some(session) = self.slot.session_mut()
                    && duration.is_finite()
                    && duration > 0.0
                {
                    session.duration = Some(duration);
                }
                MediaSignal::Applied
            }
            MediaEvent::TimeUpdate(position) => self.on_time_update(position),
            MediaEvent::Buffering(buffering) => self.on_buffering(buffering),
            MediaEvent::Ended => self.on_ended(),
            MediaEvent::Error(message) => self.on_error(message),
        }
    }

    fn on_ready(&mut self, duration: f64) -> MediaSignal {
        let Some(session) = self.slot.session_mut() else {
            return MediaSignal::Ignored;
        };
        if session.state != PlaybackState::Loading {
            debug!("Ignoring ready while {}", session.state);
            return MediaSignal::Ignored;
        }
        if duration.is_finite() && duration > 0.0 {
            session.duration = Some(duration);
        }

        self.set_state(PlaybackState::Ready);
        if self.autoplay_on_load {
            self.backend.play();
            self.set_state(PlaybackState::Playing { buffering: false });
        }
        MediaSignal::Applied
    }

    fn on_time_update(&mut self, position: f64) -> MediaSignal {
        let windows = self.skip_windows;
        let Some(session) = self.slot.session_mut() else {
            return MediaSignal::Ignored;
        };
        if !session.state.accepts_transport() || !position.is_finite() {
            return MediaSignal::Ignored;
        }

        let upper = session.duration.unwrap_or(f64::MAX);
        session.position = position.clamp(0.0, upper);
        trace!("Time update {:.1}/{:?}", session.position, session.duration);

        let position = session.position;
        let duration = session.duration;
        self.events
            .publish(PlayerEvent::TimeUpdate { position, duration });
        self.refresh_skip_visibility(windows.visibility(position, duration));
        MediaSignal::Applied
    }

    fn on_buffering(&mut self, buffering: bool) -> MediaSignal {
        let next = match self.state() {
            PlaybackState::Playing { buffering: was } if was != buffering => {
                PlaybackState::Playing { buffering }
            }
            PlaybackState::Paused { buffering: was } if was != buffering => {
                PlaybackState::Paused { buffering }
            }
            _ => return MediaSignal::Ignored,
        };
        self.set_state(next);
        self.events.publish(PlayerEvent::BufferingChanged(buffering));
        MediaSignal::Applied
    }

    fn on_ended(&mut self) -> MediaSignal {
        let Some(session) = self.slot.session_mut() else {
            return MediaSignal::Ignored;
        };
        if !session.state.accepts_transport() {
            return MediaSignal::Ignored;
        }
        if let Some(duration) = session.duration {
            session.position = duration;
        }
        let target = session.target.clone();

        self.set_state(PlaybackState::Ended);
        self.refresh_skip_visibility(SkipVisibility::default());
        info!(
            "Reached end of {} episode {}",
            target.drama_id, target.episode_index
        );
        self.events.publish(PlayerEvent::EndOfMedia {
            drama_id: target.drama_id.clone(),
            episode_index: target.episode_index,
        });
        MediaSignal::EndOfMedia(target)
    }

    fn on_error(&mut self, message: String) -> MediaSignal {
        let Some(session) = self.slot.session() else {
            return MediaSignal::Ignored;
        };
        if session.state.is_terminal() {
            return MediaSignal::Ignored;
        }
        let target = session.target.clone();

        warn!(
            "Media pipeline failed for {} episode {}: {}",
            target.drama_id, target.episode_index, message
        );
        self.set_state(PlaybackState::Error(message.clone()));
        self.refresh_skip_visibility(SkipVisibility::default());
        MediaSignal::LoadFailed { target, message }
    }

    /// No-op unless the session is Ready, Playing or Paused
    pub fn play(&mut self) -> bool {
        match self.state() {
            PlaybackState::Playing { .. } => true,
            PlaybackState::Ready => {
                self.backend.play();
                self.set_state(PlaybackState::Playing { buffering: false });
                true
            }
            PlaybackState::Paused { buffering } => {
                self.backend.play();
                self.set_state(PlaybackState::Playing { buffering });
                true
            }
            other => {
                debug!("Ignoring play while {}", other);
                false
            }
        }
    }

    /// No-op unless the session is Ready, Playing or Paused
    pub fn pause(&mut self) -> bool {
        match self.state() {
            PlaybackState::Paused { .. } => true,
            PlaybackState::Ready => {
                self.backend.pause();
                self.set_state(PlaybackState::Paused { buffering: false });
                true
            }
            PlaybackState::Playing { buffering } => {
                self.backend.pause();
                self.set_state(PlaybackState::Paused { buffering });
                true
            }
            other => {
                debug!("Ignoring pause while {}", other);
                false
            }
        }
    }

    /// Seek within `[0, duration]`. Requires a known duration. Seeking back
    /// from Ended leaves the session paused at the new position.
    pub fn seek(&mut self, to_seconds: f64) -> bool {
        let windows = self.skip_windows;
        let Some(session) = self.slot.session_mut() else {
            return false;
        };
        let Some(duration) = session.duration else {
            debug!("Ignoring seek before duration is known");
            return false;
        };
        if !(session.state.accepts_transport() || session.state == PlaybackState::Ended)
            || !to_seconds.is_finite()
        {
            return false;
        }

        let target = to_seconds.clamp(0.0, duration);
        session.position = target;
        let resume_paused = session.state == PlaybackState::Ended && target < duration;
        self.backend.seek(target);

        if resume_paused {
            self.set_state(PlaybackState::Paused { buffering: false });
        }
        self.events.publish(PlayerEvent::TimeUpdate {
            position: target,
            duration: Some(duration),
        });
        self.refresh_skip_visibility(windows.visibility(target, Some(duration)));
        true
    }

    /// Jump past the intro window. False when already past it.
    pub fn skip_intro(&mut self) -> bool {
        let Some(session) = self.slot.session() else {
            return false;
        };
        let intro_end = self.skip_windows.intro_end(session.duration);
        if session.position >= intro_end {
            return false;
        }
        debug!("Skipping intro to {:.1}s", intro_end);
        self.seek(intro_end)
    }

    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            self.audio.volume
        };
        self.audio.volume = volume;
        self.backend.set_volume(volume);
        self.sync_audio();
        self.events.publish(PlayerEvent::VolumeChanged {
            volume,
            muted: self.audio.muted,
        });
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.muted = muted;
        self.backend.set_muted(muted);
        self.sync_audio();
        self.events.publish(PlayerEvent::VolumeChanged {
            volume: self.audio.volume,
            muted,
        });
    }

    /// Applies the allowed rate nearest to `requested` and returns it
    pub fn set_playback_rate(&mut self, requested: f64) -> PlaybackRate {
        let rate = PlaybackRate::nearest(requested);
        if rate.value() != requested {
            debug!("Playback rate {} snapped to {}", requested, rate);
        }
        self.audio.rate = rate;
        self.backend.set_playback_rate(rate.value());
        self.sync_audio();
        self.events.publish(PlayerEvent::RateChanged(rate));
        rate
    }

    fn sync_audio(&mut self) {
        let audio = self.audio;
        if let Some(session) = self.slot.session_mut() {
            session.audio = audio;
        }
    }

    fn set_state(&mut self, to: PlaybackState) {
        let Some(session) = self.slot.session_mut() else {
            return;
        };
        if session.state == to {
            return;
        }
        let from = std::mem::replace(&mut session.state, to.clone());
        debug!("Playback state {} -> {}", from, to);
        self.events.publish(PlayerEvent::StateChanged { from, to });
    }

    fn refresh_skip_visibility(&mut self, visibility: SkipVisibility) {
        let Some(session) = self.slot.session_mut() else {
            return;
        };
        if session.skip != visibility {
            session.skip = visibility;
            self.events
                .publish(PlayerEvent::SkipVisibilityChanged(visibility));
        }
    }
}
