use tracing::trace;

/// The media element the controller drives.
///
/// Commands are fire-and-forget and must not block. The element reports
/// back asynchronously by feeding [`MediaEvent`](super::MediaEvent)s into
/// [`PlaybackController::handle_media_event`](super::PlaybackController::handle_media_event).
pub trait MediaBackend: Send {
    fn load(&mut self, url: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position: f64);
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
    fn set_playback_rate(&mut self, rate: f64);
}

/// Backend that accepts every command and never reports anything back.
/// Used by headless tools that only need navigation and history.
#[derive(Debug, Default)]
pub struct NullBackend {
    loaded: Option<String>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded_url(&self) -> Option<&str> {
        self.loaded.as_deref()
    }
}

impl MediaBackend for NullBackend {
    fn load(&mut self, url: &str) {
        trace!("null backend load {}", url);
        self.loaded = Some(url.to_string());
    }

    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn stop(&mut self) {
        self.loaded = None;
    }

    fn seek(&mut self, _position: f64) {}

    fn set_volume(&mut self, _volume: f64) {}

    fn set_muted(&mut self, _muted: bool) {}

    fn set_playback_rate(&mut self, _rate: f64) {}
}
