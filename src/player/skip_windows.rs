use super::types::SkipVisibility;

/// Seconds at the very start during which skip-intro stays hidden
pub const INTRO_GRACE_SECONDS: f64 = 3.0;
/// Seconds at the very end during which skip-outro stays hidden
pub const OUTRO_TAIL_SECONDS: f64 = 5.0;

/// Time windows near the start and end of an episode where a skip shortcut
/// is offered.
///
/// Skip-intro shows while `INTRO_GRACE < position < intro_end`; skip-outro
/// while `OUTRO_TAIL <= remaining <= outro_window`. On short episodes the
/// intro window is cut off where the outro window begins, so the two are
/// never visible together and the outro wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipWindows {
    intro_window_seconds: f64,
    outro_window_seconds: f64,
}

impl SkipWindows {
    pub fn new(intro_window_seconds: f64, outro_window_seconds: f64) -> Self {
        Self {
            intro_window_seconds: intro_window_seconds.max(0.0),
            outro_window_seconds: outro_window_seconds.max(0.0),
        }
    }

    pub fn intro_window_seconds(&self) -> f64 {
        self.intro_window_seconds
    }

    pub fn outro_window_seconds(&self) -> f64 {
        self.outro_window_seconds
    }

    /// Where the outro window opens, if the duration is known
    pub fn outro_start(&self, duration: Option<f64>) -> Option<f64> {
        duration.map(|d| (d - self.outro_window_seconds).max(0.0))
    }

    /// Where the intro window closes: the configured window, cut at the
    /// outro start and at the duration
    pub fn intro_end(&self, duration: Option<f64>) -> f64 {
        match (duration, self.outro_start(duration)) {
            (Some(d), Some(outro_start)) => self.intro_window_seconds.min(outro_start).min(d),
            _ => self.intro_window_seconds,
        }
    }

    pub fn visibility(&self, position: f64, duration: Option<f64>) -> SkipVisibility {
        let outro = match duration {
            Some(d) if d > 0.0 => {
                let remaining = d - position;
                (OUTRO_TAIL_SECONDS..=self.outro_window_seconds).contains(&remaining)
            }
            _ => false,
        };

        let intro_end = self.intro_end(duration);
        let intro = !outro && position > INTRO_GRACE_SECONDS && position < intro_end;

        SkipVisibility { intro, outro }
    }
}
