pub mod controller;
pub mod session;
pub mod skip_windows;
pub mod source;
pub mod traits;
pub mod types;

pub use controller::{MediaSignal, PlaybackController, PlayerSettings};
pub use session::{AudioSettings, MediaTarget, PlaybackSession};
pub use skip_windows::SkipWindows;
pub use source::EpisodeSource;
pub use traits::{MediaBackend, NullBackend};
pub use types::{LoadGeneration, MediaEvent, PlaybackRate, PlaybackState, SkipVisibility};
