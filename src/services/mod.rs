pub mod auto_play;
pub mod continuity;
pub mod progress_tracker;
pub mod watch_session;

pub use auto_play::{AutoPlayManager, EndAction, decide_after_end};
pub use continuity::{ContinuitySettings, EpisodeContinuity, OpenRequest, OpenTicket};
pub use progress_tracker::ProgressTracker;
pub use watch_session::WatchSession;
