pub mod clock;
pub mod errors;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{CatalogError, HistoryError, PlaybackError};
