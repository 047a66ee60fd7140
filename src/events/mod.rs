pub mod event_bus;
pub mod types;

pub use event_bus::{EventBus, EventFilter, EventSubscriber};
pub use types::{NavigationOutcome, PlayerEvent, PlayerEventKind};
