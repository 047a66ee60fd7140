pub mod builders;
pub mod mocks;

use chrono::{TimeZone, Utc};
use dramapop::events::EventBus;
use dramapop::history::{HistoryStore, MemoryHistoryStore};
use dramapop::player::{LoadGeneration, PlaybackController, PlayerSettings};
use dramapop::services::{ContinuitySettings, EpisodeContinuity, WatchSession};
use dramapop::utils::ManualClock;
use std::sync::Arc;

use mocks::{FakeCatalog, FakeMedia};

pub struct TestContext {
    pub session: WatchSession,
    pub catalog: Arc<FakeCatalog>,
    pub media: FakeMedia,
    pub clock: ManualClock,
    pub events: EventBus,
}

impl TestContext {
    pub fn new(catalog: FakeCatalog) -> Self {
        Self::with_history(catalog, Box::new(MemoryHistoryStore::new(50)))
    }

    pub fn with_history(catalog: FakeCatalog, history: Box<dyn HistoryStore>) -> Self {
        let media = FakeMedia::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap());
        let events = EventBus::new(1024);
        let player = PlaybackController::new(
            Box::new(media.clone()),
            PlayerSettings::default(),
            events.clone(),
        );
        let continuity = EpisodeContinuity::new(
            player,
            history,
            Arc::new(clock.clone()),
            ContinuitySettings::default(),
        );
        let catalog = Arc::new(catalog);

        Self {
            session: WatchSession::new(continuity, catalog.clone()),
            catalog,
            media,
            clock,
            events,
        }
    }

    pub async fn generation(&self) -> LoadGeneration {
        self.session
            .with(|c| c.player().current_generation())
            .await
    }
}
