use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::continuity::{EpisodeContinuity, OpenRequest};
use crate::backends::CatalogFetcher;
use crate::events::NavigationOutcome;
use crate::models::{DramaId, Episode};
use crate::player::{LoadGeneration, MediaEvent};
use crate::utils::errors::CatalogError;

/// Drives [`EpisodeContinuity`] against a catalog.
///
/// The continuity lock is held only for the synchronous halves of an open;
/// catalog fetches run without it, so a newer request can start while an
/// older fetch is still in flight. Clones share the same session.
#[derive(Clone)]
pub struct WatchSession {
    continuity: Arc<Mutex<EpisodeContinuity>>,
    catalog: Arc<dyn CatalogFetcher>,
}

impl WatchSession {
    pub fn new(continuity: EpisodeContinuity, catalog: Arc<dyn CatalogFetcher>) -> Self {
        Self {
            continuity: Arc::new(Mutex::new(continuity)),
            catalog,
        }
    }

    pub fn continuity(&self) -> &Arc<Mutex<EpisodeContinuity>> {
        &self.continuity
    }

    /// Run `f` with exclusive access to the continuity state
    pub async fn with<R>(&self, f: impl FnOnce(&mut EpisodeContinuity) -> R) -> R {
        let mut continuity = self.continuity.lock().await;
        f(&mut continuity)
    }

    /// Open a drama at `episode`, or where history left off when `None`.
    ///
    /// A failed detail fetch is not fatal: the episode is opened with the
    /// total unknown and reconciled later.
    pub async fn open_drama(&self, drama_id: DramaId, episode: Option<u32>) -> NavigationOutcome {
        self.refresh_drama(&drama_id).await;

        let index = match episode {
            Some(index) => index,
            None => {
                let index = self.continuity.lock().await.resume_index(&drama_id);
                info!("Resuming {} at episode {}", drama_id, index);
                index
            }
        };
        self.open_episode(drama_id, index).await
    }

    /// Fetch drama detail and reconcile the episode total
    pub async fn refresh_drama(&self, drama_id: &DramaId) -> bool {
        match self.catalog.get_drama_detail(drama_id).await {
            Ok(drama) => {
                self.continuity.lock().await.reconcile_drama(drama);
                true
            }
            Err(e) => {
                warn!("Failed to fetch details for {}: {}", drama_id, e);
                false
            }
        }
    }

    pub async fn episodes(&self, drama_id: &DramaId) -> Result<Vec<Episode>, CatalogError> {
        self.catalog.get_episodes(drama_id).await
    }

    pub async fn open_episode(&self, drama_id: DramaId, index: u32) -> NavigationOutcome {
        let ticket = match self.continuity.lock().await.begin_open(drama_id, index) {
            Ok(ticket) => ticket,
            Err(e) => {
                debug!("Not opening episode: {}", e);
                return NavigationOutcome::Ignored;
            }
        };

        let fetched = self
            .catalog
            .get_episode_video_info(ticket.drama_id(), ticket.episode_index())
            .await;

        self.continuity.lock().await.complete_open(ticket, fetched)
    }

    async fn follow(&self, request: Option<OpenRequest>) -> NavigationOutcome {
        match request {
            Some(request) => {
                self.open_episode(request.drama_id, request.episode_index)
                    .await
            }
            None => NavigationOutcome::Ignored,
        }
    }

    /// Feed a media pipeline event. When it ends the episode with auto-play
    /// on, the next episode is opened before this returns.
    pub async fn handle_media_event(
        &self,
        generation: LoadGeneration,
        event: MediaEvent,
    ) -> NavigationOutcome {
        let request = self
            .continuity
            .lock()
            .await
            .handle_media_event(generation, event);
        self.follow(request).await
    }

    pub async fn go_next(&self) -> NavigationOutcome {
        let request = self.continuity.lock().await.next_request();
        self.follow(request).await
    }

    pub async fn go_previous(&self) -> NavigationOutcome {
        let request = self.continuity.lock().await.previous_request();
        self.follow(request).await
    }

    pub async fn go_to_episode(&self, index: u32) -> NavigationOutcome {
        let request = self.continuity.lock().await.episode_request(index);
        self.follow(request).await
    }

    pub async fn skip_outro(&self) -> NavigationOutcome {
        let request = self.continuity.lock().await.skip_outro();
        self.follow(request).await
    }

    pub async fn retry_with_fallback(&self) -> NavigationOutcome {
        self.continuity.lock().await.retry_with_fallback()
    }

    /// Periodic timer hook for progress persistence
    pub async fn tick(&self) -> bool {
        self.continuity.lock().await.save_progress_if_due()
    }
}
