use async_trait::async_trait;
use dramapop::backends::CatalogFetcher;
use dramapop::models::{Drama, DramaId, Episode};
use dramapop::player::MediaBackend;
use dramapop::utils::CatalogError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use super::builders::episode_with_sources;

/// Media element that records every command it receives
#[derive(Debug, Clone, Default)]
pub struct FakeMedia {
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("load ").map(str::to_string))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl MediaBackend for FakeMedia {
    fn load(&mut self, url: &str) {
        self.record(format!("load {url}"));
    }

    fn play(&mut self) {
        self.record("play".into());
    }

    fn pause(&mut self) {
        self.record("pause".into());
    }

    fn stop(&mut self) {
        self.record("stop".into());
    }

    fn seek(&mut self, position: f64) {
        self.record(format!("seek {position}"));
    }

    fn set_volume(&mut self, volume: f64) {
        self.record(format!("volume {volume}"));
    }

    fn set_muted(&mut self, muted: bool) {
        self.record(format!("muted {muted}"));
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.record(format!("rate {rate}"));
    }
}

/// In-memory catalog. Episode fetches can be held back with [`gate`](Self::gate)
/// to control the order in which concurrent requests complete.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    dramas: Mutex<HashMap<DramaId, Drama>>,
    failures: Mutex<HashMap<(DramaId, u32), CatalogError>>,
    gates: Mutex<HashMap<(DramaId, u32), oneshot::Receiver<()>>>,
    episode_calls: Mutex<Vec<(DramaId, u32)>>,
    detail_calls: Mutex<usize>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drama(self, drama: Drama) -> Self {
        self.dramas.lock().unwrap().insert(drama.id.clone(), drama);
        self
    }

    pub fn fail_episode(&self, drama_id: &str, index: u32, error: CatalogError) {
        self.failures
            .lock()
            .unwrap()
            .insert((DramaId::new(drama_id), index), error);
    }

    /// Hold the next fetch of this episode until the returned sender fires
    pub fn gate(&self, drama_id: &str, index: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .insert((DramaId::new(drama_id), index), rx);
        tx
    }

    /// How many times this episode's video info was requested
    pub fn episode_fetches(&self, drama_id: &str, index: u32) -> usize {
        let key = (DramaId::new(drama_id), index);
        self.episode_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == key)
            .count()
    }

    pub fn detail_fetches(&self) -> usize {
        *self.detail_calls.lock().unwrap()
    }
}

#[async_trait]
impl CatalogFetcher for FakeCatalog {
    async fn get_drama_detail(&self, drama_id: &DramaId) -> Result<Drama, CatalogError> {
        *self.detail_calls.lock().unwrap() += 1;
        self.dramas
            .lock()
            .unwrap()
            .get(drama_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(drama_id.to_string()))
    }

    async fn get_episodes(&self, drama_id: &DramaId) -> Result<Vec<Episode>, CatalogError> {
        let drama = self.get_drama_detail(drama_id).await?;
        Ok((1..=drama.total_episodes)
            .map(|index| episode_with_sources(drama_id.as_str(), index))
            .collect())
    }

    async fn get_episode_video_info(
        &self,
        drama_id: &DramaId,
        index: u32,
    ) -> Result<Episode, CatalogError> {
        let key = (drama_id.clone(), index);
        self.episode_calls.lock().unwrap().push(key.clone());

        let gate = self.gates.lock().unwrap().remove(&key);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if let Some(error) = self.failures.lock().unwrap().get(&key).cloned() {
            return Err(error);
        }
        Ok(episode_with_sources(drama_id.as_str(), index))
    }
}
