mod client;
mod types;


use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use super::traits::CatalogFetcher;
use crate::models::{Drama, DramaId, Episode};
use crate::utils::errors::CatalogError;
use client::DramaBoxApi;
use types::{DramaBoxBook, DramaBoxChapter};

/// Catalog backed by the DramaBox HTTP API.
///
/// Episode indices are 1-based on our side and zero-based on the wire.
#[derive(Debug, Clone)]
pub struct DramaBoxClient {
    api: DramaBoxApi,
}

impl DramaBoxClient {
    pub fn new(base_url: &str, language: &str, timeout: Duration) -> Result<Self, CatalogError> {
        info!("Using catalog at {} (language {})", base_url, language);
        Ok(Self {
            api: DramaBoxApi::new(base_url, language, timeout)?,
        })
    }

    pub fn language(&self) -> &str {
        self.api.language()
    }

    pub fn set_language(&mut self, language: &str) {
        self.api.set_language(language);
    }
}

#[async_trait]
impl CatalogFetcher for DramaBoxClient {
    async fn get_drama_detail(&self, drama_id: &DramaId) -> Result<Drama, CatalogError> {
        let url = self.api.build_url(&["api", "dramas", drama_id.as_str()])?;
        let book: DramaBoxBook = self.api.get_data(url, "get_drama_detail").await?;

        let drama = Drama::from(book);
        debug!(
            "Drama {} '{}' has {} episodes",
            drama.id, drama.title, drama.total_episodes
        );
        Ok(drama)
    }

    async fn get_episodes(&self, drama_id: &DramaId) -> Result<Vec<Episode>, CatalogError> {
        let url = self
            .api
            .build_url(&["api", "dramas", drama_id.as_str(), "episodes"])?;
        let chapters: Vec<DramaBoxChapter> = self.api.get_data(url, "get_episodes").await?;

        let mut episodes: Vec<Episode> = chapters
            .into_iter()
            .map(|chapter| chapter.into_episode(drama_id))
            .collect::<Result<_, _>>()?;
        episodes.sort_by_key(|e| e.index);
        debug!("Fetched {} episodes of {}", episodes.len(), drama_id);
        Ok(episodes)
    }

    async fn get_episode_video_info(
        &self,
        drama_id: &DramaId,
        index: u32,
    ) -> Result<Episode, CatalogError> {
        let Some(wire_index) = index.checked_sub(1) else {
            return Err(CatalogError::NotFound(format!(
                "{} has no episode {}",
                drama_id, index
            )));
        };
        let wire_index = wire_index.to_string();
        let url = self.api.build_url(&[
            "api",
            "dramas",
            drama_id.as_str(),
            "episodes",
            wire_index.as_str(),
        ])?;
        let chapter: DramaBoxChapter = self.api.get_data(url, "get_episode_video_info").await?;

        chapter.into_episode(drama_id)
    }
}
