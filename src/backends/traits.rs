use async_trait::async_trait;

use crate::models::{Drama, DramaId, Episode};
use crate::utils::errors::CatalogError;

/// Read-only access to the third-party drama catalog.
///
/// Implementations must not retry on their own; a failed fetch is reported
/// once and the user decides whether to try again.
#[async_trait]
pub trait CatalogFetcher: Send + Sync + std::fmt::Debug {
    /// Drama metadata, including the total episode count
    async fn get_drama_detail(&self, drama_id: &DramaId) -> Result<Drama, CatalogError>;

    /// All episodes of a drama, ordered by index
    async fn get_episodes(&self, drama_id: &DramaId) -> Result<Vec<Episode>, CatalogError>;

    /// One episode with its CDN and quality lists. `index` is 1-based.
    async fn get_episode_video_info(
        &self,
        drama_id: &DramaId,
        index: u32,
    ) -> Result<Episode, CatalogError>;
}
