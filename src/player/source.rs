use std::cmp::Reverse;

use crate::models::{CdnSource, Episode, VideoVariant};

/// Picks a playable URL out of the CDN/quality lists embedded in an episode.
///
/// Pure selection. Fetching the episode data is the catalog's job, and an
/// episode with nothing playable resolves to `None` rather than an error.
pub struct EpisodeSource;

impl EpisodeSource {
    /// The CDN marked default, else the first one listed
    pub fn default_cdn(episode: &Episode) -> Option<&CdnSource> {
        episode
            .cdn_sources
            .iter()
            .find(|cdn| cdn.is_default)
            .or_else(|| episode.cdn_sources.first())
    }

    /// Exact quality match, then the default variant, then the first one
    pub fn select_variant(cdn: &CdnSource, preferred_quality: u32) -> Option<&VideoVariant> {
        cdn.variants
            .iter()
            .find(|v| v.quality == preferred_quality)
            .or_else(|| cdn.variants.iter().find(|v| v.is_default))
            .or_else(|| cdn.variants.first())
    }

    pub fn resolve_variant(episode: &Episode, preferred_quality: u32) -> Option<&VideoVariant> {
        Self::default_cdn(episode).and_then(|cdn| Self::select_variant(cdn, preferred_quality))
    }

    pub fn resolve_url(episode: &Episode, preferred_quality: u32) -> Option<&str> {
        Self::resolve_variant(episode, preferred_quality).map(|v| v.url.as_str())
    }

    /// Every URL worth trying for this episode, best first.
    ///
    /// Starts with [`resolve_url`](Self::resolve_url), continues with the rest
    /// of the chosen CDN ordered by distance to the preferred quality, then
    /// the other CDNs in listing order. Empty when nothing resolves.
    pub fn candidate_urls(episode: &Episode, preferred_quality: u32) -> Vec<String> {
        let Some(chosen) = Self::default_cdn(episode) else {
            return Vec::new();
        };
        let Some(first) = Self::select_variant(chosen, preferred_quality) else {
            return Vec::new();
        };

        let mut urls = vec![first.url.clone()];
        let others = episode
            .cdn_sources
            .iter()
            .filter(|cdn| !std::ptr::eq(*cdn, chosen));

        for cdn in std::iter::once(chosen).chain(others) {
            for variant in Self::by_closeness(cdn, preferred_quality) {
                if !urls.iter().any(|u| u == &variant.url) {
                    urls.push(variant.url.clone());
                }
            }
        }

        urls
    }

    /// Quality tiers offered by the chosen CDN, highest first
    pub fn available_qualities(episode: &Episode) -> Vec<u32> {
        let mut qualities: Vec<u32> = Self::default_cdn(episode)
            .map(|cdn| cdn.variants.iter().map(|v| v.quality).collect())
            .unwrap_or_default();
        qualities.sort_unstable_by(|a, b| b.cmp(a));
        qualities.dedup();
        qualities
    }

    fn by_closeness(cdn: &CdnSource, preferred_quality: u32) -> Vec<&VideoVariant> {
        let mut variants: Vec<&VideoVariant> = cdn.variants.iter().collect();
        variants.sort_by_key(|v| (v.quality.abs_diff(preferred_quality), Reverse(v.quality)));
        variants
    }
}
