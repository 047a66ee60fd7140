use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{CdnSource, Drama, DramaId, Episode, VideoVariant};
use crate::utils::errors::CatalogError;

// Ids arrive as strings or bare numbers depending on the endpoint
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom("expected string or number")),
    }
}

// `isDefault` is 0/1 on some endpoints and a boolean on others
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_i64().is_some_and(|n| n != 0)),
        Value::Null => Ok(false),
        _ => Err(serde::de::Error::custom("expected boolean or 0/1")),
    }
}

// Counts are sometimes sent as numeric strings; anything else counts as 0
fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Every response body is wrapped as `{ "data": ... }`
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DramaBoxBook {
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub book_id: String,
    pub book_name: String,
    #[serde(default)]
    pub cover_wap: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub chapter_count: u32,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub play_count: u64,
    #[serde(default)]
    pub introduction: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DramaBoxChapter {
    /// Zero-based
    pub chapter_index: u32,
    #[serde(default)]
    pub chapter_name: String,
    #[serde(default)]
    pub chapter_img: Option<String>,
    #[serde(default)]
    pub cdn_list: Vec<DramaBoxCdn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DramaBoxCdn {
    pub cdn_domain: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_default: bool,
    #[serde(default)]
    pub video_path_list: Vec<DramaBoxVideoPath>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DramaBoxVideoPath {
    pub quality: u32,
    pub video_path: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_default: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl From<DramaBoxBook> for Drama {
    fn from(book: DramaBoxBook) -> Self {
        Drama {
            id: DramaId::new(book.book_id),
            title: book.book_name,
            cover: non_empty(book.cover_wap),
            tags: book.tags,
            total_episodes: book.chapter_count,
            view_count: book.play_count,
            synopsis: non_empty(book.introduction),
        }
    }
}

impl DramaBoxChapter {
    pub fn into_episode(self, drama_id: &DramaId) -> Result<Episode, CatalogError> {
        let index = self.chapter_index.checked_add(1).ok_or_else(|| {
            CatalogError::Parse(format!(
                "chapter index {} of {} is out of range",
                self.chapter_index, drama_id
            ))
        })?;
        let cdn_sources = self
            .cdn_list
            .into_iter()
            .map(|cdn| CdnSource {
                domain: cdn.cdn_domain,
                is_default: cdn.is_default,
                variants: cdn
                    .video_path_list
                    .into_iter()
                    .filter(|v| !v.video_path.is_empty())
                    .map(|v| VideoVariant::new(v.quality, v.video_path, v.is_default))
                    .collect(),
            })
            .collect();

        Ok(Episode {
            drama_id: drama_id.clone(),
            index,
            name: self.chapter_name,
            thumbnail: non_empty(self.chapter_img),
            cdn_sources,
        })
    }
}
