use thiserror::Error;

use crate::models::DramaId;

/// Failures surfaced by episode navigation and playback.
///
/// None of these are fatal. Each one degrades to a visible UI state and no
/// variant is retried automatically.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The episode data carries no playable URL
    #[error("No playable source for {drama_id} episode {episode}")]
    SourceUnavailable { drama_id: DramaId, episode: u32 },

    /// The media pipeline rejected the resolved URL
    #[error("Media failed to load: {0}")]
    LoadFailed(String),

    /// Episode list or detail request was rejected
    #[error("Catalog request failed: {0}")]
    FetchFailed(String),

    /// Navigation outside 1..=total. Ignored rather than shown to the user.
    #[error("Episode {requested} is outside 1..={total}")]
    IndexOutOfRange { requested: u32, total: u32 },
}

impl PlaybackError {
    /// Whether the UI should be told about this error at all
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, PlaybackError::IndexOutOfRange { .. })
    }
}

/// Typed error for catalog API operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Timeouts, refused connections and other transport failures
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("Catalog API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl CatalogError {
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            CatalogError::Network(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            CatalogError::Network(format!("Connection failed: {}", error))
        } else if error.is_decode() {
            CatalogError::Parse(error.to_string())
        } else {
            CatalogError::Network(error.to_string())
        }
    }

    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => CatalogError::NotFound(body),
            _ => CatalogError::Status {
                status,
                message: body,
            },
        }
    }
}

impl From<CatalogError> for PlaybackError {
    fn from(error: CatalogError) -> Self {
        PlaybackError::FetchFailed(error.to_string())
    }
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
