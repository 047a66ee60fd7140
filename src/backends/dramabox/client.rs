use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::types::DataEnvelope;
use crate::utils::errors::CatalogError;

/// Thin HTTP layer over the DramaBox-style catalog API
#[derive(Debug, Clone)]
pub struct DramaBoxApi {
    client: reqwest::Client,
    base_url: Url,
    language: String,
}

impl DramaBoxApi {
    pub fn new(base_url: &str, language: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::Parse(format!("Invalid base URL {}: {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CatalogError::from_reqwest)?;

        Ok(Self {
            client,
            base_url,
            language: language.into(),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    /// `<base>/<segments...>?lang=<language>`, with each segment escaped
    pub(super) fn build_url(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                CatalogError::Parse(format!("Base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("lang", &self.language);
        Ok(url)
    }

    /// GET `url` and unwrap the `data` field of the response body
    pub(super) async fn get_data<T: DeserializeOwned>(
        &self,
        url: Url,
        operation_name: &str,
    ) -> Result<T, CatalogError> {
        debug!("[{}] GET {}", operation_name, url);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(CatalogError::from_reqwest)?;

        let status = response.status();
        debug!("[{}] Response: {}", operation_name, status);

        let body = response.text().await.map_err(CatalogError::from_reqwest)?;
        if !status.is_success() {
            warn!(
                "[{}] Error response - Status: {}, Body: {}",
                operation_name,
                status.as_u16(),
                body
            );
            return Err(CatalogError::from_status(status.as_u16(), body));
        }

        let envelope: DataEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            warn!("[{}] Malformed response: {}", operation_name, e);
            CatalogError::Parse(e.to_string())
        })?;
        Ok(envelope.data)
    }
}
