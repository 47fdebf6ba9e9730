//! HTTP client for the ExerciseDB catalog.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use super::{BodyPart, Exercise};

pub const DEFAULT_BASE_URL: &str = "https://exercisedb.p.rapidapi.com";
pub const DEFAULT_HOST: &str = "exercisedb.p.rapidapi.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while searching the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Exercise catalog not configured. Add exercise.api_key to config.")]
    NotConfigured,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Catalog returned status {0}: {1}")]
    Status(u16, String),
    #[error("Malformed catalog response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::Transport(e.to_string())
    }
}

/// Connection options for [`ExerciseCatalog`].
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub base_url: String,
    /// Value of the `X-RapidAPI-Host` header
    pub host: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Searches the exercise catalog by body part.
#[derive(Debug, Clone)]
pub struct ExerciseCatalog {
    client: reqwest::Client,
    base_url: String,
    host: String,
    api_key: String,
}

impl ExerciseCatalog {
    /// Creates a catalog client.
    ///
    /// Returns an error if no API key is configured.
    pub fn new(options: CatalogOptions) -> Result<Self, CatalogError> {
        let api_key = options
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CatalogError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            host: options.host,
            api_key,
        })
    }

    fn search_url(&self, body_part: BodyPart) -> String {
        format!(
            "{}/exercises/bodyPart/{}",
            self.base_url,
            body_part.path_segment()
        )
    }

    /// Fetches every exercise for a body part.
    pub async fn search(&self, body_part: BodyPart) -> Result<Vec<Exercise>, CatalogError> {
        let response = self
            .client
            .get(self.search_url(body_part))
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status(status.as_u16(), body));
        }

        let body = response.text().await?;
        let exercises: Vec<Exercise> =
            serde_json::from_str(&body).map_err(|e| CatalogError::Malformed(e.to_string()))?;

        tracing::debug!(%body_part, count = exercises.len(), "catalog search");
        Ok(exercises)
    }
}
