//! Minimal client for hunt story and theme documents.
//!
//! This crate acquires the two JSON documents a hunt needs, over HTTP
//! or from local files, and hands parsed data to the engine. Story
//! acquisition is strict: a hunt cannot start without one. Theme
//! acquisition is best-effort: any failure degrades to the default
//! theme, matching the engine's style-fallback rules.

use hunt_core::story::{RawStory, RawTheme};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when acquiring documents.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error (status {status}) fetching {url}")]
    Http { status: u16, url: String },

    #[error("Failed to parse document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP client for story and theme documents.
#[derive(Clone)]
pub struct StoryClient {
    client: reqwest::Client,
}

impl StoryClient {
    /// Create a client with default timeouts.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Fetch and parse a story document.
    pub async fn fetch_story(&self, url: &str) -> Result<RawStory, FetchError> {
        self.fetch_json(url).await
    }

    /// Fetch and parse a theme document.
    ///
    /// Degrades to the default theme on any failure; the hunt loads
    /// with default styles instead of aborting.
    pub async fn fetch_theme(&self, url: &str) -> RawTheme {
        match self.fetch_json(url).await {
            Ok(theme) => theme,
            Err(e) => {
                tracing::warn!(url, error = %e, "theme fetch failed, using default theme");
                RawTheme::default()
            }
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl Default for StoryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Read and parse a story document from a local file.
pub fn read_story_file(path: impl AsRef<Path>) -> Result<RawStory, FetchError> {
    let content = std::fs::read_to_string(path)?;
    Ok(RawStory::from_json(&content)?)
}

/// Read and parse a theme document from a local file.
///
/// Degrades to the default theme on any failure, like [`StoryClient::fetch_theme`].
pub fn read_theme_file(path: impl AsRef<Path>) -> RawTheme {
    let path = path.as_ref();
    let parsed = std::fs::read_to_string(path)
        .map_err(FetchError::from)
        .and_then(|content| Ok(RawTheme::from_json(&content)?));

    match parsed {
        Ok(theme) => theme,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "theme read failed, using default theme");
            RawTheme::default()
        }
    }
}
