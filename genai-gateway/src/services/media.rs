//! Materializes images as base64 inline parts.
//!
//! Bytes are never inspected: whatever is read or fetched is labelled
//! `image/jpeg`. The whole image is buffered in memory.

use crate::models::InlineMediaPart;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, StatusCode};
use service_core::error::AppError;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Failed to read uploaded image: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to store uploaded image: {0}")]
    Stage(#[source] std::io::Error),

    #[error("Failed to fetch image from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch image from {url}: server responded with {status}")]
    Status { url: String, status: StatusCode },
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

/// Read a file from local storage into an inline part.
pub async fn load_local(path: &Path) -> Result<InlineMediaPart, MediaError> {
    let bytes = tokio::fs::read(path).await?;

    tracing::debug!(size = bytes.len(), "Loaded uploaded image");

    Ok(encode(&bytes))
}

/// GET `url` and turn the response body into an inline part.
pub async fn fetch_remote(client: &Client, url: &str) -> Result<InlineMediaPart, MediaError> {
    let fetch_error = |source: reqwest::Error| MediaError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(fetch_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(MediaError::Status {
            url: url.to_string(),
            status,
        });
    }

    let bytes = response.bytes().await.map_err(fetch_error)?;

    tracing::debug!(url = %url, size = bytes.len(), "Fetched remote image");

    Ok(encode(&bytes))
}

fn encode(bytes: &[u8]) -> InlineMediaPart {
    InlineMediaPart::jpeg(STANDARD.encode(bytes))
}
