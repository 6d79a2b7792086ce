//! HTTP fetch port.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Network failures. Always recoverable from the caller's point of view.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("too many redirects starting at {url}")]
    TooManyRedirects { url: String },

    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Fetches remote resources.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the body as text.
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError>;

    /// Stream `url` into `dest`, following redirects. Returns bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}
