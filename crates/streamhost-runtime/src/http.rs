//! HTTP [`Fetcher`] built on reqwest.
//!
//! Redirects are followed by hand so each hop is logged and the final
//! `Location` target is re-requested from scratch, the way the release
//! hosts (GitHub, dl.strem.io) expect.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response, header, redirect};
use streamhost_core::constants::USER_AGENT;
use streamhost_core::ports::{DownloadError, Fetcher};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Maximum redirect hops before a download is abandoned.
pub const MAX_REDIRECTS: usize = 10;

/// Called with (`downloaded_bytes`, `total_bytes`); total is 0 when unknown.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Streams downloads to disk with manual redirect handling.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for ReqwestFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestFetcher")
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, DownloadError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| DownloadError::Request {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            progress: None,
        })
    }

    /// Report download progress through `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// GET `url`, following up to [`MAX_REDIRECTS`] `Location` hops.
    async fn get_following(&self, url: &str) -> Result<Response, DownloadError> {
        let mut current = url.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .client
                .get(&current)
                .send()
                .await
                .map_err(|e| DownloadError::Request {
                    url: current.clone(),
                    reason: e.to_string(),
                })?;

            let status = response.status();
            if status.is_redirection() {
                current = redirect_target(&response, &current)?;
                debug!(from = %response.url(), to = %current, "Following redirect");
                continue;
            }

            if !status.is_success() {
                return Err(DownloadError::Status {
                    url: current,
                    status: status.as_u16(),
                });
            }

            return Ok(response);
        }

        Err(DownloadError::TooManyRedirects {
            url: url.to_string(),
        })
    }

    async fn stream_to_file(
        &self,
        url: &str,
        response: Response,
        dest: &Path,
    ) -> Result<u64, DownloadError> {
        let total_size = response.content_length().unwrap_or(0);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = File::create(dest).await?;
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| DownloadError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(ref cb) = self.progress {
                cb(downloaded, total_size);
            }
        }

        file.flush().await?;
        Ok(downloaded)
    }
}

fn redirect_target(response: &Response, current: &str) -> Result<String, DownloadError> {
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| DownloadError::InvalidResponse {
            url: current.to_string(),
            reason: format!("{} without Location header", response.status()),
        })?;

    // Relative Location values resolve against the URL that issued them
    response
        .url()
        .join(location)
        .map(|url| url.to_string())
        .map_err(|e| DownloadError::InvalidResponse {
            url: current.to_string(),
            reason: format!("bad Location {location:?}: {e}"),
        })
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        let response = self.get_following(url).await?;
        response.text().await.map_err(|e| DownloadError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        info!(url, dest = %dest.display(), "Downloading");
        let response = self.get_following(url).await?;

        match self.stream_to_file(url, response, dest).await {
            Ok(bytes) => {
                info!(url, bytes, "Download complete");
                Ok(bytes)
            }
            Err(e) => {
                warn!(url, error = %e, "Download failed; removing partial file");
                if let Err(rm) = fs::remove_file(dest).await
                    && rm.kind() != std::io::ErrorKind::NotFound
                {
                    warn!(path = %dest.display(), error = %rm, "Could not remove partial download");
                }
                Err(e)
            }
        }
    }
}
