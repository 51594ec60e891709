//! Transfer of resolved media URLs to disk

use crate::downloader::progress::{DownloadStatus, ProgressReporter};
use crate::utils::error::{Result, TubegrabError};
use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Writes the body behind a media URL into a file
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download `url` into `dest`, returning the byte count
    async fn fetch(&self, url: &str, dest: &Path, progress: &ProgressReporter) -> Result<u64>;
}

/// Streaming HTTP fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path, progress: &ProgressReporter) -> Result<u64> {
        debug!("Fetching media into {}", dest.display());

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TubegrabError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let total_size = response.content_length().unwrap_or(0);
        let mut snapshot = progress.snapshot(total_size);
        snapshot.status = DownloadStatus::Downloading;
        progress.send(snapshot.clone()).await;

        let mut file = File::create(dest).await?;
        let mut downloaded = 0u64;

        // Track download speed
        let start_time = Instant::now();
        let mut last_update_time = start_time;

        // Stream response to file
        let mut stream = response.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            // Update progress every second
            let now = Instant::now();
            if now.duration_since(last_update_time) >= Duration::from_secs(1) {
                let elapsed = now.duration_since(start_time).as_secs_f64();
                let speed = if elapsed > 0.0 {
                    downloaded as f64 / elapsed
                } else {
                    0.0
                };
                snapshot.update(downloaded, speed);
                progress.send(snapshot.clone()).await;
                last_update_time = now;
            }
        }

        // Ensure file is flushed
        file.flush().await?;
        file.sync_all().await?;

        if total_size > 0 && downloaded != total_size {
            return Err(TubegrabError::Fetch(format!(
                "transfer ended early: {} of {} bytes",
                downloaded, total_size
            )));
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        snapshot.total_bytes = downloaded;
        snapshot.update(downloaded, if elapsed > 0.0 { downloaded as f64 / elapsed } else { 0.0 });
        progress.send(snapshot).await;

        info!("Fetched {} bytes into {}", downloaded, dest.display());
        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(HttpFetcher::new(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
        let dest = temp.path().join("out.bin");

        // Port 9 on loopback: nothing listens there
        let result = fetcher
            .fetch("http://127.0.0.1:9/media", &dest, &ProgressReporter::disabled())
            .await;
        assert!(result.is_err());
    }
}
