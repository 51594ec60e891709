//! yt-dlp wrapper for stream extraction
//!
//! This module handles video information extraction using yt-dlp.
//! yt-dlp is located once at construction; a missing binary is reported as a
//! fetch failure on use so frontends stay usable.

use crate::extractor::models::{RawVideo, VideoDetails};
use crate::extractor::traits::StreamProvider;
use crate::utils::config::AppSettings;
use crate::utils::error::{Result, TubegrabError};
use crate::utils::platform::find_tool;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};

/// Stream provider backed by the yt-dlp command line tool
pub struct YtDlpProvider {
    ytdlp_path: Option<PathBuf>,
    timeout: Duration,
    cookies_file: Option<PathBuf>,
    cookies_from_browser: Option<String>,
}

impl YtDlpProvider {
    /// Locate yt-dlp and capture the extraction options from settings
    pub fn from_settings(settings: &AppSettings) -> Self {
        let ytdlp_path = find_tool("yt-dlp", settings.ytdlp_path.as_deref());
        match &ytdlp_path {
            Some(path) => info!("Found yt-dlp at: {}", path.display()),
            None => warn!("yt-dlp not found; video extraction will fail"),
        }

        Self {
            ytdlp_path,
            timeout: settings.extract_timeout(),
            cookies_file: settings.cookies_file.clone(),
            cookies_from_browser: settings.cookies_from_browser.clone(),
        }
    }

    fn command(&self) -> Result<AsyncCommand> {
        let path = self.ytdlp_path.as_ref().ok_or_else(|| {
            TubegrabError::Fetch("yt-dlp not found. Please install yt-dlp".to_string())
        })?;

        let mut cmd = AsyncCommand::new(path);
        cmd.arg("--no-warnings").arg("--no-playlist");
        if let Some(file) = &self.cookies_file {
            cmd.arg("--cookies").arg(file);
        }
        if let Some(browser) = &self.cookies_from_browser {
            cmd.arg("--cookies-from-browser").arg(browser);
        }
        cmd.kill_on_drop(true);
        Ok(cmd)
    }

    async fn run(&self, mut cmd: AsyncCommand, what: &str) -> Result<Output> {
        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!("Failed to run yt-dlp for {}: {}", what, e);
                return Err(TubegrabError::Fetch(format!("failed to run yt-dlp: {}", e)));
            }
            Err(_) => {
                return Err(TubegrabError::Fetch(format!(
                    "yt-dlp timed out after {}s during {}",
                    self.timeout.as_secs(),
                    what
                )));
            }
        };

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("yt-dlp {} failed: {}", what, error_msg);
            return Err(TubegrabError::Fetch(if error_msg.is_empty() {
                format!("yt-dlp exited with {}", output.status)
            } else {
                error_msg
            }));
        }

        Ok(output)
    }
}

#[async_trait]
impl StreamProvider for YtDlpProvider {
    fn id(&self) -> &'static str {
        "yt-dlp"
    }

    /// Uses: yt-dlp --dump-json --no-download
    async fn fetch_video(&self, url: &str) -> Result<VideoDetails> {
        ensure_fetchable(url)?;
        debug!("Extracting video info for URL: {}", url);

        let mut cmd = self.command()?;
        cmd.arg("--dump-json").arg("--no-download").arg(url);
        let output = self.run(cmd, "extraction").await?;

        let details = parse_video_json(&String::from_utf8_lossy(&output.stdout))?;
        info!(
            "Extracted {} streams for \"{}\"",
            details.streams.len(),
            details.title
        );
        Ok(details)
    }

    /// Uses: yt-dlp -f <itag> -g
    async fn resolve_url(&self, url: &str, itag: &str) -> Result<String> {
        ensure_fetchable(url)?;
        debug!("Getting direct URL for format {} from {}", itag, url);

        let mut cmd = self.command()?;
        cmd.arg("-f").arg(itag).arg("-g").arg(url);
        let output = self.run(cmd, "URL resolution").await?;

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                TubegrabError::Fetch(format!("yt-dlp returned no URL for format {}", itag))
            })
    }
}

/// Accept only absolute http(s) URLs
pub fn validate_url(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url.trim())
        .map_err(|e| TubegrabError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        _ => Err(TubegrabError::InvalidUrl(url.to_string())),
    }
}

/// A URL yt-dlp cannot be pointed at is a fetch failure at this boundary
fn ensure_fetchable(url: &str) -> Result<()> {
    validate_url(url)
        .map(|_| ())
        .map_err(|e| TubegrabError::Fetch(e.to_string()))
}

/// Parse one `--dump-json` document into [`VideoDetails`]
pub fn parse_video_json(json: &str) -> Result<VideoDetails> {
    let raw: RawVideo = serde_json::from_str(json.trim())
        .map_err(|e| TubegrabError::Fetch(format!("unexpected yt-dlp output: {}", e)))?;
    Ok(raw.into())
}
