//! Application configuration

use crate::utils::error::{Result, TubegrabError};
use crate::utils::platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable naming a Netscape cookie file handed to yt-dlp
pub const COOKIES_FILE_ENV: &str = "YT_COOKIES_FILE";
/// Environment variable naming a browser yt-dlp should read cookies from
pub const COOKIES_FROM_BROWSER_ENV: &str = "YT_COOKIES_FROM_BROWSER";

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Download location
    pub download_location: PathBuf,

    /// Quality used when none is given ("best", "highest", "audio", "1080p", ...)
    pub preferred_quality: String,

    /// Seconds a stream list stays fresh in the metadata cache
    pub cache_ttl_secs: u64,

    /// Upper bound for a yt-dlp metadata call
    pub extract_timeout_secs: u64,

    /// Per-request timeout for media transfers
    pub fetch_timeout_secs: u64,

    /// Container used when video and audio are merged
    pub merge_container: String,

    /// Largest combined stream "best available" will pick, in bytes
    pub max_combined_size: Option<u64>,

    /// Explicit yt-dlp binary
    pub ytdlp_path: Option<PathBuf>,

    /// Explicit ffmpeg binary
    pub ffmpeg_path: Option<PathBuf>,

    pub cookies_file: Option<PathBuf>,

    pub cookies_from_browser: Option<String>,

    /// Web front end bind address
    pub web_addr: String,

    /// Maximum simultaneous web connections
    pub web_max_connections: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            download_location: platform::default_download_dir(),
            preferred_quality: "1080p".to_string(),
            cache_ttl_secs: 30 * 60,
            extract_timeout_secs: 60,
            fetch_timeout_secs: 30 * 60,
            merge_container: "mp4".to_string(),
            max_combined_size: None,
            ytdlp_path: None,
            ffmpeg_path: None,
            cookies_file: None,
            cookies_from_browser: None,
            web_addr: "127.0.0.1:8501".to_string(),
            web_max_connections: 32,
        }
    }
}

impl AppSettings {
    /// Default location of the settings file
    pub fn default_path() -> PathBuf {
        platform::config_dir().join("settings.json")
    }

    /// Load settings from `path`, falling back to defaults when the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default().validated());
        }

        let json = std::fs::read_to_string(path)?;
        let settings: AppSettings = serde_json::from_str(&json).map_err(|e| {
            TubegrabError::Config(format!("{}: {}", path.display(), e))
        })?;

        info!("Loaded settings from {}", path.display());
        Ok(settings.validated())
    }

    /// Write settings as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply cookie overrides from the process environment
    pub fn apply_env(mut self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok());
        self
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(file) = lookup(COOKIES_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            self.cookies_file = Some(PathBuf::from(file));
        }
        if let Some(browser) = lookup(COOKIES_FROM_BROWSER_ENV).filter(|v| !v.trim().is_empty()) {
            self.cookies_from_browser = Some(browser);
        }
    }

    /// Enforce sane minimums
    pub fn validated(mut self) -> Self {
        if self.cache_ttl_secs == 0 {
            warn!("cache_ttl_secs must be positive, using 1");
            self.cache_ttl_secs = 1;
        }
        if self.extract_timeout_secs == 0 {
            self.extract_timeout_secs = 60;
        }
        if self.fetch_timeout_secs == 0 {
            self.fetch_timeout_secs = 30 * 60;
        }
        if self.web_max_connections == 0 {
            self.web_max_connections = 1;
        }
        if self.merge_container.trim().is_empty() {
            self.merge_container = "mp4".to_string();
        }
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
