//! Error handling for tubegrab

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tubegrab
#[derive(Debug, Error)]
pub enum TubegrabError {
    /// The stream provider could not produce a stream list or a media URL
    #[error("Failed to fetch video data: {0}")]
    Fetch(String),

    #[error("No matching stream: {0}")]
    NoMatchingStream(String),

    /// The merge tool is missing or did not produce a usable file
    #[error("Merge tool unavailable: {0}")]
    MergeUnavailable(String),

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unknown quality: {0}")]
    InvalidQuality(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TubegrabError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            TubegrabError::Fetch(_) | TubegrabError::Network(_) => "fetch",
            TubegrabError::NoMatchingStream(_) => "no_matching_stream",
            TubegrabError::MergeUnavailable(_) => "merge_unavailable",
            TubegrabError::DestinationExists(_) => "destination_exists",
            TubegrabError::InvalidUrl(_) => "invalid_url",
            TubegrabError::InvalidQuality(_) => "invalid_quality",
            TubegrabError::Config(_) => "config",
            TubegrabError::Io(_) => "io",
            TubegrabError::Serialization(_) => "serialization",
        }
    }

    /// Text suitable for showing to an end user in a frontend
    pub fn user_message(&self) -> String {
        match self {
            TubegrabError::Fetch(detail) => friendly_fetch_message(detail),
            TubegrabError::Network(_) => {
                "Unable to connect. Please check your internet connection".to_string()
            }
            TubegrabError::NoMatchingStream(detail) => {
                format!("No suitable stream found ({})", detail)
            }
            TubegrabError::MergeUnavailable(_) => {
                "ffmpeg is required to merge video and audio. Install ffmpeg or choose video-only output"
                    .to_string()
            }
            TubegrabError::DestinationExists(path) => {
                format!("A file named {} already exists", display_name(path))
            }
            TubegrabError::InvalidUrl(_) => {
                "This doesn't appear to be a valid video URL".to_string()
            }
            TubegrabError::InvalidQuality(label) => format!(
                "\"{}\" is not a known quality. Use best, highest, audio-only or a resolution such as 1080p",
                label
            ),
            other => other.to_string(),
        }
    }
}

/// Map provider stderr onto something a person can act on
fn friendly_fetch_message(detail: &str) -> String {
    let lower = detail.to_lowercase();

    if lower.contains("invalid url") {
        "This doesn't appear to be a valid video URL".to_string()
    } else if lower.contains("private") {
        "This video is private or restricted".to_string()
    } else if lower.contains("geo") || lower.contains("country") || lower.contains("region") {
        "This video is not available in your region".to_string()
    } else if lower.contains("unavailable") || lower.contains("removed") {
        "This video is not available or has been removed".to_string()
    } else if lower.contains("timed out") || lower.contains("network") || lower.contains("connection")
    {
        "Unable to connect. Please check your internet connection".to_string()
    } else if lower.contains("yt-dlp not found") {
        "yt-dlp is not installed. Please install yt-dlp".to_string()
    } else {
        format!("Could not fetch video information: {}", detail)
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, TubegrabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(TubegrabError::Fetch("x".into()).kind(), "fetch");
        assert_eq!(
            TubegrabError::DestinationExists(PathBuf::from("/tmp/a.mp4")).kind(),
            "destination_exists"
        );
        assert_eq!(
            TubegrabError::MergeUnavailable("missing".into()).kind(),
            "merge_unavailable"
        );
    }

    #[test]
    fn test_user_message_for_rejected_url() {
        let err = TubegrabError::Fetch("Invalid URL: not a url".into());
        assert_eq!(err.kind(), "fetch");
        assert_eq!(err.user_message(), "This doesn't appear to be a valid video URL");
    }

    #[test]
    fn test_user_message_for_geo_block() {
        let err = TubegrabError::Fetch(
            "ERROR: The uploader has not made this video available in your country".into(),
        );
        assert_eq!(err.user_message(), "This video is not available in your region");
    }

    #[test]
    fn test_user_message_names_existing_file() {
        let err = TubegrabError::DestinationExists(PathBuf::from("/videos/clip.mp4"));
        assert!(err.user_message().contains("clip.mp4"));
    }
}
