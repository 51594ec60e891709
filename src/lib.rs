//! tubegrab library
//!
//! Stream lookup through yt-dlp with a TTL cache, resolution-based stream
//! selection, and downloads that merge separate video and audio via ffmpeg.

pub mod cache;
pub mod downloader;
pub mod extractor;
pub mod gui;
pub mod selector;
pub mod utils;
pub mod web;

// Re-export main types for easier use
pub use cache::{Clock, StreamCache, SystemClock};
pub use downloader::{
    DownloadProgress, DownloadRequest, DownloadStatus, Downloader, OutputMode, ProgressReporter,
};
pub use extractor::{StreamInfo, StreamProvider, VideoDetails, YtDlpProvider};
pub use selector::{select, Criterion, SelectionPolicy};
pub use utils::{AppSettings, Result, TubegrabError};
