//! Download module: transfer, merge and progress reporting

pub mod engine;
pub mod fetcher;
pub mod merger;
pub mod progress;

// Re-export for convenience
pub use engine::{DownloadPlan, DownloadRequest, Downloader, DownloaderConfig, OutputMode};
pub use fetcher::{HttpFetcher, MediaFetcher};
pub use merger::{FfmpegMerger, MergeTool};
pub use progress::{DownloadProgress, DownloadStatus, ProgressReporter};
